//! Active locale, consumed read-only for stamping records

/// Writing direction of the active language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

/// Language tags the site ships copy for.
pub const SUPPORTED_LANGUAGES: [&str; 4] = ["en", "fr", "de", "it"];

/// Tag used when the requested language is not supported.
pub const FALLBACK_LANGUAGE: &str = "fr";

/// Exposes the active language tag and writing direction
pub trait LocaleProvider: Send + Sync {
    /// Active language tag
    fn language(&self) -> String;

    /// Writing direction of the active language
    fn direction(&self) -> TextDirection;
}

/// Fixed locale, resolved once at construction
#[derive(Debug, Clone)]
pub struct StaticLocale {
    language: String,
}

impl StaticLocale {
    /// Create a locale, falling back when the tag is unsupported
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let language = if SUPPORTED_LANGUAGES.contains(&tag.as_str()) {
            tag
        } else {
            FALLBACK_LANGUAGE.to_string()
        };
        Self { language }
    }
}

impl Default for StaticLocale {
    fn default() -> Self {
        Self {
            language: FALLBACK_LANGUAGE.to_string(),
        }
    }
}

impl LocaleProvider for StaticLocale {
    fn language(&self) -> String {
        self.language.clone()
    }

    fn direction(&self) -> TextDirection {
        // All four supported languages read left to right.
        TextDirection::Ltr
    }
}
