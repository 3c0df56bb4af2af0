//! Feedback record types and row mapping
//!
//! One [`FeedbackRecord`] exists per `(browser_fingerprint, cta_source)`
//! pair; resubmissions overwrite the payload, language and last-seen
//! timestamp rather than inserting a second row. The row mapping mirrors
//! the remote store's column names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use uuid::Uuid;

use crate::errors::RecordError;

/// Conflict target shared by all feedback tables.
pub const CONFLICT_TARGET: &str = "browser_fingerprint,cta_source";

/// Derived device identifier
///
/// Fingerprints are used for deduplication, not authentication. They are:
/// - Stable: the same environment signals always produce the same value
/// - Opaque: a lowercase hex digest, never decomposed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Create a fingerprint from an already-derived string
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the fingerprint as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifies which widget/page/call-to-action produced a record
/// (e.g. `budget.cta`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextKey(String);

impl ContextKey {
    /// Create a context key
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContextKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContextKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ContextKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Newsletter signup preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsletterPreference {
    Yes,
    No,
}

impl NewsletterPreference {
    /// Get the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsletterPreference::Yes => "yes",
            NewsletterPreference::No => "no",
        }
    }

    /// Parse from the wire representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(NewsletterPreference::Yes),
            "no" => Some(NewsletterPreference::No),
            _ => None,
        }
    }
}

/// Interest in a user interview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewInterest {
    Yes,
    Maybe,
    No,
}

impl InterviewInterest {
    /// Get the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewInterest::Yes => "yes",
            InterviewInterest::Maybe => "maybe",
            InterviewInterest::No => "no",
        }
    }

    /// Parse from the wire representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(InterviewInterest::Yes),
            "maybe" => Some(InterviewInterest::Maybe),
            "no" => Some(InterviewInterest::No),
            _ => None,
        }
    }
}

/// Four-level emoji rating
///
/// Two glyph sets were in circulation for the lower levels; the first set
/// is canonical on the wire and the second is accepted when reading back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmileyRating {
    #[serde(rename = "😍")]
    Love,
    #[serde(rename = "🙂")]
    Like,
    #[serde(rename = "🥱", alias = "😐")]
    Neutral,
    #[serde(rename = "☹️", alias = "😕")]
    Dislike,
}

impl SmileyRating {
    /// Get the canonical emoji glyph
    pub fn as_emoji(&self) -> &'static str {
        match self {
            SmileyRating::Love => "😍",
            SmileyRating::Like => "🙂",
            SmileyRating::Neutral => "🥱",
            SmileyRating::Dislike => "☹️",
        }
    }

    /// Parse a glyph, accepting both scales
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "😍" => Some(SmileyRating::Love),
            "🙂" => Some(SmileyRating::Like),
            "🥱" | "😐" => Some(SmileyRating::Neutral),
            "☹️" | "😕" => Some(SmileyRating::Dislike),
            _ => None,
        }
    }
}

impl fmt::Display for SmileyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_emoji())
    }
}

/// Proposed pricing plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Tax,
    Discovery,
    Complete,
}

impl PlanId {
    /// Get the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Tax => "tax",
            PlanId::Discovery => "discovery",
            PlanId::Complete => "complete",
        }
    }

    /// Parse from the wire representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tax" => Some(PlanId::Tax),
            "discovery" => Some(PlanId::Discovery),
            "complete" => Some(PlanId::Complete),
            _ => None,
        }
    }
}

/// Coarse device class stamped on rating records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    /// Classify a viewport width in CSS pixels
    pub fn from_viewport_width(width: u32) -> Self {
        if width < 768 {
            DeviceType::Mobile
        } else if width < 1024 {
            DeviceType::Tablet
        } else {
            DeviceType::Desktop
        }
    }

    /// Get the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
        }
    }

    /// Parse from the wire representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "desktop" => Some(DeviceType::Desktop),
            "mobile" => Some(DeviceType::Mobile),
            "tablet" => Some(DeviceType::Tablet),
            _ => None,
        }
    }
}

/// Which kind of feedback a record carries
///
/// Each kind maps to its own table in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Email signup with newsletter/interview preferences
    Signup,
    /// Emoji rating
    Rating,
    /// Pricing-plan vote
    PricingVote,
}

impl PayloadKind {
    /// Table holding records of this kind
    pub fn table(&self) -> &'static str {
        match self {
            PayloadKind::Signup => "user_feedback",
            PayloadKind::Rating => "feature_ratings",
            PayloadKind::PricingVote => "pricing_votes",
        }
    }

    /// Analytics event name emitted after a successful write
    pub fn event_name(&self) -> &'static str {
        match self {
            PayloadKind::Signup => "FeedbackSubmitted",
            PayloadKind::Rating => "FeatureRating",
            PayloadKind::PricingVote => "PricingVote",
        }
    }
}

/// Payload variants collected by the widgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedbackPayload {
    /// Email signup with newsletter/interview preferences
    Signup {
        newsletter: NewsletterPreference,
        interview: InterviewInterest,
        email: String,
    },
    /// Emoji rating; the device class is only known for in-page widgets
    Rating {
        rating: SmileyRating,
        device: Option<DeviceType>,
    },
    /// Pricing-plan vote
    PricingVote { plan: PlanId },
}

impl FeedbackPayload {
    /// Get the payload kind
    pub fn kind(&self) -> PayloadKind {
        match self {
            FeedbackPayload::Signup { .. } => PayloadKind::Signup,
            FeedbackPayload::Rating { .. } => PayloadKind::Rating,
            FeedbackPayload::PricingVote { .. } => PayloadKind::PricingVote,
        }
    }
}

/// One feedback record per `(browser_fingerprint, cta_source)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Derived device fingerprint; part of the conflict key
    pub browser_fingerprint: Fingerprint,
    /// Widget/page source; part of the conflict key
    pub context_key: ContextKey,
    /// Collected payload
    pub payload: FeedbackPayload,
    /// Locale tag active at submission time
    pub language: String,
    /// Stamped on every write; the previous value is discarded
    pub last_seen_at: DateTime<Utc>,
    /// Minted once per controller session; analytics correlation only
    pub browser_id: Uuid,
    /// Minted per submission; analytics correlation only
    pub visitor_id: Uuid,
}

impl FeedbackRecord {
    /// Render the record as a flat store row
    pub fn to_row(&self) -> Value {
        let mut row = json!({
            "browser_id": self.browser_id,
            "visitor_id": self.visitor_id,
            "browser_fingerprint": self.browser_fingerprint.as_str(),
            "cta_source": self.context_key.as_str(),
            "language": self.language,
            "last_seen_at": self.last_seen_at.to_rfc3339(),
        });
        if let Some(columns) = row.as_object_mut() {
            match &self.payload {
                FeedbackPayload::Signup {
                    newsletter,
                    interview,
                    email,
                } => {
                    columns.insert("newsletter_preference".into(), json!(newsletter.as_str()));
                    columns.insert("interview_interest".into(), json!(interview.as_str()));
                    columns.insert("email".into(), json!(email));
                }
                FeedbackPayload::Rating { rating, device } => {
                    columns.insert("rating".into(), json!(rating.as_emoji()));
                    if let Some(device) = device {
                        columns.insert("device_type".into(), json!(device.as_str()));
                    }
                }
                FeedbackPayload::PricingVote { plan } => {
                    columns.insert("plan_id".into(), json!(plan.as_str()));
                }
            }
        }
        row
    }

    /// Parse a store row back into a record
    pub fn from_row(kind: PayloadKind, row: &Value) -> Result<Self, RecordError> {
        let payload = match kind {
            PayloadKind::Signup => FeedbackPayload::Signup {
                newsletter: parse_column(row, "newsletter_preference", NewsletterPreference::parse)?,
                interview: parse_column(row, "interview_interest", InterviewInterest::parse)?,
                email: required_column(row, "email")?.to_string(),
            },
            PayloadKind::Rating => FeedbackPayload::Rating {
                rating: parse_column(row, "rating", SmileyRating::parse)?,
                device: optional_column(row, "device_type")
                    .map(|s| {
                        DeviceType::parse(s)
                            .ok_or_else(|| RecordError::InvalidColumn("device_type", s.to_string()))
                    })
                    .transpose()?,
            },
            PayloadKind::PricingVote => FeedbackPayload::PricingVote {
                plan: parse_column(row, "plan_id", PlanId::parse)?,
            },
        };

        Ok(Self {
            browser_fingerprint: Fingerprint::new(required_column(row, "browser_fingerprint")?),
            context_key: ContextKey::new(required_column(row, "cta_source")?),
            payload,
            language: required_column(row, "language")?.to_string(),
            last_seen_at: parse_column(row, "last_seen_at", |s| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|t| t.with_timezone(&Utc))
            })?,
            browser_id: parse_column(row, "browser_id", |s| Uuid::parse_str(s).ok())?,
            visitor_id: parse_column(row, "visitor_id", |s| Uuid::parse_str(s).ok())?,
        })
    }
}

fn required_column<'a>(row: &'a Value, name: &'static str) -> Result<&'a str, RecordError> {
    row.get(name)
        .and_then(Value::as_str)
        .ok_or(RecordError::MissingColumn(name))
}

fn optional_column<'a>(row: &'a Value, name: &'static str) -> Option<&'a str> {
    row.get(name).and_then(Value::as_str)
}

fn parse_column<T>(
    row: &Value,
    name: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, RecordError> {
    let raw = required_column(row, name)?;
    parse(raw).ok_or_else(|| RecordError::InvalidColumn(name, raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(payload: FeedbackPayload) -> FeedbackRecord {
        FeedbackRecord {
            browser_fingerprint: Fingerprint::new("ab12"),
            context_key: ContextKey::new("budget.cta"),
            payload,
            language: "fr".to_string(),
            last_seen_at: Utc::now(),
            browser_id: Uuid::new_v4(),
            visitor_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_device_type_from_viewport_width() {
        assert_eq!(DeviceType::from_viewport_width(320), DeviceType::Mobile);
        assert_eq!(DeviceType::from_viewport_width(767), DeviceType::Mobile);
        assert_eq!(DeviceType::from_viewport_width(768), DeviceType::Tablet);
        assert_eq!(DeviceType::from_viewport_width(1023), DeviceType::Tablet);
        assert_eq!(DeviceType::from_viewport_width(1024), DeviceType::Desktop);
        assert_eq!(DeviceType::from_viewport_width(2560), DeviceType::Desktop);
    }

    #[test]
    fn test_smiley_rating_accepts_both_scales() {
        assert_eq!(SmileyRating::parse("🙂"), Some(SmileyRating::Like));
        assert_eq!(SmileyRating::parse("🥱"), Some(SmileyRating::Neutral));
        assert_eq!(SmileyRating::parse("😐"), Some(SmileyRating::Neutral));
        assert_eq!(SmileyRating::parse("☹️"), Some(SmileyRating::Dislike));
        assert_eq!(SmileyRating::parse("😕"), Some(SmileyRating::Dislike));
        assert_eq!(SmileyRating::parse("x"), None);
    }

    #[test]
    fn test_payload_kind_tables() {
        assert_eq!(PayloadKind::Signup.table(), "user_feedback");
        assert_eq!(PayloadKind::Rating.table(), "feature_ratings");
        assert_eq!(PayloadKind::PricingVote.table(), "pricing_votes");
    }

    #[test]
    fn test_rating_row_roundtrip() {
        let record = sample_record(FeedbackPayload::Rating {
            rating: SmileyRating::Like,
            device: Some(DeviceType::Desktop),
        });

        let row = record.to_row();
        assert_eq!(row["rating"], "🙂");
        assert_eq!(row["device_type"], "desktop");
        assert_eq!(row["cta_source"], "budget.cta");

        let parsed = FeedbackRecord::from_row(PayloadKind::Rating, &row).unwrap();
        assert_eq!(parsed.payload, record.payload);
        assert_eq!(parsed.browser_fingerprint, record.browser_fingerprint);
        assert_eq!(parsed.browser_id, record.browser_id);
    }

    #[test]
    fn test_rating_row_without_device_type() {
        let record = sample_record(FeedbackPayload::Rating {
            rating: SmileyRating::Neutral,
            device: None,
        });

        let row = record.to_row();
        assert!(row.get("device_type").is_none());

        let parsed = FeedbackRecord::from_row(PayloadKind::Rating, &row).unwrap();
        assert_eq!(
            parsed.payload,
            FeedbackPayload::Rating {
                rating: SmileyRating::Neutral,
                device: None
            }
        );
    }

    #[test]
    fn test_signup_row_roundtrip() {
        let record = sample_record(FeedbackPayload::Signup {
            newsletter: NewsletterPreference::Yes,
            interview: InterviewInterest::Maybe,
            email: "someone@example.com".to_string(),
        });

        let row = record.to_row();
        assert_eq!(row["newsletter_preference"], "yes");
        assert_eq!(row["interview_interest"], "maybe");
        assert_eq!(row["email"], "someone@example.com");

        let parsed = FeedbackRecord::from_row(PayloadKind::Signup, &row).unwrap();
        assert_eq!(parsed.payload, record.payload);
    }

    #[test]
    fn test_vote_row_roundtrip() {
        let record = sample_record(FeedbackPayload::PricingVote {
            plan: PlanId::Discovery,
        });

        let row = record.to_row();
        assert_eq!(row["plan_id"], "discovery");

        let parsed = FeedbackRecord::from_row(PayloadKind::PricingVote, &row).unwrap();
        assert_eq!(parsed.payload, record.payload);
    }

    #[test]
    fn test_from_row_missing_column() {
        let row = json!({ "browser_fingerprint": "ab12" });
        let err = FeedbackRecord::from_row(PayloadKind::PricingVote, &row).unwrap_err();
        assert!(matches!(err, RecordError::MissingColumn("plan_id")));
    }

    #[test]
    fn test_from_row_invalid_value() {
        let mut row = sample_record(FeedbackPayload::PricingVote {
            plan: PlanId::Tax,
        })
        .to_row();
        row["plan_id"] = json!("gold");

        let err = FeedbackRecord::from_row(PayloadKind::PricingVote, &row).unwrap_err();
        assert!(matches!(err, RecordError::InvalidColumn("plan_id", _)));
    }
}
