//! Device fingerprint derivation
//!
//! Turns ambient client environment signals into a stable identifier used
//! as the deduplication key for feedback records. The derivation is pure:
//! same signals, same fingerprint, no side effects. Two devices with
//! identical signals collide by construction; that is acceptable for
//! deduplication and disqualifying for authentication.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use budgetease_types::Fingerprint;

/// Delimiter between signal components. Fixed: changing it changes every
/// fingerprint ever derived.
const COMPONENT_DELIMITER: &str = "|";

/// Ambient client environment signals
///
/// Component order matters; it is part of the derivation contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSignals {
    /// Browser user-agent string
    pub user_agent: String,
    /// Negotiated language tag
    pub language: String,
    /// Timezone offset from UTC in minutes
    pub timezone_offset_minutes: i32,
    /// Screen width in pixels
    pub screen_width: u32,
    /// Screen height in pixels
    pub screen_height: u32,
    /// Screen color depth in bits
    pub color_depth: u32,
    /// Logical processor count
    pub hardware_concurrency: u32,
}

impl EnvironmentSignals {
    /// Derive the fingerprint for these signals
    ///
    /// SHA-256 over the delimiter-joined components, lowercase hex encoded.
    pub fn fingerprint(&self) -> Fingerprint {
        let digest = Sha256::digest(self.canonical_string().as_bytes());
        Fingerprint::new(hex::encode(digest))
    }

    fn canonical_string(&self) -> String {
        [
            self.user_agent.clone(),
            self.language.clone(),
            self.timezone_offset_minutes.to_string(),
            self.screen_width.to_string(),
            self.screen_height.to_string(),
            self.color_depth.to_string(),
            self.hardware_concurrency.to_string(),
        ]
        .join(COMPONENT_DELIMITER)
    }
}
