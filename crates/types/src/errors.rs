//! Store error triple and retryability classification

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error reported by the record store or its transport
///
/// Carries the code/message/details triple of the store protocol. Transport
/// failures have no code; their message is what the classifier below
/// inspects.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct StoreError {
    /// Protocol error code, when the store reported one
    pub code: Option<String>,
    /// Human-readable message; also drives retry classification
    pub message: String,
    /// Additional detail from the store, when present
    pub details: Option<String>,
}

/// Code the store uses for a zero-row lookup result.
pub const NO_ROWS_CODE: &str = "PGRST116";

impl StoreError {
    /// Create a store-reported error
    pub fn new(
        code: impl Into<Option<String>>,
        message: impl Into<String>,
        details: impl Into<Option<String>>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: details.into(),
        }
    }

    /// Create a transport-level error (no protocol code)
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            details: None,
        }
    }

    /// Whether this is the store's "no rows" status
    ///
    /// Absence is a state, not a failure; `select_one` implementations map
    /// it to `Ok(None)` before callers ever see it.
    pub fn is_not_found(&self) -> bool {
        self.code.as_deref() == Some(NO_ROWS_CODE)
    }
}

/// Classifies errors as retryable (transient) or terminal
pub trait RetryClass {
    /// Whether a retry could plausibly succeed
    fn is_retryable(&self) -> bool;
}

impl RetryClass for StoreError {
    fn is_retryable(&self) -> bool {
        is_retryable_message(&self.message)
    }
}

/// Message-based transient-error classification
///
/// Matches the wording the transport layer produces: the literal fetch
/// failure, a `network`/`timeout` substring (case-sensitive), or a bare
/// three-digit 5xx status. Kept message-based on purpose; see the design
/// notes.
pub fn is_retryable_message(message: &str) -> bool {
    message == "Failed to fetch"
        || message.contains("network")
        || message.contains("timeout")
        || is_server_status(message)
}

fn is_server_status(message: &str) -> bool {
    let bytes = message.as_bytes();
    bytes.len() == 3 && bytes[0] == b'5' && bytes[1..].iter().all(u8::is_ascii_digit)
}

/// Error parsing a store row back into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A required column was absent or not a string
    #[error("missing column: {0}")]
    MissingColumn(&'static str),

    /// A column held a value outside the expected vocabulary
    #[error("invalid value in column {0}: {1}")]
    InvalidColumn(&'static str, String),
}
