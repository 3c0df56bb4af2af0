//! Shared domain types for the budgetease feedback platform
//!
//! This crate defines the feedback records collected by the marketing
//! site's widgets, the store error triple and its retryability
//! classification, and the analytics events emitted after successful
//! submissions.

pub mod errors;
pub mod events;
pub mod records;

pub use errors::{is_retryable_message, RecordError, RetryClass, StoreError, NO_ROWS_CODE};
pub use events::AnalyticsEvent;
pub use records::{
    ContextKey, DeviceType, FeedbackPayload, FeedbackRecord, Fingerprint, InterviewInterest,
    NewsletterPreference, PayloadKind, PlanId, SmileyRating, CONFLICT_TARGET,
};
