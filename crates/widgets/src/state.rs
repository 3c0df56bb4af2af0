//! Widget state machine
//!
//! Every feedback widget follows the same three states:
//! Unanswered → Submitting → Answered, with Answered re-enterable as
//! Submitting when the user updates a prior answer. The Submitting state
//! carries the pre-submit payload so a failed upsert can revert without
//! leaving a partial record.

use budgetease_types::FeedbackPayload;

/// Observable widget state
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetState {
    /// No prior submission for this fingerprint/context pair
    Unanswered,
    /// A submission is in flight; gates further submissions
    Submitting {
        /// Payload to restore if the submission fails
        previous: Option<FeedbackPayload>,
    },
    /// A record exists; re-submission is offered with this payload
    Answered { payload: FeedbackPayload },
}

impl WidgetState {
    /// Check if no answer has been recorded
    pub fn is_unanswered(&self) -> bool {
        matches!(self, WidgetState::Unanswered)
    }

    /// Check if a submission is in flight
    pub fn is_submitting(&self) -> bool {
        matches!(self, WidgetState::Submitting { .. })
    }

    /// Check if an answer is recorded
    pub fn is_answered(&self) -> bool {
        matches!(self, WidgetState::Answered { .. })
    }

    /// The recorded payload, when answered
    pub fn answered_payload(&self) -> Option<&FeedbackPayload> {
        match self {
            WidgetState::Answered { payload } => Some(payload),
            _ => None,
        }
    }

    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            WidgetState::Unanswered => "unanswered",
            WidgetState::Submitting { .. } => "submitting",
            WidgetState::Answered { .. } => "answered",
        }
    }
}
