//! Email signup widget
//!
//! Collects a newsletter preference, interview interest and email
//! address. All three fields are required; the email must parse.

use std::sync::Arc;
use tokio::sync::watch;

use budgetease_client::{EnvironmentSignals, FeedbackStore};
use budgetease_types::{
    ContextKey, FeedbackPayload, InterviewInterest, NewsletterPreference, PayloadKind,
};

use crate::controller::{WidgetCore, WidgetError};
use crate::signal::PageNotifier;
use crate::state::WidgetState;
use crate::validation::{is_valid_email, Field, FieldError, ValidationErrors};

/// Raw form input, validated on submit
#[derive(Debug, Clone, Default)]
pub struct SignupInput {
    /// Newsletter radio selection
    pub newsletter: Option<NewsletterPreference>,
    /// Interview radio selection
    pub interview: Option<InterviewInterest>,
    /// Email field, as typed
    pub email: String,
}

impl SignupInput {
    /// Validate and convert to a payload
    pub fn validate(&self) -> Result<FeedbackPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.newsletter.is_none() {
            errors.add(Field::Newsletter, FieldError::Required);
        }
        if self.interview.is_none() {
            errors.add(Field::Interview, FieldError::Required);
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.add(Field::Email, FieldError::Required);
        } else if !is_valid_email(email) {
            errors.add(Field::Email, FieldError::InvalidEmail);
        }

        if let (Some(newsletter), Some(interview)) = (self.newsletter, self.interview) {
            if errors.is_empty() {
                return Ok(FeedbackPayload::Signup {
                    newsletter,
                    interview,
                    email: email.to_string(),
                });
            }
        }
        Err(errors)
    }
}

/// Controller for the signup form
pub struct SignupController {
    core: WidgetCore,
}

impl SignupController {
    /// Create a controller for one form instance
    pub fn new(
        store: Arc<FeedbackStore>,
        context: ContextKey,
        signals: EnvironmentSignals,
        notifier: Arc<dyn PageNotifier>,
    ) -> Self {
        Self {
            core: WidgetCore::new(store, PayloadKind::Signup, context, signals, notifier),
        }
    }

    /// Resolve the initial state from any prior submission
    pub async fn mount(&self) {
        self.core.resolve_initial().await;
    }

    /// Validate and submit the form
    pub async fn submit(&self, input: SignupInput) -> Result<(), WidgetError> {
        let payload = input.validate()?;
        self.core.submit_payload(payload).await
    }

    /// Current state
    pub fn state(&self) -> WidgetState {
        self.core.state()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.core.subscribe()
    }

    /// Discard pending resolutions
    pub fn unmount(&self) {
        self.core.unmount();
    }
}
