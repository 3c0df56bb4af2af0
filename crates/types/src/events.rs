//! Analytics events
//!
//! Emitted after a successful write, on a best-effort basis. Event and
//! attribute names match what the site's analytics dashboards already
//! expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::records::{FeedbackPayload, FeedbackRecord};

/// Named analytics event with a free-form attribute mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// Event name
    pub name: String,
    /// Attribute mapping
    pub attributes: HashMap<String, String>,
    /// When the event was built
    pub emitted_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    /// Create a new event
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: HashMap::new(),
            emitted_at: Utc::now(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Build the event for a successful submission
    pub fn for_submission(record: &FeedbackRecord, is_update: bool) -> Self {
        let event = Self::new(record.payload.kind().event_name());
        match &record.payload {
            FeedbackPayload::Signup { .. } => event
                .with_attribute("source", record.context_key.as_str())
                .with_attribute("isUpdate", bool_attr(is_update)),
            FeedbackPayload::Rating { rating, .. } => event
                .with_attribute("feature", record.context_key.as_str())
                .with_attribute("rating", rating.as_emoji())
                .with_attribute("isUpdate", bool_attr(is_update)),
            FeedbackPayload::PricingVote { plan } => {
                event.with_attribute("plan", plan.as_str())
            }
        }
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
