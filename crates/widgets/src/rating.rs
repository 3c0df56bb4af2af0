//! Emoji rating widget
//!
//! Used both inline on the informational pages and in the rating modal.
//! Inline instances know their viewport and stamp a device class; the
//! modal does not.

use std::sync::Arc;
use tokio::sync::watch;

use budgetease_client::{EnvironmentSignals, FeedbackStore};
use budgetease_types::{ContextKey, DeviceType, FeedbackPayload, PayloadKind, SmileyRating};

use crate::controller::{WidgetCore, WidgetError};
use crate::signal::PageNotifier;
use crate::state::WidgetState;

/// Controller for a rating picker
pub struct RatingController {
    core: WidgetCore,
    device: Option<DeviceType>,
}

impl RatingController {
    /// Create a controller for one picker instance
    pub fn new(
        store: Arc<FeedbackStore>,
        context: ContextKey,
        signals: EnvironmentSignals,
        device: Option<DeviceType>,
        notifier: Arc<dyn PageNotifier>,
    ) -> Self {
        Self {
            core: WidgetCore::new(store, PayloadKind::Rating, context, signals, notifier),
            device,
        }
    }

    /// Resolve the initial state from any prior rating
    pub async fn mount(&self) {
        self.core.resolve_initial().await;
    }

    /// Submit a rating
    ///
    /// The selection is the only input and the type guarantees it is
    /// present, so there is nothing to validate.
    pub async fn submit(&self, rating: SmileyRating) -> Result<(), WidgetError> {
        self.core
            .submit_payload(FeedbackPayload::Rating {
                rating,
                device: self.device,
            })
            .await
    }

    /// The previously recorded rating, when answered
    pub fn prior_rating(&self) -> Option<SmileyRating> {
        match self.core.state() {
            WidgetState::Answered {
                payload: FeedbackPayload::Rating { rating, .. },
            } => Some(rating),
            _ => None,
        }
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
