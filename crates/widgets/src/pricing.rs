//! Pricing-plan voting widget

use std::sync::Arc;
use tokio::sync::watch;

use budgetease_client::{EnvironmentSignals, FeedbackStore};
use budgetease_types::{ContextKey, FeedbackPayload, PayloadKind, PlanId};

use crate::controller::{WidgetCore, WidgetError};
use crate::signal::PageNotifier;
use crate::state::WidgetState;

/// Controller for the pricing vote
pub struct PricingController {
    core: WidgetCore,
}

impl PricingController {
    /// Create a controller for one pricing section
    pub fn new(
        store: Arc<FeedbackStore>,
        context: ContextKey,
        signals: EnvironmentSignals,
        notifier: Arc<dyn PageNotifier>,
    ) -> Self {
        Self {
            core: WidgetCore::new(store, PayloadKind::PricingVote, context, signals, notifier),
        }
    }

    /// Resolve the initial state from any prior vote
    pub async fn mount(&self) {
        self.core.resolve_initial().await;
    }

    /// Vote for a plan; voting again switches the vote
    pub async fn submit(&self, plan: PlanId) -> Result<(), WidgetError> {
        self.core
            .submit_payload(FeedbackPayload::PricingVote { plan })
            .await
    }

    /// The previously selected plan, when answered
    pub fn selected_plan(&self) -> Option<PlanId> {
        match self.core.state() {
            WidgetState::Answered {
                payload: FeedbackPayload::PricingVote { plan },
            } => Some(plan),
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
