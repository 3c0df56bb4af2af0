//! Shared controller core
//!
//! Owns the mount/submit/unmount lifecycle common to all feedback
//! widgets: fingerprint derivation on first use, initial-state resolution
//! from a prior-submission lookup, the Submitting gate, revert on failed
//! upsert, and discarding of resolutions that arrive after unmount.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use budgetease_client::{EnvironmentSignals, FeedbackStore, SubmitError, SubmitRequest};
use budgetease_types::{ContextKey, FeedbackPayload, Fingerprint, PayloadKind};

use crate::signal::PageNotifier;
use crate::state::WidgetState;
use crate::validation::ValidationErrors;

/// Error surfaced at the widget boundary
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Input failed client-side validation; nothing was sent
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A submission is already in flight on this widget instance
    #[error("a submission is already in flight")]
    SubmissionInFlight,

    /// The submission failed after retries; state has been reverted
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Lifecycle core shared by the widget controllers
pub(crate) struct WidgetCore {
    store: Arc<FeedbackStore>,
    kind: PayloadKind,
    context: ContextKey,
    signals: EnvironmentSignals,
    notifier: Arc<dyn PageNotifier>,
    browser_id: Uuid,
    fingerprint: OnceLock<Fingerprint>,
    state: watch::Sender<WidgetState>,
    // Bumped on unmount; stale lifecycles stop touching state.
    epoch: AtomicU64,
}

impl WidgetCore {
    pub(crate) fn new(
        store: Arc<FeedbackStore>,
        kind: PayloadKind,
        context: ContextKey,
        signals: EnvironmentSignals,
        notifier: Arc<dyn PageNotifier>,
    ) -> Self {
        let (state, _) = watch::channel(WidgetState::Unanswered);
        Self {
            store,
            kind,
            context,
            signals,
            notifier,
            browser_id: Uuid::new_v4(),
            fingerprint: OnceLock::new(),
            state,
            epoch: AtomicU64::new(0),
        }
    }

    /// Derive the fingerprint once and reuse it afterwards
    pub(crate) fn fingerprint(&self) -> &Fingerprint {
        self.fingerprint.get_or_init(|| self.signals.fingerprint())
    }

    pub(crate) fn state(&self) -> WidgetState {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.state.subscribe()
    }

    /// Invalidate pending lifecycles; their resolutions are discarded
    pub(crate) fn unmount(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn set_state_if_current(&self, epoch: u64, state: WidgetState) -> bool {
        if self.epoch.load(Ordering::SeqCst) == epoch {
            self.state.send_replace(state);
            true
        } else {
            debug!(context = %self.context, "widget unmounted, discarding resolution");
            false
        }
    }

    /// Resolve the initial state from a prior-submission lookup
    ///
    /// Absence resolves to Unanswered, presence to Answered with the
    /// stored payload. Lookup failures are logged and leave the widget
    /// Unanswered.
    pub(crate) async fn resolve_initial(&self) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let fingerprint = self.fingerprint().clone();

        match self
            .store
            .lookup(self.kind, &fingerprint, &self.context)
            .await
        {
            Ok(Some(record)) => {
                self.set_state_if_current(
                    epoch,
                    WidgetState::Answered {
                        payload: record.payload,
                    },
                );
            }
            Ok(None) => {
                self.set_state_if_current(epoch, WidgetState::Unanswered);
            }
            Err(err) => {
                warn!(context = %self.context, error = %err, "failed to check prior submission");
            }
        }
    }

    /// Submit a validated payload
    ///
    /// The Submitting state gates concurrent submissions on this
    /// instance. On failure the pre-submit state is restored.
    pub(crate) async fn submit_payload(&self, payload: FeedbackPayload) -> Result<(), WidgetError> {
        let epoch = self.epoch.load(Ordering::SeqCst);

        let mut previous = None;
        let entered = self.state.send_if_modified(|state| match state {
            WidgetState::Submitting { .. } => false,
            WidgetState::Answered { payload } => {
                previous = Some(payload.clone());
                *state = WidgetState::Submitting {
                    previous: previous.clone(),
                };
                true
            }
            WidgetState::Unanswered => {
                *state = WidgetState::Submitting { previous: None };
                true
            }
        });
        if !entered {
            return Err(WidgetError::SubmissionInFlight);
        }

        let request = SubmitRequest {
            fingerprint: self.fingerprint().clone(),
            context_key: self.context.clone(),
            payload,
            browser_id: self.browser_id,
            is_update: previous.is_some(),
        };

        match self.store.submit(request).await {
            Ok(record) => {
                let applied = self.set_state_if_current(
                    epoch,
                    WidgetState::Answered {
                        payload: record.payload,
                    },
                );
                if applied {
                    self.notifier.submitted(&self.context);
                }
                Ok(())
            }
            Err(err) => {
                let reverted = match previous {
                    Some(payload) => WidgetState::Answered { payload },
                    None => WidgetState::Unanswered,
                };
                self.set_state_if_current(epoch, reverted);
                Err(WidgetError::Submit(err))
            }
        }
    }
}
