//! Best-effort analytics sink
//!
//! A non-propagating notification interface: `emit` cannot fail from the
//! caller's point of view, so an analytics outage can never surface as a
//! failed submission. Implementations swallow their own errors.

use std::sync::Mutex;
use tracing::info;

use budgetease_types::AnalyticsEvent;

/// Fire-and-forget event emission
pub trait AnalyticsSink: Send + Sync {
    /// Emit one event. Must not propagate failures.
    fn emit(&self, event: AnalyticsEvent);
}

/// Discards every event
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn emit(&self, _event: AnalyticsEvent) {}
}

/// Logs events through `tracing`
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn emit(&self, event: AnalyticsEvent) {
        info!(name = %event.name, attributes = ?event.attributes, "analytics event");
    }
}

/// Captures events for test assertions
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured events
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl AnalyticsSink for RecordingSink {
    fn emit(&self, event: AnalyticsEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
