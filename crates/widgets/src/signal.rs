//! Widget-to-page signal
//!
//! On a successful submission the widget notifies its hosting page
//! section so the page can swap its own presentation. The notification
//! names the source widget and carries nothing else.

use tokio::sync::mpsc;

use budgetease_types::ContextKey;

/// Receives successful-submission notifications
pub trait PageNotifier: Send + Sync {
    /// Called once per successful submission with the source widget's
    /// context key
    fn submitted(&self, source: &ContextKey);
}

/// Ignores every notification
pub struct NoopNotifier;

impl PageNotifier for NoopNotifier {
    fn submitted(&self, _source: &ContextKey) {}
}

/// Forwards notifications over a channel
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<ContextKey>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end for the host page
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ContextKey>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl PageNotifier for ChannelNotifier {
    fn submitted(&self, source: &ContextKey) {
        // A departed host is not the widget's problem.
        let _ = self.sender.send(source.clone());
    }
}
