//! Feedback widget controllers
//!
//! Each widget follows the same lifecycle: on mount it derives the device
//! fingerprint and resolves its initial state from a prior-submission
//! lookup; on submit it validates input, upserts through the resilient
//! store client, and notifies its hosting page section; on unmount any
//! pending resolution is discarded. At most one submission is in flight
//! per widget instance.

pub mod controller;
pub mod pricing;
pub mod rating;
pub mod signal;
pub mod signup;
pub mod state;
pub mod validation;

pub use controller::WidgetError;
pub use pricing::PricingController;
pub use rating::RatingController;
pub use signal::{ChannelNotifier, NoopNotifier, PageNotifier};
pub use signup::{SignupController, SignupInput};
pub use state::WidgetState;
pub use validation::{is_valid_email, Field, FieldError, ValidationErrors};
