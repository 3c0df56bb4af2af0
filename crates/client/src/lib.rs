//! Resilient feedback-store client
//!
//! The write path for the site's feedback widgets: derive a device
//! fingerprint from ambient environment signals, look up or idempotently
//! upsert records keyed on `(fingerprint, context)` against a remote
//! record store, with bounded exponential-backoff retries around every
//! call. Connection monitoring, locale stamping and best-effort analytics
//! ride along.

pub mod analytics;
pub mod config;
pub mod connection;
pub mod fingerprint;
pub mod locale;
pub mod memory;
pub mod rest;
pub mod retry;
pub mod store;
pub mod telemetry;

pub use analytics::{AnalyticsSink, NoopSink, RecordingSink, TracingSink};
pub use config::{ClientConfig, ConfigError, ConnectionSettings, RetrySettings, StoreConfig};
pub use connection::{ConnectionMonitor, ConnectionMonitorConfig};
pub use fingerprint::EnvironmentSignals;
pub use locale::{
    LocaleProvider, StaticLocale, TextDirection, FALLBACK_LANGUAGE, SUPPORTED_LANGUAGES,
};
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use retry::RetryPolicy;
pub use store::{FeedbackStore, RecordStore, SubmitError, SubmitRequest};
pub use telemetry::init_tracing;
