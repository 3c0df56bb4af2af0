//! Record store abstraction and the typed feedback-store client
//!
//! [`RecordStore`] is the seam to the remote service: a record-oriented
//! upsert/select interface parameterized by table name, conflict target
//! and filter predicates. [`FeedbackStore`] layers the domain on top:
//! typed lookups and submissions, retry wrapping, language/timestamp
//! stamping and best-effort analytics.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use budgetease_types::{
    AnalyticsEvent, ContextKey, FeedbackPayload, FeedbackRecord, Fingerprint, PayloadKind,
    RecordError, StoreError, CONFLICT_TARGET,
};

use crate::analytics::{AnalyticsSink, NoopSink};
use crate::locale::{LocaleProvider, StaticLocale};
use crate::retry::RetryPolicy;

/// Record-oriented interface to the remote store
///
/// Implementations map the store's "no rows" status to `Ok(None)` in
/// `select_one`; callers never branch on it as an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or overwrite the row identified by the conflict target
    /// columns. A second upsert with the same conflict key overwrites
    /// rather than erroring or duplicating.
    async fn upsert(
        &self,
        table: &str,
        conflict_target: &str,
        row: Value,
    ) -> Result<(), StoreError>;

    /// Fetch at most one row matching all equality filters
    async fn select_one(
        &self,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<Option<Value>, StoreError>;

    /// Cheap reachability check used by the connection monitor
    async fn probe(&self) -> Result<(), StoreError>;
}

/// Error from a lookup or submission, after retries
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Store or transport failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store returned a row this client cannot interpret
    #[error("invalid record returned by store: {0}")]
    Record(#[from] RecordError),
}

/// One submission from a widget controller
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Device fingerprint; half of the conflict key
    pub fingerprint: Fingerprint,
    /// Widget source; the other half of the conflict key
    pub context_key: ContextKey,
    /// Collected payload
    pub payload: FeedbackPayload,
    /// Session-scoped analytics id
    pub browser_id: Uuid,
    /// Whether a prior answer is being replaced
    pub is_update: bool,
}

/// Typed client over a [`RecordStore`]
///
/// Every lookup and write goes through the retry policy. Each successful
/// write emits one analytics event; emission is fire-and-forget and can
/// never fail a submission.
pub struct FeedbackStore {
    store: Arc<dyn RecordStore>,
    retry: RetryPolicy,
    analytics: Arc<dyn AnalyticsSink>,
    locale: Arc<dyn LocaleProvider>,
}

impl FeedbackStore {
    /// Create a client with default policy, no-op analytics and the
    /// fallback locale
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
            analytics: Arc::new(NoopSink),
            locale: Arc::new(StaticLocale::default()),
        }
    }

    /// Set the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the analytics sink
    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    /// Set the locale provider used to stamp records
    pub fn with_locale(mut self, locale: Arc<dyn LocaleProvider>) -> Self {
        self.locale = locale;
        self
    }

    /// The underlying record store
    pub fn record_store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// Look up the record for a `(fingerprint, context)` pair
    ///
    /// `Ok(None)` is the absence state that resolves a widget to
    /// Unanswered; it is not a failure.
    pub async fn lookup(
        &self,
        kind: PayloadKind,
        fingerprint: &Fingerprint,
        context: &ContextKey,
    ) -> Result<Option<FeedbackRecord>, SubmitError> {
        let table = kind.table();
        let filters = vec![
            (
                "browser_fingerprint".to_string(),
                fingerprint.as_str().to_string(),
            ),
            ("cta_source".to_string(), context.as_str().to_string()),
        ];

        let store = Arc::clone(&self.store);
        let row = self
            .retry
            .run(move || {
                let store = Arc::clone(&store);
                let filters = filters.clone();
                async move { store.select_one(table, &filters).await }
            })
            .await?;

        match row {
            Some(row) => Ok(Some(FeedbackRecord::from_row(kind, &row)?)),
            None => Ok(None),
        }
    }

    /// Upsert one feedback record
    ///
    /// Stamps `last_seen_at` with the current time and the active UI
    /// language, discarding previous values. Exactly one write per call;
    /// the analytics event afterwards is best-effort.
    pub async fn submit(&self, request: SubmitRequest) -> Result<FeedbackRecord, SubmitError> {
        let record = FeedbackRecord {
            browser_fingerprint: request.fingerprint,
            context_key: request.context_key,
            payload: request.payload,
            language: self.locale.language(),
            last_seen_at: Utc::now(),
            browser_id: request.browser_id,
            visitor_id: Uuid::new_v4(),
        };

        let table = record.payload.kind().table();
        let row = record.to_row();
        let store = Arc::clone(&self.store);

        self.retry
            .run(move || {
                let store = Arc::clone(&store);
                let row = row.clone();
                async move { store.upsert(table, CONFLICT_TARGET, row).await }
            })
            .await?;

        debug!(table, context = %record.context_key, "feedback record upserted");

        self.analytics
            .emit(AnalyticsEvent::for_submission(&record, request.is_update));

        Ok(record)
    }
}
