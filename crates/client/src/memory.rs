//! In-memory record store
//!
//! Backs tests and offline development. Tracks call counts so tests can
//! assert that validation failures never reach the store, and supports
//! fault injection for exercising retry and revert paths.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use budgetease_types::StoreError;

use crate::store::RecordStore;

/// In-memory [`RecordStore`] keyed by conflict-target columns
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, HashMap<String, Value>>>,
    select_calls: AtomicU64,
    upsert_calls: AtomicU64,
    probe_calls: AtomicU64,
    latency_ms: AtomicU64,
    offline: AtomicBool,
    upsert_faults: Mutex<VecDeque<StoreError>>,
    select_faults: Mutex<VecDeque<StoreError>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of select calls that reached the store
    pub fn select_calls(&self) -> u64 {
        self.select_calls.load(Ordering::SeqCst)
    }

    /// Number of upsert calls that reached the store
    pub fn upsert_calls(&self) -> u64 {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    /// Number of reachability probes
    pub fn probe_calls(&self) -> u64 {
        self.probe_calls.load(Ordering::SeqCst)
    }

    /// Add artificial latency to every operation
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Simulate the store being unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Queue an error for the next upsert call
    pub async fn inject_upsert_error(&self, err: StoreError) {
        self.upsert_faults.lock().await.push_back(err);
    }

    /// Queue an error for the next select call
    pub async fn inject_select_error(&self, err: StoreError) {
        self.select_faults.lock().await.push_back(err);
    }

    /// Snapshot of all rows in a table
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .await
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    async fn simulate_transport(&self) -> Result<(), StoreError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::transport("Failed to fetch"));
        }
        Ok(())
    }

    fn conflict_key(conflict_target: &str, row: &Value) -> Result<String, StoreError> {
        conflict_target
            .split(',')
            .map(|column| {
                row.get(column)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        StoreError::new(
                            None,
                            format!("conflict column missing from row: {column}"),
                            None,
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|parts| parts.join(":"))
    }

    fn matches(row: &Value, filters: &[(String, String)]) -> bool {
        filters.iter().all(|(column, expected)| {
            row.get(column)
                .and_then(Value::as_str)
                .map(|actual| actual == expected)
                .unwrap_or(false)
        })
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert(
        &self,
        table: &str,
        conflict_target: &str,
        row: Value,
    ) -> Result<(), StoreError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_transport().await?;

        if let Some(err) = self.upsert_faults.lock().await.pop_front() {
            return Err(err);
        }

        let key = Self::conflict_key(conflict_target, &row)?;
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .insert(key, row);
        Ok(())
    }

    async fn select_one(
        &self,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<Option<Value>, StoreError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_transport().await?;

        if let Some(err) = self.select_faults.lock().await.pop_front() {
            return Err(err);
        }

        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|rows| {
            rows.values()
                .find(|row| Self::matches(row, filters))
                .cloned()
        }))
    }

    async fn probe(&self) -> Result<(), StoreError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_transport().await
    }
}
