//! In-memory record store using `DashMap`.
//!
//! Data is lost on process restart.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::RecordPersister;
use crate::record::{RecordId, RecordStatus, TrainingRecord};
use crate::Result;

/// Append-only in-memory record store.
///
/// Thread-safe; identities are assigned from a monotonically increasing
/// counter starting at 1.
#[derive(Debug)]
pub struct MemoryRecordStore {
    records: DashMap<RecordId, TrainingRecord>,
    next_id: AtomicU64,
}

impl MemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record by identity.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<TrainingRecord> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    fn collect(&self, keep: impl Fn(&TrainingRecord) -> bool) -> Vec<TrainingRecord> {
        let mut records: Vec<TrainingRecord> = self
            .records
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        // newest first; identity breaks same-timestamp ties
        records.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| b.id().cmp(&a.id())));
        records
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordPersister for MemoryRecordStore {
    async fn save(&self, record: TrainingRecord) -> Result<RecordId> {
        let id = RecordId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.records.insert(id, record.with_id(id));
        Ok(id)
    }

    async fn find_best_accuracy(&self, user_id: u64) -> Result<Option<f64>> {
        Ok(self
            .records
            .iter()
            .filter(|e| e.user_id() == user_id && e.status().has_winner())
            .filter_map(|e| e.accuracy())
            .filter(|a| !a.is_nan())
            .fold(None, |best: Option<f64>, a| Some(best.map_or(a, |b| b.max(a)))))
    }

    async fn find_all_for_user(&self, user_id: u64) -> Result<Vec<TrainingRecord>> {
        Ok(self.collect(|r| r.user_id() == user_id))
    }

    async fn find_all(&self) -> Result<Vec<TrainingRecord>> {
        Ok(self.collect(|_| true))
    }

    async fn count_by_status(&self, user_id: u64, status: RecordStatus) -> Result<u64> {
        Ok(self
            .records
            .iter()
            .filter(|e| e.user_id() == user_id && e.status() == status)
            .count() as u64)
    }

    async fn count_for_user(&self, user_id: u64) -> Result<u64> {
        Ok(self.records.iter().filter(|e| e.user_id() == user_id).count() as u64)
    }
}
