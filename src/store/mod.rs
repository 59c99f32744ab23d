//! Record persistence contract
//!
//! The engine needs only a handful of read/write operations from whatever
//! storage technology backs it.
//!
//! # Example
//!
//! ```rust
//! use model_arena::metrics::TaskType;
//! use model_arena::record::{RecordStatus, TrainingRecord};
//! use model_arena::store::{MemoryRecordStore, RecordPersister};
//!
//! # async fn example() -> model_arena::Result<()> {
//! let store = MemoryRecordStore::new();
//! let record = TrainingRecord::builder(42, "iris", TaskType::Classification).build()?;
//!
//! let id = store.save(record).await?;
//! assert_eq!(store.find_all_for_user(42).await?[0].id(), Some(id));
//! assert_eq!(store.count_by_status(42, RecordStatus::Failed).await?, 1);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::MemoryRecordStore;

use std::future::Future;

use crate::record::{RecordId, RecordStatus, TrainingRecord};
use crate::Result;

/// Durable storage of training records.
pub trait RecordPersister: Send + Sync {
    /// Append `record`, returning its newly assigned identity.
    fn save(&self, record: TrainingRecord) -> impl Future<Output = Result<RecordId>> + Send;

    /// Highest winner accuracy among the user's classification runs that
    /// produced a winner.
    ///
    /// `PartialFailure` runs count too, not only fully successful ones.
    fn find_best_accuracy(&self, user_id: u64) -> impl Future<Output = Result<Option<f64>>> + Send;

    /// All of the user's records, most recent first.
    fn find_all_for_user(
        &self,
        user_id: u64,
    ) -> impl Future<Output = Result<Vec<TrainingRecord>>> + Send;

    /// Number of the user's records with `status`.
    fn count_by_status(
        &self,
        user_id: u64,
        status: RecordStatus,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Every record, most recent first.
    fn find_all(&self) -> impl Future<Output = Result<Vec<TrainingRecord>>> + Send;

    /// Number of the user's records.
    fn count_for_user(&self, user_id: u64) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let records = self.find_all_for_user(user_id).await?;
            Ok(records.len() as u64)
        }
    }
}
