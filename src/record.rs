//! Training Record - durable audit entry, one per training run
//!
//! Records are append-only: built once, saved once, never mutated. The
//! identity is assigned by the persistence layer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{MetricSet, Metrics, TaskType};
use crate::{Error, Result};

/// Identity assigned by a [`RecordPersister`](crate::store::RecordPersister).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Every algorithm succeeded.
    Success,
    /// A winner exists but at least one algorithm failed.
    PartialFailure,
    /// No algorithm succeeded.
    Failed,
}

impl RecordStatus {
    /// Status for a run with or without a winner and with `failed` failures.
    #[must_use]
    pub const fn for_run(has_winner: bool, failed: usize) -> Self {
        match (has_winner, failed) {
            (false, _) => Self::Failed,
            (true, 0) => Self::Success,
            (true, _) => Self::PartialFailure,
        }
    }

    /// Whether records with this status carry a winner.
    #[must_use]
    pub const fn has_winner(self) -> bool {
        matches!(self, Self::Success | Self::PartialFailure)
    }
}

/// Audit record of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    id: Option<RecordId>,
    user_id: u64,
    dataset_name: String,
    model_name: Option<String>,
    task_type: TaskType,
    winner_metrics: Option<Metrics>,
    training_time_seconds: Option<f64>,
    full_metrics: String,
    status: RecordStatus,
    date: DateTime<Utc>,
    description: Option<String>,
}

impl TrainingRecord {
    /// Start building a record for `user_id` on `dataset_name`.
    #[must_use]
    pub fn builder(
        user_id: u64,
        dataset_name: impl Into<String>,
        task_type: TaskType,
    ) -> TrainingRecordBuilder {
        TrainingRecordBuilder::new(user_id, dataset_name, task_type)
    }

    /// Copy of this record carrying the persistence identity.
    #[must_use]
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Persistence identity, once saved.
    #[must_use]
    pub const fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Requesting user.
    #[must_use]
    pub const fn user_id(&self) -> u64 {
        self.user_id
    }

    /// Dataset name.
    #[must_use]
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    /// Winning algorithm name.
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    /// Task type of the run.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Full-precision metrics of the winner.
    #[must_use]
    pub const fn winner_metrics(&self) -> Option<&Metrics> {
        self.winner_metrics.as_ref()
    }

    /// Winner accuracy; `None` for regression runs or runs without winner.
    #[must_use]
    pub const fn accuracy(&self) -> Option<f64> {
        match self.winner_metrics {
            Some(Metrics::Classification(m)) => m.accuracy,
            _ => None,
        }
    }

    /// Winner training time in seconds.
    #[must_use]
    pub const fn training_time_seconds(&self) -> Option<f64> {
        self.training_time_seconds
    }

    /// Serialized comparison table.
    #[must_use]
    pub fn full_metrics(&self) -> &str {
        &self.full_metrics
    }

    /// Run status.
    #[must_use]
    pub const fn status(&self) -> RecordStatus {
        self.status
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Free-text summary.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Builder for `TrainingRecord`.
#[derive(Debug)]
pub struct TrainingRecordBuilder {
    user_id: u64,
    dataset_name: String,
    task_type: TaskType,
    winner: Option<(String, Metrics, f64)>,
    full_metrics: String,
    status: RecordStatus,
    description: Option<String>,
}

impl TrainingRecordBuilder {
    /// Create a builder with required fields. Status defaults to `Failed`.
    #[must_use]
    pub fn new(user_id: u64, dataset_name: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            user_id,
            dataset_name: dataset_name.into(),
            task_type,
            winner: None,
            full_metrics: String::new(),
            status: RecordStatus::Failed,
            description: None,
        }
    }

    /// Snapshot the winner's name, metrics and training time.
    #[must_use]
    pub fn winner(mut self, winner: &MetricSet) -> Self {
        self.winner = winner.metrics().map(|m| {
            (
                winner.algorithm_name().to_string(),
                *m,
                winner.training_time_seconds(),
            )
        });
        self
    }

    /// Serialized comparison table.
    #[must_use]
    pub fn full_metrics(mut self, full_metrics: impl Into<String>) -> Self {
        self.full_metrics = full_metrics.into();
        self
    }

    /// Run status.
    #[must_use]
    pub const fn status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    /// Free-text summary.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build the record, stamping the creation date.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the status and winner disagree, or the
    /// winner's metrics belong to another task type.
    pub fn build(self) -> Result<TrainingRecord> {
        match (&self.winner, self.status.has_winner()) {
            (None, true) => {
                return Err(Error::InvalidInput(format!(
                    "{:?} record requires a winning model",
                    self.status
                )));
            }
            (Some((name, _, _)), false) => {
                return Err(Error::InvalidInput(format!(
                    "Failed record cannot name a winner ({name})"
                )));
            }
            (Some((name, metrics, _)), true) if metrics.task_type() != self.task_type => {
                return Err(Error::InvalidInput(format!(
                    "winner {name} has {} metrics in a {} run",
                    metrics.task_type(),
                    self.task_type
                )));
            }
            _ => {}
        }

        let (model_name, winner_metrics, training_time_seconds) = match self.winner {
            Some((name, metrics, secs)) => (Some(name), Some(metrics), Some(secs)),
            None => (None, None, None),
        };

        Ok(TrainingRecord {
            id: None,
            user_id: self.user_id,
            dataset_name: self.dataset_name,
            model_name,
            task_type: self.task_type,
            winner_metrics,
            training_time_seconds,
            full_metrics: self.full_metrics,
            status: self.status,
            date: Utc::now(),
            description: self.description,
        })
    }
}
