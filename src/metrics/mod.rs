//! Per-algorithm evaluation outcomes
//!
//! A [`MetricSet`] is produced once per algorithm invocation and is read-only
//! after the collector hands it downstream.
//!
//! ```text
//! MetricSet ── Outcome::Success(Metrics::Classification | Metrics::Regression)
//!           └─ Outcome::Failed { reason: Timeout | Fault, message }
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use model_arena::metrics::{ClassificationMetrics, MetricSet, TaskType};
//!
//! let rf = MetricSet::classification(
//!     "rf",
//!     ClassificationMetrics::new().accuracy(0.91).f1_score(0.88),
//! )
//! .with_training_time(1.2);
//!
//! assert_eq!(rf.task_type(), TaskType::Classification);
//! assert_eq!(rf.headline_score(), Some(0.91));
//! ```

mod metric_set;
mod output;

pub use metric_set::{
    ClassificationMetrics, FailureReason, MetricSet, Metrics, Outcome, RegressionMetrics,
    Status, TaskType,
};
pub use output::parse_trainer_output;
