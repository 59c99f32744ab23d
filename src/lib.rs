//! # Model Arena: Concurrent Model Evaluation and Best-Model Selection
//!
//! **Version**: 0.1.0
//!
//! Model Arena runs a set of candidate ML algorithms against one dataset,
//! picks the best one with a deterministic ranking policy, keeps an audit
//! record of every run and tells the user when training completes.
//!
//! ## Pipeline
//!
//! ```text
//! ResultCollector ─▶ SelectionPolicy ─▶ ComparisonBuilder ─▶ RecordPersister ─▶ NotificationDispatcher
//!   (bounded pool)     (lexicographic)     (display table)      (audit record)      (push + log)
//! ```
//!
//! - **Containment**: a failing, panicking or hanging algorithm becomes a
//!   `Failed` entry; it never takes the run down
//! - **Determinism**: the same results always select the same winner, ties
//!   going to the earliest submission
//! - **Best effort**: persistence and notification problems are reported as
//!   status, not errors
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use model_arena::algorithm::{Algorithm, Dataset, FnAlgorithm};
//! use model_arena::metrics::{ClassificationMetrics, MetricSet, TaskType};
//! use model_arena::notify::MemoryNotificationChannel;
//! use model_arena::orchestrator::{RunStatus, TrainingOrchestrator};
//! use model_arena::store::MemoryRecordStore;
//! use model_arena::EngineConfig;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> model_arena::Result<()> {
//! let rf: Arc<dyn Algorithm> = Arc::new(FnAlgorithm::new("rf", TaskType::Classification, |_| async {
//!     anyhow::Ok(MetricSet::classification("rf", ClassificationMetrics::new().accuracy(0.91).f1_score(0.88)))
//! }));
//! let svm: Arc<dyn Algorithm> = Arc::new(FnAlgorithm::new("svm", TaskType::Classification, |_| async {
//!     anyhow::Ok(MetricSet::classification("svm", ClassificationMetrics::new().accuracy(0.91).f1_score(0.90)))
//! }));
//!
//! let orchestrator = TrainingOrchestrator::new(
//!     EngineConfig::default(),
//!     Arc::new(MemoryRecordStore::new()),
//!     Arc::new(MemoryNotificationChannel::new()),
//! )?;
//! let response = orchestrator.run(42, Dataset::named("iris"), vec![rf, svm]).await?;
//!
//! assert_eq!(response.best_model.as_deref(), Some("svm"));
//! assert_eq!(response.status, RunStatus::Success);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod algorithm;
pub mod collector;
pub mod comparison;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod notify;
pub mod orchestrator;
pub mod record;
pub mod selection;
pub mod store;

pub use collector::ResultCollector;
pub use comparison::{ComparisonBuilder, ComparisonTable};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use metrics::{MetricSet, TaskType};
pub use notify::{NotificationChannel, NotificationDispatcher};
pub use orchestrator::{RunStatus, TrainingOrchestrator, TrainingResponse};
pub use record::{RecordId, RecordStatus, TrainingRecord};
pub use selection::SelectionPolicy;
pub use store::RecordPersister;
