//! Algorithm invocations
//!
//! An [`Algorithm`] is an opaque unit of work: given a dataset it either
//! returns a [`MetricSet`] or fails. Training itself happens elsewhere.
//!
//! Adapters:
//! - [`FnAlgorithm`]: async closure
//! - [`BlockingAlgorithm`]: CPU-bound closure isolated on the blocking pool
//! - [`ProcessAlgorithm`]: external trainer program printing JSON

mod process;

pub use process::ProcessAlgorithm;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::metrics::{MetricSet, TaskType};

/// Dataset reference handed to every algorithm of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Display name, used in records and notifications.
    pub name: String,
    /// Where the algorithm can read the data (path or URI).
    pub location: Option<String>,
    /// Column to predict.
    pub target_column: Option<String>,
}

impl Dataset {
    /// Dataset known only by name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            target_column: None,
        }
    }

    /// Set the data location.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the target column.
    #[must_use]
    pub fn target(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }
}

/// One evaluable algorithm.
#[async_trait]
pub trait Algorithm: Send + Sync {
    /// Identifier, unique within a run.
    fn name(&self) -> &str;

    /// Task type the algorithm is declared for.
    fn task_type(&self) -> TaskType;

    /// Train and evaluate against `dataset`.
    async fn evaluate(&self, dataset: &Dataset) -> anyhow::Result<MetricSet>;
}

type BoxedEval = Arc<
    dyn Fn(Dataset) -> std::pin::Pin<Box<dyn Future<Output = anyhow::Result<MetricSet>> + Send>>
        + Send
        + Sync,
>;

/// Algorithm backed by an async closure.
///
/// ```rust
/// use model_arena::algorithm::{Algorithm, Dataset, FnAlgorithm};
/// use model_arena::metrics::{ClassificationMetrics, MetricSet, TaskType};
///
/// # async fn example() -> anyhow::Result<()> {
/// let rf = FnAlgorithm::new("rf", TaskType::Classification, |_dataset| async {
///     anyhow::Ok(MetricSet::classification("rf", ClassificationMetrics::new().accuracy(0.9)))
/// });
/// let set = rf.evaluate(&Dataset::named("iris")).await?;
/// assert!(set.is_success());
/// # Ok(())
/// # }
/// ```
pub struct FnAlgorithm {
    name: String,
    task_type: TaskType,
    eval: BoxedEval,
}

impl FnAlgorithm {
    /// Wrap `f`; it receives an owned copy of the dataset reference.
    pub fn new<F, Fut>(name: impl Into<String>, task_type: TaskType, f: F) -> Self
    where
        F: Fn(Dataset) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<MetricSet>> + Send + 'static,
    {
        Self {
            name: name.into(),
            task_type,
            eval: Arc::new(move |dataset| Box::pin(f(dataset))),
        }
    }
}

impl std::fmt::Debug for FnAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAlgorithm")
            .field("name", &self.name)
            .field("task_type", &self.task_type)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Algorithm for FnAlgorithm {
    fn name(&self) -> &str {
        &self.name
    }

    fn task_type(&self) -> TaskType {
        self.task_type
    }

    async fn evaluate(&self, dataset: &Dataset) -> anyhow::Result<MetricSet> {
        (self.eval)(dataset.clone()).await
    }
}

/// Algorithm backed by a synchronous, CPU-bound closure.
///
/// The closure runs on tokio's blocking pool. If the invocation is abandoned
/// on timeout the thread finishes in the background and its result is dropped.
pub struct BlockingAlgorithm<F> {
    name: String,
    task_type: TaskType,
    f: Arc<F>,
}

impl<F> BlockingAlgorithm<F>
where
    F: Fn(&Dataset) -> anyhow::Result<MetricSet> + Send + Sync + 'static,
{
    /// Wrap `f`.
    pub fn new(name: impl Into<String>, task_type: TaskType, f: F) -> Self {
        Self {
            name: name.into(),
            task_type,
            f: Arc::new(f),
        }
    }
}

#[async_trait]
impl<F> Algorithm for BlockingAlgorithm<F>
where
    F: Fn(&Dataset) -> anyhow::Result<MetricSet> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn task_type(&self) -> TaskType {
        self.task_type
    }

    async fn evaluate(&self, dataset: &Dataset) -> anyhow::Result<MetricSet> {
        let f = Arc::clone(&self.f);
        let dataset = dataset.clone();
        tokio::task::spawn_blocking(move || f(&dataset)).await?
    }
}
