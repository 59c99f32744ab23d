//! Concurrent result collection
//!
//! Runs every submitted algorithm on a bounded worker pool and returns one
//! [`MetricSet`] per algorithm, in submission order.
//!
//! - Each invocation runs on its own task, so a panic or hang in one never
//!   blocks or cancels the others.
//! - A per-invocation timeout (started once a worker slot is acquired)
//!   aborts the invocation and yields `Failed/Timeout`.
//! - Errors and panics yield `Failed/Fault` with the message retained.
//! - No retries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::algorithm::{Algorithm, Dataset};
use crate::config::{EngineConfig, MAX_WORKERS_CEILING};
use crate::metrics::{FailureReason, MetricSet};

/// Bounded-concurrency executor for algorithm invocations.
#[derive(Debug, Clone)]
pub struct ResultCollector {
    max_workers: usize,
    timeout: Duration,
}

impl ResultCollector {
    /// Collector with a worker cap and per-invocation timeout.
    ///
    /// The cap is clamped to `1..=MAX_WORKERS_CEILING`.
    #[must_use]
    pub fn new(max_workers: usize, timeout: Duration) -> Self {
        Self {
            max_workers: max_workers.clamp(1, MAX_WORKERS_CEILING),
            timeout,
        }
    }

    /// Collector configured from engine settings.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_workers, config.algorithm_timeout)
    }

    /// Per-invocation timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Worker pool size used for `submitted` algorithms.
    #[must_use]
    pub fn pool_size(&self, submitted: usize) -> usize {
        submitted.clamp(1, self.max_workers)
    }

    /// Evaluate all `algorithms` against `dataset`.
    ///
    /// Never fails: every invocation is represented in the output, Failed
    /// entries included. Output order equals submission order.
    pub async fn collect(
        &self,
        dataset: &Dataset,
        algorithms: &[Arc<dyn Algorithm>],
    ) -> Vec<MetricSet> {
        if algorithms.is_empty() {
            return Vec::new();
        }

        let pool = self.pool_size(algorithms.len());
        debug!(
            submitted = algorithms.len(),
            workers = pool,
            timeout_ms = self.timeout.as_millis(),
            dataset = %dataset.name,
            "collecting algorithm results"
        );

        let semaphore = Arc::new(Semaphore::new(pool));
        let dataset = Arc::new(dataset.clone());
        let mut workers = JoinSet::new();

        for (index, algorithm) in algorithms.iter().enumerate() {
            let algorithm = Arc::clone(algorithm);
            let semaphore = Arc::clone(&semaphore);
            let dataset = Arc::clone(&dataset);
            let bound = self.timeout;

            workers.spawn(async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = semaphore.acquire_owned().await.ok();
                (index, invoke(algorithm, dataset, bound).await)
            });
        }

        let mut completed: Vec<(usize, MetricSet)> = Vec::with_capacity(algorithms.len());
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(entry) => completed.push(entry),
                Err(e) => warn!(error = %e, "collector worker lost"),
            }
        }

        // Any slot without a result lost its worker task; report it as a fault.
        let mut slots: Vec<Option<MetricSet>> = vec![None; algorithms.len()];
        for (index, set) in completed {
            slots[index] = Some(set);
        }
        slots
            .into_iter()
            .zip(algorithms)
            .map(|(slot, algorithm)| {
                slot.unwrap_or_else(|| {
                    MetricSet::failed(
                        algorithm.name(),
                        algorithm.task_type(),
                        FailureReason::Fault,
                        "worker task lost",
                    )
                })
            })
            .collect()
    }
}

/// Run one algorithm on its own task under `bound`.
async fn invoke(algorithm: Arc<dyn Algorithm>, dataset: Arc<Dataset>, bound: Duration) -> MetricSet {
    let name = algorithm.name().to_string();
    let task_type = algorithm.task_type();
    let started = Instant::now();

    let evaluating = Arc::clone(&algorithm);
    let mut handle = tokio::spawn(async move { evaluating.evaluate(&dataset).await });

    let set = match timeout(bound, &mut handle).await {
        Ok(Ok(Ok(set))) => accept(&name, set, started.elapsed()),
        Ok(Ok(Err(e))) => {
            MetricSet::failed(&name, task_type, FailureReason::Fault, format!("{e:#}"))
        }
        Ok(Err(join_error)) => {
            let message = if join_error.is_panic() {
                "algorithm panicked".to_string()
            } else {
                join_error.to_string()
            };
            MetricSet::failed(&name, task_type, FailureReason::Fault, message)
        }
        Err(_) => {
            handle.abort();
            MetricSet::failed(
                &name,
                task_type,
                FailureReason::Timeout,
                format!("timeout after {bound:?}"),
            )
        }
    };

    let set = if set.is_success() {
        set
    } else {
        set.with_training_time(started.elapsed().as_secs_f64())
    };

    match set.failure() {
        None => info!(algorithm = %name, score = ?set.headline_score(), "algorithm succeeded"),
        Some((reason, message)) => {
            warn!(algorithm = %name, %reason, detail = message, "algorithm failed");
        }
    }
    set
}

/// Normalize a successful result: submitted name, measured time if absent,
/// value ranges checked.
fn accept(name: &str, set: MetricSet, elapsed: Duration) -> MetricSet {
    let set = if set.algorithm_name() == name {
        set
    } else {
        debug!(
            submitted = name,
            reported = set.algorithm_name(),
            "algorithm reported a different name"
        );
        set.with_algorithm_name(name)
    };

    if let Err(e) = set.validate() {
        return MetricSet::failed(
            name,
            set.task_type(),
            FailureReason::Fault,
            format!("invalid metrics: {e}"),
        );
    }

    if set.training_time_seconds() > 0.0 {
        set
    } else {
        set.with_training_time(elapsed.as_secs_f64())
    }
}
