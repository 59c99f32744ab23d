//! Training run orchestration
//!
//! ```text
//! Collecting → Selecting → Persisting → Notifying → Done
//! ```
//!
//! Phases never go backwards. Only a rejected request fails a run: a
//! malformed submission before any work, or mixed task types detected
//! before anything is persisted. Persistence and notification problems are
//! reported through [`RunStatus`] and the logs.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::algorithm::{Algorithm, Dataset};
use crate::collector::ResultCollector;
use crate::comparison::{round_to, ComparisonBuilder, ComparisonTable};
use crate::config::EngineConfig;
use crate::metrics::{MetricSet, Outcome};
use crate::notify::{NotificationChannel, NotificationDispatcher, TrainingSummary};
use crate::record::{RecordId, RecordStatus, TrainingRecord};
use crate::selection::SelectionPolicy;
use crate::store::RecordPersister;
use crate::{Error, Result};

/// Phase of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Algorithms are being evaluated.
    Collecting,
    /// The winner is being chosen.
    Selecting,
    /// The audit record is being saved.
    Persisting,
    /// The user is being notified.
    Notifying,
    /// The response is ready.
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Collecting => "collecting",
            Self::Selecting => "selecting",
            Self::Persisting => "persisting",
            Self::Notifying => "notifying",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Overall outcome reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Every algorithm succeeded and the record was saved.
    Success,
    /// A winner exists, some algorithms failed, the record was saved.
    PartialFailure,
    /// No algorithm succeeded; the record was saved.
    Failed,
    /// The audit record could not be saved.
    PersistenceFailed,
}

impl From<RecordStatus> for RunStatus {
    fn from(status: RecordStatus) -> Self {
        match status {
            RecordStatus::Success => Self::Success,
            RecordStatus::PartialFailure => Self::PartialFailure,
            RecordStatus::Failed => Self::Failed,
        }
    }
}

/// Result of one training run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResponse {
    /// Winning algorithm, if any succeeded.
    pub best_model: Option<String>,
    /// Every submitted algorithm in submission order.
    pub comparison: ComparisonTable,
    /// Human-readable line per algorithm, then a verdict line.
    pub reports: Vec<String>,
    /// Overall status.
    pub status: RunStatus,
    /// Identity of the saved record.
    pub record_id: Option<RecordId>,
}

/// Drives collection, selection, comparison, persistence and notification.
pub struct TrainingOrchestrator<P> {
    config: EngineConfig,
    collector: ResultCollector,
    policy: SelectionPolicy,
    comparison: ComparisonBuilder,
    persister: Arc<P>,
    dispatcher: NotificationDispatcher,
}

impl<P> fmt::Debug for TrainingOrchestrator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainingOrchestrator")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl<P: RecordPersister> TrainingOrchestrator<P> {
    /// Orchestrator over `persister` and a shared notification `channel`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `config` fails [`EngineConfig::validate`].
    pub fn new(
        config: EngineConfig,
        persister: Arc<P>,
        channel: Arc<dyn NotificationChannel>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            collector: ResultCollector::from_config(&config),
            policy: SelectionPolicy,
            comparison: ComparisonBuilder::new(config.display_precision),
            dispatcher: NotificationDispatcher::from_config(channel, &config),
            persister,
            config,
        })
    }

    /// Engine settings in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Record persister in use.
    #[must_use]
    pub const fn persister(&self) -> &Arc<P> {
        &self.persister
    }

    /// Evaluate `algorithms` on `dataset` for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty or duplicate-named submission or
    /// a blank dataset name, and `ContractViolation` when the run mixes
    /// task types. Nothing is persisted or sent in either case.
    pub async fn run(
        &self,
        user_id: u64,
        dataset: Dataset,
        algorithms: Vec<Arc<dyn Algorithm>>,
    ) -> Result<TrainingResponse> {
        validate_request(&dataset, &algorithms)?;
        info!(
            user_id,
            dataset = %dataset.name,
            algorithms = algorithms.len(),
            "training run started"
        );

        enter(user_id, RunPhase::Collecting);
        let results = self.collector.collect(&dataset, &algorithms).await;

        enter(user_id, RunPhase::Selecting);
        let winner = match self.policy.select(&results) {
            Ok(index) => index.map(|i| &results[i]),
            Err(e) => {
                warn!(user_id, error = %e, "training run rejected");
                return Err(e);
            }
        };
        let comparison = self.comparison.build(&results);
        let reports = self.reports(&results, winner);

        enter(user_id, RunPhase::Persisting);
        let failed = results.iter().filter(|s| !s.is_success()).count();
        let record_status = RecordStatus::for_run(winner.is_some(), failed);
        let record_id = match self
            .save_record(user_id, &dataset, &algorithms, winner, &comparison, record_status)
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                error!(user_id, error = %e, "failed to persist training record");
                None
            }
        };

        enter(user_id, RunPhase::Notifying);
        match winner {
            Some(set) => {
                self.notify(user_id, TrainingSummary::from_winner(set, &dataset.name))
                    .await;
            }
            None => debug!(user_id, "no winner, notification skipped"),
        }

        enter(user_id, RunPhase::Done);
        let status = if record_id.is_some() {
            RunStatus::from(record_status)
        } else {
            RunStatus::PersistenceFailed
        };
        info!(
            user_id,
            best_model = winner.map(MetricSet::algorithm_name),
            ?status,
            "training run finished"
        );

        Ok(TrainingResponse {
            best_model: winner.map(|s| s.algorithm_name().to_string()),
            comparison,
            reports,
            status,
            record_id,
        })
    }

    /// Tear down the notification channel.
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
    }

    async fn save_record(
        &self,
        user_id: u64,
        dataset: &Dataset,
        algorithms: &[Arc<dyn Algorithm>],
        winner: Option<&MetricSet>,
        comparison: &ComparisonTable,
        status: RecordStatus,
    ) -> Result<RecordId> {
        let task_type = winner.map_or_else(|| algorithms[0].task_type(), MetricSet::task_type);
        let description = match winner {
            Some(set) => format!(
                "{} algorithms on {}; best model {}",
                algorithms.len(),
                dataset.name,
                set.algorithm_name()
            ),
            None => format!(
                "{} algorithms on {}; no successful model",
                algorithms.len(),
                dataset.name
            ),
        };

        let mut builder = TrainingRecord::builder(user_id, dataset.name.as_str(), task_type)
            .full_metrics(comparison.to_json_string()?)
            .status(status)
            .description(description);
        if let Some(set) = winner {
            builder = builder.winner(set);
        }

        let id = self.persister.save(builder.build()?).await?;
        debug!(user_id, record_id = %id, ?status, "training record saved");
        Ok(id)
    }

    /// Fire the notification, waiting at most the configured grace period.
    async fn notify(&self, user_id: u64, summary: TrainingSummary) {
        let handle = self.dispatcher.spawn_notify(user_id, summary);
        match timeout(self.config.notification_grace, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(user_id, error = %e, "notification task failed"),
            Err(_) => debug!(user_id, "notification still in flight, not waiting"),
        }
    }

    fn reports(&self, results: &[MetricSet], winner: Option<&MetricSet>) -> Vec<String> {
        let precision = self.config.display_precision;
        let places = precision as usize;
        let mut reports: Vec<String> = results
            .iter()
            .map(|set| match set.outcome() {
                Outcome::Success { metrics } => {
                    let values: Vec<String> = metrics
                        .entries()
                        .iter()
                        .filter_map(|(key, value)| {
                            value.map(|v| format!("{key}={:.places$}", round_to(v, precision)))
                        })
                        .collect();
                    format!(
                        "{}: {} ({:.2}s)",
                        set.algorithm_name(),
                        values.join(" "),
                        set.training_time_seconds()
                    )
                }
                Outcome::Failed { message, .. } => {
                    format!("{}: failed ({message})", set.algorithm_name())
                }
            })
            .collect();

        reports.push(match winner {
            Some(set) => format!("best model: {}", set.algorithm_name()),
            None => "no successful model".to_string(),
        });
        reports
    }
}

fn enter(user_id: u64, phase: RunPhase) {
    debug!(user_id, %phase, "run phase");
}

/// Reject malformed submissions before any algorithm runs.
fn validate_request(dataset: &Dataset, algorithms: &[Arc<dyn Algorithm>]) -> Result<()> {
    if dataset.name.trim().is_empty() {
        return Err(Error::InvalidInput("dataset name is blank".to_string()));
    }

    let Some(first) = algorithms.first() else {
        return Err(Error::InvalidInput("no algorithms submitted".to_string()));
    };

    let mut seen = HashSet::with_capacity(algorithms.len());
    for algorithm in algorithms {
        let name = algorithm.name();
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("algorithm name is blank".to_string()));
        }
        if !seen.insert(name) {
            return Err(Error::InvalidInput(format!(
                "algorithm '{name}' submitted more than once"
            )));
        }
        if algorithm.task_type() != first.task_type() {
            return Err(Error::ContractViolation {
                expected: first.task_type(),
                found: algorithm.task_type(),
                algorithm: name.to_string(),
            });
        }
    }
    Ok(())
}
