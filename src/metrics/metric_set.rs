//! MetricSet - one algorithm's evaluation outcome for a single run

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Kind of learning problem a run evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Discrete labels, ranked by accuracy/f1/precision/recall.
    Classification,
    /// Continuous target, ranked by r² then error magnitudes.
    Regression,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classification => f.write_str("Classification"),
            Self::Regression => f.write_str("Regression"),
        }
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classification" => Ok(Self::Classification),
            "regression" => Ok(Self::Regression),
            other => Err(Error::InvalidInput(format!("unknown task type: {other}"))),
        }
    }
}

/// Classification metrics. `None` means the algorithm did not produce the value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationMetrics {
    /// Fraction of correct predictions, in [0, 1].
    pub accuracy: Option<f64>,
    /// Weighted precision, in [0, 1].
    pub precision: Option<f64>,
    /// Weighted recall, in [0, 1].
    pub recall: Option<f64>,
    /// Weighted F1, in [0, 1].
    pub f1_score: Option<f64>,
}

impl ClassificationMetrics {
    /// Empty metric bag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accuracy: None,
            precision: None,
            recall: None,
            f1_score: None,
        }
    }

    /// Set accuracy.
    #[must_use]
    pub const fn accuracy(mut self, value: f64) -> Self {
        self.accuracy = Some(value);
        self
    }

    /// Set precision.
    #[must_use]
    pub const fn precision(mut self, value: f64) -> Self {
        self.precision = Some(value);
        self
    }

    /// Set recall.
    #[must_use]
    pub const fn recall(mut self, value: f64) -> Self {
        self.recall = Some(value);
        self
    }

    /// Set F1 score.
    #[must_use]
    pub const fn f1_score(mut self, value: f64) -> Self {
        self.f1_score = Some(value);
        self
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1Score", self.f1_score),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(Error::InvalidInput(format!(
                        "{key} must be within [0, 1], got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Regression metrics. `None` means the algorithm did not produce the value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean squared error, >= 0.
    pub mse: Option<f64>,
    /// Mean absolute error, >= 0.
    pub mae: Option<f64>,
    /// Root mean squared error, >= 0.
    pub rmse: Option<f64>,
    /// Coefficient of determination, <= 1 (may be negative).
    pub r2: Option<f64>,
}

impl RegressionMetrics {
    /// Empty metric bag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mse: None,
            mae: None,
            rmse: None,
            r2: None,
        }
    }

    /// Set mean squared error.
    #[must_use]
    pub const fn mse(mut self, value: f64) -> Self {
        self.mse = Some(value);
        self
    }

    /// Set mean absolute error.
    #[must_use]
    pub const fn mae(mut self, value: f64) -> Self {
        self.mae = Some(value);
        self
    }

    /// Set root mean squared error.
    #[must_use]
    pub const fn rmse(mut self, value: f64) -> Self {
        self.rmse = Some(value);
        self
    }

    /// Set r².
    #[must_use]
    pub const fn r2(mut self, value: f64) -> Self {
        self.r2 = Some(value);
        self
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [("mse", self.mse), ("mae", self.mae), ("rmse", self.rmse)] {
            if let Some(v) = value {
                if v < 0.0 {
                    return Err(Error::InvalidInput(format!("{key} must be >= 0, got {v}")));
                }
            }
        }
        if let Some(r2) = self.r2 {
            if r2 > 1.0 {
                return Err(Error::InvalidInput(format!("r2 must be <= 1, got {r2}")));
            }
        }
        Ok(())
    }
}

/// Task-specific metrics. Only the fields valid for the variant exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "taskType")]
pub enum Metrics {
    /// Classification metrics
    Classification(ClassificationMetrics),
    /// Regression metrics
    Regression(RegressionMetrics),
}

impl Metrics {
    /// Task type discriminant of this variant.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        match self {
            Self::Classification(_) => TaskType::Classification,
            Self::Regression(_) => TaskType::Regression,
        }
    }

    /// Accuracy for classification, r² for regression.
    #[must_use]
    pub const fn headline_score(&self) -> Option<f64> {
        match self {
            Self::Classification(m) => m.accuracy,
            Self::Regression(m) => m.r2,
        }
    }

    /// Named metric values in display order. Keys are stable per task type.
    #[must_use]
    pub const fn entries(&self) -> [(&'static str, Option<f64>); 4] {
        match self {
            Self::Classification(m) => [
                ("accuracy", m.accuracy),
                ("precision", m.precision),
                ("recall", m.recall),
                ("f1Score", m.f1_score),
            ],
            Self::Regression(m) => [
                ("mse", m.mse),
                ("mae", m.mae),
                ("rmse", m.rmse),
                ("r2", m.r2),
            ],
        }
    }

    /// Metric key names for a task type, in display order.
    #[must_use]
    pub const fn keys(task_type: TaskType) -> [&'static str; 4] {
        match task_type {
            TaskType::Classification => ["accuracy", "precision", "recall", "f1Score"],
            TaskType::Regression => ["mse", "mae", "rmse", "r2"],
        }
    }

    /// Check value ranges for the variant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a classification value is outside [0, 1],
    /// a regression error is negative, or r² exceeds 1.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Classification(m) => m.validate(),
            Self::Regression(m) => m.validate(),
        }
    }
}

/// Why an algorithm produced no usable metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureReason {
    /// Exceeded the per-algorithm time bound.
    Timeout,
    /// Returned an error or panicked.
    Fault,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::Fault => f.write_str("fault"),
        }
    }
}

/// Coarse status of a `MetricSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Metrics are usable.
    Success,
    /// No usable metrics.
    Failed,
}

/// Result of one algorithm invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// Evaluation produced metrics.
    Success {
        /// Produced metrics
        metrics: Metrics,
    },
    /// Evaluation failed; the message is kept for reports.
    Failed {
        /// Failure category
        reason: FailureReason,
        /// Human-readable detail
        message: String,
    },
}

/// One algorithm's evaluation outcome for a single training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSet {
    algorithm_name: String,
    task_type: TaskType,
    outcome: Outcome,
    training_time_seconds: f64,
    artifact_path: Option<String>,
}

impl MetricSet {
    /// Successful classification result.
    #[must_use]
    pub fn classification(algorithm_name: impl Into<String>, metrics: ClassificationMetrics) -> Self {
        Self::success(algorithm_name, Metrics::Classification(metrics))
    }

    /// Successful regression result.
    #[must_use]
    pub fn regression(algorithm_name: impl Into<String>, metrics: RegressionMetrics) -> Self {
        Self::success(algorithm_name, Metrics::Regression(metrics))
    }

    /// Successful result for an already-built metrics variant.
    #[must_use]
    pub fn success(algorithm_name: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            algorithm_name: algorithm_name.into(),
            task_type: metrics.task_type(),
            outcome: Outcome::Success { metrics },
            training_time_seconds: 0.0,
            artifact_path: None,
        }
    }

    /// Failed result. Carries no metrics.
    #[must_use]
    pub fn failed(
        algorithm_name: impl Into<String>,
        task_type: TaskType,
        reason: FailureReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            algorithm_name: algorithm_name.into(),
            task_type,
            outcome: Outcome::Failed {
                reason,
                message: message.into(),
            },
            training_time_seconds: 0.0,
            artifact_path: None,
        }
    }

    /// Set the wall-clock training time in seconds (negative values clamp to 0).
    #[must_use]
    pub fn with_training_time(mut self, seconds: f64) -> Self {
        self.training_time_seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self
    }

    /// Set the reference to the produced model artifact.
    #[must_use]
    pub fn with_artifact_path(mut self, path: impl Into<String>) -> Self {
        self.artifact_path = Some(path.into());
        self
    }

    /// Replace the algorithm name.
    #[must_use]
    pub fn with_algorithm_name(mut self, name: impl Into<String>) -> Self {
        self.algorithm_name = name.into();
        self
    }

    /// Algorithm identifier, unique within a run.
    #[must_use]
    pub fn algorithm_name(&self) -> &str {
        &self.algorithm_name
    }

    /// Task type of this entry.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Success or Failed.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self.outcome {
            Outcome::Success { .. } => Status::Success,
            Outcome::Failed { .. } => Status::Failed,
        }
    }

    /// Whether the entry carries usable metrics.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Full outcome.
    #[must_use]
    pub const fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Metrics, if the evaluation succeeded.
    #[must_use]
    pub const fn metrics(&self) -> Option<&Metrics> {
        match &self.outcome {
            Outcome::Success { metrics } => Some(metrics),
            Outcome::Failed { .. } => None,
        }
    }

    /// Failure reason and message, if the evaluation failed.
    #[must_use]
    pub fn failure(&self) -> Option<(FailureReason, &str)> {
        match &self.outcome {
            Outcome::Failed { reason, message } => Some((*reason, message.as_str())),
            Outcome::Success { .. } => None,
        }
    }

    /// Accuracy (classification) or r² (regression) of a successful entry.
    #[must_use]
    pub fn headline_score(&self) -> Option<f64> {
        self.metrics().and_then(Metrics::headline_score)
    }

    /// Wall-clock training time in seconds.
    #[must_use]
    pub const fn training_time_seconds(&self) -> f64 {
        self.training_time_seconds
    }

    /// Reference to the produced model artifact, if any.
    #[must_use]
    pub fn artifact_path(&self) -> Option<&str> {
        self.artifact_path.as_deref()
    }

    /// Check the entry's invariants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank name or out-of-range metric values.
    pub fn validate(&self) -> Result<()> {
        if self.algorithm_name.trim().is_empty() {
            return Err(Error::InvalidInput("algorithm name is required".to_string()));
        }
        match self.metrics() {
            Some(metrics) => metrics.validate(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_fixes_task_type() {
        let set = MetricSet::regression("lr", RegressionMetrics::new().r2(0.5));
        assert_eq!(set.task_type(), TaskType::Regression);
        assert_eq!(set.status(), Status::Success);
        assert_eq!(set.headline_score(), Some(0.5));
        assert!(set.failure().is_none());
    }

    #[test]
    fn test_failed_entry_has_no_metrics() {
        let set = MetricSet::failed("svm", TaskType::Classification, FailureReason::Timeout, "slow");
        assert_eq!(set.status(), Status::Failed);
        assert!(set.metrics().is_none());
        assert_eq!(set.failure(), Some((FailureReason::Timeout, "slow")));
        assert!(set.headline_score().is_none());
    }

    #[test]
    fn test_validate_ranges() {
        let bad = MetricSet::classification("rf", ClassificationMetrics::new().accuracy(1.2));
        assert!(bad.validate().is_err());

        let bad = MetricSet::regression("lr", RegressionMetrics::new().mae(-0.1));
        assert!(bad.validate().is_err());

        let bad = MetricSet::regression("lr", RegressionMetrics::new().r2(1.01));
        assert!(bad.validate().is_err());

        let ok = MetricSet::regression("lr", RegressionMetrics::new().r2(-3.0).mse(4.0));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_training_time_clamped() {
        let set = MetricSet::classification("rf", ClassificationMetrics::new()).with_training_time(-2.0);
        assert!(set.training_time_seconds().abs() < f64::EPSILON);
        let set = set.with_training_time(f64::NAN);
        assert!(set.training_time_seconds().abs() < f64::EPSILON);
    }

    #[test]
    fn test_task_type_parse() {
        assert_eq!("classification".parse::<TaskType>().unwrap(), TaskType::Classification);
        assert_eq!(" Regression ".parse::<TaskType>().unwrap(), TaskType::Regression);
        assert!("clustering".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let set = MetricSet::classification("rf", ClassificationMetrics::new().accuracy(0.9));
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["algorithmName"], "rf");
        assert_eq!(json["outcome"]["status"], "success");
        assert_eq!(json["outcome"]["metrics"]["taskType"], "Classification");
        assert!((json["outcome"]["metrics"]["accuracy"].as_f64().unwrap() - 0.9).abs() < 1e-12);
    }
}
