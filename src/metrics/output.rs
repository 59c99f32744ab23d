//! Parsing of external trainer output
//!
//! Trainers print a single JSON object on stdout:
//!
//! ```text
//! {"algorithm": "rf", "metrics": {"accuracy": 0.91, "f1": 0.88, "trainingTime": 1.2}, "modelPath": "/tmp/rf.pkl"}
//! {"error": "target column not found"}
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{ClassificationMetrics, MetricSet, RegressionMetrics, TaskType};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainerOutput {
    algorithm: Option<String>,
    #[serde(default)]
    metrics: Map<String, Value>,
    model_path: Option<String>,
    error: Option<String>,
}

fn number(metrics: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| metrics.get(*key).and_then(Value::as_f64))
        .filter(|v| v.is_finite())
}

/// Parse one trainer output document into a `MetricSet`.
///
/// `fallback_name` is used when the document omits `algorithm`. Extra keys
/// (confusion matrix, predictions, feature importance) are ignored.
///
/// # Errors
///
/// Returns `Json` if the document is not valid JSON and `AlgorithmOutput`
/// if the trainer reported an error.
pub fn parse_trainer_output(
    task_type: TaskType,
    fallback_name: &str,
    output: &str,
) -> Result<MetricSet> {
    let parsed: TrainerOutput = serde_json::from_str(output.trim())?;

    if let Some(error) = parsed.error {
        return Err(Error::AlgorithmOutput(error));
    }

    let name = parsed
        .algorithm
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| fallback_name.to_string());
    let m = &parsed.metrics;

    let set = match task_type {
        TaskType::Classification => MetricSet::classification(
            name,
            ClassificationMetrics {
                accuracy: number(m, &["accuracy"]),
                precision: number(m, &["precision"]),
                recall: number(m, &["recall"]),
                f1_score: number(m, &["f1", "f1Score", "f1_score"]),
            },
        ),
        TaskType::Regression => MetricSet::regression(
            name,
            RegressionMetrics {
                mse: number(m, &["mse"]),
                mae: number(m, &["mae"]),
                rmse: number(m, &["rmse"]),
                r2: number(m, &["r2"]),
            },
        ),
    };

    let set = set.with_training_time(number(m, &["trainingTime"]).unwrap_or(0.0));
    Ok(match parsed.model_path {
        Some(path) => set.with_artifact_path(path),
        None => set,
    })
}

impl MetricSet {
    /// Parse a trainer output document; the document must name the algorithm.
    ///
    /// # Errors
    ///
    /// See [`parse_trainer_output`]; a missing algorithm name is
    /// `AlgorithmOutput`.
    pub fn from_output_json(task_type: TaskType, json: &str) -> Result<Self> {
        let set = parse_trainer_output(task_type, "", json)?;
        if set.algorithm_name().is_empty() {
            return Err(Error::AlgorithmOutput(
                "trainer output does not name the algorithm".to_string(),
            ));
        }
        Ok(set)
    }
}
