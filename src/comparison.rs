//! Cross-algorithm comparison table
//!
//! One entry per submitted algorithm, in submission order. Successful
//! entries of a task type all carry the same keys (absent values are
//! `null`); failed entries carry `status`, `reason` and `error` instead of
//! metrics. Numbers are rounded for display only.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::metrics::{MetricSet, Outcome};

/// Default number of decimal places in the table.
pub const DEFAULT_PRECISION: u32 = 4;

/// Status marker value for successful entries.
pub const STATUS_SUCCESS: &str = "success";
/// Status marker value for failed entries.
pub const STATUS_FAILED: &str = "failed";

/// Round `value` to `places` decimal places. Non-finite values pass through.
#[must_use]
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(i32::try_from(places).unwrap_or(i32::MAX));
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

fn number(value: Option<f64>, places: u32) -> Value {
    value
        .map(|v| round_to(v, places))
        .and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

/// Ordered key/value view of one algorithm's row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricMap(Vec<(String, Value)>);

impl MetricMap {
    fn push(&mut self, key: &str, value: Value) {
        self.0.push((key.to_string(), value));
    }

    /// Value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Numeric value for `key`, if present and numeric.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Keys in row order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Whether the row is marked failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.get("status").and_then(Value::as_str) == Some(STATUS_FAILED)
    }
}

impl Serialize for MetricMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Mapping algorithm name → metric row; iteration order is submission order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonTable {
    rows: Vec<(String, MetricMap)>,
}

impl ComparisonTable {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for `algorithm`.
    #[must_use]
    pub fn get(&self, algorithm: &str) -> Option<&MetricMap> {
        self.rows
            .iter()
            .find(|(name, _)| name == algorithm)
            .map(|(_, row)| row)
    }

    /// Algorithm names in submission order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(name, _)| name.as_str())
    }

    /// Rows in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricMap)> {
        self.rows.iter().map(|(name, row)| (name.as_str(), row))
    }

    /// Serialized form stored as the audit snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Json` if serialization fails.
    pub fn to_json_string(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for ComparisonTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (name, row) in &self.rows {
            map.serialize_entry(name, row)?;
        }
        map.end()
    }
}

/// Builds [`ComparisonTable`]s at a fixed display precision.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonBuilder {
    precision: u32,
}

impl Default for ComparisonBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl ComparisonBuilder {
    /// Builder rounding to `precision` decimal places.
    #[must_use]
    pub const fn new(precision: u32) -> Self {
        Self { precision }
    }

    /// One row per entry of `results`, Failed entries included.
    #[must_use]
    pub fn build(&self, results: &[MetricSet]) -> ComparisonTable {
        let rows = results
            .iter()
            .map(|set| (set.algorithm_name().to_string(), self.row(set)))
            .collect();
        ComparisonTable { rows }
    }

    fn row(&self, set: &MetricSet) -> MetricMap {
        let mut row = MetricMap::default();
        match set.outcome() {
            Outcome::Success { metrics } => {
                for (key, value) in metrics.entries() {
                    row.push(key, number(value, self.precision));
                }
                row.push(
                    "trainingTime",
                    number(Some(set.training_time_seconds()), self.precision),
                );
                row.push("status", Value::from(STATUS_SUCCESS));
            }
            Outcome::Failed { reason, message } => {
                row.push("status", Value::from(STATUS_FAILED));
                row.push("reason", Value::from(reason.to_string()));
                row.push("error", Value::from(message.as_str()));
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ClassificationMetrics, FailureReason, RegressionMetrics, TaskType};

    #[test]
    fn test_round_to() {
        assert!((round_to(0.123_456, 4) - 0.1235).abs() < 1e-12);
        assert!((round_to(-1.000_04, 4) + 1.0).abs() < 1e-12);
        assert!(round_to(f64::INFINITY, 4).is_infinite());
    }

    #[test]
    fn test_every_entry_emitted_in_order() {
        let results = vec![
            MetricSet::regression("b", RegressionMetrics::new().r2(0.1)),
            MetricSet::failed("a", TaskType::Regression, FailureReason::Timeout, "timeout after 1s"),
            MetricSet::regression("c", RegressionMetrics::new().r2(0.75)),
        ];
        let table = ComparisonBuilder::default().build(&results);

        assert_eq!(table.len(), 3);
        assert_eq!(table.names().collect::<Vec<_>>(), ["b", "a", "c"]);

        let failed = table.get("a").unwrap();
        assert!(failed.is_failed());
        assert_eq!(failed.get("reason").and_then(Value::as_str), Some("timeout"));
        assert!(failed.get("r2").is_none());
    }

    #[test]
    fn test_stable_keys_with_nulls() {
        let results = vec![
            MetricSet::classification(
                "full",
                ClassificationMetrics::new()
                    .accuracy(0.9)
                    .precision(0.8)
                    .recall(0.7)
                    .f1_score(0.75),
            ),
            MetricSet::classification("partial", ClassificationMetrics::new().accuracy(0.5)),
        ];
        let table = ComparisonBuilder::default().build(&results);

        let full: Vec<_> = table.get("full").unwrap().keys().collect();
        let partial: Vec<_> = table.get("partial").unwrap().keys().collect();
        assert_eq!(full, partial);
        assert_eq!(full, ["accuracy", "precision", "recall", "f1Score", "trainingTime", "status"]);
        assert_eq!(table.get("partial").unwrap().get("f1Score"), Some(&Value::Null));
    }

    #[test]
    fn test_display_rounding() {
        let results = vec![MetricSet::classification(
            "rf",
            ClassificationMetrics::new().accuracy(0.912_345_6),
        )
        .with_training_time(1.234_567)];
        let table = ComparisonBuilder::new(2).build(&results);
        let row = table.get("rf").unwrap();
        assert_eq!(row.number("accuracy"), Some(0.91));
        assert_eq!(row.number("trainingTime"), Some(1.23));
    }

    #[test]
    fn test_json_preserves_order() {
        let results = vec![
            MetricSet::classification("zeta", ClassificationMetrics::new().accuracy(0.1)),
            MetricSet::classification("alpha", ClassificationMetrics::new().accuracy(0.2)),
        ];
        let json = ComparisonBuilder::default().build(&results).to_json_string().unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
        assert!(json.contains(r#""status":"success""#));
    }
}
