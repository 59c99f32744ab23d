//! Best-model selection
//!
//! Pure ranking over collected results. Failed entries are ignored; a run
//! with no successful entry has no winner, which is a normal outcome.
//!
//! Ranking keys, compared lexicographically, highest wins:
//!
//! | Task type      | Key                                   |
//! |----------------|---------------------------------------|
//! | Classification | (accuracy, f1Score, precision, recall) |
//! | Regression     | (r2, -rmse, -mae, -mse)               |
//!
//! An absent (or NaN) value ranks below every present value, including 0.0.
//! Equal keys resolve to the earliest submitted entry.

use std::cmp::Ordering;

use crate::metrics::{MetricSet, Metrics, TaskType};
use crate::{Error, Result};

/// Lexicographic ranking key of one successful entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankKey([Option<f64>; 4]);

impl RankKey {
    /// Build the key for a metrics variant. Lower-is-better values are negated.
    #[must_use]
    pub fn for_metrics(metrics: &Metrics) -> Self {
        let present = |v: Option<f64>| v.filter(|x| !x.is_nan());
        let negated = |v: Option<f64>| present(v).map(|x| -x);

        match metrics {
            Metrics::Classification(m) => Self([
                present(m.accuracy),
                present(m.f1_score),
                present(m.precision),
                present(m.recall),
            ]),
            Metrics::Regression(m) => Self([
                present(m.r2),
                negated(m.rmse),
                negated(m.mae),
                negated(m.mse),
            ]),
        }
    }

    /// Key components in comparison order.
    #[must_use]
    pub const fn components(&self) -> [Option<f64>; 4] {
        self.0
    }
}

fn compare_component(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        // NaN is filtered out when keys are built
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| compare_component(*a, *b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Task type shared by all successful entries, if any.
///
/// # Errors
///
/// Returns `ContractViolation` if successful entries disagree.
pub fn run_task_type(results: &[MetricSet]) -> Result<Option<TaskType>> {
    let mut expected: Option<TaskType> = None;
    for set in results.iter().filter(|s| s.is_success()) {
        match expected {
            None => expected = Some(set.task_type()),
            Some(task_type) if task_type != set.task_type() => {
                return Err(Error::ContractViolation {
                    expected: task_type,
                    found: set.task_type(),
                    algorithm: set.algorithm_name().to_string(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(expected)
}

/// Index of the winning entry, or `None` if no entry succeeded.
///
/// # Errors
///
/// Returns `ContractViolation` for mixed task types.
///
/// # Example
///
/// ```rust
/// use model_arena::metrics::{ClassificationMetrics, MetricSet};
/// use model_arena::selection::select;
///
/// let results = vec![
///     MetricSet::classification("rf", ClassificationMetrics::new().accuracy(0.91).f1_score(0.88)),
///     MetricSet::classification("svm", ClassificationMetrics::new().accuracy(0.91).f1_score(0.90)),
/// ];
/// assert_eq!(select(&results).unwrap(), Some(1));
/// ```
pub fn select(results: &[MetricSet]) -> Result<Option<usize>> {
    run_task_type(results)?;

    let mut best: Option<(usize, RankKey)> = None;
    for (index, key) in keyed(results) {
        match best {
            // strictly greater: ties keep the earlier submission
            Some((_, best_key)) if key <= best_key => {}
            _ => best = Some((index, key)),
        }
    }
    Ok(best.map(|(index, _)| index))
}

/// Indices of successful entries, best first. Ties keep submission order.
///
/// # Errors
///
/// Returns `ContractViolation` for mixed task types.
pub fn rank(results: &[MetricSet]) -> Result<Vec<usize>> {
    run_task_type(results)?;

    let mut ranked: Vec<(usize, RankKey)> = keyed(results).collect();
    // stable sort keeps submission order among equal keys
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(ranked.into_iter().map(|(index, _)| index).collect())
}

fn keyed(results: &[MetricSet]) -> impl Iterator<Item = (usize, RankKey)> + '_ {
    results
        .iter()
        .enumerate()
        .filter_map(|(index, set)| set.metrics().map(|m| (index, RankKey::for_metrics(m))))
}

/// Selection policy as a value, for callers that inject it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionPolicy;

impl SelectionPolicy {
    /// See [`select`].
    ///
    /// # Errors
    ///
    /// Returns `ContractViolation` for mixed task types.
    pub fn select(&self, results: &[MetricSet]) -> Result<Option<usize>> {
        select(results)
    }

    /// See [`rank`].
    ///
    /// # Errors
    ///
    /// Returns `ContractViolation` for mixed task types.
    pub fn rank(&self, results: &[MetricSet]) -> Result<Vec<usize>> {
        rank(results)
    }
}
