//! Property-based tests for selection and comparison
//!
//! - Test ranking invariants against a brute-force reference
//! - Test table shape invariants
//! - Run with ProptestConfig::with_cases(100)

use model_arena::comparison::ComparisonBuilder;
use model_arena::metrics::{ClassificationMetrics, FailureReason, MetricSet, Metrics, TaskType};
use model_arena::selection::{rank, select, RankKey};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Metric value on a coarse grid so ties actually happen.
fn arb_value() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (0u32..=4).prop_map(|v| Some(f64::from(v) / 4.0)),
    ]
}

fn arb_classification() -> impl Strategy<Value = ClassificationMetrics> {
    (arb_value(), arb_value(), arb_value(), arb_value()).prop_map(|(a, p, r, f)| {
        ClassificationMetrics {
            accuracy: a,
            precision: p,
            recall: r,
            f1_score: f,
        }
    })
}

/// Classification results, roughly a fifth of them failed.
fn arb_results(max: usize) -> impl Strategy<Value = Vec<MetricSet>> {
    proptest::collection::vec((arb_classification(), 0u8..5), 0..max).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (metrics, roll))| {
                let name = format!("algo{i}");
                if roll == 0 {
                    MetricSet::failed(name, TaskType::Classification, FailureReason::Fault, "boom")
                } else {
                    MetricSet::classification(name, metrics)
                }
            })
            .collect()
    })
}

fn key(set: &MetricSet) -> Option<RankKey> {
    set.metrics().map(RankKey::for_metrics)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: winner has the maximal key and is the earliest among equals
    #[test]
    fn prop_select_is_earliest_maximum(results in arb_results(12)) {
        let winner = select(&results).unwrap();
        let best = results.iter().filter_map(key).max();

        match (winner, best) {
            (None, None) => {}
            (Some(index), Some(best)) => {
                prop_assert_eq!(key(&results[index]), Some(best));
                for earlier in &results[..index] {
                    prop_assert!(key(earlier).map_or(true, |k| k < best));
                }
            }
            (w, b) => prop_assert!(false, "winner {:?} but best key {:?}", w, b),
        }
    }

    /// Property: selection is deterministic
    #[test]
    fn prop_select_is_deterministic(results in arb_results(12)) {
        prop_assert_eq!(select(&results).unwrap(), select(&results).unwrap());
    }

    /// Property: rank is sorted descending and starts with the winner
    #[test]
    fn prop_rank_consistent_with_select(results in arb_results(12)) {
        let ranked = rank(&results).unwrap();
        let successes = results.iter().filter(|s| s.is_success()).count();

        prop_assert_eq!(ranked.len(), successes);
        prop_assert_eq!(ranked.first().copied(), select(&results).unwrap());
        for pair in ranked.windows(2) {
            prop_assert!(key(&results[pair[0]]) >= key(&results[pair[1]]));
        }
    }

    /// Property: a missing accuracy never beats accuracy 0.0
    #[test]
    fn prop_missing_ranks_below_zero(other in arb_classification()) {
        let missing = ClassificationMetrics { accuracy: None, ..other };
        let zero = ClassificationMetrics::new().accuracy(0.0);
        prop_assert!(
            RankKey::for_metrics(&Metrics::Classification(missing))
                < RankKey::for_metrics(&Metrics::Classification(zero))
        );
    }

    /// Property: one row per submission, in submission order
    #[test]
    fn prop_comparison_covers_every_submission(results in arb_results(12)) {
        let table = ComparisonBuilder::default().build(&results);
        let names: Vec<&str> = table.names().collect();
        let expected: Vec<&str> = results.iter().map(MetricSet::algorithm_name).collect();
        prop_assert_eq!(names, expected);

        let failed = results.iter().filter(|s| !s.is_success()).count();
        prop_assert_eq!(table.iter().filter(|(_, row)| row.is_failed()).count(), failed);
    }

    /// Property: successful rows share one key set
    #[test]
    fn prop_comparison_keys_are_stable(results in arb_results(12)) {
        let table = ComparisonBuilder::default().build(&results);
        let mut key_sets = table
            .iter()
            .filter(|(_, row)| !row.is_failed())
            .map(|(_, row)| row.keys().map(str::to_string).collect::<Vec<_>>());

        if let Some(first) = key_sets.next() {
            for keys in key_sets {
                prop_assert_eq!(&keys, &first);
            }
        }
    }
}
