//! Property-based tests for profiling and correction.
//!
//! Run with more cases:
//!
//! ```bash
//! PROPTEST_CASES=10000 cargo test -p sieve --test property_tests
//! ```

use std::collections::HashSet;

use proptest::prelude::*;

use sieve::metrics::QualityWeights;
use sieve::suggestion::StandardizeKind;
use sieve::{
    CancelToken, CorrectionAction, CorrectionApplier, CorrectionPlan, Dataset, DatasetProfiler,
    SuggestionEngine, TypeDetector, Value,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Cells mixing blanks, small numbers and short text with stray spaces.
fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        1 => Just(Value::Null),
        3 => (0i32..6).prop_map(|n| Value::Number(n as f64)),
        3 => "[a-c ]{0,3}".prop_map(Value::Text),
    ]
}

fn column(rows: usize) -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(cell(), rows)
}

/// Datasets of one to three columns sharing a row count.
fn dataset() -> impl Strategy<Value = Dataset> {
    (0usize..25, 1usize..4).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(column(rows), cols).prop_map(|columns| {
            Dataset::from_columns(
                columns
                    .into_iter()
                    .enumerate()
                    .map(|(i, values)| (format!("c{}", i), values)),
            )
            .expect("equal-length columns")
        })
    })
}

fn pct() -> impl Strategy<Value = f64> {
    0.0f64..=100.0
}

/// Messy real-world cells: addresses, phones, dates, accents and IBANs.
fn messy_cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        1 => Just(Value::Null),
        1 => prop::sample::select(vec![1.0, 2.5]).prop_map(Value::Number),
        6 => prop::sample::select(vec![
            " A@B.com ",
            "a@b.com",
            "x@Y.org",
            "0033612345678",
            "+33 6 12 34 56 78",
            "06 12 34 56 78",
            "01/02/2024",
            "2024-02-01",
            "13/01/2024",
            "José",
            "jose",
            " Élodie ",
            "GB82 WEST 1234 5698 7654 32",
            "gb82west12345698765432",
            "Acme Corp",
            "ACME Corp.",
            "",
            "  ",
        ])
        .prop_map(Value::text),
    ]
}

const MESSY_COLUMNS: [&str; 3] = ["a", "b", "c"];

fn messy_dataset() -> impl Strategy<Value = Dataset> {
    (0usize..12).prop_flat_map(|rows| {
        prop::collection::vec(prop::collection::vec(messy_cell(), rows), MESSY_COLUMNS.len())
            .prop_map(|columns| {
                Dataset::from_columns(MESSY_COLUMNS.into_iter().zip(columns))
                    .expect("equal-length columns")
            })
    })
}

fn column_name() -> impl Strategy<Value = String> {
    prop::sample::select(MESSY_COLUMNS.to_vec()).prop_map(str::to_string)
}

/// Any correction action over the messy columns.
fn action() -> impl Strategy<Value = CorrectionAction> {
    prop_oneof![
        column_name().prop_map(|k| CorrectionAction::Dedupe { keys: vec![k] }),
        (column_name(), column_name())
            .prop_map(|(a, b)| CorrectionAction::Dedupe { keys: vec![a, b] }),
        prop::sample::select(vec![0.5, 0.8, 1.0])
            .prop_map(|threshold| CorrectionAction::DedupeFuzzy { threshold }),
        Just(CorrectionAction::ImputeMean),
        Just(CorrectionAction::ImputeMode),
        prop::sample::select(vec![
            StandardizeKind::Email,
            StandardizeKind::Date,
            StandardizeKind::Phone,
            StandardizeKind::Iban,
        ])
        .prop_map(|kind| CorrectionAction::Standardize { kind }),
        Just(CorrectionAction::NormalizeText),
        Just(CorrectionAction::KeepAsIs),
    ]
}

/// Plans of up to five actions, each on a random column.
fn plan() -> impl Strategy<Value = CorrectionPlan> {
    prop::collection::vec((column_name(), action()), 0..6).prop_map(|actions| {
        actions
            .into_iter()
            .fold(CorrectionPlan::new(), |plan, (column, action)| plan.with_action(&column, action))
    })
}

// =============================================================================
// Profile Properties
// =============================================================================

mod profile_tests {
    use super::*;

    proptest! {
        /// Every percentage and score stays within 0..=100.
        #[test]
        fn metrics_are_bounded(data in dataset()) {
            let profile = DatasetProfiler::new().profile(&data);
            for c in &profile.columns {
                for v in [c.missing_pct, c.duplicate_pct, c.invalid_pct, c.outlier_pct, c.quality_score] {
                    prop_assert!((0.0..=100.0).contains(&v), "{} out of range in {}", v, c.name);
                }
            }
            prop_assert!((0.0..=100.0).contains(&profile.global_score));
        }

        /// Profiling the same dataset twice gives the same profile.
        #[test]
        fn profile_is_deterministic(data in dataset()) {
            let profiler = DatasetProfiler::new();
            prop_assert_eq!(profiler.profile(&data), profiler.profile(&data));
        }

        /// Type detection depends only on the values.
        #[test]
        fn detection_is_deterministic(values in column(20)) {
            let detector = TypeDetector::new();
            prop_assert_eq!(detector.detect(&values), detector.detect(&values));
        }

        /// More missing data never raises the score.
        #[test]
        fn score_is_monotonic_in_missing(
            a in pct(), b in pct(), dup in pct(), invalid in pct(), outlier in pct()
        ) {
            let weights = QualityWeights::default();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                weights.score(high, dup, invalid, outlier) <= weights.score(low, dup, invalid, outlier)
            );
        }
    }
}

// =============================================================================
// Correction Properties
// =============================================================================

mod apply_tests {
    use super::*;

    proptest! {
        /// Re-applying the default plan to its own output changes nothing.
        #[test]
        fn default_plan_is_idempotent(data in dataset()) {
            let profile = DatasetProfiler::new().profile(&data);
            let plan = CorrectionPlan::from_defaults(&SuggestionEngine::new().suggest_all(&profile));
            let applier = CorrectionApplier::new();

            let outcome = applier.apply_with_cancel(&data, &plan, &CancelToken::new()).unwrap();
            prop_assert!(outcome.converged, "no fixed point after {} passes", outcome.passes);

            let (again, log) = applier.apply(&outcome.dataset, &plan).unwrap();
            prop_assert!(log.is_empty(), "unexpected changes: {:?}", log);
            prop_assert_eq!(&again, &outcome.dataset);
        }

        /// Any plan, over addresses, phones, dates, accents and IBANs,
        /// settles and then leaves its own output alone.
        #[test]
        fn any_plan_is_idempotent(data in messy_dataset(), plan in plan()) {
            let applier = CorrectionApplier::new();

            let outcome = applier.apply_with_cancel(&data, &plan, &CancelToken::new()).unwrap();
            prop_assert!(outcome.converged, "no fixed point after {} passes", outcome.passes);

            let (again, log) = applier.apply(&outcome.dataset, &plan).unwrap();
            prop_assert!(log.is_empty(), "unexpected changes: {:?}", log);
            prop_assert_eq!(&again, &outcome.dataset);
        }

        /// Exact dedupe leaves one row per distinct key, first seen first.
        #[test]
        fn dedupe_keeps_first_of_each_key(values in column(30)) {
            let data = Dataset::from_columns([("k", values.clone())]).unwrap();
            let plan = CorrectionPlan::new()
                .with_action("k", CorrectionAction::Dedupe { keys: vec!["k".to_string()] });

            let (cleaned, _) = CorrectionApplier::new().apply(&data, &plan).unwrap();

            let mut seen = HashSet::new();
            let expected: Vec<Option<String>> = values
                .iter()
                .map(Value::key)
                .filter(|k| seen.insert(k.clone()))
                .collect();
            let actual: Vec<Option<String>> = cleaned.column("k").unwrap().iter().map(Value::key).collect();

            prop_assert_eq!(cleaned.row_count(), expected.len());
            prop_assert_eq!(actual, expected);
        }

        /// Applying never mutates the caller's dataset.
        #[test]
        fn input_is_untouched(data in dataset()) {
            let before = data.clone();
            let profile = DatasetProfiler::new().profile(&data);
            let plan = CorrectionPlan::from_defaults(&SuggestionEngine::new().suggest_all(&profile));
            let _ = CorrectionApplier::new().apply(&data, &plan).unwrap();
            prop_assert_eq!(data, before);
        }
    }
}
