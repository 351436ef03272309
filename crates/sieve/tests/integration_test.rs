//! Integration tests for Sieve.

use std::io::Write;
use tempfile::NamedTempFile;

use chrono::{NaiveTime, TimeZone, Utc};
use sieve::jobs::{FileLoader, Frequency, InMemoryJobStore, Job, JobStatus, JobStore, Scheduler};
use sieve::suggestion::StandardizeKind;
use sieve::{
    CorrectionAction, CorrectionApplier, CorrectionPlan, Dataset, DeclaredFormat, DetectedType,
    ExportFormat, Exporter, Ingestor, OrchestratorState, ProfileOrchestrator, SieveConfig,
    SieveError, Value,
};

/// Helper to create a temporary file with given content and extension.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn parse(content: &str, format: DeclaredFormat) -> Dataset {
    Ingestor::new()
        .parse(content.as_bytes(), format)
        .expect("Parse failed")
        .0
}

fn std_action(kind: StandardizeKind) -> CorrectionAction {
    CorrectionAction::Standardize { kind }
}

fn dedupe(column: &str) -> CorrectionAction {
    CorrectionAction::Dedupe {
        keys: vec![column.to_string()],
    }
}

// =============================================================================
// Correction Behavior
// =============================================================================

#[test]
fn test_dedupe_after_email_standardization() {
    let dataset = parse(
        r#"[{"email": " A@B.com "}, {"email": "a@b.com"}]"#,
        DeclaredFormat::Json,
    );
    let plan = CorrectionPlan::new()
        .with_action("email", dedupe("email"))
        .with_action("email", std_action(StandardizeKind::Email));

    let (cleaned, log) = CorrectionApplier::new().apply(&dataset, &plan).unwrap();

    assert_eq!(cleaned.row_count(), 1);
    assert_eq!(cleaned.get(0, "email"), Some(&Value::text("a@b.com")));
    assert_eq!(log.len(), 2);
    assert_eq!(dataset.row_count(), 2, "input must not change");
}

#[test]
fn test_impute_mean_fills_blank() {
    let dataset = parse(r#"[{"n": 1}, {"n": 2}, {"n": 3}, {"n": null}, {"n": 5}]"#, DeclaredFormat::Json);
    let plan = CorrectionPlan::new().with_action("n", CorrectionAction::ImputeMean);

    let (cleaned, log) = CorrectionApplier::new().apply(&dataset, &plan).unwrap();

    assert_eq!(cleaned.get(3, "n"), Some(&Value::Number(2.75)));
    assert_eq!(log, vec!["imputed mean 2.75 on column n (1 cells)"]);
}

#[test]
fn test_phone_standardization_enables_dedupe() {
    let dataset = parse("phone\n0033612345678\n+33612345678\n", DeclaredFormat::Csv);

    let profile = ProfileOrchestrator::new().ingest(dataset.clone()).unwrap().clone();
    assert_eq!(profile.columns[0].detected_type, DetectedType::Phone);

    let plan = CorrectionPlan::new()
        .with_action("phone", std_action(StandardizeKind::Phone))
        .with_action("phone", dedupe("phone"));
    let (cleaned, log) = CorrectionApplier::new().apply(&dataset, &plan).unwrap();

    assert_eq!(cleaned.row_count(), 1);
    assert_eq!(cleaned.get(0, "phone"), Some(&Value::text("+33612345678")));
    assert_eq!(log[0], "removed 1 duplicate rows on column phone");
}

#[test]
fn test_iban_invalid_share() {
    let dataset = parse(
        "iban\n\
         GB82 WEST 1234 5698 7654 32\n\
         DE89370400440532013000\n\
         FR1420041010050500013M02606\n\
         NL91ABNA0417164300\n\
         GB00WEST12345698765432\n",
        DeclaredFormat::Csv,
    );

    let mut orchestrator = ProfileOrchestrator::new();
    let profile = orchestrator.ingest(dataset).unwrap();
    let iban = profile.column("iban").unwrap();

    assert_eq!(iban.detected_type, DetectedType::Iban);
    assert!((iban.invalid_pct - 20.0).abs() < 1e-9);

    let standardize = orchestrator.suggestions()["iban"]
        .iter()
        .find(|s| s.id == "standardize-iban-iban")
        .expect("iban standardization suggested");
    assert!(standardize.selected_by_default);
}

#[test]
fn test_empty_dataset_profiles_cleanly() {
    let mut orchestrator = ProfileOrchestrator::new();
    let profile = orchestrator.ingest(Dataset::empty()).unwrap();
    assert!(profile.columns.is_empty());
    assert_eq!(profile.global_score, 0.0);

    let report = orchestrator.apply().unwrap();
    assert!(report.log.is_empty());
}

// =============================================================================
// File Ingest Tests
// =============================================================================

#[test]
fn test_ingest_csv_file() {
    let file = create_test_file(
        "id,name,email,signup\n\
         1,Alice,alice@example.com,2024-01-15\n\
         2,Bob,bob@example.com,2024-02-01\n\
         3,Carol,,2024-03-10\n",
        ".csv",
    );

    let (dataset, source) = Ingestor::new().parse_file(file.path()).unwrap();
    assert_eq!(source.format, DeclaredFormat::Csv);
    assert_eq!(source.row_count, 3);
    assert_eq!(source.column_count, 4);
    assert!(source.hash.starts_with("sha256:"));
    assert_eq!(dataset.get(2, "email"), Some(&Value::Null));

    let profile = ProfileOrchestrator::new().ingest(dataset).unwrap().clone();
    let types: Vec<DetectedType> = profile.columns.iter().map(|c| c.detected_type).collect();
    assert_eq!(
        types,
        vec![DetectedType::Number, DetectedType::Text, DetectedType::Email, DetectedType::Date]
    );
}

#[test]
fn test_ingest_semicolon_csv() {
    let file = create_test_file("a;b\n1;2\n3;4\n", ".csv");
    let (dataset, _) = Ingestor::new().parse_file(file.path()).unwrap();
    assert_eq!(dataset.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_ingest_json_wrapper_file() {
    let file = create_test_file(
        r#"{"data": [{"a": 1, "b": true}, {"a": 2, "c": "late"}]}"#,
        ".json",
    );
    let (dataset, _) = Ingestor::new().parse_file(file.path()).unwrap();
    assert_eq!(dataset.column_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(dataset.get(1, "b"), Some(&Value::Null));
}

#[test]
fn test_unsupported_extension() {
    let file = create_test_file("whatever", ".parquet");
    assert!(matches!(
        Ingestor::new().parse_file(file.path()),
        Err(SieveError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_size_limit() {
    let config = SieveConfig::from_toml_str("[ingest]\nmax_bytes = 8\n").unwrap();
    let file = create_test_file("a,b\n1,2\n3,4\n", ".csv");

    let mut orchestrator = ProfileOrchestrator::with_config(config);
    assert!(matches!(
        orchestrator.ingest_file(file.path()),
        Err(SieveError::SizeExceeded { limit: 8, .. })
    ));
    assert_eq!(orchestrator.state(), OrchestratorState::Empty);
}

// =============================================================================
// Orchestrator Workflow Tests
// =============================================================================

#[test]
fn test_full_workflow_from_file() {
    let file = create_test_file(
        "name,email,age\n\
         José,jose@example.com,34\n\
         José,jose@example.com,34\n\
         Ana,ANA@Example.com,\n\
         Lee,not-an-email,29\n",
        ".csv",
    );

    let mut orchestrator = ProfileOrchestrator::new();
    orchestrator.ingest_file(file.path()).unwrap();
    let before = orchestrator.profile().unwrap().global_score;

    let report = orchestrator.apply().unwrap();
    assert_eq!(report.rows_before, 4);
    assert_eq!(report.rows_after, 3);
    assert!(report.score_after >= before);
    assert!(report.log.iter().any(|l| l.starts_with("removed 1 duplicate rows")));
    assert!(report.log.iter().any(|l| l.starts_with("imputed mean")));

    let dataset = orchestrator.dataset().unwrap();
    assert_eq!(dataset.get(0, "name"), Some(&Value::text("Jose")));
    assert_eq!(dataset.get(1, "email"), Some(&Value::text("ana@example.com")));
    assert_eq!(dataset.get(2, "email"), Some(&Value::text("not-an-email")));

    let comparison = orchestrator.comparison().unwrap();
    assert_eq!(comparison.rows_before, 4);
    assert_eq!(comparison.missing_after, 0);

    let text = Exporter::report(orchestrator.profile().unwrap(), Some(&comparison));
    assert!(text.contains("Before / after"));
}

#[test]
fn test_selection_changes_applied_plan() {
    let dataset = parse("city,n\nParis,1\n,2\nParis,3\nLyon,4\n", DeclaredFormat::Csv);
    let mut orchestrator = ProfileOrchestrator::new();
    orchestrator.ingest(dataset).unwrap();

    orchestrator.select_suggestion("city", "dedupe-city", false).unwrap();
    orchestrator.select_suggestion("city", "impute-mode-city", false).unwrap();
    let report = orchestrator.apply().unwrap();

    assert_eq!(report.rows_after, 4);
    assert_eq!(orchestrator.dataset().unwrap().get(1, "city"), Some(&Value::Null));
}

#[test]
fn test_misuse_is_reported() {
    let mut orchestrator = ProfileOrchestrator::new();
    assert!(matches!(
        orchestrator.select_suggestion("a", "keep-a", true),
        Err(SieveError::InvalidState { .. })
    ));
}

#[test]
fn test_profile_row_cap() {
    let mut content = String::from("n\n");
    for i in 0..50 {
        content.push_str(&format!("{}\n", i));
    }
    content.push_str("oops\n");

    let config = SieveConfig::from_toml_str("profile_row_cap = 50").unwrap();
    let mut orchestrator = ProfileOrchestrator::with_config(config);
    let profile = orchestrator.ingest(parse(&content, DeclaredFormat::Csv)).unwrap();

    assert_eq!(profile.row_count, 51);
    assert_eq!(profile.profiled_rows, 50);
    assert_eq!(profile.columns[0].invalid_pct, 0.0);
}

// =============================================================================
// Export and Scheduling Tests
// =============================================================================

#[test]
fn test_export_then_reingest() {
    let dataset = parse("a,b\nx,1\n,2\n", DeclaredFormat::Csv);
    let bytes = Exporter::write(&dataset, ExportFormat::Csv).unwrap();
    let (again, _) = Ingestor::new().parse(&bytes, DeclaredFormat::Csv).unwrap();
    assert_eq!(again, dataset);
}

#[test]
fn test_scheduler_with_file_loader() {
    let file = create_test_file("n,tag\n1,a\n,b\n3,c\n", ".csv");
    let plan = CorrectionPlan::new().with_action("n", CorrectionAction::ImputeMean);

    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let job = Job::new(
        "nightly",
        Frequency::Daily,
        NaiveTime::from_hms_opt(1, 0, 0).unwrap(),
        file.path().to_string_lossy(),
        plan,
        now,
    );
    let id = job.id.clone();

    let mut store = InMemoryJobStore::new();
    store.save_job(job).unwrap();

    let later = Utc.with_ymd_and_hms(2024, 6, 2, 1, 30, 0).unwrap();
    let runs = Scheduler::new()
        .run_due(later, &mut store, &FileLoader::default())
        .unwrap();

    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, JobStatus::Completed);
    assert_eq!(runs[0].log, vec!["imputed mean 2 on column n (1 cells)"]);
    assert_eq!(
        store.job(&id).unwrap().next_run,
        Utc.with_ymd_and_hms(2024, 6, 3, 1, 0, 0).unwrap()
    );
}
