//! Profile → suggest → apply workflow with snapshot history.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SieveConfig;
use crate::error::{Result, SieveError};
use crate::input::{Dataset, Ingestor, SourceMetadata};
use crate::metrics::{ColumnSummary, DatasetProfiler};
use crate::schema::DatasetProfile;
use crate::suggestion::{CorrectionSuggestion, SuggestionEngine};
use crate::transform::{CancelToken, CorrectionApplier, CorrectionPlan};

/// Where the orchestrator is in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    Empty,
    Profiled,
    PlanDrafted,
    Applying,
}

impl OrchestratorState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Profiled => "profiled",
            Self::PlanDrafted => "plan drafted",
            Self::Applying => "applying",
        }
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one `apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub log: Vec<String>,
    pub rows_before: usize,
    pub rows_after: usize,
    pub score_before: f64,
    pub score_after: f64,
    pub passes: usize,
    pub converged: bool,
}

/// Before/after figures for the most recent correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub score_before: f64,
    pub score_after: f64,
    pub rows_before: usize,
    pub rows_after: usize,
    pub missing_before: usize,
    pub missing_after: usize,
}

impl Comparison {
    /// Blank cells that are no longer blank (or whose rows were removed).
    pub fn missing_fixed(&self) -> usize {
        self.missing_before.saturating_sub(self.missing_after)
    }

    pub fn score_delta(&self) -> f64 {
        self.score_after - self.score_before
    }
}

struct Snapshot {
    dataset: Arc<Dataset>,
    profile: DatasetProfile,
}

/// Drives a dataset through profiling, suggestion selection, and correction.
///
/// Snapshots are immutable; `apply` replaces the current snapshot and keeps
/// the previous one for [`comparison`](Self::comparison).
pub struct ProfileOrchestrator {
    config: SieveConfig,
    profiler: DatasetProfiler,
    engine: SuggestionEngine,
    applier: CorrectionApplier,
    state: OrchestratorState,
    current: Option<Snapshot>,
    previous: Option<Snapshot>,
    suggestions: IndexMap<String, Vec<CorrectionSuggestion>>,
    /// Explicit selections, keyed by column then suggestion id.
    selections: IndexMap<String, IndexMap<String, bool>>,
    last_log: Vec<String>,
}

impl ProfileOrchestrator {
    /// Create an orchestrator with default configuration.
    pub fn new() -> Self {
        Self::with_config(SieveConfig::default())
    }

    /// Create an orchestrator with custom configuration.
    pub fn with_config(config: SieveConfig) -> Self {
        let profiler = config.profiler();
        let engine = config.suggestion_engine();
        let applier = config.applier();
        Self {
            config,
            profiler,
            engine,
            applier,
            state: OrchestratorState::Empty,
            current: None,
            previous: None,
            suggestions: IndexMap::new(),
            selections: IndexMap::new(),
            last_log: Vec::new(),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn config(&self) -> &SieveConfig {
        &self.config
    }

    /// Current dataset snapshot.
    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.current.as_ref().map(|s| &s.dataset)
    }

    /// Profile of the current snapshot.
    pub fn profile(&self) -> Option<&DatasetProfile> {
        self.current.as_ref().map(|s| &s.profile)
    }

    /// Descriptive statistics for the current dataset.
    pub fn statistics(&self) -> Option<IndexMap<String, ColumnSummary>> {
        self.current
            .as_ref()
            .map(|snapshot| self.profiler.summarize(&snapshot.dataset))
    }

    /// Suggestions for the current snapshot, per column.
    pub fn suggestions(&self) -> &IndexMap<String, Vec<CorrectionSuggestion>> {
        &self.suggestions
    }

    /// Log of the most recent `apply`.
    pub fn last_log(&self) -> &[String] {
        &self.last_log
    }

    /// Load a new dataset and profile it.
    pub fn ingest(&mut self, dataset: Dataset) -> Result<&DatasetProfile> {
        self.require("ingest", &[OrchestratorState::Empty, OrchestratorState::Profiled])?;

        self.previous = None;
        self.last_log.clear();
        let profile = self.install(Arc::new(dataset));
        info!(
            rows = profile.row_count,
            columns = profile.columns.len(),
            global_score = profile.global_score,
            "dataset profiled"
        );
        Ok(profile)
    }

    /// Parse a file with the configured ingestor, then [`ingest`](Self::ingest) it.
    pub fn ingest_file(&mut self, path: impl AsRef<Path>) -> Result<SourceMetadata> {
        self.require("ingest", &[OrchestratorState::Empty, OrchestratorState::Profiled])?;
        let (dataset, source) = Ingestor::with_config(self.config.ingest.clone()).parse_file(path)?;
        self.ingest(dataset)?;
        Ok(source)
    }

    /// Mark a suggestion as selected or not. Does not touch the data.
    pub fn select_suggestion(&mut self, column: &str, id: &str, selected: bool) -> Result<()> {
        self.require(
            "select a suggestion",
            &[OrchestratorState::Profiled, OrchestratorState::PlanDrafted],
        )?;

        let list = self
            .suggestions
            .get(column)
            .ok_or_else(|| SieveError::UnknownColumn(column.to_string()))?;
        if !list.iter().any(|s| s.id == id) {
            return Err(SieveError::UnknownSuggestion {
                column: column.to_string(),
                id: id.to_string(),
            });
        }

        self.selections
            .entry(column.to_string())
            .or_default()
            .insert(id.to_string(), selected);
        self.state = OrchestratorState::PlanDrafted;
        Ok(())
    }

    /// The plan implied by the defaults plus explicit selections.
    pub fn current_plan(&self) -> CorrectionPlan {
        let mut plan = CorrectionPlan::new();
        for (column, list) in &self.suggestions {
            let overrides = self.selections.get(column);
            for suggestion in list {
                let selected = overrides
                    .and_then(|o| o.get(&suggestion.id).copied())
                    .unwrap_or(suggestion.selected_by_default);
                if selected {
                    plan.select(column, suggestion.clone());
                }
            }
        }
        plan
    }

    /// Apply the current selections.
    pub fn apply(&mut self) -> Result<ApplyReport> {
        let plan = self.current_plan();
        self.apply_plan_with_cancel(&plan, &CancelToken::new())
    }

    /// Apply an explicit plan, ignoring current selections.
    pub fn apply_plan(&mut self, plan: &CorrectionPlan) -> Result<ApplyReport> {
        self.apply_plan_with_cancel(plan, &CancelToken::new())
    }

    /// Apply an explicit plan, stopping between stages once `cancel` fires.
    ///
    /// On failure the orchestrator returns to the state it was in.
    pub fn apply_plan_with_cancel(
        &mut self,
        plan: &CorrectionPlan,
        cancel: &CancelToken,
    ) -> Result<ApplyReport> {
        let resume = self.state;
        self.require("apply", &[OrchestratorState::Profiled, OrchestratorState::PlanDrafted])?;
        let Some(current) = self.current.as_ref() else {
            return Err(SieveError::InvalidState { operation: "apply", state: resume.label() });
        };

        self.state = OrchestratorState::Applying;
        let before = Arc::clone(&current.dataset);
        let score_before = current.profile.global_score;

        let outcome = match self.applier.apply_with_cancel(&before, plan, cancel) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = resume;
                return Err(e);
            }
        };

        let log = outcome.log();
        self.previous = self.current.take();
        let after = self.install(Arc::new(outcome.dataset));
        let (rows_after, score_after) = (after.row_count, after.global_score);
        self.last_log = log.clone();

        info!(
            changes = log.len(),
            rows_before = before.row_count(),
            rows_after,
            score_before,
            score_after,
            "corrections applied"
        );

        Ok(ApplyReport {
            log,
            rows_before: before.row_count(),
            rows_after,
            score_before,
            score_after,
            passes: outcome.passes,
            converged: outcome.converged,
        })
    }

    /// Before/after figures for the last `apply`, if any.
    pub fn comparison(&self) -> Option<Comparison> {
        let before = self.previous.as_ref()?;
        let after = self.current.as_ref()?;
        Some(Comparison {
            score_before: before.profile.global_score,
            score_after: after.profile.global_score,
            rows_before: before.dataset.row_count(),
            rows_after: after.dataset.row_count(),
            missing_before: before.dataset.blank_cells(),
            missing_after: after.dataset.blank_cells(),
        })
    }

    /// Drop all data and return to `Empty`.
    pub fn reset(&mut self) {
        self.state = OrchestratorState::Empty;
        self.current = None;
        self.previous = None;
        self.suggestions.clear();
        self.selections.clear();
        self.last_log.clear();
    }

    /// Profile `dataset`, regenerate suggestions, and make it current.
    fn install(&mut self, dataset: Arc<Dataset>) -> &DatasetProfile {
        let profile = self.profiler.profile(&dataset);
        self.suggestions = self.engine.suggest_all(&profile);
        self.selections.clear();
        self.state = OrchestratorState::Profiled;
        &self.current.insert(Snapshot { dataset, profile }).profile
    }

    fn require(&self, operation: &'static str, allowed: &[OrchestratorState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SieveError::InvalidState {
                operation,
                state: self.state.label(),
            })
        }
    }
}

impl Default for ProfileOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Value;
    use crate::schema::DetectedType;
    use crate::suggestion::CorrectionAction;

    fn contacts() -> Dataset {
        Dataset::from_columns(vec![
            (
                "email",
                vec![
                    Value::text(" a@b.com "),
                    Value::text("a@b.com"),
                    Value::text("c@d.org"),
                ],
            ),
            (
                "age",
                vec![Value::Number(30.0), Value::Null, Value::Number(40.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_ingest_profiles_dataset() {
        let mut orch = ProfileOrchestrator::new();
        let profile = orch.ingest(contacts()).unwrap();
        assert_eq!(profile.columns.len(), 2);
        assert_eq!(profile.column("email").unwrap().detected_type, DetectedType::Email);
        assert_eq!(orch.state(), OrchestratorState::Profiled);
        assert!(!orch.suggestions()["email"].is_empty());
    }

    #[test]
    fn test_empty_dataset() {
        let mut orch = ProfileOrchestrator::new();
        let profile = orch.ingest(Dataset::empty()).unwrap();
        assert!(profile.columns.is_empty());
        assert_eq!(profile.global_score, 0.0);
    }

    #[test]
    fn test_apply_from_empty_is_misuse() {
        let mut orch = ProfileOrchestrator::new();
        assert!(matches!(
            orch.apply(),
            Err(SieveError::InvalidState { operation: "apply", state: "empty" })
        ));
    }

    #[test]
    fn test_ingest_while_drafting_is_misuse() {
        let mut orch = ProfileOrchestrator::new();
        orch.ingest(contacts()).unwrap();
        orch.select_suggestion("age", "keep-age", true).unwrap();
        assert_eq!(orch.state(), OrchestratorState::PlanDrafted);
        assert!(matches!(
            orch.ingest(contacts()),
            Err(SieveError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_select_unknown() {
        let mut orch = ProfileOrchestrator::new();
        orch.ingest(contacts()).unwrap();
        assert!(matches!(
            orch.select_suggestion("nope", "keep-nope", true),
            Err(SieveError::UnknownColumn(_))
        ));
        assert!(matches!(
            orch.select_suggestion("age", "bogus", true),
            Err(SieveError::UnknownSuggestion { .. })
        ));
    }

    #[test]
    fn test_deselecting_changes_plan() {
        let mut orch = ProfileOrchestrator::new();
        orch.ingest(contacts()).unwrap();
        let before = orch.current_plan().len();
        orch.select_suggestion("age", "impute-mean-age", false).unwrap();
        assert_eq!(orch.current_plan().len(), before - 1);
    }

    #[test]
    fn test_apply_updates_snapshot_and_comparison() {
        let mut orch = ProfileOrchestrator::new();
        orch.ingest(contacts()).unwrap();
        let report = orch.apply().unwrap();

        assert_eq!(report.rows_before, 3);
        assert_eq!(report.rows_after, 2);
        assert!(report.converged);
        assert_eq!(orch.state(), OrchestratorState::Profiled);
        assert_eq!(orch.last_log(), report.log.as_slice());

        let cmp = orch.comparison().unwrap();
        assert_eq!(cmp.missing_after, 0);
        assert!(cmp.missing_fixed() >= 1);
        assert!(cmp.score_delta() >= 0.0);
    }

    #[test]
    fn test_reapplying_same_plan_is_stable() {
        let mut orch = ProfileOrchestrator::new();
        orch.ingest(contacts()).unwrap();
        orch.select_suggestion("email", "standardize-email-email", true).unwrap();
        let plan = orch.current_plan();
        let first = orch.apply_plan(&plan).unwrap();
        assert!(first.log.iter().any(|l| l.starts_with("standardized 1 values as email")));
        let data = Arc::clone(orch.dataset().unwrap());
        let profile = orch.profile().unwrap().clone();

        let report = orch.apply_plan(&plan).unwrap();
        assert!(report.log.is_empty());
        assert_eq!(**orch.dataset().unwrap(), *data);
        assert_eq!(orch.profile().unwrap(), &profile);
    }

    #[test]
    fn test_fuzzy_dedupe_uses_metric_threshold() {
        let config = SieveConfig::from_toml_str(
            "[metrics.fuzzy]\nenabled = true\nsimilarity_threshold = 0.8\n",
        )
        .unwrap();
        let dataset = Dataset::from_columns(vec![(
            "code",
            vec![
                Value::text("abcdefgh"),
                Value::text("abcdefgx"),
                Value::text("zzzz"),
            ],
        )])
        .unwrap();

        let mut orch = ProfileOrchestrator::with_config(config);
        let profile = orch.ingest(dataset).unwrap();
        assert!(profile.column("code").unwrap().near_duplicate_pct.unwrap() > 0.0);

        orch.select_suggestion("code", "dedupe-fuzzy-code", true).unwrap();
        let report = orch.apply().unwrap();
        assert_eq!(report.rows_before, 3);
        assert_eq!(report.rows_after, 2);
        assert_eq!(report.log, vec!["removed 1 near-duplicate rows on column code"]);
    }

    #[test]
    fn test_empty_plan_still_transitions() {
        let mut orch = ProfileOrchestrator::new();
        orch.ingest(contacts()).unwrap();
        orch.select_suggestion("age", "keep-age", true).unwrap();
        let report = orch.apply_plan(&CorrectionPlan::new()).unwrap();
        assert!(report.log.is_empty());
        assert_eq!(report.rows_after, 3);
        assert_eq!(orch.state(), OrchestratorState::Profiled);
    }

    #[test]
    fn test_failed_apply_restores_state() {
        let mut orch = ProfileOrchestrator::new();
        orch.ingest(contacts()).unwrap();
        orch.select_suggestion("age", "keep-age", true).unwrap();

        let plan = CorrectionPlan::new().with_action("ghost", CorrectionAction::ImputeMode);
        assert!(matches!(orch.apply_plan(&plan), Err(SieveError::UnknownColumn(_))));
        assert_eq!(orch.state(), OrchestratorState::PlanDrafted);
        assert_eq!(orch.dataset().unwrap().row_count(), 3);
    }

    #[test]
    fn test_reset() {
        let mut orch = ProfileOrchestrator::new();
        orch.ingest(contacts()).unwrap();
        orch.apply().unwrap();
        orch.reset();
        assert_eq!(orch.state(), OrchestratorState::Empty);
        assert!(orch.dataset().is_none());
        assert!(orch.comparison().is_none());
        assert!(orch.statistics().is_none());
    }

    #[test]
    fn test_statistics_follow_current_dataset() {
        let mut orch = ProfileOrchestrator::new();
        orch.ingest(contacts()).unwrap();
        let stats = orch.statistics().unwrap();
        assert_eq!(stats.keys().collect::<Vec<_>>(), vec!["email", "age"]);
        assert!(matches!(stats["age"], ColumnSummary::Numeric { count: 2, .. }));
    }

    #[test]
    fn test_snapshots_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Arc<Dataset>>();
        assert_send_sync::<ProfileOrchestrator>();
    }
}
