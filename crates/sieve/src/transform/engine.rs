//! Correction applier: executes a plan against a dataset.
//!
//! A pass runs three stages in a fixed order: deduplication, imputation,
//! then standardization. Passes repeat until one changes nothing, so that
//! applying the same plan to the result is a no-op.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SieveError};
use crate::input::{Dataset, Value};
use crate::inference::ParseOptions;
use crate::metrics::fuzzy::{similarity, FuzzyConfig};
use crate::suggestion::CorrectionAction;

use super::cancel::CancelToken;
use super::operations::{column_mean, column_mode, normalize_text, standardize};
use super::plan::CorrectionPlan;

/// Applier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplierConfig {
    /// Upper bound on passes before giving up on convergence.
    pub max_passes: usize,
}

impl Default for ApplierConfig {
    fn default() -> Self {
        Self { max_passes: 8 }
    }
}

/// Pipeline stage a change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Dedupe,
    Impute,
    Standardize,
}

/// One effective change made by the applier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedChange {
    /// Pass number, starting at 1.
    pub pass: usize,
    pub stage: Stage,
    /// Column the action belongs to.
    pub column: String,
    /// Id of the suggestion that caused the change.
    pub suggestion_id: String,
    /// Rows removed or cells rewritten.
    pub affected: usize,
    /// Log line.
    pub message: String,
}

impl fmt::Display for AppliedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of applying a plan.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// The corrected dataset.
    pub dataset: Dataset,
    /// Changes in the order they happened.
    pub changes: Vec<AppliedChange>,
    /// Passes executed, including the final no-op pass.
    pub passes: usize,
    /// False when `max_passes` ran out before a no-op pass.
    pub converged: bool,
}

impl ApplyOutcome {
    /// Human-readable change log.
    pub fn log(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.message.clone()).collect()
    }

    /// Rows removed across all passes.
    pub fn rows_removed(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.stage == Stage::Dedupe)
            .map(|c| c.affected)
            .sum()
    }
}

/// Applies correction plans.
pub struct CorrectionApplier {
    config: ApplierConfig,
    options: ParseOptions,
    /// Kept representatives each row is compared to during fuzzy dedupe.
    fuzzy_row_cap: usize,
}

impl CorrectionApplier {
    /// Create an applier with default configuration.
    pub fn new() -> Self {
        Self::with_config(ApplierConfig::default(), ParseOptions::default())
    }

    /// Create an applier with custom configuration.
    pub fn with_config(config: ApplierConfig, options: ParseOptions) -> Self {
        Self {
            config,
            options,
            fuzzy_row_cap: FuzzyConfig::default().row_cap,
        }
    }

    /// Bound fuzzy dedupe by the same row cap as the near-duplicate metric.
    pub fn with_fuzzy(mut self, fuzzy: &FuzzyConfig) -> Self {
        self.fuzzy_row_cap = fuzzy.row_cap;
        self
    }

    /// Apply a plan, returning the new dataset and its change log.
    ///
    /// The input dataset is never modified.
    pub fn apply(&self, dataset: &Dataset, plan: &CorrectionPlan) -> Result<(Dataset, Vec<String>)> {
        let outcome = self.apply_with_cancel(dataset, plan, &CancelToken::new())?;
        let log = outcome.log();
        Ok((outcome.dataset, log))
    }

    /// Apply a plan, checking `cancel` between stages.
    pub fn apply_with_cancel(
        &self,
        dataset: &Dataset,
        plan: &CorrectionPlan,
        cancel: &CancelToken,
    ) -> Result<ApplyOutcome> {
        self.validate(dataset, plan)?;

        let max_passes = self.config.max_passes.max(1);
        let mut current = dataset.clone();
        let mut changes = Vec::new();

        for pass in 1..=max_passes {
            let (next, pass_changes) = self.run_pass(&current, plan, pass, cancel)?;
            if pass_changes.is_empty() {
                info!(
                    passes = pass,
                    changes = changes.len(),
                    rows_before = dataset.row_count(),
                    rows_after = current.row_count(),
                    "plan applied"
                );
                return Ok(ApplyOutcome {
                    dataset: current,
                    changes,
                    passes: pass,
                    converged: true,
                });
            }
            changes.extend(pass_changes);
            current = next;
        }

        warn!(max_passes, "plan did not converge; result may change if applied again");
        Ok(ApplyOutcome {
            dataset: current,
            changes,
            passes: max_passes,
            converged: false,
        })
    }

    /// Every column named by the plan must exist.
    fn validate(&self, dataset: &Dataset, plan: &CorrectionPlan) -> Result<()> {
        for column in plan.referenced_columns() {
            if !dataset.has_column(column) {
                return Err(SieveError::UnknownColumn(column.to_string()));
            }
        }
        Ok(())
    }

    fn run_pass(
        &self,
        input: &Dataset,
        plan: &CorrectionPlan,
        pass: usize,
        cancel: &CancelToken,
    ) -> Result<(Dataset, Vec<AppliedChange>)> {
        let mut changes = Vec::new();

        cancel.check()?;
        let mut data = self.dedupe_stage(input, plan, pass, &mut changes);

        cancel.check()?;
        self.impute_stage(&mut data, plan, pass, &mut changes);

        cancel.check()?;
        self.standardize_stage(&mut data, plan, pass, &mut changes);

        Ok((data, changes))
    }

    // =========================================================================
    // DEDUPE
    // =========================================================================

    fn dedupe_stage(
        &self,
        input: &Dataset,
        plan: &CorrectionPlan,
        pass: usize,
        changes: &mut Vec<AppliedChange>,
    ) -> Dataset {
        let mut data = input.clone();

        for (column, suggestion) in plan.iter() {
            let (keep, message) = match &suggestion.action {
                CorrectionAction::Dedupe { keys } => {
                    let keep = self.exact_keep(&data, plan, keys);
                    let removed = data.row_count() - keep.len();
                    let target = if keys.len() > 1 {
                        format!("columns {}", keys.join("+"))
                    } else {
                        format!("column {}", column)
                    };
                    (keep, format!("removed {} duplicate rows on {}", removed, target))
                }
                CorrectionAction::DedupeFuzzy { threshold } => {
                    let keep = self.fuzzy_keep(&data, plan, column, *threshold);
                    let removed = data.row_count() - keep.len();
                    (
                        keep,
                        format!("removed {} near-duplicate rows on column {}", removed, column),
                    )
                }
                _ => continue,
            };

            let removed = data.row_count() - keep.len();
            if removed == 0 {
                continue;
            }

            debug!(column, removed, "dedupe");
            data = data.select_rows(&keep);
            changes.push(AppliedChange {
                pass,
                stage: Stage::Dedupe,
                column: column.to_string(),
                suggestion_id: suggestion.id.clone(),
                affected: removed,
                message,
            });
        }

        data
    }

    /// Indices of first occurrences of each composite key.
    fn exact_keep(&self, data: &Dataset, plan: &CorrectionPlan, keys: &[String]) -> Vec<usize> {
        let key_columns: Vec<Vec<Option<String>>> = keys
            .iter()
            .map(|k| self.normalized_keys(data, plan, k))
            .collect();

        let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(data.row_count());
        (0..data.row_count())
            .filter(|&row| {
                let key: Vec<Option<String>> =
                    key_columns.iter().map(|col| col[row].clone()).collect();
                seen.insert(key)
            })
            .collect()
    }

    /// Rows kept by fuzzy dedupe: each non-blank row is dropped when it
    /// matches one of the first `fuzzy_row_cap` kept rows. Blanks are kept.
    fn fuzzy_keep(
        &self,
        data: &Dataset,
        plan: &CorrectionPlan,
        column: &str,
        threshold: f64,
    ) -> Vec<usize> {
        let keys = self.normalized_keys(data, plan, column);
        let mut representatives: Vec<String> = Vec::new();
        let mut keep = Vec::with_capacity(keys.len());

        for (row, key) in keys.into_iter().enumerate() {
            let Some(key) = key.map(|k| k.to_lowercase()) else {
                keep.push(row);
                continue;
            };

            let matched = representatives
                .iter()
                .any(|rep| *rep == key || similarity(rep, &key) >= threshold);
            if matched {
                continue;
            }

            keep.push(row);
            if representatives.len() < self.fuzzy_row_cap {
                representatives.push(key);
            }
        }

        keep
    }

    /// Dedupe keys for a column, after the column's planned normalizers.
    fn normalized_keys(&self, data: &Dataset, plan: &CorrectionPlan, column: &str) -> Vec<Option<String>> {
        let normalizers = plan.normalizers_for(column);
        data.column(column)
            .unwrap_or(&[])
            .iter()
            .map(|value| {
                let mut current = value.clone();
                for action in &normalizers {
                    if let Some(next) = self.normalize(action, &current) {
                        current = next;
                    }
                }
                current.key()
            })
            .collect()
    }

    // =========================================================================
    // IMPUTATION
    // =========================================================================

    fn impute_stage(
        &self,
        data: &mut Dataset,
        plan: &CorrectionPlan,
        pass: usize,
        changes: &mut Vec<AppliedChange>,
    ) {
        for (column, suggestion) in plan.iter() {
            let Some(values) = data.column(column) else {
                continue;
            };

            let blanks = values.iter().filter(|v| v.is_blank()).count();
            if blanks == 0 {
                continue;
            }

            let (statistic, fill) = match suggestion.action {
                CorrectionAction::ImputeMean => ("mean", column_mean(values).map(Value::Number)),
                CorrectionAction::ImputeMode => ("mode", column_mode(values)),
                _ => continue,
            };

            let Some(fill) = fill else {
                debug!(column, statistic, "no values to impute from; skipped");
                continue;
            };

            if let Some(cells) = data.column_mut(column) {
                for cell in cells.iter_mut().filter(|v| v.is_blank()) {
                    *cell = fill.clone();
                }
            }

            debug!(column, statistic, filled = blanks, "impute");
            changes.push(AppliedChange {
                pass,
                stage: Stage::Impute,
                column: column.to_string(),
                suggestion_id: suggestion.id.clone(),
                affected: blanks,
                message: format!(
                    "imputed {} {} on column {} ({} cells)",
                    statistic, fill, column, blanks
                ),
            });
        }
    }

    // =========================================================================
    // STANDARDIZATION
    // =========================================================================

    fn standardize_stage(
        &self,
        data: &mut Dataset,
        plan: &CorrectionPlan,
        pass: usize,
        changes: &mut Vec<AppliedChange>,
    ) {
        for (column, suggestion) in plan.iter() {
            let action = &suggestion.action;
            if !action.is_normalizer() {
                continue;
            }
            let Some(cells) = data.column_mut(column) else {
                continue;
            };

            let mut rewritten = 0;
            for cell in cells.iter_mut().filter(|v| !v.is_blank()) {
                if let Some(next) = self.normalize(action, cell) {
                    if next != *cell {
                        *cell = next;
                        rewritten += 1;
                    }
                }
            }

            if rewritten == 0 {
                continue;
            }

            let message = match action {
                CorrectionAction::Standardize { kind } => format!(
                    "standardized {} values as {} on column {}",
                    rewritten,
                    kind.label(),
                    column
                ),
                _ => format!("normalized {} text values on column {}", rewritten, column),
            };

            debug!(column, rewritten, "standardize");
            changes.push(AppliedChange {
                pass,
                stage: Stage::Standardize,
                column: column.to_string(),
                suggestion_id: suggestion.id.clone(),
                affected: rewritten,
                message,
            });
        }
    }

    fn normalize(&self, action: &CorrectionAction, value: &Value) -> Option<Value> {
        match action {
            CorrectionAction::Standardize { kind } => standardize(*kind, value, self.options),
            CorrectionAction::NormalizeText => normalize_text(value),
            _ => None,
        }
    }
}

impl Default for CorrectionApplier {
    fn default() -> Self {
        Self::new()
    }
}
