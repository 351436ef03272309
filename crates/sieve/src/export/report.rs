//! Quality reports.

use std::fmt::Write;

use crate::error::Result;
use crate::orchestrator::Comparison;
use crate::schema::DatasetProfile;

use super::writer::Exporter;

impl Exporter {
    /// Plain-text quality report, with a before/after section when given.
    pub fn report(profile: &DatasetProfile, comparison: Option<&Comparison>) -> String {
        let mut out = String::new();
        let kpis = profile.kpis();

        // Writing to a String never fails.
        let _ = writeln!(out, "DATA QUALITY REPORT");
        let _ = writeln!(out, "===================");
        let _ = writeln!(out, "Global score:  {:.1}/100", kpis.global_score);
        let _ = writeln!(
            out,
            "Rows:          {} ({} profiled)",
            kpis.rows, profile.profiled_rows
        );
        let _ = writeln!(out, "Columns:       {} ({} with issues)", kpis.columns, kpis.columns_with_issues);

        if !profile.columns.is_empty() {
            let width = profile
                .columns
                .iter()
                .map(|c| c.name.chars().count())
                .max()
                .unwrap_or(0)
                .max("column".len());

            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{:<width$}  {:<8}  {:>6}  {:>8}  {:>6}  {:>8}  {:>8}",
                "column", "type", "score", "missing", "dups", "invalid", "outliers"
            );
            for c in &profile.columns {
                let _ = writeln!(
                    out,
                    "{:<width$}  {:<8}  {:>6.1}  {:>7.1}%  {:>5.1}%  {:>7.1}%  {:>7.1}%",
                    c.name,
                    c.detected_type.label(),
                    c.quality_score,
                    c.missing_pct,
                    c.duplicate_pct,
                    c.invalid_pct,
                    c.outlier_pct
                );
            }
        }

        let insights = profile.insights();
        if !insights.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Insights");
            for line in insights {
                let _ = writeln!(out, "  - {}", line);
            }
        }

        if let Some(cmp) = comparison {
            let _ = writeln!(out);
            let _ = writeln!(out, "Before / after");
            let _ = writeln!(
                out,
                "  score:   {:.1} -> {:.1} ({:+.1})",
                cmp.score_before,
                cmp.score_after,
                cmp.score_delta()
            );
            let _ = writeln!(out, "  rows:    {} -> {}", cmp.rows_before, cmp.rows_after);
            let _ = writeln!(out, "  missing cells fixed: {}", cmp.missing_fixed());
        }

        out
    }

    /// The profile and its headline figures as JSON.
    pub fn report_json(profile: &DatasetProfile) -> Result<Vec<u8>> {
        let document = serde_json::json!({
            "kpis": profile.kpis(),
            "profile": profile,
            "insights": profile.insights(),
        });
        Ok(serde_json::to_vec_pretty(&document)?)
    }
}
