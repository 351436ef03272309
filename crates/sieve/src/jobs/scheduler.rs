//! Runs due jobs: load, profile, apply the stored plan, record the run.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::SieveConfig;
use crate::error::Result;
use crate::orchestrator::{ApplyReport, ProfileOrchestrator};

use super::job::{Job, JobRun, JobStatus};
use super::store::{DatasetLoader, JobStore};

/// Executes jobs whose `next_run` has passed.
pub struct Scheduler {
    config: SieveConfig,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_config(SieveConfig::default())
    }

    pub fn with_config(config: SieveConfig) -> Self {
        Self { config }
    }

    /// Run every due job once and return the recorded runs.
    ///
    /// A failing job is recorded as failed and does not stop the others.
    /// Only store errors are returned.
    pub fn run_due(
        &self,
        now: DateTime<Utc>,
        store: &mut dyn JobStore,
        loader: &dyn DatasetLoader,
    ) -> Result<Vec<JobRun>> {
        let due: Vec<Job> = store.jobs()?.into_iter().filter(|j| j.is_due(now)).collect();
        let mut runs = Vec::with_capacity(due.len());

        for mut job in due {
            job.status = JobStatus::Running;
            store.save_job(job.clone())?;

            let mut run = JobRun::started(&job.id, now);
            match self.execute(&job, loader) {
                Ok(report) => {
                    run.status = JobStatus::Completed;
                    run.log = report.log;
                    run.rows_before = report.rows_before;
                    run.rows_after = report.rows_after;
                    run.score_before = report.score_before;
                    run.score_after = report.score_after;
                    info!(job = %job.id, rows_after = run.rows_after, "job completed");
                }
                Err(e) => {
                    run.status = JobStatus::Failed;
                    run.note = Some(e.to_string());
                    warn!(job = %job.id, error = %e, "job failed");
                }
            }
            run.finished_at = Utc::now().max(now);

            job.status = run.status;
            job.last_run = Some(now);
            job.advance(now);
            store.record_run(run.clone())?;
            store.save_job(job)?;
            runs.push(run);
        }

        Ok(runs)
    }

    fn execute(&self, job: &Job, loader: &dyn DatasetLoader) -> Result<ApplyReport> {
        let dataset = loader.load(&job.source)?;
        let mut orchestrator = ProfileOrchestrator::with_config(self.config.clone());
        orchestrator.ingest(dataset)?;
        orchestrator.apply_plan(&job.plan)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
