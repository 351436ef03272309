//! Job persistence and dataset loading capabilities.

use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Result, SieveError};
use crate::input::{Dataset, IngestConfig, Ingestor};

use super::job::{Job, JobRun};

/// Storage for job definitions and run history.
pub trait JobStore: Send {
    /// Insert or replace a job.
    fn save_job(&mut self, job: Job) -> Result<()>;

    fn job(&self, id: &str) -> Result<Job>;

    /// All jobs in insertion order.
    fn jobs(&self) -> Result<Vec<Job>>;

    fn delete_job(&mut self, id: &str) -> Result<()>;

    fn record_run(&mut self, run: JobRun) -> Result<()>;

    /// Runs of one job, oldest first.
    fn runs(&self, job_id: &str) -> Result<Vec<JobRun>>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: IndexMap<String, Job>,
    runs: Vec<JobRun>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn save_job(&mut self, job: Job) -> Result<()> {
        self.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    fn job(&self, id: &str) -> Result<Job> {
        self.jobs
            .get(id)
            .cloned()
            .ok_or_else(|| SieveError::JobNotFound(id.to_string()))
    }

    fn jobs(&self) -> Result<Vec<Job>> {
        Ok(self.jobs.values().cloned().collect())
    }

    fn delete_job(&mut self, id: &str) -> Result<()> {
        if self.jobs.shift_remove(id).is_none() {
            return Err(SieveError::JobNotFound(id.to_string()));
        }
        self.runs.retain(|r| r.job_id != id);
        Ok(())
    }

    fn record_run(&mut self, run: JobRun) -> Result<()> {
        if !self.jobs.contains_key(&run.job_id) {
            return Err(SieveError::JobNotFound(run.job_id));
        }
        self.runs.push(run);
        Ok(())
    }

    fn runs(&self, job_id: &str) -> Result<Vec<JobRun>> {
        Ok(self.runs.iter().filter(|r| r.job_id == job_id).cloned().collect())
    }
}

/// Resolves a job's source into a dataset.
pub trait DatasetLoader {
    fn load(&self, source: &str) -> Result<Dataset>;
}

impl<F> DatasetLoader for F
where
    F: Fn(&str) -> Result<Dataset>,
{
    fn load(&self, source: &str) -> Result<Dataset> {
        self(source)
    }
}

/// Treats sources as file paths.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    config: IngestConfig,
}

impl FileLoader {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }
}

impl DatasetLoader for FileLoader {
    fn load(&self, source: &str) -> Result<Dataset> {
        let (dataset, _) = Ingestor::with_config(self.config.clone()).parse_file(Path::new(source))?;
        Ok(dataset)
    }
}
