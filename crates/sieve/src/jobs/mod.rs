//! Scheduled re-application of correction plans.

mod job;
mod scheduler;
mod store;

pub use job::{next_run_after, Frequency, Job, JobRun, JobStatus};
pub use scheduler::Scheduler;
pub use store::{DatasetLoader, FileLoader, InMemoryJobStore, JobStore};
