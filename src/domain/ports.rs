use crate::core::command::CommandTemplate;
use crate::domain::model::{Job, JobOutcome, JobOutput};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait ConfigProvider: Send + Sync {
    fn products_path(&self) -> &Path;
    fn workers(&self) -> usize;
    fn command(&self) -> &CommandTemplate;
}

/// Runs a single job to completion.
///
/// An `Err` means the job could not be started at all; a process that ran
/// and exited non-zero is still `Ok`.
#[async_trait]
pub trait JobRunner: Send + Sync + 'static {
    async fn run(&self, job: &Job) -> Result<JobOutput>;
}

pub trait Reporter: Send + Sync + 'static {
    fn report(&self, outcome: &JobOutcome) -> Result<()>;
}
