pub mod command;
pub mod dispatcher;
pub mod engine;
pub mod products;
pub mod report;
pub mod runner;

pub use crate::domain::model::{DispatchSummary, Job, JobOutcome, JobOutput, JobResult, ProductId};
pub use crate::domain::ports::{ConfigProvider, JobRunner, Reporter};
pub use crate::utils::error::Result;
