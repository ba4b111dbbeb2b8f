use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque identifier of a product to observe, e.g. `IDD60920`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One external invocation for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Position of the product in the input list.
    pub index: usize,
    pub product: ProductId,
}

/// What a finished process left behind.
#[derive(Debug, Clone)]
pub struct JobOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl JobOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone)]
pub enum JobResult {
    Completed(JobOutput),
    /// The process never started; carries the launch error text.
    LaunchFailed(String),
}

#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job: Job,
    pub result: JobResult,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(&self.result, JobResult::Completed(output) if output.success())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(exit_code: Option<i32>) -> JobOutput {
        JobOutput {
            exit_code,
            stdout: Vec::new(),
            stderr: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_outcome_success_requires_zero_exit() {
        let job = Job {
            index: 0,
            product: ProductId::from("IDD60920"),
        };

        let ok = JobOutcome {
            job: job.clone(),
            result: JobResult::Completed(output(Some(0))),
        };
        let failed = JobOutcome {
            job: job.clone(),
            result: JobResult::Completed(output(Some(1))),
        };
        let signalled = JobOutcome {
            job: job.clone(),
            result: JobResult::Completed(output(None)),
        };
        let not_started = JobOutcome {
            job,
            result: JobResult::LaunchFailed("not found".to_string()),
        };

        assert!(ok.is_success());
        assert!(!failed.is_success());
        assert!(!signalled.is_success());
        assert!(!not_started.is_success());
    }

    #[test]
    fn test_product_id_deserializes_from_plain_string() {
        let ids: Vec<ProductId> = serde_json::from_str(r#"["IDD60920", "IDV60901"]"#).unwrap();
        assert_eq!(ids, vec![ProductId::from("IDD60920"), ProductId::from("IDV60901")]);
        assert_eq!(ids[0].to_string(), "IDD60920");
    }
}
