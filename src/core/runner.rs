use crate::core::command::CommandTemplate;
use crate::domain::model::{Job, JobOutput};
use crate::domain::ports::JobRunner;
use crate::utils::error::{DispatchError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Runs each job as a child process and buffers everything it prints.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    command: CommandTemplate,
}

impl ProcessRunner {
    pub fn new(command: CommandTemplate) -> Self {
        Self { command }
    }
}

#[async_trait]
impl JobRunner for ProcessRunner {
    async fn run(&self, job: &Job) -> Result<JobOutput> {
        let args = self.command.render(&job.product);
        tracing::debug!(
            "Launching job {} for {}: {}",
            job.index,
            job.product,
            self.command.display_line(&job.product)
        );

        let mut cmd = Command::new(&self.command.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.command.working_dir {
            cmd.current_dir(dir);
        }

        let start = Instant::now();
        let output = cmd
            .output()
            .await
            .map_err(|source| DispatchError::LaunchError {
                program: self.command.program.clone(),
                source,
            })?;

        Ok(JobOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
            elapsed: start.elapsed(),
        })
    }
}

/// Launches nothing; each job "prints" the command line it would have run.
#[derive(Debug, Clone)]
pub struct DryRunRunner {
    command: CommandTemplate,
}

impl DryRunRunner {
    pub fn new(command: CommandTemplate) -> Self {
        Self { command }
    }
}

#[async_trait]
impl JobRunner for DryRunRunner {
    async fn run(&self, job: &Job) -> Result<JobOutput> {
        Ok(JobOutput {
            exit_code: Some(0),
            stdout: self.command.display_line(&job.product).into_bytes(),
            stderr: Vec::new(),
            elapsed: Duration::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProductId;

    fn job(product: &str) -> Job {
        Job {
            index: 0,
            product: ProductId::from(product),
        }
    }

    #[tokio::test]
    async fn test_dry_run_reports_command_line() {
        let runner = DryRunRunner::new(CommandTemplate::default());
        let output = runner.run(&job("IDD60920")).await.unwrap();

        assert!(output.success());
        assert_eq!(
            String::from_utf8(output.stdout).unwrap(),
            "dotnet run Logging:LogLevel:Default=Debug observations:ObservationService:Product=IDD60920"
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let runner = ProcessRunner::new(CommandTemplate {
            program: "obs-loader-no-such-program".to_string(),
            ..CommandTemplate::default()
        });

        let err = runner.run(&job("IDD60920")).await.unwrap_err();
        assert!(matches!(err, DispatchError::LaunchError { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_both_streams_and_exit_code() {
        let runner = ProcessRunner::new(CommandTemplate {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo \"out $1\"; echo \"err $1\" >&2; exit 3".to_string(),
                "sh".to_string(),
            ],
            override_template: "Product={product}".to_string(),
            working_dir: None,
        });

        let output = runner.run(&job("IDD60920")).await.unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stdout), "out Product=IDD60920\n");
        assert_eq!(String::from_utf8_lossy(&output.stderr), "err Product=IDD60920\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_working_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = ProcessRunner::new(CommandTemplate {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "pwd".to_string(), "sh".to_string()],
            override_template: "{product}".to_string(),
            working_dir: Some(dir.path().to_path_buf()),
        });

        let output = runner.run(&job("A")).await.unwrap();
        let printed = String::from_utf8_lossy(&output.stdout);
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(std::path::Path::new(printed.trim()).canonicalize().unwrap(), expected);
    }
}
