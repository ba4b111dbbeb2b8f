use crate::domain::model::{DispatchSummary, Job, JobOutcome, JobResult, ProductId};
use crate::domain::ports::{JobRunner, Reporter};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Fans jobs out over a fixed number of worker slots.
///
/// Every job is submitted up front and holds a slot for its whole lifetime,
/// so at most `workers` processes run at once. `run` returns only after the
/// last job has been reported.
pub struct Dispatcher<R: JobRunner, P: Reporter> {
    runner: Arc<R>,
    reporter: Arc<P>,
    workers: usize,
}

impl<R: JobRunner, P: Reporter> Dispatcher<R, P> {
    pub fn new(runner: Arc<R>, reporter: Arc<P>, workers: usize) -> Self {
        Self {
            runner,
            reporter,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub async fn run(&self, products: Vec<ProductId>) -> DispatchSummary {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();
        let mut summary = DispatchSummary {
            dispatched: products.len(),
            ..Default::default()
        };

        for (index, product) in products.into_iter().enumerate() {
            let job = Job { index, product };
            let semaphore = Arc::clone(&semaphore);
            let runner = Arc::clone(&self.runner);
            let reporter = Arc::clone(&self.reporter);
            let tracked = job.clone();

            let handle = tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        error!("Worker pool closed before job {} ran: {}", job.index, e);
                        return false;
                    }
                };
                run_job(runner.as_ref(), reporter.as_ref(), job).await
            });
            pending.insert(handle.id(), tracked);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, succeeded)) => {
                    pending.remove(&id);
                    if succeeded {
                        summary.succeeded += 1;
                    } else {
                        summary.failed += 1;
                    }
                }
                Err(e) => {
                    error!("Worker task aborted: {}", e);
                    summary.failed += 1;
                    // The task died before reporting; print its block here.
                    if let Some(job) = pending.remove(&e.id()) {
                        let outcome = JobOutcome {
                            job,
                            result: JobResult::LaunchFailed(format!("worker panicked: {}", e)),
                        };
                        if let Err(e) = self.reporter.report(&outcome) {
                            error!("Failed to print output of {}: {}", outcome.job.product, e);
                        }
                    }
                }
            }
        }

        summary
    }
}

async fn run_job<R: JobRunner, P: Reporter>(runner: &R, reporter: &P, job: Job) -> bool {
    debug!("Job {} started for {}", job.index, job.product);

    let result = match runner.run(&job).await {
        Ok(output) => {
            if output.success() {
                info!("✅ {} finished in {:?}", job.product, output.elapsed);
            } else {
                warn!(
                    "⚠️ {} exited with {} after {:?}",
                    job.product,
                    output
                        .exit_code
                        .map_or_else(|| "a signal".to_string(), |code| format!("status {}", code)),
                    output.elapsed
                );
            }
            JobResult::Completed(output)
        }
        Err(e) => {
            warn!("❌ {} could not be started: {}", job.product, e);
            JobResult::LaunchFailed(e.to_string())
        }
    };

    let outcome = JobOutcome { job, result };
    if let Err(e) = reporter.report(&outcome) {
        error!("Failed to print output of {}: {}", outcome.job.product, e);
    }
    outcome.is_success()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::StreamReporter;
    use crate::domain::model::JobOutput;
    use crate::utils::error::{DispatchError, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every call and the peak number of jobs in flight.
    #[derive(Default)]
    struct TrackingRunner {
        calls: Mutex<HashMap<String, usize>>,
        active: AtomicUsize,
        peak: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl JobRunner for TrackingRunner {
        async fn run(&self, job: &Job) -> Result<JobOutput> {
            *self
                .calls
                .lock()
                .unwrap()
                .entry(job.product.to_string())
                .or_default() += 1;

            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on == Some(job.product.as_str()) {
                return Err(DispatchError::IoError(std::io::Error::other("boom")));
            }

            Ok(JobOutput {
                exit_code: Some(if job.product.as_str().starts_with("bad") { 1 } else { 0 }),
                stdout: format!("echo {}", job.product).into_bytes(),
                stderr: Vec::new(),
                elapsed: Duration::from_millis(20),
            })
        }
    }

    fn products(ids: &[&str]) -> Vec<ProductId> {
        ids.iter().map(|id| ProductId::from(*id)).collect()
    }

    #[tokio::test]
    async fn test_each_product_runs_exactly_once() {
        let runner = Arc::new(TrackingRunner::default());
        let reporter = Arc::new(StreamReporter::buffered());
        let dispatcher = Dispatcher::new(runner.clone(), reporter.clone(), 3);

        let summary = dispatcher
            .run(products(&["A", "B", "C", "D", "E"]))
            .await;

        assert_eq!(summary.dispatched, 5);
        assert_eq!(summary.succeeded, 5);
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 5);
        assert!(calls.values().all(|count| *count == 1));
        assert_eq!(reporter.text().matches("--\n").count(), 5);
    }

    #[tokio::test]
    async fn test_never_exceeds_worker_count() {
        let runner = Arc::new(TrackingRunner::default());
        let reporter = Arc::new(StreamReporter::buffered());
        let dispatcher = Dispatcher::new(runner.clone(), reporter, 2);

        dispatcher
            .run(products(&["A", "B", "C", "D", "E", "F"]))
            .await;

        let peak = runner.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 2, "peak was {peak}");
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_siblings() {
        let runner = Arc::new(TrackingRunner {
            fail_on: Some("C"),
            ..Default::default()
        });
        let reporter = Arc::new(StreamReporter::buffered());
        let dispatcher = Dispatcher::new(runner, reporter.clone(), 2);

        let summary = dispatcher.run(products(&["A", "bad-B", "C", "D"])).await;

        assert_eq!(
            summary,
            DispatchSummary {
                dispatched: 4,
                succeeded: 2,
                failed: 2,
            }
        );
        let text = reporter.text();
        for id in ["A", "bad-B", "C", "D"] {
            assert!(text.contains(&format!("Product: {id}\n")));
        }
        assert!(text.contains("boom"));
    }

    struct PanickingRunner;

    #[async_trait]
    impl JobRunner for PanickingRunner {
        async fn run(&self, job: &Job) -> Result<JobOutput> {
            if job.product.as_str() == "B" {
                panic!("runner blew up on {}", job.product);
            }
            Ok(JobOutput {
                exit_code: Some(0),
                stdout: Vec::new(),
                stderr: Vec::new(),
                elapsed: Duration::ZERO,
            })
        }
    }

    #[tokio::test]
    async fn test_panicking_job_is_still_reported() {
        let reporter = Arc::new(StreamReporter::buffered());
        let dispatcher = Dispatcher::new(Arc::new(PanickingRunner), reporter.clone(), 2);

        let summary = dispatcher.run(products(&["A", "B"])).await;

        assert_eq!(
            summary,
            DispatchSummary {
                dispatched: 2,
                succeeded: 1,
                failed: 1,
            }
        );
        let text = reporter.text();
        assert_eq!(text.matches("--\n").count(), 2);
        assert!(text.contains("Product: A\n"));
        assert!(text.contains("Product: B\n\nworker panicked"));
    }

    #[tokio::test]
    async fn test_zero_workers_still_makes_progress() {
        let runner = Arc::new(TrackingRunner::default());
        let dispatcher = Dispatcher::new(runner, Arc::new(StreamReporter::buffered()), 0);
        assert_eq!(dispatcher.workers(), 1);

        let summary = dispatcher.run(products(&["A"])).await;
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test]
    async fn test_empty_list_dispatches_nothing() {
        let runner = Arc::new(TrackingRunner::default());
        let dispatcher = Dispatcher::new(runner.clone(), Arc::new(StreamReporter::buffered()), 4);

        let summary = dispatcher.run(Vec::new()).await;
        assert_eq!(summary, DispatchSummary::default());
        assert!(runner.calls.lock().unwrap().is_empty());
    }
}
