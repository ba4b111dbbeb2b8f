use crate::core::dispatcher::Dispatcher;
use crate::core::products::load_product_list;
use crate::domain::model::DispatchSummary;
use crate::domain::ports::{ConfigProvider, JobRunner, Reporter};
use crate::utils::error::Result;
use std::sync::Arc;

pub struct DispatchEngine<C: ConfigProvider, R: JobRunner, P: Reporter> {
    config: C,
    runner: Arc<R>,
    reporter: Arc<P>,
}

impl<C: ConfigProvider, R: JobRunner, P: Reporter> DispatchEngine<C, R, P> {
    pub fn new(config: C, runner: Arc<R>, reporter: Arc<P>) -> Self {
        Self {
            config,
            runner,
            reporter,
        }
    }

    /// Load the product list, then run one job per product.
    ///
    /// Fails only when the product list cannot be loaded, in which case no
    /// job is started.
    pub async fn run(&self) -> Result<DispatchSummary> {
        let products_path = self.config.products_path();
        tracing::info!("📁 Loading products from {}", products_path.display());
        let products = load_product_list(products_path)?;
        tracing::info!("Loaded {} products", products.len());

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.runner),
            Arc::clone(&self.reporter),
            self.config.workers(),
        );
        tracing::info!(
            "🚀 Dispatching {} jobs over {} workers",
            products.len(),
            dispatcher.workers()
        );

        let summary = dispatcher.run(products).await;
        tracing::info!(
            "Dispatched {} jobs: {} succeeded, {} failed",
            summary.dispatched,
            summary.succeeded,
            summary.failed
        );

        Ok(summary)
    }
}
