use clap::Parser;
use obs_loader::core::{ConfigProvider, JobRunner};
use obs_loader::utils::{logger, validation::Validate};
use obs_loader::{
    CliConfig, ConsoleReporter, DispatchConfig, DispatchEngine, DispatchError, DispatchSummary,
    DryRunRunner, ProcessRunner,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting obs-loader");

    let config = match DispatchConfig::from_cli(&cli).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => exit_on_startup_error(&e),
    };

    display_config_summary(&config, cli.dry_run);
    tracing::debug!("Resolved config: {}", serde_json::to_string(&config)?);

    let result = if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no process will be started");
        let runner = DryRunRunner::new(config.command().clone());
        dispatch(config, runner).await
    } else {
        let runner = ProcessRunner::new(config.command().clone());
        dispatch(config, runner).await
    };

    match result {
        Ok(summary) => {
            if summary.failed > 0 {
                tracing::warn!(
                    "{} of {} jobs failed, see their output above",
                    summary.failed,
                    summary.dispatched
                );
            } else {
                tracing::info!("✅ All {} jobs completed", summary.dispatched);
            }
        }
        Err(e) => exit_on_startup_error(&e),
    }

    Ok(())
}

async fn dispatch<R: JobRunner>(
    config: DispatchConfig,
    runner: R,
) -> obs_loader::Result<DispatchSummary> {
    let reporter = Arc::new(ConsoleReporter::stdout());
    DispatchEngine::new(config, Arc::new(runner), reporter)
        .run()
        .await
}

fn display_config_summary(config: &DispatchConfig, dry_run: bool) {
    tracing::info!("📋 Configuration:");
    tracing::info!("   Products: {}", config.products_path.display());
    tracing::info!("   Workers: {}", config.workers);
    tracing::info!("   Program: {}", config.command.program);
    tracing::info!("   Override: {}", config.command.override_template);
    if let Some(dir) = &config.command.working_dir {
        tracing::info!("   Working dir: {}", dir.display());
    }
    if dry_run {
        tracing::info!("   Dry run: yes");
    }
}

// Startup failures stop the run before any job is launched.
fn exit_on_startup_error(e: &DispatchError) -> ! {
    tracing::error!("❌ Startup failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}
