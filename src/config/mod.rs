pub mod toml_config;

use crate::core::command::CommandTemplate;
use crate::core::products::DEFAULT_PRODUCT_LIST;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_range, Validate};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use clap::Parser;

pub const MAX_WORKERS: usize = 1024;

/// One worker per available CPU.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "obs-loader")]
#[command(about = "Runs the observation loader once per product, several at a time")]
pub struct CliConfig {
    /// JSON file holding an array of product identifiers
    #[arg(short, long, env = "OBS_PRODUCTS")]
    pub products: Option<PathBuf>,

    /// TOML file with dispatcher settings
    #[arg(short, long, env = "OBS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of jobs run at once [default: available CPUs]
    #[arg(short, long, env = "OBS_WORKERS")]
    pub workers: Option<usize>,

    /// Program launched for every product
    #[arg(long, env = "OBS_PROGRAM")]
    pub program: Option<String>,

    /// Argument placed before the product override; repeat for several
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Last argument of every job; `{product}` is replaced by the identifier
    #[arg(long)]
    pub override_template: Option<String>,

    /// Directory the program is started in
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Print the command of every job without running it
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

/// Fully resolved dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchConfig {
    pub products_path: PathBuf,
    pub workers: usize,
    pub command: CommandTemplate,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            products_path: PathBuf::from(DEFAULT_PRODUCT_LIST),
            workers: default_workers(),
            command: CommandTemplate::default(),
        }
    }
}

impl DispatchConfig {
    /// Defaults, then the TOML file named by `--config`, then flags and
    /// `OBS_*` environment variables.
    #[cfg(feature = "cli")]
    pub fn from_cli(cli: &CliConfig) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = &cli.config {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            config = toml_config::TomlConfig::from_file(path)?.apply(config);
        }

        if let Some(path) = &cli.products {
            config.products_path = path.clone();
        }
        if let Some(workers) = cli.workers {
            config.workers = workers;
        }
        if let Some(program) = &cli.program {
            config.command.program = program.clone();
        }
        if !cli.args.is_empty() {
            config.command.args = cli.args.clone();
        }
        if let Some(template) = &cli.override_template {
            config.command.override_template = template.clone();
        }
        if let Some(dir) = &cli.working_dir {
            config.command.working_dir = Some(dir.clone());
        }

        Ok(config)
    }
}

impl ConfigProvider for DispatchConfig {
    fn products_path(&self) -> &Path {
        &self.products_path
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn command(&self) -> &CommandTemplate {
        &self.command
    }
}

impl Validate for DispatchConfig {
    fn validate(&self) -> Result<()> {
        validate_path("products.path", &self.products_path.to_string_lossy())?;
        validate_range("pool.workers", self.workers, 1, MAX_WORKERS)?;
        self.command.validate()?;
        if let Some(dir) = &self.command.working_dir {
            validate_path("command.working_dir", &dir.to_string_lossy())?;
        }
        Ok(())
    }
}
