pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{toml_config::TomlConfig, DispatchConfig};
pub use core::{
    command::CommandTemplate,
    dispatcher::Dispatcher,
    engine::DispatchEngine,
    products::load_product_list,
    report::{ConsoleReporter, StreamReporter},
    runner::{DryRunRunner, ProcessRunner},
};
pub use domain::model::{DispatchSummary, Job, JobOutcome, JobOutput, JobResult, ProductId};
pub use utils::error::{DispatchError, Result};
