use crate::config::DispatchConfig;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional dispatcher settings file. Every section and key may be omitted;
/// missing values keep the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub products: Option<ProductsConfig>,
    pub pool: Option<PoolConfig>,
    pub command: Option<CommandConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductsConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub override_template: Option<String>,
    pub working_dir: Option<PathBuf>,
}

impl TomlConfig {
    /// Read and parse a settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse settings after replacing `${VAR}` with environment values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    // Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        use regex::{Captures, Regex};
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

        re.replace_all(content, |caps: &Captures<'_>| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Overlay the values present in this file onto `config`.
    pub fn apply(self, mut config: DispatchConfig) -> DispatchConfig {
        if let Some(path) = self.products.and_then(|p| p.path) {
            config.products_path = path;
        }
        if let Some(workers) = self.pool.and_then(|p| p.workers) {
            config.workers = workers;
        }
        if let Some(command) = self.command {
            if let Some(program) = command.program {
                config.command.program = program;
            }
            if let Some(args) = command.args {
                config.command.args = args;
            }
            if let Some(template) = command.override_template {
                config.command.override_template = template;
            }
            if command.working_dir.is_some() {
                config.command.working_dir = command.working_dir;
            }
        }
        config
    }
}
