use crate::domain::model::ProductId;
use crate::utils::error::Result;
use crate::utils::validation::{validate_contains, validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const PRODUCT_PLACEHOLDER: &str = "{product}";

pub const DEFAULT_PROGRAM: &str = "dotnet";
pub const DEFAULT_ARGS: [&str; 2] = ["run", "Logging:LogLevel:Default=Debug"];
pub const DEFAULT_OVERRIDE_TEMPLATE: &str = "observations:ObservationService:Product={product}";

/// The fixed part of every job's command line.
///
/// A job runs `program`, then `args`, then `override_template` with the
/// product identifier substituted for `{product}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
    pub override_template: String,
    pub working_dir: Option<PathBuf>,
}

impl Default for CommandTemplate {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: DEFAULT_ARGS.iter().map(|arg| arg.to_string()).collect(),
            override_template: DEFAULT_OVERRIDE_TEMPLATE.to_string(),
            working_dir: None,
        }
    }
}

impl CommandTemplate {
    pub fn render_override(&self, product: &ProductId) -> String {
        self.override_template
            .replace(PRODUCT_PLACEHOLDER, product.as_str())
    }

    /// Arguments for `product`, program excluded.
    pub fn render(&self, product: &ProductId) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(self.render_override(product));
        args
    }

    /// Shell-like rendering used for logs and dry runs.
    pub fn display_line(&self, product: &ProductId) -> String {
        std::iter::once(self.program.clone())
            .chain(self.render(product))
            .map(|part| quote_if_needed(&part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_if_needed(part: &str) -> String {
    if part.is_empty() || part.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
        format!("{:?}", part)
    } else {
        part.to_string()
    }
}

impl Validate for CommandTemplate {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("command.program", &self.program)?;
        validate_contains(
            "command.override_template",
            &self.override_template,
            PRODUCT_PLACEHOLDER,
        )?;
        Ok(())
    }
}
