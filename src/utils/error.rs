use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Failed to load product list '{path}': {message}")]
    ProductListError { path: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to launch '{program}': {source}")]
    LaunchError {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl DispatchError {
    /// Short message for the console, without source chains.
    pub fn user_friendly_message(&self) -> String {
        match self {
            DispatchError::IoError(e) => format!("File access failed: {}", e),
            DispatchError::SerializationError(e) => format!("Invalid JSON: {}", e),
            DispatchError::TomlError(e) => format!("Invalid configuration file: {}", e),
            DispatchError::ProductListError { path, message } => {
                format!("Could not read product list {}: {}", path, message)
            }
            DispatchError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            DispatchError::LaunchError { program, .. } => {
                format!("Could not start '{}'", program)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DispatchError::IoError(_) => "Check that the file exists and is readable",
            DispatchError::SerializationError(_) | DispatchError::ProductListError { .. } => {
                "The product list must be a JSON array of strings, e.g. [\"IDD60920\"]"
            }
            DispatchError::TomlError(_) => "Check the TOML syntax of the configuration file",
            DispatchError::InvalidConfigValueError { .. } => {
                "Fix the value on the command line, in the environment or in the config file"
            }
            DispatchError::LaunchError { .. } => {
                "Make sure the program is installed and on PATH, or set --program"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
