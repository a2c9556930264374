use thiserror::Error;

/// Recoverable failures around the level assigner: reading graphs, options
/// and writing reports. The assigner itself panics on contract violations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid TOML options: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid YAML options: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
