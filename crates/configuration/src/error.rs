use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config.toml or TRADEBOOK_* overrides: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid value for `{key}`: {reason}")]
    ValidationError { key: &'static str, reason: String },
}
