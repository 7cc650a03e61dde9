use std::io;

use thiserror::Error;

/// Library-wide error type for codkus operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration issue.
    #[error("{0}")]
    Configuration(String),

    /// Required environment variable is not set.
    #[error("Environment variable {0} is not set")]
    EnvironmentVariableMissing(String),

    /// Task text was empty after trimming.
    #[error("Task description is empty. Provide the requirement to implement.")]
    EmptyTask,

    /// Requested model is not in the supported set.
    #[error("Unknown model '{name}'. Available: {available}")]
    UnknownModel { name: String, available: String },

    /// Completion API call failed (network, auth, rate limit, bad payload).
    #[error("Completion API error: {message}")]
    CompletionApi { message: String, status: Option<u16> },

    /// LLM response did not carry the structure a stage expected.
    #[error("Malformed completion response: expected {expected} ({details})")]
    MalformedResponse { expected: String, details: String },

    /// Prompt template could not be rendered.
    #[error("Failed to render prompt '{template}': {details}")]
    PromptRender { template: String, details: String },

    /// Code runner could not be started or supervised.
    #[error("Runner error: {0}")]
    Runner(String),

    /// Interactive confirmation failed.
    #[error("Confirmation prompt failed: {0}")]
    Confirm(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}
