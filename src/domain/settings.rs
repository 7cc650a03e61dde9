//! Runtime settings merged from defaults and an optional `codkus.toml`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::AppError;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "codkus.toml";

/// Completion endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// OpenAI-compatible chat-completions URL.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum attempts for retryable failures.
    pub max_retries: u32,
    /// Base backoff delay in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_api_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Interpreter subprocess configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Interpreter binary to invoke.
    pub python_bin: String,
    /// Wall-clock limit for one execution, in seconds.
    pub timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { python_bin: default_python_bin(), timeout_secs: default_run_timeout() }
    }
}

/// Bound on the solve loop's execute-and-fix attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixConfig {
    pub max_attempts: u32,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self { max_attempts: default_fix_attempts() }
    }
}

/// Bound on delimiter-repair round trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairConfig {
    pub max_attempts: u32,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self { max_attempts: default_repair_attempts() }
    }
}

/// All runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub api: ApiConfig,
    pub run: RunnerConfig,
    pub fix: FixConfig,
    pub repair: RepairConfig,
}

impl Settings {
    /// Load settings from an explicit path, from `./codkus.toml` when one
    /// exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    AppError::config_error(format!(
                        "Cannot read config file {}: {e}",
                        path.display()
                    ))
                })?;
                Self::from_toml(&text)
            }
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    let text = fs::read_to_string(fallback)?;
                    Self::from_toml(&text)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse settings from TOML text, filling omitted fields with defaults.
    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        let dto: SettingsDto = toml::from_str(text)?;
        Ok(dto.into())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsDto {
    api: Option<ApiConfigDto>,
    run: Option<RunnerConfigDto>,
    fix: Option<FixConfigDto>,
    repair: Option<RepairConfigDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiConfigDto {
    api_url: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunnerConfigDto {
    python_bin: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixConfigDto {
    max_attempts: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RepairConfigDto {
    max_attempts: Option<u32>,
}

impl From<SettingsDto> for Settings {
    fn from(dto: SettingsDto) -> Self {
        let default_api = ApiConfig::default();
        let api = if let Some(d) = dto.api {
            ApiConfig {
                api_url: d.api_url.unwrap_or(default_api.api_url),
                timeout_secs: d.timeout_secs.unwrap_or(default_api.timeout_secs),
                max_retries: d.max_retries.unwrap_or(default_api.max_retries),
                retry_delay_ms: d.retry_delay_ms.unwrap_or(default_api.retry_delay_ms),
            }
        } else {
            default_api
        };

        let default_run = RunnerConfig::default();
        let run = if let Some(d) = dto.run {
            RunnerConfig {
                python_bin: d.python_bin.unwrap_or(default_run.python_bin),
                timeout_secs: d.timeout_secs.unwrap_or(default_run.timeout_secs),
            }
        } else {
            default_run
        };

        let fix = FixConfig {
            max_attempts: dto
                .fix
                .and_then(|d| d.max_attempts)
                .unwrap_or_else(default_fix_attempts),
        };

        let repair = RepairConfig {
            max_attempts: dto
                .repair
                .and_then(|d| d.max_attempts)
                .unwrap_or_else(default_repair_attempts),
        };

        Settings { api, run, fix, repair }
    }
}

fn default_api_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_api_timeout() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_python_bin() -> String {
    "python3".to_string()
}

fn default_run_timeout() -> u64 {
    20
}

fn default_fix_attempts() -> u32 {
    3
}

fn default_repair_attempts() -> u32 {
    2
}
