use std::env::var;
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used if no log level is set in the environment.
const DEFAULT_LOG_FILTER: &str = "info";

/// Process-wide logging settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `EnvFilter` directives, e.g. `info` or `my_lambda=debug,lamb=info`
    pub log_filter: String,
    pub log_format: LogFormat,
    /// CloudWatch does not render color codes, so this is off unless asked for
    pub ansi: bool,
}

/// Output format of the log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line, the format CloudWatch Logs Insights can query
    #[default]
    Json,
    /// Human readable single line records
    Compact,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log format {0:?}, use json, text or compact")]
    LogFormat(String),
    #[error("invalid value {0:?} for LAMB_LOG_ANSI, use true or false")]
    Ansi(String),
    #[error("invalid log filter {filter:?}: {reason}")]
    LogFilter { filter: String, reason: String },
    #[error("failed to install the tracing subscriber: {0}")]
    Init(String),
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            // AWS_LAMBDA_LOG_FORMAT uses Text for the plain format
            "text" | "compact" => Ok(Self::Compact),
            _ => Err(ConfigError::LogFormat(s.to_owned())),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: LogFormat::default(),
            ansi: false,
        }
    }
}

impl Config {
    /// Creates a new Config instance from the environment variables:
    /// - `LAMB_LOG` or `AWS_LAMBDA_LOG_LEVEL` for the filter, `info` by default
    /// - `LAMB_LOG_FORMAT` or `AWS_LAMBDA_LOG_FORMAT`, `json` by default
    /// - `LAMB_LOG_ANSI`, `false` by default
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| var(name).ok())
    }

    /// Same as `from_env`, but reads the values with `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // lamb specific vars have priority over the ones set by Lambda advanced logging controls
        let log_filter = match lookup("LAMB_LOG") {
            Some(v) => v,
            None => match lookup("AWS_LAMBDA_LOG_LEVEL") {
                Some(v) => lambda_log_level(&v),
                None => DEFAULT_LOG_FILTER.to_owned(),
            },
        };

        let log_format = match lookup("LAMB_LOG_FORMAT").or_else(|| lookup("AWS_LAMBDA_LOG_FORMAT")) {
            Some(v) => v.parse()?,
            None => LogFormat::default(),
        };

        let ansi = match lookup("LAMB_LOG_ANSI") {
            Some(v) => v.trim().parse::<bool>().map_err(|_| ConfigError::Ansi(v))?,
            None => false,
        };

        let config = Self {
            log_filter,
            log_format,
            ansi,
        };

        // fail early rather than when the subscriber is installed
        config.env_filter()?;

        Ok(config)
    }

    pub(crate) fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_new(&self.log_filter).map_err(|e| ConfigError::LogFilter {
            filter: self.log_filter.clone(),
            reason: e.to_string(),
        })
    }
}

/// Lambda log levels are upper case and include FATAL, which tracing does not have.
fn lambda_log_level(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "fatal" => "error".to_owned(),
        v => v.to_owned(),
    }
}
