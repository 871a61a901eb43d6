use crate::config::{Config, ConfigError, LogFormat};

/// Installs the process-wide tracing subscriber. Call once at startup, before the runtime starts.
///
/// Timestamps are omitted because CloudWatch adds its own.
/// Dispatchers created with `with_logger` keep using their own subscriber.
pub fn init_tracing(config: &Config) -> Result<(), ConfigError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter()?)
        .with_ansi(config.ansi)
        .with_target(false)
        .without_time();

    let result = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    result.map_err(|e| ConfigError::Init(e.to_string()))
}
