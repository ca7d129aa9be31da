pub mod redactor;
pub mod config;

pub use redactor::*;
pub use config::*;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Operator logging with credential redaction
///
/// The operator logs secret names, fetch failures and SQL issued against the
/// database. None of these may carry the secret material itself: TLS private
/// keys, certificates and superuser passwords are scrubbed by
/// [`CredentialRedactor`] before text reaches a log line.
///
/// # Example
///
/// ```rust,no_run
/// use logger_redacted::{init_tracing, redact, LoggerConfig};
///
/// init_tracing(&LoggerConfig::default()).unwrap();
///
/// let err = "vsql failed: ALTER USER dbadmin IDENTIFIED BY 'hunter2'";
/// tracing::warn!(error = %redact(err), "Superuser password update failed");
/// // error="vsql failed: ALTER USER dbadmin IDENTIFIED BY '[REDACTED]'"
/// ```
#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`.
///
/// # Errors
///
/// Fails if the configured filter does not parse or a global subscriber is
/// already installed.
pub fn init_tracing(config: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }

    Ok(())
}
