//! Observability (structured logging)
//!
//! Connector resolution runs once at startup, so logs are the operator's main
//! window into which connectors loaded and why others did not.

use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// One JSON object per event
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub const fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,skyauth=debug"
    } else {
        "info"
    }
}

/// Initialize logging with the build's default format
///
/// # Example
///
/// ```rust,no_run
/// use skyauth::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("resolving connectors");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init() -> anyhow::Result<()> {
    init_with(LogFormat::default())
}

/// Initialize logging with an explicit format
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_with(format: LogFormat) -> anyhow::Result<()> {
    subscriber(format).try_init()?;
    Ok(())
}

/// Env-filtered subscriber writing `format` to stderr
fn subscriber(format: LogFormat) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let output = match format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry().with(output).with(env_filter)
}
