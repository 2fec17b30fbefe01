//! CLI Config

use std::time::Duration;

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub(crate) struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    pub(crate) database_url: Option<String>,
}

impl DatabaseConfig {
    pub(crate) fn url(&self) -> Result<&str, String> {
        self.database_url
            .as_deref()
            .ok_or_else(|| "DATABASE_URL is not set (pass --database-url or add it to .env)".to_string())
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub(crate) log_format: LogFormat,
}

/// Checkout settings.
#[derive(Debug, Args)]
pub(crate) struct CheckoutConfig {
    /// Upper bound on a checkout transaction, in seconds
    #[arg(long, env = "CHECKOUT_TIMEOUT_SECONDS", default_value_t = 10u64, global = true)]
    pub(crate) checkout_timeout_seconds: u64,
}

impl CheckoutConfig {
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.checkout_timeout_seconds)
    }
}
