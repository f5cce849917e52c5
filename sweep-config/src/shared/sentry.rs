use serde::{Deserialize, Serialize};

/// Sentry error tracking configuration.
///
/// When present, binaries report pass failures and panics to Sentry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentryConfig {
    /// Sentry DSN (Data Source Name) for error reporting.
    pub dsn: String,
}
