use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A pass must be given some time to run.
    #[error("`pass.timeout_secs` cannot be zero")]
    TimeoutZero,
    /// The pod cleanup would never match anything.
    #[error("`terminal_phases` and `terminal_reasons` cannot both be empty")]
    NoTerminalStates,
    /// The label to apply is not a valid Kubernetes label.
    #[error("invalid label `{key}={value}`: {reason}")]
    InvalidLabel {
        key: String,
        value: String,
        reason: &'static str,
    },
    /// The scope namespace was configured as an empty string.
    #[error("`namespace` cannot be empty when set")]
    EmptyNamespace,
}
