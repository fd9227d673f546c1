use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Classification of a single provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrl,
    Timeout,
    Cancelled,
    NetworkError,
    BodyReadError,
    ParseError,
    UnknownProvider,
    UpstreamStatus,
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::BodyReadError => "body_read_error",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::UnknownProvider => "unknown_provider",
            ErrorKind::UpstreamStatus => "upstream_status",
            ErrorKind::NotFound => "not_found",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of one fetcher invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{provider} ({kind}): {message}")]
pub struct FetchError {
    pub provider: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(provider: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CepError {
    #[error("request timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Provider failed: {0}")]
    Provider(#[from] FetchError),

    #[error("All {} providers failed: {}", .0.len(), join_failures(.0))]
    AllProvidersFailed(Vec<FetchError>),

    #[error("No providers configured")]
    NoProviders,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

fn join_failures(failures: &[FetchError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CepError {
    /// Short machine-readable label, used by the JSON presenter.
    pub fn kind_label(&self) -> &'static str {
        match self {
            CepError::Timeout(_) => "timeout",
            CepError::Provider(e) => e.kind.as_str(),
            CepError::AllProvidersFailed(_) => "all_providers_failed",
            CepError::NoProviders => "no_providers",
            CepError::ConfigError { .. }
            | CepError::InvalidConfigValueError { .. }
            | CepError::MissingConfigError { .. } => "config",
            CepError::IoError(_) => "io",
            CepError::SerializationError(_) => "serialization",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CepError::Timeout(_))
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CepError::Timeout(_) => "request timeout".to_string(),
            CepError::Provider(e) => format!("Error: {}", e),
            CepError::AllProvidersFailed(failures) => {
                format!("Error: no provider could resolve the postal code ({})", join_failures(failures))
            }
            other => format!("Error: {}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CepError::Timeout(_) => "Raise --timeout-ms or check network connectivity",
            CepError::Provider(e) => match e.kind {
                ErrorKind::NotFound => "Check that the postal code exists",
                ErrorKind::InvalidUrl | ErrorKind::UnknownProvider => {
                    "Check the provider endpoints in the configuration"
                }
                _ => "Retry later or configure additional providers",
            },
            CepError::AllProvidersFailed(failures)
                if failures.iter().all(|e| e.kind == ErrorKind::NotFound) =>
            {
                "Check that the postal code exists"
            }
            CepError::AllProvidersFailed(_) => "Retry later or configure additional providers",
            CepError::NoProviders => "Add at least one [[providers]] entry",
            CepError::ConfigError { .. }
            | CepError::InvalidConfigValueError { .. }
            | CepError::MissingConfigError { .. } => "Fix the configuration file or CLI flags",
            CepError::IoError(_) => "Check file paths and permissions",
            CepError::SerializationError(_) => "Report this as a bug",
        }
    }
}

pub type Result<T> = std::result::Result<T, CepError>;
