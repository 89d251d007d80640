//! Error taxonomy for a single weather search.
//!
//! Every [`SearchError`] displays as the exact message shown to the user, so
//! the orchestrator can publish `err.to_string()` without further mapping.

use thiserror::Error;

/// Why a search did not produce a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Please enter a city name")]
    Validation,

    #[error("City not found. Please check the city name.")]
    CityNotFound,

    #[error("API key is invalid")]
    InvalidApiKey,

    #[error("API key exceeded quota or is disabled")]
    QuotaExceeded,

    #[error("Network error: {status_text}")]
    Server { status_text: String },

    #[error("No data received")]
    EmptyResponse,

    #[error("No internet connection. Please check your network.")]
    NoConnection,

    #[error("Request timeout. Please try again.")]
    Timeout,

    #[error("Something went wrong: {message}")]
    Transport { message: String },

    /// The last city could not be stored after a successful lookup.
    #[error("Something went wrong: {message}")]
    Persistence { message: String },
}

/// Broad group a [`SearchError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected before any I/O.
    Validation,
    /// 4xx from the provider.
    Client,
    /// Any other non-2xx status.
    Server,
    /// 2xx without a payload.
    EmptyResponse,
    /// Connectivity, timeout or other I/O fault.
    Transport,
    /// Local storage fault.
    Storage,
}

impl SearchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SearchError::Validation => ErrorCategory::Validation,
            SearchError::CityNotFound | SearchError::InvalidApiKey | SearchError::QuotaExceeded => {
                ErrorCategory::Client
            }
            SearchError::Server { .. } => ErrorCategory::Server,
            SearchError::EmptyResponse => ErrorCategory::EmptyResponse,
            SearchError::NoConnection | SearchError::Timeout | SearchError::Transport { .. } => {
                ErrorCategory::Transport
            }
            SearchError::Persistence { .. } => ErrorCategory::Storage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    UnresolvedHost,
    Timeout,
    Other,
}

/// A request that never produced an HTTP response we could use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub const UNRESOLVED_HOST_MARKER: &'static str = "Unable to resolve host";
    pub const TIMEOUT_MARKER: &'static str = "timeout";

    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// Infer the kind from a free-form failure message.
    ///
    /// The host marker wins over the timeout marker.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = if message.contains(Self::UNRESOLVED_HOST_MARKER) {
            TransportErrorKind::UnresolvedHost
        } else if message.contains(Self::TIMEOUT_MARKER) {
            TransportErrorKind::Timeout
        } else {
            TransportErrorKind::Other
        };
        Self { kind, message }
    }
}

impl From<reqwest::Error> for TransportError {
    /// The request URL carries the API key, so it never reaches the message.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let message = error_chain(&err);

        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() && looks_like_dns_failure(&message) {
            TransportErrorKind::UnresolvedHost
        } else {
            TransportError::from_message(message.as_str()).kind
        };

        Self { kind, message }
    }
}

fn looks_like_dns_failure(chain: &str) -> bool {
    let lower = chain.to_lowercase();
    lower.contains("dns error")
        || lower.contains("failed to lookup address")
        || lower.contains("name or service not known")
        || lower.contains("no such host")
}

/// `err: source: source ...` on one line.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
