//! Error types for InkLink API calls.
//!
//! Every failed call surfaces as an [`Error`]. Failures that came back from the
//! server ([`Error::Http`]) and failures to reach it at all ([`Error::Network`])
//! carry a status code, an auxiliary [`Payload`], and the time they were
//! created. [`Error::kind`] classifies an error the way page code reacts to it.

use chrono::{DateTime, Utc};
use derive_more::{Display, Error, From};

use crate::Payload;

/// Message used for every transport-level failure.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error: Unable to connect to the server";

// ============================================================================
// Error Kind
// ============================================================================

/// Classification of an [`Error`], derived from its status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// 401 or 403: the session is missing or invalid.
    #[display("authentication")]
    Authentication,
    /// Status 0: the server could not be reached.
    #[display("network")]
    Network,
    /// 500 and above.
    #[display("server")]
    Server,
    /// 400-499 other than authentication failures.
    #[display("client")]
    Client,
    /// Anything else, including local failures that never hit the network.
    #[display("unknown")]
    Unknown,
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for InkLink API operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with a non-2xx status.
    #[display("{message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Server-provided `message`, or `HTTP {status}: {reason}`.
        message: String,
        /// Parsed response body.
        #[error(not(source))]
        data: Payload,
        /// When the error was created.
        #[error(not(source))]
        timestamp: DateTime<Utc>,
    },

    /// The request never produced a response (DNS, connection, timeout).
    #[display("{message}")]
    #[from(skip)]
    Network {
        /// Generic network failure message.
        message: String,
        /// `{"originalError": "<reason>"}`.
        #[error(not(source))]
        data: Payload,
        /// When the error was created.
        #[error(not(source))]
        timestamp: DateTime<Utc>,
    },

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "data.author.username").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// An interceptor rejected the call.
    #[display("interceptor rejected request: {_0}")]
    #[from(skip)]
    Interceptor(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from a status code and the parsed response body.
    ///
    /// The message is taken from the body's `message` field when present,
    /// otherwise it is `HTTP {status}: {reason}`.
    #[must_use]
    pub fn http(status: u16, data: Payload) -> Self {
        let message = data.message().map_or_else(
            || {
                let reason = http::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|code| code.canonical_reason())
                    .unwrap_or_default();
                format!("HTTP {status}: {reason}")
            },
            str::to_string,
        );
        Self::Http {
            status,
            message,
            data,
            timestamp: Utc::now(),
        }
    }

    /// Create a network error wrapping the underlying failure reason.
    #[must_use]
    pub fn network(reason: impl Into<String>) -> Self {
        let data = Payload::Json(serde_json::json!({ "originalError": reason.into() }));
        Self::Network {
            message: NETWORK_ERROR_MESSAGE.to_string(),
            data,
            timestamp: Utc::now(),
        }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an interceptor rejection.
    #[must_use]
    pub fn interceptor(message: impl Into<String>) -> Self {
        Self::Interceptor(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Status code of the failure: the HTTP status, or 0 when there was no response.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Http { status, .. } => *status,
            _ => 0,
        }
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Http { status, .. } => match *status {
                401 | 403 => ErrorKind::Authentication,
                500.. => ErrorKind::Server,
                400..500 => ErrorKind::Client,
                _ => ErrorKind::Unknown,
            },
            _ => ErrorKind::Unknown,
        }
    }

    /// Returns `true` for 401 and 403 responses.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Authentication)
    }

    /// Returns `true` if the server could not be reached.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns `true` for 5xx responses.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status() >= 500
    }

    /// Returns `true` for 4xx responses, authentication failures included.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        let status = self.status();
        status >= 400 && status < 500
    }

    /// Auxiliary data attached to HTTP and network errors.
    #[must_use]
    pub const fn data(&self) -> Option<&Payload> {
        match self {
            Self::Http { data, .. } | Self::Network { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Creation time of HTTP and network errors.
    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Http { timestamp, .. } | Self::Network { timestamp, .. } => Some(*timestamp),
            _ => None,
        }
    }

    /// Decode the auxiliary data, e.g. a structured validation error body.
    ///
    /// Returns `None` when the error carries no data.
    pub fn decode_data<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.data().map(Payload::json)
    }
}
