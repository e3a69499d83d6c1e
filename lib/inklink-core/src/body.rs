//! Request bodies and JSON helpers.

use bytes::Bytes;

use crate::{Form, Result};

/// Content types the client sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`), the default for every request.
    Json,
    /// Plain text content type (`text/plain`).
    PlainText,
    /// Binary content type (`application/octet-stream`).
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a [`RequestConfig`](crate::RequestConfig).
#[derive(Debug, Clone)]
pub enum Body {
    /// Raw bytes, sent with whatever `Content-Type` the headers carry.
    Raw(Bytes),
    /// Already-encoded JSON.
    Json(Bytes),
    /// Multipart form data. The transport drops any configured `Content-Type`
    /// and sets one with the form's boundary.
    Multipart(Form),
}

impl Body {
    /// Encode a value as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self> {
        to_json(value).map(Self::Json)
    }

    /// Returns `true` for multipart bodies.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// Consume into an optional content type override and the encoded bytes.
    #[must_use]
    pub fn into_parts(self) -> (Option<String>, Bytes) {
        match self {
            Self::Raw(bytes) | Self::Json(bytes) => (None, bytes),
            Self::Multipart(form) => {
                let (content_type, bytes) = form.into_body();
                (Some(content_type), bytes)
            }
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Raw(bytes)
    }
}

impl From<Form> for Body {
    fn from(form: Form) -> Self {
        Self::Multipart(form)
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use inklink_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Comment { content: String }
///
/// let comment = Comment { content: "Lovely".to_string() };
/// let bytes = to_json(&comment).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"content":"Lovely"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes with path-aware error messages.
///
/// # Errors
///
/// Returns an error if JSON deserialization fails, with the error message
/// including the path to the problematic field (e.g., "author.username").
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
