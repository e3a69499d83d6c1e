//! Normalized responses.
//!
//! The transport turns every successful HTTP response into a [`Payload`]:
//! JSON bodies are parsed, `204 No Content` becomes [`Payload::Empty`], and
//! anything else is kept as text.
//!
//! The backend wraps most (not all) answers in an [`Envelope`]
//! `{ success, message, data }`. [`Payload::into_data`] is the one place that
//! decides whether to unwrap it, and [`Page`] accepts both a raw array and a
//! paged object `{ content, totalPages }`.
//!
//! # Example
//!
//! ```ignore
//! let page: Page<StoryResponse> = client.stories().list(None).await?.into_data()?;
//! ```

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

// ============================================================================
// Payload
// ============================================================================

/// Body of a response after content-type normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    /// No content (HTTP 204, or an empty JSON body).
    #[default]
    Empty,
    /// Parsed `application/json` body.
    Json(Value),
    /// Any other body, decoded as UTF-8 (lossy).
    Text(String),
}

impl Payload {
    /// Normalize a raw response body.
    ///
    /// A JSON content type with a blank body gives [`Payload::Empty`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonDeserialization`] if the body is declared as JSON
    /// but does not parse. That error has status 0 and kind `unknown`; it is
    /// not a network error.
    pub fn decode(status: u16, content_type: Option<&str>, body: &[u8]) -> Result<Self> {
        let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));

        if status == 204 || (is_json && body.iter().all(u8::is_ascii_whitespace)) {
            return Ok(Self::Empty);
        }
        if is_json {
            return crate::from_json(body).map(Self::Json);
        }
        Ok(Self::Text(String::from_utf8_lossy(body).into_owned()))
    }

    /// Returns `true` for [`Payload::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The JSON value, if this is a JSON payload.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The text, if this is a text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The `message` field of a JSON object payload.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.as_json()?.get("message")?.as_str()
    }

    /// Decode the whole payload, without envelope unwrapping.
    ///
    /// Text decodes as a JSON string and [`Payload::Empty`] as `null`.
    ///
    /// # Errors
    ///
    /// Returns an error with the failing JSON path if decoding fails.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Self::Json(value) => from_value(value),
            Self::Text(text) => from_value(&Value::String(text.clone())),
            Self::Empty => from_value(&Value::Null),
        }
    }

    /// Decode the payload, unwrapping an [`Envelope`] first when present.
    ///
    /// An object counts as an envelope when it has a boolean `success` key and
    /// a `data` key. Anything else is decoded as-is.
    ///
    /// # Errors
    ///
    /// Returns an error with the failing JSON path if decoding fails.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Json(value) => from_value(&unwrap_envelope(value)),
            other => other.json(),
        }
    }

    /// Decode the payload as an [`Envelope`].
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not an envelope object.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<Envelope<T>> {
        self.json()
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.get("success").is_some_and(Value::is_boolean) && map.contains_key("data") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    serde_path_to_error::deserialize(value)
        .map_err(|e| Error::json_deserialization(e.path().to_string(), e.inner().to_string()))
}

// ============================================================================
// Envelope & Page
// ============================================================================

/// The backend's response wrapper.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome.
    #[serde(default)]
    pub message: Option<String>,
    /// Wrapped payload.
    #[serde(default)]
    pub data: Option<T>,
    /// Error detail on failure.
    #[serde(default)]
    pub error: Option<String>,
    /// Server time in epoch milliseconds.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// A page of results.
///
/// Deserializes from either a raw JSON array (one page holding everything)
/// or a paged object `{ content, totalPages, totalElements, number }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "PageRepr<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Items on this page.
    pub content: Vec<T>,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of items, when the server reports it.
    pub total_elements: Option<u64>,
    /// Zero-based page index.
    pub number: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Items(Vec<T>),
    #[serde(rename_all = "camelCase")]
    Paged {
        content: Vec<T>,
        #[serde(default)]
        total_pages: Option<u32>,
        #[serde(default)]
        total_elements: Option<u64>,
        #[serde(default)]
        number: Option<u32>,
    },
}

impl<T> From<PageRepr<T>> for Page<T> {
    fn from(repr: PageRepr<T>) -> Self {
        match repr {
            PageRepr::Items(content) => Self {
                content,
                total_pages: 1,
                total_elements: None,
                number: 0,
            },
            PageRepr::Paged {
                content,
                total_pages,
                total_elements,
                number,
            } => Self {
                content,
                total_pages: total_pages.unwrap_or(1),
                total_elements,
                number: number.unwrap_or(0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn decode_json_body() {
        let payload = Payload::decode(200, Some("application/json;charset=UTF-8"), br#"{"id":1}"#)
            .expect("json");
        check!(payload == Payload::Json(json!({"id": 1})));
    }

    #[test]
    fn decode_no_content() {
        let payload = Payload::decode(204, None, b"").expect("empty");
        check!(payload.is_empty());

        let payload = Payload::decode(200, Some("application/json"), b"").expect("empty json");
        check!(payload.is_empty());
    }

    #[test]
    fn decode_text_body() {
        let payload = Payload::decode(200, Some("text/plain"), b"OK").expect("text");
        check!(payload.as_text() == Some("OK"));

        let payload = Payload::decode(500, None, b"boom").expect("text");
        check!(payload == Payload::Text("boom".to_string()));
    }

    #[test]
    fn decode_broken_json_fails() {
        let result = Payload::decode(200, Some("application/json"), b"{not json");
        let_assert!(Err(err @ Error::JsonDeserialization { .. }) = result);
        check!(err.status() == 0);
        check!(err.kind() == ErrorKind::Unknown);
        check!(!err.is_network_error());
    }

    #[test]
    fn envelope_data_without_default() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Author {
            username: String,
        }

        let payload = Payload::Json(json!({"success": true, "data": {"username": "ada"}}));
        let envelope: Envelope<Author> = payload.envelope().expect("envelope");
        check!(envelope.success);
        check!(envelope.data == Some(Author { username: "ada".to_string() }));
        check!(envelope.message.is_none());
    }

    #[test]
    fn into_data_unwraps_envelope() {
        let payload = Payload::Json(json!({
            "success": true,
            "message": "ok",
            "data": [1, 2, 3]
        }));
        let data: Vec<u32> = payload.into_data().expect("data");
        check!(data == vec![1, 2, 3]);
    }

    #[test]
    fn into_data_keeps_raw_values() {
        let payload = Payload::Json(json!([4, 5]));
        let data: Vec<u32> = payload.into_data().expect("data");
        check!(data == vec![4, 5]);

        // `success` without `data` is not an envelope
        let payload = Payload::Json(json!({"success": true, "message": "signed out"}));
        let value: Value = payload.into_data().expect("value");
        check!(value["message"] == "signed out");
    }

    #[test]
    fn into_data_reports_path() {
        #[derive(Debug, Deserialize)]
        struct Story {
            #[allow(dead_code)]
            title: String,
        }

        let payload = Payload::Json(json!({"success": true, "data": {"title": 42}}));
        let_assert!(Err(Error::JsonDeserialization { path, .. }) = payload.into_data::<Story>());
        check!(path == "title");
    }

    #[test]
    fn envelope_fields() {
        let payload = Payload::Json(json!({
            "success": false,
            "message": "Login failed",
            "error": "bad credentials",
            "timestamp": 1_700_000_000_000_i64
        }));
        let envelope: Envelope<Value> = payload.envelope().expect("envelope");
        check!(!envelope.success);
        check!(envelope.message.as_deref() == Some("Login failed"));
        check!(envelope.error.as_deref() == Some("bad credentials"));
        check!(envelope.data.is_none());
        check!(payload.message() == Some("Login failed"));
    }

    #[test]
    fn page_from_raw_array() {
        let page: Page<u32> = serde_json::from_value(json!([1, 2])).expect("page");
        check!(page.content == vec![1, 2]);
        check!(page.total_pages == 1);
        check!(page.number == 0);
    }

    #[test]
    fn page_from_paged_object() {
        let page: Page<String> = serde_json::from_value(json!({
            "content": ["a", "b"],
            "totalPages": 7,
            "totalElements": 70,
            "number": 2
        }))
        .expect("page");
        check!(page.content == vec!["a".to_string(), "b".to_string()]);
        check!(page.total_pages == 7);
        check!(page.total_elements == Some(70));
        check!(page.number == 2);
    }
}
