//! Per-call request configuration.
//!
//! A [`RequestConfig`] names an endpoint relative to the API base path, the
//! method, headers, structured query parameters, an optional [`Body`], and
//! whether session cookies go along. Interceptors receive and return it.
//!
//! # Example
//!
//! ```
//! use inklink_core::{Method, RequestConfig};
//!
//! let config = RequestConfig::builder("/stories/search")
//!     .param("q", "dragons")
//!     .param("page", "0")
//!     .build();
//!
//! assert_eq!(config.method(), Method::Get);
//! assert_eq!(config.params().len(), 2);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use crate::{Body, Form, Method};

/// One API call, before it reaches the transport.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    endpoint: String,
    method: Method,
    headers: HashMap<String, String>,
    params: Vec<(String, String)>,
    body: Option<Body>,
    include_credentials: bool,
    cache_ttl: Option<Duration>,
}

impl RequestConfig {
    /// Creates a new [`RequestConfigBuilder`] for a GET on `endpoint`.
    #[must_use]
    pub fn builder(endpoint: impl Into<String>) -> RequestConfigBuilder {
        RequestConfigBuilder::new(endpoint)
    }

    /// GET `endpoint` with no parameters.
    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::builder(endpoint).build()
    }

    /// Endpoint path relative to the API base, e.g. `/stories/42`.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Replace the endpoint.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Caller-supplied headers. Defaults are merged in by the transport.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Mutable access to headers.
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    /// Single header value, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Structured query parameters, in insertion order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Whether session cookies are attached.
    #[must_use]
    pub const fn include_credentials(&self) -> bool {
        self.include_credentials
    }

    /// Force session cookies on or off.
    pub fn set_include_credentials(&mut self, include: bool) {
        self.include_credentials = include;
    }

    /// Per-call cache TTL, overriding the cache default.
    #[must_use]
    pub const fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl
    }

    /// Take the body out of the config.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }
}

/// Builder for [`RequestConfig`].
#[derive(Debug, Clone)]
pub struct RequestConfigBuilder {
    config: RequestConfig,
}

impl RequestConfigBuilder {
    /// Creates a new builder for a GET on `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            config: RequestConfig {
                endpoint: endpoint.into(),
                method: Method::Get,
                headers: HashMap::new(),
                params: Vec::new(),
                body: None,
                include_credentials: true,
                cache_ttl: None,
            },
        }
    }

    /// Sets the method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.config.method = method;
        self
    }

    /// Sets a header, replacing any existing one with the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.config.params.push((name.into(), value.to_string()));
        self
    }

    /// Appends multiple query parameters.
    #[must_use]
    pub fn params(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.config.params.extend(pairs);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.config.body = Some(body.into());
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> crate::Result<Self> {
        self.config.body = Some(Body::json(value)?);
        Ok(self)
    }

    /// Sets a multipart body.
    #[must_use]
    pub fn multipart(self, form: Form) -> Self {
        self.body(form)
    }

    /// Whether session cookies are attached (on by default).
    #[must_use]
    pub fn include_credentials(mut self, include: bool) -> Self {
        self.config.include_credentials = include;
        self
    }

    /// Cache TTL for this call, when it is a cacheable GET.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = Some(ttl);
        self
    }

    /// Builds the [`RequestConfig`].
    #[must_use]
    pub fn build(self) -> RequestConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = RequestConfig::get("/auth/me");

        assert_eq!(config.endpoint(), "/auth/me");
        assert_eq!(config.method(), Method::Get);
        assert!(config.headers().is_empty());
        assert!(config.params().is_empty());
        assert!(config.body().is_none());
        assert!(config.include_credentials());
        assert!(config.cache_ttl().is_none());
    }

    #[test]
    fn builder_params_keep_order() {
        let config = RequestConfig::builder("/stories")
            .param("page", 0)
            .param("size", 12)
            .param("sort", "createdAt,desc")
            .build();

        let names: Vec<_> = config.params().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["page", "size", "sort"]);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let config = RequestConfig::builder("/tags")
            .header("X-Trace", "abc")
            .build();

        assert_eq!(config.header("x-trace"), Some("abc"));
        assert_eq!(config.header("missing"), None);
    }

    #[test]
    fn json_body() {
        let config = RequestConfig::builder("/stories/1/comments")
            .method(Method::Post)
            .json(&serde_json::json!({"content": "Great read"}))
            .expect("json")
            .build();

        assert_eq!(config.method(), Method::Post);
        assert!(matches!(config.body(), Some(Body::Json(_))));
    }

    #[test]
    fn multipart_body() {
        let mut config = RequestConfig::builder("/users/3/avatar")
            .method(Method::Post)
            .multipart(Form::new().file("file", "me.png", vec![1, 2]))
            .build();

        assert!(config.body().is_some_and(Body::is_multipart));
        assert!(config.take_body().is_some());
        assert!(config.body().is_none());
    }

    #[test]
    fn cache_ttl_override() {
        let config = RequestConfig::builder("/tags/popular")
            .cache_ttl(Duration::from_secs(30))
            .build();
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(30)));
    }
}
