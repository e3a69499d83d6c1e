//! HTTP transport using hyper-util.
//!
//! [`HyperTransport`] is the innermost service of the client. It joins the
//! endpoint onto the base URL, merges the default `Content-Type` with the
//! caller's headers, attaches session cookies, and normalizes the response
//! into a [`Payload`] or an [`Error`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use inklink_core::{ContentType, Transport};
use tower_service::Service;
use tracing::warn;
use url::Url;

use crate::{ClientConfig, Error, Payload, RequestConfig, Result, ServiceFuture};

// ============================================================================
// Session Cookies
// ============================================================================

/// Session cookies shared by every clone of a transport.
///
/// Cookies are captured from `Set-Cookie` on responses to requests that
/// include credentials, and replayed in a `Cookie` header on later ones.
/// Attributes (`Path`, `Expires`, ...) are ignored; `Max-Age=0` or an empty
/// value removes the cookie.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Arc<Mutex<BTreeMap<String, String>>>,
}

impl CookieJar {
    /// Create an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one `Set-Cookie` header value.
    pub fn store(&self, set_cookie: &str) {
        let mut attributes = set_cookie.split(';').map(str::trim);
        let Some((name, value)) = attributes.next().and_then(|pair| pair.split_once('=')) else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let expired = attributes.any(|attr| attr.eq_ignore_ascii_case("max-age=0"));

        let mut cookies = self.lock();
        if expired || value.is_empty() {
            cookies.remove(name);
        } else {
            cookies.insert(name.to_string(), value.trim().to_string());
        }
    }

    /// Value of a stored cookie.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).cloned()
    }

    /// `Cookie` header value for all stored cookies, if any.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        let cookies = self.lock();
        if cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }

    /// Forget every cookie.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Transport
// ============================================================================

/// HTTP transport with connection pooling, TLS, and session cookies.
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    base_url: Arc<str>,
    timeout: Option<Duration>,
    cookies: CookieJar,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a transport from the client configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(config.connect_timeout));

        Self {
            inner,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            timeout: config.timeout,
            cookies: CookieJar::new(),
        }
    }

    /// Base URL every endpoint is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session cookies of this transport.
    #[must_use]
    pub const fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Absolute URL of a request: base + endpoint + structured params.
    pub fn resolve_url(&self, config: &RequestConfig) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, config.endpoint()))?;
        if !config.params().is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in config.params() {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    fn build_request(&self, mut config: RequestConfig) -> Result<http::Request<Full<Bytes>>> {
        let url = self.resolve_url(&config)?;
        let (body_content_type, body) = config
            .take_body()
            .map_or((None, Bytes::new()), inklink_core::Body::into_parts);

        let mut builder = http::Request::builder()
            .method(http::Method::from(config.method()))
            .uri(url.as_str());

        let has_content_type = config.header(CONTENT_TYPE.as_str()).is_some();
        match body_content_type {
            // multipart: the form's boundary replaces whatever was configured
            Some(content_type) => {
                for (name, value) in config.headers() {
                    if !name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                }
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            None => {
                if !has_content_type {
                    builder = builder.header(CONTENT_TYPE, ContentType::Json.as_str());
                }
                for (name, value) in config.headers() {
                    builder = builder.header(name.as_str(), value.as_str());
                }
            }
        }

        if config.include_credentials() && config.header(COOKIE.as_str()).is_none() {
            if let Some(cookie) = self.cookies.header_value() {
                builder = builder.header(COOKIE, cookie);
            }
        }

        builder
            .body(Full::new(body))
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    async fn execute(&self, config: RequestConfig) -> Result<Payload> {
        let include_credentials = config.include_credentials();
        let endpoint = config.endpoint().to_string();
        let request = self.build_request(config)?;

        let pending = self.inner.request(request);
        let response = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, pending).await.map_err(|_| {
                warn!(%endpoint, ?timeout, "API request timed out");
                Error::network(format!("request timed out after {timeout:?}"))
            })?,
            None => pending.await,
        }
        .map_err(|err| {
            warn!(%endpoint, error = %err, "API request failed");
            Error::network(err.to_string())
        })?;

        let status = response.status();
        if include_credentials {
            for value in response.headers().get_all(SET_COOKIE) {
                if let Ok(value) = value.to_str() {
                    self.cookies.store(value);
                }
            }
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|err| Error::network(err.to_string()))?
            .to_bytes();

        let payload = match Payload::decode(status.as_u16(), content_type.as_deref(), &body) {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => {
                Payload::Text(String::from_utf8_lossy(&body).into_owned())
            }
            Err(err) => return Err(err),
        };

        if status.is_success() {
            Ok(payload)
        } else {
            Err(Error::http(status.as_u16(), payload))
        }
    }
}

impl Transport for HyperTransport {
    async fn send(&self, config: RequestConfig) -> Result<Payload> {
        self.execute(config).await
    }
}

impl Service<RequestConfig> for HyperTransport {
    type Response = Payload;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, config: RequestConfig) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move { transport.execute(config).await })
    }
}

fn https_connector(connect_timeout: Duration) -> HttpsConnector<HttpConnector> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(connect_timeout));

    let root_store: rustls::RootCertStore =
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Form, Method};

    fn transport() -> HyperTransport {
        HyperTransport::new(
            &ClientConfig::builder()
                .base_url("http://localhost:8080/api")
                .build(),
        )
    }

    #[test]
    fn resolve_url_joins_base_and_params() {
        let config = RequestConfig::builder("/stories/search")
            .param("q", "sea & sky")
            .param("page", 0)
            .build();

        let url = transport().resolve_url(&config).expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/stories/search?q=sea+%26+sky&page=0"
        );
    }

    #[test]
    fn default_content_type_is_json() {
        let request = transport()
            .build_request(RequestConfig::get("/tags"))
            .expect("request");
        assert_eq!(
            request.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"application/json"[..])
        );
    }

    #[test]
    fn caller_content_type_wins() {
        let config = RequestConfig::builder("/files/raw")
            .method(Method::Post)
            .header("content-type", "text/plain")
            .body(Bytes::from_static(b"hello"))
            .build();
        let request = transport().build_request(config).expect("request");

        let values: Vec<_> = request.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, ["text/plain"]);
    }

    #[test]
    fn multipart_replaces_content_type() {
        let config = RequestConfig::builder("/users/1/avatar")
            .method(Method::Post)
            .header("Content-Type", "application/json")
            .multipart(Form::with_boundary("edge").file("file", "me.png", vec![1]))
            .build();
        let request = transport().build_request(config).expect("request");

        let values: Vec<_> = request.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, ["multipart/form-data; boundary=edge"]);
    }

    #[test]
    fn cookies_attached_only_with_credentials() {
        let transport = transport();
        transport.cookies().store("JSESSIONID=abc123; Path=/; HttpOnly");

        let request = transport
            .build_request(RequestConfig::get("/auth/me"))
            .expect("request");
        assert_eq!(
            request.headers().get(COOKIE).map(|v| v.as_bytes()),
            Some(&b"JSESSIONID=abc123"[..])
        );

        let anonymous = RequestConfig::builder("/health")
            .include_credentials(false)
            .build();
        let request = transport.build_request(anonymous).expect("request");
        assert!(request.headers().get(COOKIE).is_none());
    }

    #[test]
    fn cookie_jar_store_and_expire() {
        let jar = CookieJar::new();
        jar.store("JSESSIONID=abc; Path=/");
        jar.store("theme=dark");
        assert_eq!(jar.get("JSESSIONID").as_deref(), Some("abc"));
        assert_eq!(jar.header_value().as_deref(), Some("JSESSIONID=abc; theme=dark"));

        jar.store("JSESSIONID=; Max-Age=0; Path=/");
        assert!(jar.get("JSESSIONID").is_none());

        jar.store("garbage");
        jar.clear();
        assert!(jar.header_value().is_none());
    }
}
