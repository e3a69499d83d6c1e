//! Request logging middleware.
//!
//! Logs every call that reaches the transport using the `tracing` crate.
//! Cache hits never get here.

use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service, ServiceExt};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, Payload, RequestConfig, Result, ServiceFuture};

/// Layer that adds request logging.
///
/// # Example
///
/// ```ignore
/// use inklink::InkLinkClient;
/// use inklink::middleware::LoggingLayer;
///
/// let client = InkLinkClient::builder()
///     .layer(LoggingLayer::debug())
///     .build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Log level for the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level, including headers and params.
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

impl LoggingLayer {
    /// Create a new logging layer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer that logs at debug level.
    #[must_use]
    pub const fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// Level of this layer.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs requests and their outcome.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Service<RequestConfig> for Logging<S>
where
    S: Service<RequestConfig, Response = Payload, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Payload;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, config: RequestConfig) -> Self::Future {
        let method = config.method();
        let endpoint = config.endpoint().to_string();
        let level = self.level;

        let span = span!(Level::INFO, "inklink_request", %method, %endpoint);

        let inner = self.inner.clone();
        Box::pin(
            async move {
                let start = Instant::now();

                match level {
                    LogLevel::Debug => {
                        debug!(
                            headers = ?config.headers(),
                            params = ?config.params(),
                            credentials = config.include_credentials(),
                            "sending request"
                        );
                    }
                    LogLevel::Info => info!("sending request"),
                }

                let result = inner.oneshot(config).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(payload) => {
                        info!(elapsed_ms, empty = payload.is_empty(), "request completed");
                    }
                    Err(err) if err.status() > 0 => {
                        warn!(
                            status = err.status(),
                            kind = %err.kind(),
                            elapsed_ms,
                            "request failed with HTTP error"
                        );
                    }
                    Err(err) => warn!(error = %err, elapsed_ms, "request failed"),
                }

                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_layer_default() {
        assert_eq!(LoggingLayer::new().level(), LogLevel::Info);
    }

    #[test]
    fn logging_layer_debug() {
        assert_eq!(LoggingLayer::debug().level(), LogLevel::Debug);
    }

    #[tokio::test]
    async fn passes_results_through() {
        let service = tower::service_fn(|config: RequestConfig| async move {
            if config.endpoint() == "/missing" {
                Err(Error::http(404, Payload::Empty))
            } else {
                Ok(Payload::Text(config.endpoint().to_string()))
            }
        });
        let logging = LoggingLayer::debug().layer(service);

        let ok = logging
            .clone()
            .oneshot(RequestConfig::get("/health"))
            .await
            .expect("ok");
        assert_eq!(ok, Payload::Text("/health".to_string()));

        let err = logging
            .oneshot(RequestConfig::get("/missing"))
            .await
            .expect_err("404");
        assert_eq!(err.status(), 404);
    }
}
