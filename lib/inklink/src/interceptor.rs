//! Interceptor pipeline.
//!
//! Interceptors are async transforms applied at a fixed phase of every call
//! that misses the cache:
//!
//! 1. request interceptors map the [`RequestConfig`], in registration order
//! 2. the inner service sends it
//! 3. response interceptors map the [`Payload`], in registration order
//! 4. on failure (including a failing response interceptor) error
//!    interceptors map the [`Error`], in registration order, and the final
//!    error is returned
//!
//! Each interceptor receives the previous one's output. A failing request
//! interceptor aborts the call before anything is sent and skips the error
//! interceptors.
//!
//! # Example
//!
//! ```ignore
//! use inklink::{InkLinkClient, Interceptor, RequestConfig};
//!
//! let client = InkLinkClient::builder()
//!     .add_request_interceptor(|mut config: RequestConfig| async move {
//!         config.headers_mut().insert("X-Client".into(), "inklink".into());
//!         Ok(config)
//!     })
//!     .build();
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::{Layer, Service, ServiceExt};

use crate::{Error, Payload, RequestConfig, Result, ServiceFuture};

/// Boxed future returned by interceptors.
pub type InterceptorFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Transforms a request before it is sent.
pub trait RequestInterceptor: Send + Sync {
    /// Map the config. An error aborts the call.
    fn intercept(&self, config: RequestConfig) -> InterceptorFuture<Result<RequestConfig>>;
}

/// Transforms a successful response.
pub trait ResponseInterceptor: Send + Sync {
    /// Map the payload. An error is routed through the error interceptors.
    fn intercept(&self, payload: Payload) -> InterceptorFuture<Result<Payload>>;
}

/// Transforms an error before it reaches the caller.
pub trait ErrorInterceptor: Send + Sync {
    /// Map the error. The result is always returned as an error.
    fn intercept(&self, error: Error) -> InterceptorFuture<Error>;
}

impl<F, Fut> RequestInterceptor for F
where
    F: Fn(RequestConfig) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RequestConfig>> + Send + 'static,
{
    fn intercept(&self, config: RequestConfig) -> InterceptorFuture<Result<RequestConfig>> {
        Box::pin(self(config))
    }
}

impl<F, Fut> ResponseInterceptor for F
where
    F: Fn(Payload) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Payload>> + Send + 'static,
{
    fn intercept(&self, payload: Payload) -> InterceptorFuture<Result<Payload>> {
        Box::pin(self(payload))
    }
}

impl<F, Fut> ErrorInterceptor for F
where
    F: Fn(Error) -> Fut + Send + Sync,
    Fut: Future<Output = Error> + Send + 'static,
{
    fn intercept(&self, error: Error) -> InterceptorFuture<Error> {
        Box::pin(self(error))
    }
}

/// An interceptor tagged with the phase it runs in.
#[derive(Clone)]
pub enum Interceptor {
    /// Runs before the request is sent.
    Request(Arc<dyn RequestInterceptor>),
    /// Runs on successful responses.
    Response(Arc<dyn ResponseInterceptor>),
    /// Runs on failures.
    Error(Arc<dyn ErrorInterceptor>),
}

impl Interceptor {
    /// Tag a request interceptor.
    pub fn request(interceptor: impl RequestInterceptor + 'static) -> Self {
        Self::Request(Arc::new(interceptor))
    }

    /// Tag a response interceptor.
    pub fn response(interceptor: impl ResponseInterceptor + 'static) -> Self {
        Self::Response(Arc::new(interceptor))
    }

    /// Tag an error interceptor.
    pub fn error(interceptor: impl ErrorInterceptor + 'static) -> Self {
        Self::Error(Arc::new(interceptor))
    }

    /// Phase name, for diagnostics.
    #[must_use]
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Response(_) => "response",
            Self::Error(_) => "error",
        }
    }
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Interceptor").field(&self.phase()).finish()
    }
}

/// Request interceptor and response interceptor that change nothing.
///
/// Installed by default as the extension points for header injection and
/// response transforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl RequestInterceptor for PassThrough {
    fn intercept(&self, config: RequestConfig) -> InterceptorFuture<Result<RequestConfig>> {
        Box::pin(async move { Ok(config) })
    }
}

impl ResponseInterceptor for PassThrough {
    fn intercept(&self, payload: Payload) -> InterceptorFuture<Result<Payload>> {
        Box::pin(async move { Ok(payload) })
    }
}

/// Ordered interceptor sequences, one per phase.
#[derive(Clone, Default)]
pub struct Interceptors {
    request: Vec<Arc<dyn RequestInterceptor>>,
    response: Vec<Arc<dyn ResponseInterceptor>>,
    error: Vec<Arc<dyn ErrorInterceptor>>,
}

impl std::fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptors")
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .field("error", &self.error.len())
            .finish()
    }
}

impl Interceptors {
    /// Empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor to the sequence of its phase.
    pub fn add(&mut self, interceptor: Interceptor) {
        match interceptor {
            Interceptor::Request(interceptor) => self.request.push(interceptor),
            Interceptor::Response(interceptor) => self.response.push(interceptor),
            Interceptor::Error(interceptor) => self.error.push(interceptor),
        }
    }

    /// Append a request interceptor.
    pub fn add_request(&mut self, interceptor: impl RequestInterceptor + 'static) {
        self.add(Interceptor::request(interceptor));
    }

    /// Append a response interceptor.
    pub fn add_response(&mut self, interceptor: impl ResponseInterceptor + 'static) {
        self.add(Interceptor::response(interceptor));
    }

    /// Append an error interceptor.
    pub fn add_error(&mut self, interceptor: impl ErrorInterceptor + 'static) {
        self.add(Interceptor::error(interceptor));
    }

    /// Append every interceptor of `other`, phase by phase, keeping order.
    pub fn extend(&mut self, other: Self) {
        self.request.extend(other.request);
        self.response.extend(other.response);
        self.error.extend(other.error);
    }

    /// Number of interceptors per phase: (request, response, error).
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.request.len(), self.response.len(), self.error.len())
    }

    /// Run the request interceptors in order.
    ///
    /// # Errors
    ///
    /// Returns the first interceptor error; later interceptors do not run.
    pub async fn apply_request(&self, mut config: RequestConfig) -> Result<RequestConfig> {
        for interceptor in &self.request {
            config = interceptor.intercept(config).await?;
        }
        Ok(config)
    }

    /// Run the response interceptors in order.
    ///
    /// # Errors
    ///
    /// Returns the first interceptor error; later interceptors do not run.
    pub async fn apply_response(&self, mut payload: Payload) -> Result<Payload> {
        for interceptor in &self.response {
            payload = interceptor.intercept(payload).await?;
        }
        Ok(payload)
    }

    /// Run the error interceptors in order.
    pub async fn apply_error(&self, mut error: Error) -> Error {
        for interceptor in &self.error {
            error = interceptor.intercept(error).await;
        }
        error
    }
}

/// Layer that runs an [`Interceptors`] pipeline around the inner service.
#[derive(Debug, Clone, Default)]
pub struct InterceptorLayer {
    interceptors: Arc<Interceptors>,
}

impl InterceptorLayer {
    /// Create a layer from a registered pipeline.
    #[must_use]
    pub fn new(interceptors: Interceptors) -> Self {
        Self {
            interceptors: Arc::new(interceptors),
        }
    }
}

impl<S> Layer<S> for InterceptorLayer {
    type Service = Intercepted<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Intercepted {
            inner,
            interceptors: Arc::clone(&self.interceptors),
        }
    }
}

/// Service produced by [`InterceptorLayer`].
#[derive(Debug, Clone)]
pub struct Intercepted<S> {
    inner: S,
    interceptors: Arc<Interceptors>,
}

impl<S> Service<RequestConfig> for Intercepted<S>
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
        let interceptors = Arc::clone(&self.interceptors);
        let inner = self.inner.clone();

        Box::pin(async move {
            let config = interceptors.apply_request(config).await?;

            let outcome = match inner.oneshot(config).await {
                Ok(payload) => interceptors.apply_response(payload).await,
                Err(err) => Err(err),
            };

            match outcome {
                Ok(payload) => Ok(payload),
                Err(err) => Err(interceptors.apply_error(err).await),
            }
        })
    }
}
