//! The composed InkLink client.
//!
//! [`InkLinkClient`] is a boxed tower service stack:
//!
//! ```text
//! CacheLayer -> InterceptorLayer -> extra layers -> transport
//! ```
//!
//! The cache answers repeated GETs on its own; everything else runs the
//! interceptor pipeline and reaches the transport ([`HyperTransport`] unless
//! one is injected through the builder).

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use serde::Serialize;
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::api::{Analytics, Auth, Batch, Comments, Files, Likes, Stories, System, Tags, Users};
use crate::cache::{CacheLayer, ResponseCache};
use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::interceptor::{
    ErrorInterceptor, Interceptor, InterceptorLayer, Interceptors, PassThrough,
    RequestInterceptor, ResponseInterceptor,
};
use crate::middleware::LoggingLayer;
use crate::session::{AuthRedirect, IdentityStore, MemoryIdentityStore, MemoryNavigator, Navigator, Session};
use crate::transport::HyperTransport;
use crate::{Error, Form, Method, Payload, RequestConfig, Result, Transport};

// ============================================================================
// Type-Erased Service for Layer Composition
// ============================================================================

/// Type-erased service every layer wraps.
pub type BoxedService = BoxCloneService<RequestConfig, Payload, Error>;

/// Future type of the services in the stack.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Payload>> + Send + 'static>>;

/// Makes a [`BoxedService`] shareable across threads.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, config: RequestConfig) -> ServiceFuture {
        // clone out of the lock, never hold it across the call
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(config).await })
    }
}

/// Adapts a [`Transport`] into the innermost service.
struct TransportService<T> {
    transport: Arc<T>,
}

impl<T> Clone for TransportService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> Service<RequestConfig> for TransportService<T>
where
    T: Transport + 'static,
{
    type Response = Payload;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, config: RequestConfig) -> Self::Future {
        let transport = Arc::clone(&self.transport);
        Box::pin(async move { transport.send(config).await })
    }
}

// ============================================================================
// Public Client
// ============================================================================

/// InkLink API client with interceptors and a response cache.
///
/// Cloning is cheap; clones share the cache, the session store, and the
/// transport's connection pool and cookies.
///
/// # Example
///
/// ```ignore
/// use inklink::InkLinkClient;
/// use inklink::api::SignInRequest;
///
/// let client = InkLinkClient::builder()
///     .base_url("https://inklink.example/api")
///     .with_logging()
///     .build();
///
/// client.auth().login(&SignInRequest { username: "ada".into(), password: "...".into() }).await?;
/// let stories = client.stories().list(None).await?;
/// ```
#[derive(Clone)]
pub struct InkLinkClient {
    service: SyncService,
    cache: Arc<ResponseCache>,
    session: Session,
    config: ClientConfig,
}

impl std::fmt::Debug for InkLinkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InkLinkClient")
            .field("config", &self.config)
            .field("cache_entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl Default for InkLinkClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InkLinkClient {
    /// Client with default configuration and default interceptors.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> InkLinkClientBuilder {
        InkLinkClientBuilder::default()
    }

    /// Configuration the client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Local identity state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Response cache.
    #[must_use]
    pub const fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Run one call through the whole stack.
    pub async fn request(&self, config: RequestConfig) -> Result<Payload> {
        self.service.call(config).await
    }

    /// `GET endpoint`.
    pub async fn get(&self, endpoint: impl Into<String>) -> Result<Payload> {
        self.request(RequestConfig::get(endpoint)).await
    }

    /// `GET endpoint` with query params.
    pub async fn get_with_params<I, K, V>(
        &self,
        endpoint: impl Into<String>,
        params: I,
    ) -> Result<Payload>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let config = params
            .into_iter()
            .fold(RequestConfig::builder(endpoint), |builder, (name, value)| {
                builder.param(name, value)
            })
            .build();
        self.request(config).await
    }

    /// `POST endpoint` without a body.
    pub async fn post(&self, endpoint: impl Into<String>) -> Result<Payload> {
        let config = RequestConfig::builder(endpoint)
            .method(Method::Post)
            .build();
        self.request(config).await
    }

    /// `POST endpoint` with a JSON body.
    pub async fn post_json<T: Serialize>(
        &self,
        endpoint: impl Into<String>,
        body: &T,
    ) -> Result<Payload> {
        let config = RequestConfig::builder(endpoint)
            .method(Method::Post)
            .json(body)?
            .build();
        self.request(config).await
    }

    /// `PUT endpoint` with a JSON body.
    pub async fn put_json<T: Serialize>(
        &self,
        endpoint: impl Into<String>,
        body: &T,
    ) -> Result<Payload> {
        let config = RequestConfig::builder(endpoint)
            .method(Method::Put)
            .json(body)?
            .build();
        self.request(config).await
    }

    /// `DELETE endpoint`.
    pub async fn delete(&self, endpoint: impl Into<String>) -> Result<Payload> {
        let config = RequestConfig::builder(endpoint)
            .method(Method::Delete)
            .build();
        self.request(config).await
    }

    /// `POST endpoint` with a multipart body.
    pub async fn post_form(&self, endpoint: impl Into<String>, form: Form) -> Result<Payload> {
        let config = RequestConfig::builder(endpoint)
            .method(Method::Post)
            .multipart(form)
            .build();
        self.request(config).await
    }

    // ========================================================================
    // Cache Administration
    // ========================================================================

    /// Serve and store GETs through the cache.
    pub fn enable_cache(&self) {
        self.cache.enable();
    }

    /// Bypass the cache for reads and writes.
    pub fn disable_cache(&self) {
        self.cache.disable();
    }

    /// Whether the cache is on.
    #[must_use]
    pub fn is_cache_enabled(&self) -> bool {
        self.cache.is_enabled()
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop cached responses whose key starts with `prefix`.
    pub fn invalidate_cache(&self, prefix: &str) -> usize {
        self.cache.invalidate(prefix)
    }

    // ========================================================================
    // Endpoint Groups
    // ========================================================================

    /// `/auth` endpoints.
    #[must_use]
    pub const fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    /// `/stories` endpoints.
    #[must_use]
    pub const fn stories(&self) -> Stories<'_> {
        Stories::new(self)
    }

    /// Comment endpoints.
    #[must_use]
    pub const fn comments(&self) -> Comments<'_> {
        Comments::new(self)
    }

    /// Like endpoints.
    #[must_use]
    pub const fn likes(&self) -> Likes<'_> {
        Likes::new(self)
    }

    /// `/users` endpoints.
    #[must_use]
    pub const fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    /// `/tags` endpoints.
    #[must_use]
    pub const fn tags(&self) -> Tags<'_> {
        Tags::new(self)
    }

    /// File upload endpoints.
    #[must_use]
    pub const fn files(&self) -> Files<'_> {
        Files::new(self)
    }

    /// Analytics endpoints.
    #[must_use]
    pub const fn analytics(&self) -> Analytics<'_> {
        Analytics::new(self)
    }

    /// Health and status endpoints.
    #[must_use]
    pub const fn system(&self) -> System<'_> {
        System::new(self)
    }

    /// Batch lookup endpoints.
    #[must_use]
    pub const fn batch(&self) -> Batch<'_> {
        Batch::new(self)
    }
}

impl Transport for InkLinkClient {
    async fn send(&self, config: RequestConfig) -> Result<Payload> {
        self.request(config).await
    }
}

impl Service<RequestConfig> for InkLinkClient {
    type Response = Payload;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, config: RequestConfig) -> Self::Future {
        self.service.call(config)
    }
}

// ============================================================================
// Builder
// ============================================================================

type LayerFn = Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>;

/// Builder for [`InkLinkClient`].
///
/// # Example
///
/// ```ignore
/// use inklink::{InkLinkClient, RequestConfig};
///
/// let client = InkLinkClient::builder()
///     .login_page("/signin.html")
///     .add_request_interceptor(|mut config: RequestConfig| async move {
///         config.headers_mut().insert("X-Trace".into(), "1".into());
///         Ok(config)
///     })
///     .build();
/// ```
pub struct InkLinkClientBuilder {
    config: ClientConfigBuilder,
    interceptors: Interceptors,
    layers: Vec<LayerFn>,
    transport: Option<BoxedService>,
    identity_store: Option<Arc<dyn IdentityStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    use_default_interceptors: bool,
}

impl Default for InkLinkClientBuilder {
    fn default() -> Self {
        Self {
            config: ClientConfigBuilder::default(),
            interceptors: Interceptors::new(),
            layers: Vec::new(),
            transport: None,
            identity_store: None,
            navigator: None,
            use_default_interceptors: true,
        }
    }
}

impl std::fmt::Debug for InkLinkClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InkLinkClientBuilder")
            .field("config", &self.config)
            .field("interceptors", &self.interceptors)
            .field("layers_count", &self.layers.len())
            .field("custom_transport", &self.transport.is_some())
            .field("use_default_interceptors", &self.use_default_interceptors)
            .finish_non_exhaustive()
    }
}

impl InkLinkClientBuilder {
    // ========================================================================
    // Core Configuration
    // ========================================================================

    /// Start from a full configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        let mut builder = ClientConfig::builder()
            .base_url(config.base_url)
            .connect_timeout(config.connect_timeout)
            .pool_idle_per_host(config.pool_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .cache_ttl(config.cache_ttl)
            .cache_enabled(config.cache_enabled)
            .login_page(config.login_page);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        self.config = builder;
        self
    }

    /// Set the API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.base_url(base_url);
        self
    }

    /// Set a whole-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Set the default cache TTL.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config = self.config.cache_ttl(ttl);
        self
    }

    /// Set whether the cache starts enabled.
    #[must_use]
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config = self.config.cache_enabled(enabled);
        self
    }

    /// Set the page the auth redirect targets.
    #[must_use]
    pub fn login_page(mut self, page: impl Into<String>) -> Self {
        self.config = self.config.login_page(page);
        self
    }

    // ========================================================================
    // Interceptors
    // ========================================================================

    /// Register a tagged interceptor.
    #[must_use]
    pub fn interceptor(mut self, interceptor: Interceptor) -> Self {
        self.interceptors.add(interceptor);
        self
    }

    /// Append a request interceptor.
    #[must_use]
    pub fn add_request_interceptor(self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptor(Interceptor::request(interceptor))
    }

    /// Append a response interceptor.
    #[must_use]
    pub fn add_response_interceptor(
        self,
        interceptor: impl ResponseInterceptor + 'static,
    ) -> Self {
        self.interceptor(Interceptor::response(interceptor))
    }

    /// Append an error interceptor.
    #[must_use]
    pub fn add_error_interceptor(self, interceptor: impl ErrorInterceptor + 'static) -> Self {
        self.interceptor(Interceptor::error(interceptor))
    }

    /// Skip the pass-through and [`AuthRedirect`] defaults.
    #[must_use]
    pub fn without_default_interceptors(mut self) -> Self {
        self.use_default_interceptors = false;
        self
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    /// Store for local identity state (in-memory by default).
    #[must_use]
    pub fn identity_store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.identity_store = Some(store);
        self
    }

    /// Browsing context the auth redirect moves (in-memory by default).
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replace the hyper transport with any [`Transport`].
    #[must_use]
    pub fn transport<T: Transport + 'static>(self, transport: T) -> Self {
        self.transport_service(TransportService {
            transport: Arc::new(transport),
        })
    }

    /// Replace the hyper transport with any tower service.
    #[must_use]
    pub fn transport_service<S>(mut self, service: S) -> Self
    where
        S: Service<RequestConfig, Response = Payload, Error = Error> + Clone + Send + 'static,
        S::Future: Send + 'static,
    {
        self.transport = Some(BoxCloneService::new(service));
        self
    }

    // ========================================================================
    // Layers
    // ========================================================================

    /// Add a tower layer between the interceptors and the transport.
    ///
    /// First added = outermost.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<RequestConfig, Response = Payload, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<RequestConfig>>::Future: Send + 'static,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Log each request that reaches the transport at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log each request that reaches the transport at debug level, with headers.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the client.
    #[must_use]
    pub fn build(self) -> InkLinkClient {
        let config = self.config.build();

        let store = self
            .identity_store
            .unwrap_or_else(|| Arc::new(MemoryIdentityStore::new()));
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(MemoryNavigator::new("/")));

        let mut interceptors = Interceptors::new();
        if self.use_default_interceptors {
            interceptors.add_request(PassThrough);
            interceptors.add_response(PassThrough);
            interceptors.add_error(AuthRedirect::new(
                Arc::clone(&store),
                navigator,
                config.login_page.as_str(),
            ));
        }
        interceptors.extend(self.interceptors);

        let mut service = self
            .transport
            .unwrap_or_else(|| BoxCloneService::new(HyperTransport::new(&config)));

        // first added = outermost
        for layer_fn in self.layers.iter().rev() {
            service = layer_fn(service);
        }

        service = BoxCloneService::new(InterceptorLayer::new(interceptors).layer(service));

        let cache = Arc::new(ResponseCache::new(config.cache_ttl));
        if !config.cache_enabled {
            cache.disable();
        }
        service = BoxCloneService::new(CacheLayer::new(Arc::clone(&cache)).layer(service));

        InkLinkClient {
            service: SyncService::new(service),
            cache,
            session: Session::new(store),
            config,
        }
    }
}
