//! Time-boxed cache of GET responses.
//!
//! [`ResponseCache`] maps a key derived from the endpoint and its sorted
//! query parameters to a [`Payload`] and an expiry instant. Entries are
//! dropped lazily on lookup once expired, explicitly by key, by prefix, or
//! all at once. There is no size bound.
//!
//! [`CacheLayer`] sits outermost in the client stack: a hit on a cacheable
//! GET returns immediately without touching interceptors or the transport.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::time::Instant;
use tower::{Layer, Service, ServiceExt};
use tracing::debug;
use url::form_urlencoded;

use crate::{Payload, RequestConfig, Result, ServiceFuture};

/// Lifetime of entries whose TTL overflows the clock: 30 years.
pub const FOREVER: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Payload,
    expires_at: Instant,
}

/// Shared store of cached responses.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
    enabled: AtomicBool,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CACHE_TTL)
    }
}

impl ResponseCache {
    /// Create an enabled cache with the given default TTL.
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            enabled: AtomicBool::new(true),
        }
    }

    /// Key for an endpoint and its params: `endpoint?k1=v1&k2=v2`, params
    /// sorted by name then value and form-encoded. No params gives `endpoint?`.
    #[must_use]
    pub fn cache_key(endpoint: &str, params: &[(String, String)]) -> String {
        let mut sorted: Vec<&(String, String)> = params.iter().collect();
        sorted.sort();
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(sorted)
            .finish();
        format!("{endpoint}?{query}")
    }

    /// Key of a request.
    #[must_use]
    pub fn key_for(config: &RequestConfig) -> String {
        Self::cache_key(config.endpoint(), config.params())
    }

    /// Live value under `key`. An expired entry is removed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Payload> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if Instant::now() < entry.expires_at {
            return Some(entry.value.clone());
        }
        entries.remove(key);
        None
    }

    /// Store `value` until `now + ttl`. A TTL past the clock's range keeps
    /// the entry for [`FOREVER`].
    pub fn set(&self, key: impl Into<String>, value: Payload, ttl: Duration) {
        let now = Instant::now();
        let entry = CacheEntry {
            value,
            expires_at: now.checked_add(ttl).unwrap_or(now + FOREVER),
        };
        self.lock().insert(key.into(), entry);
    }

    /// Store `value` with the default TTL.
    pub fn put(&self, key: impl Into<String>, value: Payload) {
        self.set(key, value, self.default_ttl);
    }

    /// Remove one entry. Returns whether it existed.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Remove every entry whose key starts with `prefix`. Returns how many.
    pub fn invalidate(&self, prefix: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    /// Number of stored entries, expired ones not yet swept included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Default TTL.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Turn caching on.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Turn caching off. Stored entries are kept but neither read nor written.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Whether caching is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Layer serving cacheable GETs from a [`ResponseCache`].
#[derive(Debug, Clone)]
pub struct CacheLayer {
    cache: Arc<ResponseCache>,
}

impl CacheLayer {
    /// Create a layer backed by `cache`.
    #[must_use]
    pub const fn new(cache: Arc<ResponseCache>) -> Self {
        Self { cache }
    }
}

impl<S> Layer<S> for CacheLayer {
    type Service = Cached<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Cached {
            inner,
            cache: Arc::clone(&self.cache),
        }
    }
}

/// Service produced by [`CacheLayer`].
#[derive(Debug, Clone)]
pub struct Cached<S> {
    inner: S,
    cache: Arc<ResponseCache>,
}

impl<S> Service<RequestConfig> for Cached<S>
where
    S: Service<RequestConfig, Response = Payload, Error = crate::Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Payload;
    type Error = crate::Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, config: RequestConfig) -> Self::Future {
        let cache = Arc::clone(&self.cache);
        let inner = self.inner.clone();

        let cacheable = cache.is_enabled() && config.method().is_cacheable();
        let key = cacheable.then(|| ResponseCache::key_for(&config));
        let ttl = config.cache_ttl().unwrap_or_else(|| cache.default_ttl());

        if let Some(key) = &key {
            if let Some(payload) = cache.get(key) {
                debug!(%key, "serving from cache");
                return Box::pin(async move { Ok(payload) });
            }
        }

        Box::pin(async move {
            let payload = inner.oneshot(config).await?;
            if let Some(key) = key {
                debug!(%key, ?ttl, "caching response");
                cache.set(key, payload.clone(), ttl);
            }
            Ok(payload)
        })
    }
}
