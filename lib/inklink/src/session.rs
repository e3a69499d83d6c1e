//! Local identity state and the login redirect.
//!
//! The server session lives in a cookie; what is kept here is only a
//! display-convenience copy of the signed-in user. [`IdentityStore`] is the
//! key-value seam for that copy and [`Navigator`] the seam for the browsing
//! context. [`AuthRedirect`] ties them together as the default error
//! interceptor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::warn;

use crate::interceptor::{ErrorInterceptor, InterceptorFuture};
use crate::Error;

/// Store key of the authenticated flag.
pub const IS_AUTHENTICATED_KEY: &str = "isAuthenticated";
/// Store key of the cached user.
pub const USER_KEY: &str = "user";
/// Store key of the cached current user.
pub const CURRENT_USER_KEY: &str = "currentUser";

// ============================================================================
// Identity Store
// ============================================================================

/// String key-value storage for local identity state.
pub trait IdentityStore: Send + Sync {
    /// Value under `key`.
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`.
    fn set(&self, key: &str, value: String);
    /// Remove `key`.
    fn remove(&self, key: &str);
}

/// In-process [`IdentityStore`].
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryIdentityStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// Helpers over an [`IdentityStore`] for the signed-in user.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn IdentityStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_marked_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }

    /// Cache `user` and mark the session authenticated.
    pub fn remember_user(&self, user: &Value) {
        let encoded = user.to_string();
        self.store.set(CURRENT_USER_KEY, encoded.clone());
        self.store.set(USER_KEY, encoded);
        self.store.set(IS_AUTHENTICATED_KEY, "true".to_string());
    }

    /// Cached user, if one was remembered and still parses.
    #[must_use]
    pub fn cached_user(&self) -> Option<Value> {
        self.store
            .get(CURRENT_USER_KEY)
            .or_else(|| self.store.get(USER_KEY))
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// Whether the authenticated flag is set.
    #[must_use]
    pub fn is_marked_authenticated(&self) -> bool {
        self.store.get(IS_AUTHENTICATED_KEY).as_deref() == Some("true")
    }

    /// Forget the cached user and the authenticated flag.
    pub fn clear(&self) {
        self.store.remove(IS_AUTHENTICATED_KEY);
        self.store.remove(USER_KEY);
        self.store.remove(CURRENT_USER_KEY);
    }
}

// ============================================================================
// Navigator
// ============================================================================

/// The browsing context the client redirects.
pub trait Navigator: Send + Sync {
    /// Current location path.
    fn current_path(&self) -> String;
    /// Move to `target`.
    fn redirect(&self, target: &str);
}

/// [`Navigator`] that records the location and counts redirects.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    path: Mutex<String>,
    redirects: AtomicUsize,
}

impl MemoryNavigator {
    /// Start at `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(path.into()),
            redirects: AtomicUsize::new(0),
        }
    }

    /// Number of redirects so far.
    #[must_use]
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn redirect(&self, target: &str) {
        *self.path.lock().unwrap_or_else(PoisonError::into_inner) = target.to_string();
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Auth Redirect
// ============================================================================

/// Error interceptor handling 401/403 globally.
///
/// Drops the local authenticated flag and cached user, then sends the
/// navigator to the login page unless it is already there. The error is
/// returned unchanged.
#[derive(Clone)]
pub struct AuthRedirect {
    store: Arc<dyn IdentityStore>,
    navigator: Arc<dyn Navigator>,
    login_page: Arc<str>,
}

impl std::fmt::Debug for AuthRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRedirect")
            .field("login_page", &self.login_page)
            .finish_non_exhaustive()
    }
}

impl AuthRedirect {
    /// Create the interceptor.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        navigator: Arc<dyn Navigator>,
        login_page: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            navigator,
            login_page: login_page.into(),
        }
    }

    fn handle(&self, error: &Error) {
        if !error.is_auth_error() {
            return;
        }
        warn!(status = error.status(), message = %error, "authentication error");

        self.store.remove(IS_AUTHENTICATED_KEY);
        self.store.remove(USER_KEY);

        if !self.navigator.current_path().contains(&*self.login_page) {
            self.navigator.redirect(&self.login_page);
        }
    }
}

impl ErrorInterceptor for AuthRedirect {
    fn intercept(&self, error: Error) -> InterceptorFuture<Error> {
        self.handle(&error);
        Box::pin(async move { error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Payload;
    use serde_json::json;

    fn fixture(path: &str) -> (Arc<MemoryIdentityStore>, Arc<MemoryNavigator>, AuthRedirect) {
        let store = Arc::new(MemoryIdentityStore::new());
        let navigator = Arc::new(MemoryNavigator::new(path));
        let redirect = AuthRedirect::new(store.clone(), navigator.clone(), "login.html");
        (store, navigator, redirect)
    }

    #[test]
    fn session_remember_and_clear() {
        let session = Session::new(Arc::new(MemoryIdentityStore::new()));
        assert!(!session.is_marked_authenticated());

        session.remember_user(&json!({"id": 1, "username": "ada"}));
        assert!(session.is_marked_authenticated());
        assert_eq!(session.cached_user(), Some(json!({"id": 1, "username": "ada"})));

        session.clear();
        assert!(!session.is_marked_authenticated());
        assert!(session.cached_user().is_none());
    }

    #[tokio::test]
    async fn auth_error_clears_and_redirects() {
        let (store, navigator, redirect) = fixture("/dashboard.html");
        Session::new(store.clone()).remember_user(&json!({"id": 1}));

        let err = redirect.intercept(Error::http(401, Payload::Empty)).await;

        assert_eq!(err.status(), 401);
        assert!(store.get(IS_AUTHENTICATED_KEY).is_none());
        assert!(store.get(USER_KEY).is_none());
        assert_eq!(navigator.redirects(), 1);
        assert_eq!(navigator.current_path(), "login.html");
    }

    #[tokio::test]
    async fn no_redirect_when_on_login_page() {
        let (_, navigator, redirect) = fixture("/app/login.html");

        let err = redirect.intercept(Error::http(403, Payload::Empty)).await;

        assert_eq!(err.status(), 403);
        assert_eq!(navigator.redirects(), 0);
    }

    #[tokio::test]
    async fn other_errors_are_ignored() {
        let (store, navigator, redirect) = fixture("/dashboard.html");
        store.set(IS_AUTHENTICATED_KEY, "true".to_string());

        let err = redirect.intercept(Error::http(500, Payload::Empty)).await;

        assert_eq!(err.status(), 500);
        assert_eq!(store.get(IS_AUTHENTICATED_KEY).as_deref(), Some("true"));
        assert_eq!(navigator.redirects(), 0);
    }
}
