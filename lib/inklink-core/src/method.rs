//! HTTP method types.

use derive_more::Display;

/// HTTP method of a [`RequestConfig`](crate::RequestConfig).
///
/// Requests default to [`Method::Get`] when no method is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Method {
    /// Read a resource. The only cacheable method.
    #[default]
    #[display("GET")]
    Get,
    /// Create a resource or trigger an action.
    #[display("POST")]
    Post,
    /// Replace a resource.
    #[display("PUT")]
    Put,
    /// Remove a resource.
    #[display("DELETE")]
    Delete,
    /// Partially update a resource.
    #[display("PATCH")]
    Patch,
}

impl Method {
    /// Returns `true` if responses to this method may be stored in the response cache.
    #[must_use]
    pub const fn is_cacheable(&self) -> bool {
        matches!(self, Self::Get)
    }

    /// Returns `true` if the method changes server state.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !self.is_cacheable()
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
        }
    }
}
