//! HTTP client for the InkLink blogging API.
//!
//! Calls flow through a composed stack:
//!
//! - a [`ResponseCache`] answering repeated GETs within their TTL
//! - an interceptor pipeline transforming requests, responses and errors
//! - optional tower layers such as [`middleware::LoggingLayer`]
//! - a [`HyperTransport`] talking to the REST backend with session cookies
//!
//! # Example
//!
//! ```ignore
//! use inklink::prelude::*;
//! use inklink::api::{PageQuery, StoryResponse};
//!
//! let client = InkLinkClient::builder()
//!     .base_url("http://localhost:8080/api")
//!     .build();
//!
//! let page: Page<StoryResponse> = client
//!     .stories()
//!     .search("dragons", Some(PageQuery::new(0, 12)))
//!     .await?
//!     .into_data()?;
//! ```

pub mod api;
mod cache;
mod client;
mod config;
mod interceptor;
pub mod middleware;
pub mod prelude;
mod session;
mod transport;

// Re-export client types
pub use cache::{CacheLayer, Cached, ResponseCache};
pub use client::{BoxedService, InkLinkClient, InkLinkClientBuilder, ServiceFuture};
pub use config::{
    ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL, DEFAULT_CACHE_TTL, DEFAULT_LOGIN_PAGE,
};
pub use interceptor::{
    ErrorInterceptor, Intercepted, Interceptor, InterceptorFuture, InterceptorLayer,
    Interceptors, PassThrough, RequestInterceptor, ResponseInterceptor,
};
pub use session::{
    AuthRedirect, CURRENT_USER_KEY, IS_AUTHENTICATED_KEY, IdentityStore, MemoryIdentityStore,
    MemoryNavigator, Navigator, Session, USER_KEY,
};
pub use transport::{CookieJar, HyperTransport};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use inklink_core::{
    Body, ContentType, Envelope, Error, ErrorKind, Form, Method, NETWORK_ERROR_MESSAGE, Page,
    Part, Payload, RequestConfig, RequestConfigBuilder, Result, Transport, from_json, to_json,
};

// Re-export http types for status codes and headers
pub use inklink_core::{StatusCode, header};
