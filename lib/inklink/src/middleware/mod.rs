//! Tower middleware for the InkLink client.
//!
//! Layers added with [`InkLinkClientBuilder::layer`](crate::InkLinkClientBuilder::layer)
//! sit between the interceptor pipeline and the transport, so they only see
//! calls that missed the cache. The first layer added is the outermost.
//!
//! Any tower layer whose service speaks
//! `Service<RequestConfig, Response = Payload, Error = Error>` fits.

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
