//! The transport seam.
//!
//! [`Transport`] performs exactly one HTTP exchange for a [`RequestConfig`]
//! and normalizes the outcome: a [`Payload`] for 2xx responses, an
//! [`Error`](crate::Error) for everything else. Implement it directly to plug
//! in a fake backend for tests.

use std::future::Future;

use crate::{Payload, RequestConfig, Result};

/// Executes a single API call.
pub trait Transport: Send + Sync {
    /// Send the request and normalize the response.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`](crate::Error::Http) for non-2xx statuses, carrying the parsed body
    /// - [`Error::Network`](crate::Error::Network) when no response was received
    fn send(&self, config: RequestConfig) -> impl Future<Output = Result<Payload>> + Send;
}
