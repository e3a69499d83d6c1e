//! Core types for the InkLink API client.
//!
//! This crate holds the transport-agnostic pieces:
//! - [`Method`] - HTTP method enum
//! - [`RequestConfig`] and [`RequestConfigBuilder`] - one API call
//! - [`Body`], [`Form`] and [`Part`] - request bodies
//! - [`Payload`], [`Envelope`] and [`Page`] - normalized responses
//! - [`Error`], [`ErrorKind`] and [`Result`] - error handling
//! - [`Transport`] - the seam between the pipeline and the network

mod body;
mod error;
mod method;
mod multipart;
mod request;
mod response;
mod transport;

pub use body::{Body, ContentType, from_json, to_json};
pub use error::{Error, ErrorKind, NETWORK_ERROR_MESSAGE, Result};
pub use method::Method;
pub use multipart::{Form, Part};
pub use request::{RequestConfig, RequestConfigBuilder};
pub use response::{Envelope, Page, Payload};
pub use transport::Transport;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
