//! Prelude module for convenient imports.
//!
//! ```ignore
//! use inklink::prelude::*;
//! ```

pub use crate::{
    Envelope, Error, ErrorKind, Form, InkLinkClient, Interceptor, Method, Page, Payload,
    RequestConfig, ResponseCache, Result, Transport,
};

pub use serde::{Deserialize, Serialize};
