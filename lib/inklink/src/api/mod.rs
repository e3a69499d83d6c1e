//! Typed endpoint groups of the InkLink API.
//!
//! Each group borrows an [`InkLinkClient`] and builds [`RequestConfig`]s for
//! one resource. Query parameters are always structured so the response
//! cache keys them consistently. Successful mutations invalidate the cache
//! prefixes whose reads they can change.
//!
//! Results are returned as [`Payload`]; decode them with
//! [`Payload::into_data`], which unwraps the `{ success, data }` envelope
//! when present.
//!
//! # Example
//!
//! ```ignore
//! use inklink::{InkLinkClient, Page};
//! use inklink::api::StoryResponse;
//!
//! let client = InkLinkClient::new();
//! let page: Page<StoryResponse> = client.stories().list(None).await?.into_data()?;
//! ```

mod analytics;
mod auth;
mod batch;
mod comments;
mod files;
mod likes;
mod models;
mod stories;
mod system;
mod tags;
mod users;

pub use analytics::Analytics;
pub use auth::Auth;
pub use batch::Batch;
pub use comments::Comments;
pub use files::Files;
pub use likes::Likes;
pub use models::{
    CommentRequest, CommentResponse, IdsRequest, PageQuery, SignInRequest, SignUpRequest,
    StoryRequest, StoryResponse, TagRequest, UserProfile,
};
pub use stories::Stories;
pub use system::System;
pub use tags::Tags;
pub use users::Users;

use serde::Serialize;

use crate::{InkLinkClient, Method, Payload, RequestConfig, RequestConfigBuilder, Result};

/// Builder for `method endpoint` with a JSON body.
fn json_request<T: Serialize>(
    method: Method,
    endpoint: impl Into<String>,
    body: &T,
) -> Result<RequestConfigBuilder> {
    RequestConfig::builder(endpoint).method(method).json(body)
}

/// GET `endpoint` with `query` as params.
fn paged(endpoint: impl Into<String>, query: &PageQuery) -> RequestConfigBuilder {
    RequestConfig::builder(endpoint).params(query.to_params())
}

/// Send a mutation and, on success, drop cached reads under `prefixes`.
async fn mutate(
    client: &InkLinkClient,
    config: RequestConfig,
    prefixes: &[&str],
) -> Result<Payload> {
    let payload = client.request(config).await?;
    for prefix in prefixes {
        client.invalidate_cache(prefix);
    }
    Ok(payload)
}
