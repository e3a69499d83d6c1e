use super::{TagRequest, json_request, mutate};
use crate::{InkLinkClient, Method, Payload, RequestConfig, Result};

/// `/tags` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Tags<'a> {
    client: &'a InkLinkClient,
}

impl<'a> Tags<'a> {
    /// Limit used by [`Tags::popular`] when none is given.
    pub const DEFAULT_POPULAR_LIMIT: u32 = 20;

    pub(crate) const fn new(client: &'a InkLinkClient) -> Self {
        Self { client }
    }

    /// `GET /tags`.
    pub async fn all(&self) -> Result<Payload> {
        self.client.get("/tags").await
    }

    /// `GET /tags/popular?limit=`.
    pub async fn popular(&self, limit: Option<u32>) -> Result<Payload> {
        let config = RequestConfig::builder("/tags/popular")
            .param("limit", limit.unwrap_or(Self::DEFAULT_POPULAR_LIMIT))
            .build();
        self.client.request(config).await
    }

    /// `POST /tags`.
    pub async fn create(&self, name: impl Into<String>) -> Result<Payload> {
        let body = TagRequest { name: name.into() };
        let config = json_request(Method::Post, "/tags", &body)?.build();
        mutate(self.client, config, &["/tags"]).await
    }
}
