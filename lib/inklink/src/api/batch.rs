use super::{IdsRequest, json_request};
use crate::{InkLinkClient, Method, Payload, Result};

/// Batch lookup endpoints. These are POSTs and never cached.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    client: &'a InkLinkClient,
}

impl<'a> Batch<'a> {
    pub(crate) const fn new(client: &'a InkLinkClient) -> Self {
        Self { client }
    }

    /// `POST /batch/stories` with `{ "ids": [...] }`.
    pub async fn stories(&self, ids: impl Into<Vec<u64>>) -> Result<Payload> {
        self.lookup("/batch/stories", ids.into()).await
    }

    /// `POST /batch/users` with `{ "ids": [...] }`.
    pub async fn users(&self, ids: impl Into<Vec<u64>>) -> Result<Payload> {
        self.lookup("/batch/users", ids.into()).await
    }

    async fn lookup(&self, endpoint: &str, ids: Vec<u64>) -> Result<Payload> {
        let config = json_request(Method::Post, endpoint, &IdsRequest { ids })?.build();
        self.client.request(config).await
    }
}
