use crate::{InkLinkClient, Payload, Result};

/// Health and status endpoints.
#[derive(Debug, Clone, Copy)]
pub struct System<'a> {
    client: &'a InkLinkClient,
}

impl<'a> System<'a> {
    pub(crate) const fn new(client: &'a InkLinkClient) -> Self {
        Self { client }
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<Payload> {
        self.client.get("/health").await
    }

    /// `GET /status`.
    pub async fn status(&self) -> Result<Payload> {
        self.client.get("/status").await
    }
}
