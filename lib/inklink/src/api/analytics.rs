use crate::{InkLinkClient, Method, Payload, RequestConfig, Result};

/// View recording and analytics endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Analytics<'a> {
    client: &'a InkLinkClient,
}

impl<'a> Analytics<'a> {
    pub(crate) const fn new(client: &'a InkLinkClient) -> Self {
        Self { client }
    }

    /// `POST /stories/{story_id}/view`.
    pub async fn record_view(&self, story_id: u64) -> Result<Payload> {
        let config = RequestConfig::builder(format!("/stories/{story_id}/view"))
            .method(Method::Post)
            .build();
        self.client.request(config).await
    }

    /// `GET /analytics/stories/{story_id}`.
    pub async fn story(&self, story_id: u64) -> Result<Payload> {
        self.client.get(format!("/analytics/stories/{story_id}")).await
    }

    /// `GET /analytics/users/{user_id}`.
    pub async fn user(&self, user_id: u64) -> Result<Payload> {
        self.client.get(format!("/analytics/users/{user_id}")).await
    }
}
