use super::{PageQuery, mutate, paged};
use crate::{InkLinkClient, Method, Payload, RequestConfig, Result};

/// Like endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Likes<'a> {
    client: &'a InkLinkClient,
}

impl<'a> Likes<'a> {
    pub(crate) const fn new(client: &'a InkLinkClient) -> Self {
        Self { client }
    }

    /// `POST /stories/{story_id}/like`, liking or unliking.
    pub async fn toggle(&self, story_id: u64) -> Result<Payload> {
        let config = RequestConfig::builder(format!("/stories/{story_id}/like"))
            .method(Method::Post)
            .build();
        mutate(self.client, config, &["/stories", "/users"]).await
    }

    /// `GET /stories/{story_id}/like`.
    pub async fn check(&self, story_id: u64) -> Result<Payload> {
        self.client.get(format!("/stories/{story_id}/like")).await
    }

    /// `GET /users/{user_id}/likes`. Defaults to page 0, 10 per page.
    pub async fn for_user(&self, user_id: u64, query: Option<PageQuery>) -> Result<Payload> {
        let query = query.unwrap_or_else(|| PageQuery::new(0, 10));
        let config = paged(format!("/users/{user_id}/likes"), &query).build();
        self.client.request(config).await
    }
}
