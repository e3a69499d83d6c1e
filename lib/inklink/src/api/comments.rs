use super::{CommentRequest, json_request, mutate};
use crate::{InkLinkClient, Method, Payload, RequestConfig, Result};

const AFFECTED: &[&str] = &["/stories"];

/// Comment endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Comments<'a> {
    client: &'a InkLinkClient,
}

impl<'a> Comments<'a> {
    pub(crate) const fn new(client: &'a InkLinkClient) -> Self {
        Self { client }
    }

    /// `GET /stories/{story_id}/comments`.
    pub async fn for_story(&self, story_id: u64) -> Result<Payload> {
        self.client.get(format!("/stories/{story_id}/comments")).await
    }

    /// `POST /stories/{story_id}/comments`.
    pub async fn add(&self, story_id: u64, content: impl Into<String>) -> Result<Payload> {
        let body = CommentRequest {
            content: content.into(),
        };
        let config =
            json_request(Method::Post, format!("/stories/{story_id}/comments"), &body)?.build();
        mutate(self.client, config, AFFECTED).await
    }

    /// `PUT /comments/{comment_id}`.
    pub async fn update(&self, comment_id: u64, content: impl Into<String>) -> Result<Payload> {
        let body = CommentRequest {
            content: content.into(),
        };
        let config = json_request(Method::Put, format!("/comments/{comment_id}"), &body)?.build();
        mutate(self.client, config, AFFECTED).await
    }

    /// `DELETE /comments/{comment_id}`.
    pub async fn delete(&self, comment_id: u64) -> Result<Payload> {
        let config = RequestConfig::builder(format!("/comments/{comment_id}"))
            .method(Method::Delete)
            .build();
        mutate(self.client, config, AFFECTED).await
    }
}
