use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::{PageQuery, StoryRequest, json_request, mutate, paged};
use crate::{InkLinkClient, Method, Payload, RequestConfig, Result};

/// Characters `encodeURIComponent` leaves alone.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const AFFECTED: &[&str] = &["/stories", "/users"];

/// `/stories` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Stories<'a> {
    client: &'a InkLinkClient,
}

impl<'a> Stories<'a> {
    /// Sort used by [`Stories::list`] when none is given.
    pub const DEFAULT_SORT: &'static str = "createdAt,desc";

    pub(crate) const fn new(client: &'a InkLinkClient) -> Self {
        Self { client }
    }

    /// `GET /stories`. Defaults to page 0, 12 per page, newest first.
    pub async fn list(&self, query: Option<PageQuery>) -> Result<Payload> {
        let mut query = query.unwrap_or_else(|| PageQuery::new(0, 12));
        if query.sort.is_none() {
            query.sort = Some(Self::DEFAULT_SORT.to_string());
        }
        self.client.request(paged("/stories", &query).build()).await
    }

    /// `GET /stories/{id}`.
    pub async fn get(&self, id: u64) -> Result<Payload> {
        self.client.get(format!("/stories/{id}")).await
    }

    /// `POST /stories`.
    pub async fn create(&self, story: &StoryRequest) -> Result<Payload> {
        let config = json_request(Method::Post, "/stories", story)?.build();
        mutate(self.client, config, AFFECTED).await
    }

    /// `PUT /stories/{id}`.
    pub async fn update(&self, id: u64, story: &StoryRequest) -> Result<Payload> {
        let config = json_request(Method::Put, format!("/stories/{id}"), story)?.build();
        mutate(self.client, config, AFFECTED).await
    }

    /// `DELETE /stories/{id}`.
    pub async fn delete(&self, id: u64) -> Result<Payload> {
        let config = RequestConfig::builder(format!("/stories/{id}"))
            .method(Method::Delete)
            .build();
        mutate(self.client, config, AFFECTED).await
    }

    /// `GET /users/{user_id}/stories`. Defaults to page 0, 10 per page.
    pub async fn by_user(&self, user_id: u64, query: Option<PageQuery>) -> Result<Payload> {
        let query = query.unwrap_or_else(|| PageQuery::new(0, 10));
        let config = paged(format!("/users/{user_id}/stories"), &query).build();
        self.client.request(config).await
    }

    /// `GET /stories/search?q=`. Defaults to page 0, 12 per page.
    pub async fn search(&self, text: &str, query: Option<PageQuery>) -> Result<Payload> {
        let query = query.unwrap_or_else(|| PageQuery::new(0, 12));
        let config = RequestConfig::builder("/stories/search")
            .param("q", text)
            .params(query.to_params())
            .build();
        self.client.request(config).await
    }

    /// `GET /stories/tag/{name}` with the name percent-encoded.
    pub async fn by_tag(&self, name: &str, query: Option<PageQuery>) -> Result<Payload> {
        let query = query.unwrap_or_else(|| PageQuery::new(0, 12));
        let endpoint = format!("/stories/tag/{}", utf8_percent_encode(name, PATH_SEGMENT));
        self.client.request(paged(endpoint, &query).build()).await
    }

    /// `GET /stories/category/{category}`.
    pub async fn by_category(&self, category: &str, query: Option<PageQuery>) -> Result<Payload> {
        let query = query.unwrap_or_else(|| PageQuery::new(0, 12));
        let config = paged(format!("/stories/category/{category}"), &query).build();
        self.client.request(config).await
    }
}
