use bytes::Bytes;
use serde::Serialize;

use super::{json_request, mutate};
use crate::{Form, InkLinkClient, Method, Payload, RequestConfig, Result};

const AFFECTED: &[&str] = &["/users"];

/// `/users` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
    client: &'a InkLinkClient,
}

impl<'a> Users<'a> {
    pub(crate) const fn new(client: &'a InkLinkClient) -> Self {
        Self { client }
    }

    /// `GET /users/{id}`.
    pub async fn profile(&self, id: u64) -> Result<Payload> {
        self.client.get(format!("/users/{id}")).await
    }

    /// `PUT /users/{id}` with any JSON-serializable profile fields.
    pub async fn update_profile<T: Serialize>(&self, id: u64, profile: &T) -> Result<Payload> {
        let config = json_request(Method::Put, format!("/users/{id}"), profile)?.build();
        mutate(self.client, config, AFFECTED).await
    }

    /// `POST /users/{id}/avatar` as multipart field `file`.
    pub async fn upload_avatar(
        &self,
        id: u64,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Result<Payload> {
        let config = RequestConfig::builder(format!("/users/{id}/avatar"))
            .method(Method::Post)
            .multipart(Form::new().file("file", filename, data))
            .build();
        mutate(self.client, config, AFFECTED).await
    }

    /// `GET /users/{id}/stats`.
    pub async fn stats(&self, id: u64) -> Result<Payload> {
        self.client.get(format!("/users/{id}/stats")).await
    }
}
