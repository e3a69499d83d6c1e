use bytes::Bytes;

use super::mutate;
use crate::{Form, InkLinkClient, Method, Payload, RequestConfig, Result};

const AFFECTED: &[&str] = &["/stories", "/users"];

/// File upload endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Files<'a> {
    client: &'a InkLinkClient,
}

impl<'a> Files<'a> {
    pub(crate) const fn new(client: &'a InkLinkClient) -> Self {
        Self { client }
    }

    /// `POST /stories/{story_id}/image` as multipart field `file`.
    pub async fn upload_story_image(
        &self,
        story_id: u64,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Result<Payload> {
        let config = RequestConfig::builder(format!("/stories/{story_id}/image"))
            .method(Method::Post)
            .multipart(Form::new().file("file", filename, data))
            .build();
        mutate(self.client, config, AFFECTED).await
    }

    /// `POST /files/upload` with every file under the repeated field `files`.
    pub async fn upload_many<I, N, D>(&self, files: I) -> Result<Payload>
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: Into<Bytes>,
    {
        let form = files
            .into_iter()
            .fold(Form::new(), |form, (name, data)| form.file("files", name, data));
        let config = RequestConfig::builder("/files/upload")
            .method(Method::Post)
            .multipart(form)
            .build();
        mutate(self.client, config, AFFECTED).await
    }
}
