use serde_json::Value;
use tracing::debug;

use super::{SignInRequest, SignUpRequest, json_request};
use crate::{InkLinkClient, Method, Payload, RequestConfig, Result};

/// `/auth` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Auth<'a> {
    client: &'a InkLinkClient,
}

impl<'a> Auth<'a> {
    pub(crate) const fn new(client: &'a InkLinkClient) -> Self {
        Self { client }
    }

    /// `POST /auth/signin`. The returned user is remembered in the session.
    pub async fn login(&self, credentials: &SignInRequest) -> Result<Payload> {
        let config = json_request(Method::Post, "/auth/signin", credentials)?.build();
        let payload = self.client.request(config).await?;

        if let Ok(user) = payload.clone().into_data::<Value>() {
            if user.is_object() {
                self.client.session().remember_user(&user);
            }
        }
        Ok(payload)
    }

    /// `POST /auth/signup`.
    pub async fn register(&self, account: &SignUpRequest) -> Result<Payload> {
        let config = json_request(Method::Post, "/auth/signup", account)?.build();
        self.client.request(config).await
    }

    /// `POST /auth/signout`. Clears the session and every cached response.
    pub async fn logout(&self) -> Result<Payload> {
        let config = RequestConfig::builder("/auth/signout")
            .method(Method::Post)
            .build();
        let payload = self.client.request(config).await?;

        self.client.session().clear();
        self.client.clear_cache();
        Ok(payload)
    }

    /// `GET /auth/me`.
    pub async fn current_user(&self) -> Result<Payload> {
        self.client.get("/auth/me").await
    }

    /// Whether `GET /auth/me` succeeds. Never fails.
    pub async fn verify_session(&self) -> bool {
        match self.current_user().await {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "session verification failed");
                false
            }
        }
    }
}
