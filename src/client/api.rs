//! HTTP client for the user administration API

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use super::error::ClientError;
use super::session::Session;
use crate::api::types::ApiErrorResponse;
use crate::domain::{Page, UpdateUserRequest, User, UserId, UserStats};

/// Calls the views make against the API
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserApi: Send + Sync + Debug {
    async fn list_users(&self, page: usize) -> Result<Page<User>, ClientError>;

    async fn update_user(
        &self,
        id: UserId,
        request: &UpdateUserRequest,
    ) -> Result<User, ClientError>;

    async fn delete_user(&self, id: UserId) -> Result<(), ClientError>;

    async fn user_stats(&self) -> Result<UserStats, ClientError>;

    async fn logout(&self) -> Result<(), ClientError>;
}

#[derive(Deserialize)]
struct UsersEnvelope {
    users: Page<User>,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

/// `UserApi` over reqwest, carrying the session's bearer token
#[derive(Debug, Clone)]
pub struct HttpUserApi {
    client: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl HttpUserApi {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Attach the bearer token, failing when the session has none
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        Err(error_from_response(response).await)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(envelope) => ClientError::Status {
            status: status.as_u16(),
            message: envelope.error.message,
            fields: envelope.error.fields.unwrap_or_default(),
        },
        Err(_) => ClientError::status(
            status.as_u16(),
            format!(
                "HTTP {}",
                status.canonical_reason().unwrap_or(status.as_str())
            ),
        ),
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn list_users(&self, page: usize) -> Result<Page<User>, ClientError> {
        debug!(page, "Fetching users");

        let mut request = self
            .client
            .get(self.url("/users"))
            .query(&[("page", page)]);

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let envelope: UsersEnvelope = self.send_json(request).await?;
        Ok(envelope.users)
    }

    async fn update_user(
        &self,
        id: UserId,
        request: &UpdateUserRequest,
    ) -> Result<User, ClientError> {
        debug!(user_id = %id, "Updating user");

        let builder = self
            .authorized(self.client.put(self.url(&format!("/users/{}", id))))?
            .json(request);

        let envelope: UserEnvelope = self.send_json(builder).await?;
        Ok(envelope.user)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), ClientError> {
        debug!(user_id = %id, "Deleting user");

        let builder =
            self.authorized(self.client.delete(self.url(&format!("/users/{}", id))))?;
        self.send(builder).await?;
        Ok(())
    }

    async fn user_stats(&self) -> Result<UserStats, ClientError> {
        let builder = self.authorized(self.client.get(self.url("/user-stats")))?;
        self.send_json(builder).await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let builder = self.authorized(self.client.post(self.url("/logout")))?;
        self.send(builder).await?;
        Ok(())
    }
}
