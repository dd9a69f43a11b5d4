//! Admin REST API client.
//!
//! Every response is wrapped in a `{ success, data, message }` envelope.
//! Failed requests surface the server's `message`, or
//! `HTTP error! status: <code>` when the body has none.

mod products;
mod types;
mod users;

pub use types::{
    ApiRole, ApiUser, Credentials, ImageSource, NewUser, Product, ProductDraft, User, UserUpdate,
};

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{resolve_env_var, Config};
use crate::error::{ApiError, ConfigError};
use crate::session::{RoleResolver, Session};

use types::LoginData;

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

fn default_success() -> bool {
    true
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the `/api/...` routes.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    roles: RoleResolver,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, roles: RoleResolver) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            roles,
        })
    }

    /// Build a client from `[api]` and `[auth]`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let base_url = resolve_env_var(&config.api.base_url).ok_or_else(|| {
            ConfigError::ValidationError(
                "api.base_url not set. Set IMPRINT_API_BASE_URL env var.".to_string(),
            )
        })?;
        Self::new(
            &base_url,
            Duration::from_millis(config.api.timeout_ms),
            RoleResolver::new(&config.auth),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn roles(&self) -> &RoleResolver {
        &self.roles
    }

    /// Exchange credentials for a session. The role is resolved here, once.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let request = self
            .request(Method::POST, "/api/login", None)
            .json(credentials);
        let data: LoginData = self.send(request).await?;

        let role = self.roles.resolve(data.user.role_id.as_deref());
        tracing::debug!("Logged in {} as {}", data.user.email, role);

        Ok(Session {
            token: data.token,
            user_id: data.user.id,
            email: data.user.email,
            role,
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    fn request(&self, method: Method, route: &str, session: Option<&Session>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(route))
            .header("Content-Type", "application/json");
        match session {
            Some(session) => builder.bearer_auth(&session.token),
            None => builder,
        }
    }

    /// Send a request and unwrap the envelope's `data`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let text = self.send_raw(request).await?;
        parse_envelope(&text)
    }

    /// Send a request whose envelope carries no data.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let text = self.send_raw(request).await?;
        if text.trim().is_empty() {
            return Ok(());
        }
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
        check_success(&envelope)
    }

    async fn send_raw(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &text),
            });
        }
        Ok(text)
    }
}

/// Message for a non-2xx response.
fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {status}"))
}

fn check_success<T>(envelope: &Envelope<T>) -> Result<(), ApiError> {
    if envelope.success {
        Ok(())
    } else {
        Err(ApiError::Http {
            status: 200,
            message: envelope
                .message
                .clone()
                .unwrap_or_else(|| "Request was not successful".to_string()),
        })
    }
}

fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    check_success(&envelope)?;
    envelope
        .data
        .ok_or_else(|| ApiError::Decode("response envelope has no data".to_string()))
}
