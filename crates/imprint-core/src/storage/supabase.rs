//! Supabase storage HTTP API.
//!
//! Uploads go to `POST {endpoint}/storage/v1/object/{bucket}/{key}` with
//! `x-upsert: false`, so an occupied key is refused by the server.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::{ObjectMetadata, ObjectStore};
use crate::error::{ConfigError, StoreError};
use crate::types::StoragePath;

/// Supabase storage client.
pub struct SupabaseStore {
    endpoint: Url,
    api_key: String,
    public_base: Option<Url>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "statusCode")]
    status_code: Option<String>,
}

impl SupabaseStore {
    /// Create a client for the project at `endpoint`.
    ///
    /// `public_base`, when set, replaces `{endpoint}/storage/v1/object/public`
    /// as the prefix of public URLs (e.g. a CDN in front of the bucket).
    pub fn new(
        endpoint: &str,
        api_key: &str,
        public_base: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let parse = |field: &str, value: &str| {
            Url::parse(value).map_err(|e| {
                ConfigError::ValidationError(format!("{field} is not a valid URL ({value}): {e}"))
            })
        };
        let endpoint = parse("storage.endpoint", endpoint)?;
        let public_base = public_base
            .map(|base| parse("storage.public_base_url", base))
            .transpose()?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            api_key: api_key.to_string(),
            public_base,
            client,
        })
    }

    /// Upload URL for an object.
    fn object_url(&self, path: &StoragePath) -> Option<Url> {
        with_segments(
            &self.endpoint,
            ["storage", "v1", "object", path.bucket.as_str()],
            &path.key,
        )
    }
}

/// Append fixed segments and the slash-separated key, percent-encoding each.
fn with_segments<'a>(
    base: &Url,
    fixed: impl IntoIterator<Item = &'a str>,
    key: &str,
) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(fixed)
        .extend(key.split('/'));
    Some(url)
}

/// Map a refused upload to a store error.
///
/// The storage API reports duplicates either as HTTP 409 or as HTTP 400
/// with `statusCode: "409"` in the body.
fn classify_failure(status: u16, body: &str, path: &StoragePath) -> StoreError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let inner_status = parsed.as_ref().and_then(|b| b.status_code.as_deref());
    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone().or_else(|| b.error.clone()))
        .unwrap_or_else(|| body.trim().to_string());

    let duplicate = status == 409
        || inner_status == Some("409")
        || message.contains("already exists")
        || message.contains("Duplicate");

    if duplicate {
        StoreError::AlreadyExists {
            bucket: path.bucket.clone(),
            key: path.key.clone(),
        }
    } else {
        StoreError::Rejected { status, message }
    }
}

#[async_trait]
impl ObjectStore for SupabaseStore {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn put(
        &self,
        path: &StoragePath,
        bytes: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        let url = self.object_url(path).ok_or_else(|| {
            StoreError::Transport(format!("endpoint {} cannot carry a path", self.endpoint))
        })?;

        tracing::debug!("Uploading {} bytes to {}", bytes.len(), url);

        let resp = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("apikey", &self.api_key)
            .header("Content-Type", &metadata.content_type)
            .header("Cache-Control", metadata.cache_control())
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("Supabase request failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        match resp.text().await {
            Ok(text) => Err(classify_failure(status.as_u16(), &text, path)),
            Err(e) => Err(StoreError::Rejected {
                status: status.as_u16(),
                message: format!("unreadable error body: {e}"),
            }),
        }
    }

    fn public_url(&self, path: &StoragePath) -> Option<String> {
        let url = match &self.public_base {
            Some(base) => with_segments(base, [path.bucket.as_str()], &path.key),
            None => with_segments(
                &self.endpoint,
                ["storage", "v1", "object", "public", path.bucket.as_str()],
                &path.key,
            ),
        };
        url.map(String::from)
    }
}
