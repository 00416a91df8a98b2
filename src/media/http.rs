//! Signed multipart upload to an HTTP image host.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::info;

use super::MediaHost;
use crate::config::MediaConfig;
use crate::{AppError, Result};

/// Fields of the upload response this client reads.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

/// Media host client using signed multipart uploads.
pub struct HttpMediaHost {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    api_secret: String,
}

impl HttpMediaHost {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the upload URL or credentials are missing.
    pub fn from_config(config: &MediaConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(AppError::Config(
                "media upload_url, api key and api secret are required".into(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    async fn upload_inner(&self, folder: &str, file_name: &str, bytes: Bytes) -> Result<String> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.api_secret,
        );

        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_owned())
            .mime_str("image/jpeg")
            .map_err(|err| AppError::Media(format!("invalid mime type: {err}")))?;

        let form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_owned())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", part);

        let res = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| AppError::Media(format!("upload request failed: {err}")))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Media(format!("upload rejected ({status}): {body}")));
        }

        let parsed: UploadResponse = res
            .json()
            .await
            .map_err(|err| AppError::Media(format!("invalid upload response: {err}")))?;

        let url = parsed
            .secure_url
            .or(parsed.url)
            .ok_or_else(|| AppError::Media("upload response has no url".into()))?;

        info!(folder, file_name, "photo uploaded");
        Ok(url)
    }
}

impl MediaHost for HttpMediaHost {
    fn upload(
        &self,
        folder: &str,
        file_name: &str,
        bytes: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        let folder = folder.to_owned();
        let file_name = file_name.to_owned();
        Box::pin(async move { self.upload_inner(&folder, &file_name, bytes).await })
    }
}

/// Signature over upload parameters: SHA-256 hex of the key-sorted
/// `k=v&k=v` string immediately followed by the API secret.
#[must_use]
pub fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
