//! HTTP client used by one module to call another.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ModulesSettings;
use crate::shared::error::AppError;

/// Header carrying the shared key on internal endpoints.
pub const MODULE_KEY_HEADER: &str = "x-module-key";

#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("Module request failed: {0}")]
    Transport(String),

    #[error("Module responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Module response could not be decoded: {0}")]
    Decode(String),
}

impl From<ModuleError> for AppError {
    fn from(e: ModuleError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

/// Error body shape shared by every module.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct ModuleClient {
    http: Client,
    base_url: String,
    internal_key: String,
}

impl ModuleClient {
    pub fn new(settings: &ModulesSettings) -> Result<Self, ModuleError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ModuleError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            internal_key: settings.internal_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET on behalf of the user owning `token`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ModuleError> {
        let response = self
            .http
            .get(self.url(path))
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| ModuleError::Transport(e.to_string()))?;

        decode(response).await
    }

    /// POST to an internal endpoint, authenticated by the module key.
    pub async fn post_json_internal<B, T>(&self, path: &str, body: &B) -> Result<T, ModuleError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(path))
            .header(MODULE_KEY_HEADER, &self.internal_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ModuleError::Transport(e.to_string()))?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ModuleError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        return Err(ModuleError::Status {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ModuleError::Decode(e.to_string()))
}
