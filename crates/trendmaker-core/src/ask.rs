use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AskError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

#[derive(Serialize)]
struct AskRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    response: String,
}

/// Anything that can answer a chat message.
///
/// The HTTP client is the real implementation; tests plug in their own.
#[async_trait]
pub trait AskBackend: Send + Sync {
    async fn ask(&self, message: &str) -> Result<String, AskError>;
}

#[derive(Clone, Debug)]
pub struct AskClient {
    client: Client,
    base_url: String,
}

impl AskClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url)
    }
}

#[async_trait]
impl AskBackend for AskClient {
    async fn ask(&self, message: &str) -> Result<String, AskError> {
        let url = self.ask_url();
        debug!(%url, chars = message.chars().count(), "posting ask request");

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { message })
            .send()
            .await
            .map_err(|source| AskError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status {
                status: status.as_u16(),
            });
        }

        // Body read errors are network failures; only bad JSON is a decode failure
        let body = response
            .bytes()
            .await
            .map_err(|source| AskError::Network { url, source })?;

        let parsed: AskResponse =
            serde_json::from_slice(&body).map_err(|e| AskError::Decode(e.to_string()))?;
        Ok(parsed.response)
    }
}
