//! OpenAI-compatible chat completion client.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{build_prompt, GuidanceRequest, SYSTEM_PROMPT};
use crate::error::GuidanceError;
use crate::storage::GuidanceConfig;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GuidanceClient {
    http: Client,
    config: GuidanceConfig,
    /// Used instead of the environment when set.
    api_key: Option<String>,
}

impl GuidanceClient {
    pub fn new(config: GuidanceConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to build HTTP client, using defaults");
                Client::new()
            });
        Self {
            http,
            config,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }

    /// The API key, read from the configured environment variable on every
    /// call so a key added later is picked up.
    pub fn api_key(&self) -> Result<String, GuidanceError> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }
        std::env::var(&self.config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GuidanceError::MissingCredential(self.config.api_key_env.clone()))
    }

    /// `<api_base>/chat/completions`.
    pub fn endpoint(&self) -> Result<Url, GuidanceError> {
        let invalid = || GuidanceError::InvalidEndpoint(self.config.api_base.clone());
        let mut url = Url::parse(&self.config.api_base).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["chat", "completions"]);
        Ok(url)
    }

    /// Ask for a meditation script. A response without choices yields an
    /// empty string.
    pub async fn generate(&self, req: &GuidanceRequest) -> Result<String, GuidanceError> {
        let key = self.api_key()?;
        let endpoint = self.endpoint()?;
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(req) },
            ],
            "temperature": self.config.temperature,
        });

        tracing::debug!(model = %self.config.model, topic = ?req.topic, "requesting guidance");
        let resp = self
            .http
            .post(endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "guidance upstream failed");
            return Err(GuidanceError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GuidanceError::MalformedResponse(e.to_string()))?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}
