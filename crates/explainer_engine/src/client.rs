use std::time::Duration;

use engine_logging::engine_debug;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ClientError, FailureKind};

#[derive(Debug, Clone)]
pub struct GenerateSettings {
    pub endpoint: String,
    pub model: String,
    /// Ask the upstream to constrain output to JSON (`"format": "json"`).
    pub format_json: bool,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "llama3".to_string(),
            format_json: true,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            max_bytes: 1024 * 1024,
        }
    }
}

/// Source of raw model output for a prompt.
#[async_trait::async_trait]
pub trait Explainer: Send + Sync {
    /// Returns `Ok(None)` when the upstream answered successfully but carried
    /// no usable response text.
    async fn explain(&self, prompt: &str) -> Result<Option<String>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Value,
}

impl GenerateResponse {
    /// Text to hand to the parser. Non-string payloads are passed on as raw
    /// JSON so they fail parsing and get retried.
    fn into_text(self) -> Option<String> {
        match self.response {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(text),
            other => {
                engine_debug!("Upstream response field is not a string: {}", other);
                Some(other.to_string())
            }
        }
    }
}

/// Non-streaming client for an Ollama-style `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    settings: GenerateSettings,
    endpoint: reqwest::Url,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(settings: GenerateSettings) -> Result<Self, ClientError> {
        let endpoint = reqwest::Url::parse(&settings.endpoint)
            .map_err(|err| ClientError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            endpoint,
            client,
        })
    }

    fn request_body(&self, prompt: &str) -> String {
        let mut body = json!({
            "model": self.settings.model,
            "prompt": prompt,
            "stream": false,
        });
        if self.settings.format_json {
            body["format"] = json!("json");
        }
        body.to_string()
    }

    fn too_large(&self, actual: u64) -> ClientError {
        ClientError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl Explainer for OllamaClient {
    async fn explain(&self, prompt: &str) -> Result<Option<String>, ClientError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(self.request_body(prompt))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        let envelope: GenerateResponse = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(err) => {
                engine_debug!("Upstream body is not a generate response: {}", err);
                return Ok(None);
            }
        };

        Ok(envelope.into_text())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
