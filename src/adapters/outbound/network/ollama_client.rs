use crate::adapters::outbound::network::map_transport_error;
use crate::ports::outbound::{LlmClient, UpstreamError};
use crate::shared::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Ollama API client implementing the LlmClient port.
///
/// Talks to a locally hosted Ollama instance over its `generate` and
/// `embeddings` endpoints with non-streaming, single-turn requests.
pub struct OllamaClient {
    client: reqwest::Client,
    generate_url: String,
    embeddings_url: String,
    model: String,
}

impl OllamaClient {
    const MODEL: &'static str = "llama3";
    const TIMEOUT_SECONDS: u64 = 30;

    pub fn new(generate_url: impl Into<String>, embeddings_url: impl Into<String>) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("sbom-sentinel/{}", version);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(Self::TIMEOUT_SECONDS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            generate_url: generate_url.into(),
            embeddings_url: embeddings_url.into(),
            model: Self::MODEL.to_string(),
        })
    }
}

// Ollama API request/response structures

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f64>,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        prompt: &str,
    ) -> std::result::Result<String, UpstreamError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let send = self.client.post(&self.generate_url).json(&request).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(UpstreamError::Cancelled),
            result = send => result.map_err(map_transport_error)?,
        };

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let body: GenerateResponse = tokio::select! {
            _ = cancel.cancelled() => return Err(UpstreamError::Cancelled),
            result = response.json() => result.map_err(map_transport_error)?,
        };

        Ok(body.response.trim().to_string())
    }

    async fn embed(
        &self,
        cancel: &CancellationToken,
        text: &str,
    ) -> std::result::Result<Vec<f64>, UpstreamError> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let send = self.client.post(&self.embeddings_url).json(&request).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(UpstreamError::Cancelled),
            result = send => result.map_err(map_transport_error)?,
        };

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let body: EmbeddingResponse = tokio::select! {
            _ = cancel.cancelled() => return Err(UpstreamError::Cancelled),
            result = response.json() => result.map_err(map_transport_error)?,
        };

        Ok(body.embedding)
    }
}
