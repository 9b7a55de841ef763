//! Thin HTTP client for an OpenAI-compatible chat-completions API.
//!
//! No retries and no explicit timeout; a hung upstream holds the request open.
use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, AppResult};
use crate::openai::types::{ChatCompletionRequest, ChatCompletionResponse};

/// Anything that can turn a chat request into a completion.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &ChatCompletionRequest) -> AppResult<ChatCompletionResponse>;
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAIClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        OpenAIClient { client: Client::new(), base_url: base, api_key }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> AppResult<ChatCompletionResponse> {
        let url = self.completions_url();
        tracing::info!("Requesting completion from {} (model {})", url, request.model);
        tracing::debug!("Completion payload: {:?}", request);

        let response = self.client.post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if response.status().is_success() {
            let completion: ChatCompletionResponse = response.json().await?;
            tracing::debug!("Completion returned {} choice(s)", completion.choices.len());
            Ok(completion)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::error!("Completion failed. Status: {}, Body: {}", status, body);
            Err(AppError::Upstream { status: status.as_u16(), body })
        }
    }
}
