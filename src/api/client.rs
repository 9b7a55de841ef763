//! Thin HTTP client for a running agent service.
//!
//! - `health` fetches `/health` as JSON.
//! - `agent` posts an `AgentRequest` to `/agent` and returns the reply JSON.
use reqwest::Client;
use serde_json::Value;

use crate::agent::AgentRequest;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        ApiClient { client: Client::new(), base_url: base }
    }

    pub async fn health(&self) -> AppResult<Value> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(AppError::Upstream {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    pub async fn agent(&self, request: &AgentRequest) -> AppResult<Value> {
        let url = format!("{}/agent", self.base_url);
        tracing::info!("Posting agent request to {}", url);
        let response = self.client.post(&url).json(request).send().await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read error body".to_string());
            Err(AppError::Upstream { status: status.as_u16(), body })
        }
    }
}
