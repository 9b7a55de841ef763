//! Request pipeline: prompt, completion, extraction.
pub mod fallback;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::openai::{ChatCompletionRequest, ChatMessage, CompletionClient};
use crate::prompt::constructor::PromptBuilder;
use crate::prompt::extract::{self, ExtractMode};

pub const SYSTEM_PROMPT: &str = "You are a data visualization agent.";
pub const TEMPERATURE: f32 = 0.1;
pub const EXPECTED_KEYS: [&str; 3] = ["summary", "suggested_visuals", "chart_specs"];

/// Caller payload for `POST /agent`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentRequest {
    pub schema_description: String,
    pub sample_rows: String,
}

impl AgentRequest {
    /// Read a raw request body without checking its content type or field types.
    ///
    /// Strings pass through, null or absent fields become empty text, any other
    /// value is substituted as its JSON text. Only a body that is not JSON fails.
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        let value: Value = serde_json::from_slice(body).map_err(AppError::Json)?;
        Ok(AgentRequest {
            schema_description: field_text(&value, "schema_description"),
            sample_rows: field_text(&value, "sample_rows"),
        })
    }
}

fn field_text(body: &Value, key: &str) -> String {
    match body.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub struct AgentService {
    client: Option<Arc<dyn CompletionClient>>,
    model: String,
    prompts: PromptBuilder,
    extract_mode: ExtractMode,
}

impl AgentService {
    /// `client` of `None` answers every request with the offline fallback.
    pub fn new(
        client: Option<Arc<dyn CompletionClient>>,
        model: String,
        prompts: PromptBuilder,
        extract_mode: ExtractMode,
    ) -> Self {
        AgentService { client, model, prompts, extract_mode }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn respond(&self, request: &AgentRequest) -> AppResult<Value> {
        // an unreadable template fails the request in both modes
        let template = self.prompts.load_template().await?;
        let Some(client) = &self.client else {
            tracing::info!("No completion client configured, using offline response");
            return fallback::respond(request);
        };

        let prompt = template.render(&request.schema_description, &request.sample_rows);
        let completion_request = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: TEMPERATURE,
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
        };
        let completion = client.complete(&completion_request).await?;
        let text = completion.first_text().unwrap_or("{}");
        tracing::debug!("Model reply: {}", text);

        let value = extract::extract_json(text, self.extract_mode)?;
        warn_on_missing_keys(&value);
        Ok(value)
    }
}

fn warn_on_missing_keys(value: &Value) {
    if let Some(obj) = value.as_object() {
        let missing: Vec<&str> = EXPECTED_KEYS.iter().copied().filter(|k| !obj.contains_key(*k)).collect();
        if !missing.is_empty() {
            tracing::warn!("Model reply is missing keys: {}", missing.join(", "));
        }
    } else {
        tracing::warn!("Model reply is not a JSON object");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::{ChatCompletionResponse, Role};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recording {
        reply: Option<String>,
        seen: Mutex<Vec<ChatCompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for Recording {
        async fn complete(&self, request: &ChatCompletionRequest) -> AppResult<ChatCompletionResponse> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(match &self.reply {
                Some(text) => ChatCompletionResponse::from_text(text.clone()),
                None => ChatCompletionResponse::default(),
            })
        }
    }

    fn template() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "instructions: Be brief.\nprompt: \"S={{schema_description}} R={{sample_rows}}\"\n",
        )
        .unwrap();
        file
    }

    fn service(client: Arc<Recording>, path: &std::path::Path) -> AgentService {
        let client: Arc<dyn CompletionClient> = client;
        AgentService::new(Some(client), "test-model".into(), PromptBuilder::new(path), ExtractMode::Greedy)
    }

    #[tokio::test]
    async fn sends_two_messages_at_fixed_temperature() {
        let file = template();
        let client = Arc::new(Recording { reply: Some("{\"summary\":\"s\"}".into()), seen: Mutex::default() });
        let svc = service(client.clone(), file.path());
        let req = AgentRequest { schema_description: "users".into(), sample_rows: "1,A".into() };

        let out = svc.respond(&req).await.unwrap();
        assert_eq!(out, json!({"summary": "s"}));

        let seen = client.seen.lock().unwrap();
        let sent = &seen[0];
        assert_eq!(sent.model, "test-model");
        assert_eq!(sent.temperature, TEMPERATURE);
        assert_eq!(sent.messages[0], ChatMessage::system(SYSTEM_PROMPT));
        assert_eq!(sent.messages[1].role, Role::User);
        assert!(sent.messages[1].content.ends_with("S=users R=1,A"));
    }

    #[tokio::test]
    async fn missing_choice_defaults_to_empty_object() {
        let file = template();
        let client = Arc::new(Recording { reply: None, seen: Mutex::default() });
        let out = service(client, file.path()).respond(&AgentRequest::default()).await.unwrap();
        assert_eq!(out, json!({}));
    }

    #[tokio::test]
    async fn unparsable_reply_is_an_error() {
        let file = template();
        let client = Arc::new(Recording { reply: Some("{\"a\":1} and {\"b\":2}".into()), seen: Mutex::default() });
        let err = service(client, file.path()).respond(&AgentRequest::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Extract(_)));
    }

    #[tokio::test]
    async fn offline_service_still_requires_template() {
        let svc = AgentService::new(None, "m".into(), PromptBuilder::new("/missing.yaml"), ExtractMode::Greedy);
        let err = svc.respond(&AgentRequest::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Template(_)));

        let file = template();
        let svc = AgentService::new(None, "m".into(), PromptBuilder::new(file.path()), ExtractMode::Greedy);
        let out = svc.respond(&AgentRequest::default()).await.unwrap();
        assert!(out.get("summary").is_some());
    }

    #[test]
    fn body_fields_are_coerced_to_text() {
        let req = AgentRequest::from_body(br#"{"sample_rows": "x"}"#).unwrap();
        assert_eq!(req.schema_description, "");
        assert_eq!(req.sample_rows, "x");

        let req = AgentRequest::from_body(br#"{"schema_description": null, "sample_rows": [1, 2]}"#).unwrap();
        assert_eq!(req.schema_description, "");
        assert_eq!(req.sample_rows, "[1,2]");

        let req = AgentRequest::from_body(b"[]").unwrap();
        assert_eq!(req.sample_rows, "");
    }

    #[test]
    fn non_json_body_is_an_error() {
        let err = AgentRequest::from_body(b"schema_description=x").unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }
}
