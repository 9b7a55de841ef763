//! Axum request handlers for the HTTP API.
use axum::body::Bytes;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::agent::AgentRequest;
use crate::api::routes::AppState;
use crate::error::AppResult;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "ok": true, "model": state.agent.model() }))
}

/// The body is parsed as JSON whatever its content type.
pub async fn agent(State(state): State<Arc<AppState>>, body: Bytes) -> AppResult<Json<Value>> {
    let span = tracing::info_span!("agent", request_id = %Uuid::new_v4());
    async {
        let payload = AgentRequest::from_body(&body)?;
        tracing::info!(
            schema_len = payload.schema_description.len(),
            rows_len = payload.sample_rows.len(),
            "Handling agent request"
        );
        state.agent.respond(&payload).await.map(Json)
    }
    .instrument(span)
    .await
}
