//! Data Agent Service library
//!
//! Modules:
//! - `api`: Axum router, handlers, and a client for a running service.
//! - `agent`: The `/agent` pipeline plus an offline fallback answer.
//! - `openai`: Chat-completion wire types and HTTP client.
//! - `prompt`: YAML prompt templates with `{{placeholder}}` replacement, and
//!   JSON extraction from model replies.
//! - `utils`: CSV sample-row parsing and schema description.
//! - `deploy`: Upload/install/start steps against a sandbox.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `AgentService`,
//! `PromptBuilder`, and `OpenAIClient`.
pub mod agent;
pub mod api;
pub mod config;
pub mod deploy;
pub mod error;
pub mod openai;
pub mod prompt;
pub mod utils;

pub use agent::{AgentRequest, AgentService};
pub use config::Config;
pub use openai::client::OpenAIClient;
pub use prompt::constructor::PromptBuilder;
