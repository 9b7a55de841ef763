//! Prompt construction with simple `{{placeholder}}` substitution.
//!
//! The template is a YAML document with `instructions` and `prompt` fields. It
//! is read from disk on every call so edits take effect without a restart.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{AppError, AppResult};

pub const SCHEMA_PLACEHOLDER: &str = "{{schema_description}}";
pub const ROWS_PLACEHOLDER: &str = "{{sample_rows}}";

/// Appended to every prompt between the instructions and the filled template.
pub const STRICT_FORMAT: &str = "Return ONLY a single JSON object with keys \"summary\",\"suggested_visuals\",\"chart_specs\". No markdown fences or extra text.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptTemplate {
    #[serde(default)]
    instructions: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
}

impl PromptTemplate {
    /// Parse a template document. Missing or null keys become empty strings.
    pub fn from_yaml(raw: &str) -> AppResult<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(raw)
            .map_err(|e| AppError::Template(format!("Failed to parse template YAML: {}", e)))?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
            .map_err(|e| AppError::Template(format!("Unexpected template shape: {}", e)))
    }

    pub async fn load(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Template(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&raw)
    }

    pub fn instructions(&self) -> &str {
        self.instructions.as_deref().unwrap_or("").trim()
    }

    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or("").trim()
    }

    /// Assemble the final prompt text.
    ///
    /// Only the first occurrence of each placeholder is replaced; later
    /// occurrences are left in the output as-is.
    pub fn render(&self, schema_description: &str, sample_rows: &str) -> String {
        let filled = self
            .prompt()
            .replacen(SCHEMA_PLACEHOLDER, schema_description, 1)
            .replacen(ROWS_PLACEHOLDER, sample_rows, 1);
        format!("{}\n\n{}\n\n{}", self.instructions(), STRICT_FORMAT, filled)
    }
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template_path: PathBuf,
}

impl PromptBuilder {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        PromptBuilder { template_path: template_path.into() }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub async fn load_template(&self) -> AppResult<PromptTemplate> {
        PromptTemplate::load(&self.template_path).await
    }

    pub async fn build_prompt(&self, schema_description: &str, sample_rows: &str) -> AppResult<String> {
        let template = self.load_template().await?;
        Ok(template.render(schema_description, sample_rows))
    }
}
