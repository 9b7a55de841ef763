//! Best-effort recovery of a JSON object from free-text model replies.
//!
//! Two steps: pick a candidate substring, then parse it strictly. Callers get a
//! typed error back and decide whether to fall back or surface it.
use serde_json::Value;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

const EMPTY_OBJECT: &str = "{}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// First `{` through the last `}` in the text, braces not balanced.
    #[default]
    Greedy,
    /// First brace-balanced object, ignoring braces inside string literals.
    Balanced,
}

impl FromStr for ExtractMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(ExtractMode::Greedy),
            "balanced" => Ok(ExtractMode::Balanced),
            other => Err(other.to_string()),
        }
    }
}

/// Select the substring to parse. Defaults to `"{}"` when no object is found.
pub fn candidate(text: &str, mode: ExtractMode) -> &str {
    let found = match mode {
        ExtractMode::Greedy => greedy_span(text),
        ExtractMode::Balanced => balanced_span(text),
    };
    found.unwrap_or(EMPTY_OBJECT)
}

pub fn parse_candidate(candidate: &str) -> AppResult<Value> {
    serde_json::from_str(candidate).map_err(AppError::Extract)
}

pub fn extract_json(text: &str, mode: ExtractMode) -> AppResult<Value> {
    parse_candidate(candidate(text, mode))
}

fn greedy_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn balanced_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
