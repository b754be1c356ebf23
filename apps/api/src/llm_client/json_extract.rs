//! Recovers JSON from free-form LLM text.
//!
//! Models wrap JSON in code fences, prepend commentary, or trail off with
//! explanations. These helpers locate the outermost bracket/brace span and
//! parse only that. No schema validation happens here; callers read fields
//! best-effort with defaults.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Array,
    Object,
}

impl fmt::Display for JsonShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonShape::Array => f.write_str("array"),
            JsonShape::Object => f.write_str("object"),
        }
    }
}

/// Extraction failure. Carries the task name and the raw response so the
/// caller can log exactly what the model sent.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON {shape} found in {task} response")]
    NotFound {
        task: String,
        shape: JsonShape,
        raw: String,
    },

    #[error("malformed JSON {shape} in {task} response: {source}")]
    Malformed {
        task: String,
        shape: JsonShape,
        raw: String,
        source: serde_json::Error,
    },
}

impl ExtractError {
    pub fn raw(&self) -> &str {
        match self {
            ExtractError::NotFound { raw, .. } | ExtractError::Malformed { raw, .. } => raw,
        }
    }

    pub fn task(&self) -> &str {
        match self {
            ExtractError::NotFound { task, .. } | ExtractError::Malformed { task, .. } => task,
        }
    }
}

/// Parses the span from the first `[` to the last `]`.
pub fn extract_json_array(task: &str, text: &str) -> Result<Vec<Value>, ExtractError> {
    let span = delimited_span(text, '[', ']').ok_or_else(|| ExtractError::NotFound {
        task: task.to_string(),
        shape: JsonShape::Array,
        raw: text.to_string(),
    })?;

    serde_json::from_str(span).map_err(|source| ExtractError::Malformed {
        task: task.to_string(),
        shape: JsonShape::Array,
        raw: text.to_string(),
        source,
    })
}

/// Parses a JSON object, preferring a ```json fenced block and falling back
/// to the span from the first `{` to the last `}`.
pub fn extract_json_object(task: &str, text: &str) -> Result<Map<String, Value>, ExtractError> {
    if let Some(fenced) = fenced_json(text) {
        if let Ok(object) = serde_json::from_str::<Map<String, Value>>(fenced) {
            return Ok(object);
        }
    }

    // The whole trimmed text, when it is itself `{...}`, is exactly this span,
    // so no separate whole-text attempt is needed.
    let span = delimited_span(text, '{', '}').ok_or_else(|| ExtractError::NotFound {
        task: task.to_string(),
        shape: JsonShape::Object,
        raw: text.to_string(),
    })?;

    serde_json::from_str(span).map_err(|source| ExtractError::Malformed {
        task: task.to_string(),
        shape: JsonShape::Object,
        raw: text.to_string(),
        source,
    })
}

/// Returns `text[first open ..= last close]` when both exist in that order.
fn delimited_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Content between a ```json marker and the last ``` fence, trimmed.
fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let end = text.rfind(FENCE)?;
    (end > start).then(|| text[start..end].trim())
}
