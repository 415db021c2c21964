//! Q&A response decoding
//!
//! Depending on deployment the service answers a question either with JSON
//! (`{"answer": "..."}` or a bare value) or with a plain-text body. The
//! declared `Content-Type` decides which decoder runs; the body is never
//! sniffed.

use super::{ApiError, ApiResult};
use serde_json::Value;

/// Decoded Q&A response
#[derive(Debug, Clone, PartialEq)]
pub enum QaReply {
    /// Body declared as JSON
    Structured(Value),
    /// Any other declared type; body kept verbatim
    PlainText(String),
}

/// Whether a declared content type denotes a JSON body
pub fn is_structured_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

impl QaReply {
    /// Decode `body` according to its declared content type
    pub fn decode(content_type: Option<&str>, body: String) -> ApiResult<Self> {
        if is_structured_content_type(content_type) {
            let value = serde_json::from_str(&body)
                .map_err(|e| ApiError::Decode(format!("invalid JSON answer: {}", e)))?;
            Ok(QaReply::Structured(value))
        } else {
            Ok(QaReply::PlainText(body))
        }
    }

    /// Answer text to display
    ///
    /// For structured replies a present, non-empty `answer` field wins;
    /// otherwise the whole decoded body is the answer.
    pub fn into_answer(self) -> String {
        match self {
            QaReply::PlainText(text) => text,
            QaReply::Structured(value) => match value.get("answer") {
                Some(answer) if is_truthy(answer) => render(answer.clone()),
                _ => render(value),
            },
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
