//! Turns a free-form model completion into a well-typed [`QuestionSet`].
//!
//! The completion is untrusted: it may be wrapped in Markdown fences, carry
//! trailing commas, or have prose around the JSON. Anything that survives
//! sanitization and parses as `{ "questions": [...] }` is coerced field by
//! field; nothing else is recovered.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde_json::Value;
use thiserror::Error;

use crate::{
    errors::AppError,
    models::domain::{Question, QuestionSet, QuestionType},
};

static CODE_FENCE: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"```[A-Za-z0-9_-]*").expect("CODE_FENCE is a valid regex pattern")
});

static TRAILING_COMMA: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r",\s*([}\]])").expect("TRAILING_COMMA is a valid regex pattern")
});

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Invalid questions format from model")]
    InvalidFormat,
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        AppError::GenerationFailed(err.to_string())
    }
}

/// Strips code fences, drops commas before `}`/`]`, and slices to the span
/// between the first `{` and the last `}` when both exist in that order.
pub fn sanitize_json(raw: &str) -> String {
    let unfenced = CODE_FENCE.replace_all(raw, "");
    let repaired = TRAILING_COMMA.replace_all(unfenced.trim(), "$1");

    match (repaired.find('{'), repaired.rfind('}')) {
        (Some(start), Some(end)) if start < end => repaired[start..=end].to_string(),
        _ => repaired.into_owned(),
    }
}

pub fn normalize_response(raw: &str) -> Result<QuestionSet, NormalizeError> {
    let sanitized = sanitize_json(raw);
    let parsed: Value = serde_json::from_str(&sanitized)?;

    let questions = parsed
        .get("questions")
        .and_then(Value::as_array)
        .ok_or(NormalizeError::InvalidFormat)?;

    let mut ids = IdAllocator::default();
    let normalized: QuestionSet = questions
        .iter()
        .enumerate()
        .map(|(index, question)| coerce_question(question, index, &mut ids))
        .collect();

    log::debug!("Normalized {} questions from model response", normalized.len());
    Ok(normalized)
}

fn coerce_question(question: &Value, index: usize, ids: &mut IdAllocator) -> Question {
    let position = index as u64 + 1;

    Question {
        id: ids.assign(model_id(question.get("id")), position),
        text: coerce_text(question.get("text")),
        options: coerce_options(question.get("options")),
        answer: coerce_text(question.get("answer")),
        explanation: coerce_text(question.get("explanation")),
        question_type: QuestionType::from_model_value(question.get("type").and_then(Value::as_str)),
    }
}

fn model_id(value: Option<&Value>) -> Option<u64> {
    let id = match value? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    id.filter(|id| *id > 0)
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce_options(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(|option| match option {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Keeps ids unique across one response.
#[derive(Default)]
struct IdAllocator {
    used: HashSet<u64>,
}

impl IdAllocator {
    /// `position` is 1-based, so the fallback is always positive and found
    /// within `used.len() + 1` candidates.
    fn assign(&mut self, requested: Option<u64>, position: u64) -> u64 {
        let id = match requested {
            Some(id) if !self.used.contains(&id) => id,
            _ => (position..=u64::MAX)
                .find(|candidate| !self.used.contains(candidate))
                .unwrap_or(position),
        };

        self.used.insert(id);
        id
    }
}
