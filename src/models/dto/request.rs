use once_cell::sync::Lazy;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::{AppError, AppResult};
use crate::models::domain::{GenerationParams, Question, QuestionSelection};

pub const DEFAULT_QUESTION_TYPE: &str = "both";
pub const DEFAULT_OBJECTIVE_COUNT: i64 = 10;
pub const DEFAULT_THEORY_COUNT: i64 = 5;

const INVALID_QUESTION_TYPE: &str =
    "Invalid question type: must be \"objective\", \"theory\", or \"both\"";

static LEADING_INTEGER: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^\s*([+-]?\d+)").expect("LEADING_INTEGER is a valid regex pattern")
});

/// Generation parameters exactly as they arrived in the multipart form,
/// checked before any extraction or model call happens.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuestionsRequestDto {
    #[validate(custom(function = "validate_question_type"))]
    pub question_type: String,

    #[validate(range(min = 0, message = "Invalid question counts: must be positive numbers"))]
    pub objective_count: i64,

    #[validate(range(min = 0, message = "Invalid question counts: must be positive numbers"))]
    pub theory_count: i64,
}

impl GenerateQuestionsRequestDto {
    /// Applies the form defaults: a missing type is `both`, a missing or
    /// non-numeric count falls back to 10 objective / 5 theory.
    pub fn from_form_fields(
        question_type: Option<&str>,
        objective_count: Option<&str>,
        theory_count: Option<&str>,
    ) -> Self {
        let question_type = question_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_QUESTION_TYPE)
            .to_string();

        Self {
            question_type,
            objective_count: parse_count(objective_count, DEFAULT_OBJECTIVE_COUNT),
            theory_count: parse_count(theory_count, DEFAULT_THEORY_COUNT),
        }
    }
}

impl TryFrom<GenerateQuestionsRequestDto> for GenerationParams {
    type Error = AppError;

    /// Rejections surface as `GenerationFailed` carrying the bare rule
    /// message, the same shape as any other failure of a generate request.
    fn try_from(dto: GenerateQuestionsRequestDto) -> AppResult<Self> {
        dto.validate()
            .map_err(|errors| AppError::GenerationFailed(first_message(&errors)))?;

        let selection: QuestionSelection = dto
            .question_type
            .parse()
            .map_err(|_| AppError::GenerationFailed(INVALID_QUESTION_TYPE.to_string()))?;
        let objective_count = u32::try_from(dto.objective_count)
            .map_err(|_| AppError::GenerationFailed("Objective count is too large".to_string()))?;
        let theory_count = u32::try_from(dto.theory_count)
            .map_err(|_| AppError::GenerationFailed("Theory count is too large".to_string()))?;

        Ok(GenerationParams::new(selection, objective_count, theory_count))
    }
}

fn validate_question_type(value: &str) -> Result<(), ValidationError> {
    match value {
        "objective" | "theory" | "both" => Ok(()),
        _ => Err(ValidationError::new("question_type").with_message(INVALID_QUESTION_TYPE.into())),
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field| field.iter())
        .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

/// Leading integer of the field; missing, non-numeric and zero all take
/// the default.
fn parse_count(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| LEADING_INTEGER.captures(v))
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .filter(|count| *count != 0)
        .unwrap_or(default)
}

/// Body of `POST /api/history`; id and date are assigned on save.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveSessionRequest {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,

    #[serde(default)]
    #[validate(length(max = 255))]
    pub file_type: String,

    #[serde(default)]
    pub question_type: QuestionSelection,

    #[serde(default)]
    pub num_objective_questions: u32,

    #[serde(default)]
    pub num_theory_questions: u32,

    #[validate(length(min = 1, message = "A session must contain at least one question"))]
    pub questions: Vec<Question>,
}
