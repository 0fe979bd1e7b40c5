use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Which question kinds the caller asked for.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSelection {
    Objective,
    Theory,
    #[default]
    Both,
}

impl QuestionSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionSelection::Objective => "objective",
            QuestionSelection::Theory => "theory",
            QuestionSelection::Both => "both",
        }
    }
}

impl FromStr for QuestionSelection {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "objective" => Ok(QuestionSelection::Objective),
            "theory" => Ok(QuestionSelection::Theory),
            "both" => Ok(QuestionSelection::Both),
            _ => Err(AppError::ValidationError(
                "Invalid question type: must be \"objective\", \"theory\", or \"both\"".to_string(),
            )),
        }
    }
}

impl std::fmt::Display for QuestionSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated generation parameters. Counts for the unselected kind are kept
/// as sent but ignored by [`GenerationParams::effective_counts`].
#[derive(Clone, Debug, PartialEq, Eq, Copy)]
pub struct GenerationParams {
    pub selection: QuestionSelection,
    pub objective_count: u32,
    pub theory_count: u32,
}

impl GenerationParams {
    pub fn new(selection: QuestionSelection, objective_count: u32, theory_count: u32) -> Self {
        Self {
            selection,
            objective_count,
            theory_count,
        }
    }

    /// (objective, theory) counts with the unselected kind forced to zero.
    pub fn effective_counts(&self) -> (u32, u32) {
        match self.selection {
            QuestionSelection::Objective => (self.objective_count, 0),
            QuestionSelection::Theory => (0, self.theory_count),
            QuestionSelection::Both => (self.objective_count, self.theory_count),
        }
    }
}

/// Document text plus parameters, built once per API call and never persisted.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub document_text: String,
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn new(document_text: String, params: GenerationParams) -> AppResult<Self> {
        if document_text.is_empty() {
            return Err(AppError::ValidationError(
                "Invalid text content: text must be a non-empty string".to_string(),
            ));
        }

        Ok(Self {
            document_text,
            params,
        })
    }
}
