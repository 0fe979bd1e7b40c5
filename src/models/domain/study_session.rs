use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{generation::QuestionSelection, question::Question};

/// One saved generation, as stored in the history blob.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub date: DateTime<Utc>,
    pub filename: String,
    pub file_type: String,
    pub question_type: QuestionSelection,
    pub num_objective_questions: u32,
    pub num_theory_questions: u32,
    pub questions: Vec<Question>,
}
