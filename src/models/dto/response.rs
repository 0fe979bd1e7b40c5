use serde::Serialize;

use crate::models::domain::{Question, StudySession};

#[derive(Debug, Clone, Serialize)]
pub struct GenerateQuestionsResponse {
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub sessions: Vec<StudySession>,
}

#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    pub message: String,
    pub sessions: Vec<StudySession>,
}
