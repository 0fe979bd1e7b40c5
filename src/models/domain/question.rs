use serde::{Deserialize, Serialize};

/// A single study question after normalization. Every field is always present.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: u64,
    pub text: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Objective,
    Theory,
}

impl QuestionType {
    /// Only the exact literal `"theory"` maps to `Theory`.
    pub fn from_model_value(value: Option<&str>) -> Self {
        match value {
            Some("theory") => QuestionType::Theory,
            _ => QuestionType::Objective,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Objective => "objective",
            QuestionType::Theory => "theory",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type QuestionSet = Vec<Question>;
