pub mod generation;
pub mod question;
pub mod study_session;
pub use generation::{GenerationParams, GenerationRequest, QuestionSelection};
pub use question::{Question, QuestionSet, QuestionType};
pub use study_session::StudySession;
