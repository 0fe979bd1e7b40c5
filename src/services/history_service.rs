use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{GenerationParams, StudySession},
        dto::request::SaveSessionRequest,
    },
    repositories::KeyValueStore,
};

pub const HISTORY_KEY: &str = "study-history";

/// Saved sessions, newest first, stored as one JSON array under [`HISTORY_KEY`].
pub struct HistoryService {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list_sessions(&self) -> AppResult<Vec<StudySession>> {
        self.load().await
    }

    pub async fn get_session(&self, id: &str) -> AppResult<StudySession> {
        self.load()
            .await?
            .into_iter()
            .find(|session| session.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Study session with id '{}' not found", id)))
    }

    pub async fn save_session(&self, request: SaveSessionRequest) -> AppResult<StudySession> {
        request.validate()?;

        let params = GenerationParams::new(
            request.question_type,
            request.num_objective_questions,
            request.num_theory_questions,
        );
        let (num_objective_questions, num_theory_questions) = params.effective_counts();

        let session = StudySession {
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            filename: request.filename,
            file_type: request.file_type,
            question_type: request.question_type,
            num_objective_questions,
            num_theory_questions,
            questions: request.questions,
        };

        let _guard = self.write_lock.lock().await;
        let mut sessions = self.load().await?;
        sessions.insert(0, session.clone());
        self.persist(&sessions).await?;

        log::info!(
            "Saved study session {} ({} questions)",
            session.id,
            session.questions.len()
        );
        Ok(session)
    }

    /// Removes one session and returns what remains.
    pub async fn delete_session(&self, id: &str) -> AppResult<Vec<StudySession>> {
        let _guard = self.write_lock.lock().await;
        let mut sessions = self.load().await?;

        let before = sessions.len();
        sessions.retain(|session| session.id != id);
        if sessions.len() == before {
            return Err(AppError::NotFound(format!(
                "Study session with id '{}' not found",
                id
            )));
        }

        self.persist(&sessions).await?;
        Ok(sessions)
    }

    pub async fn clear_history(&self) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        self.store.delete(HISTORY_KEY).await
    }

    async fn load(&self) -> AppResult<Vec<StudySession>> {
        let Some(blob) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&blob) {
            Ok(sessions) => Ok(sessions),
            Err(e) => {
                log::error!("Discarding unreadable study history: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn persist(&self, sessions: &[StudySession]) -> AppResult<()> {
        let blob = serde_json::to_string(sessions)
            .map_err(|e| AppError::InternalError(format!("Cannot serialize history: {}", e)))?;
        self.store.set(HISTORY_KEY, blob).await
    }
}
