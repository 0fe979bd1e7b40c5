use std::{path::PathBuf, sync::Arc};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{GenerationParams, GenerationRequest, QuestionSet, QuestionType},
    services::{
        llm_client::LlmClient, prompt_builder::build_prompt,
        response_normalizer::normalize_response, text_extractor::TextExtractor,
    },
};

pub struct QuestionService {
    extractor: Arc<dyn TextExtractor>,
    llm: Arc<dyn LlmClient>,
}

impl QuestionService {
    pub fn new(extractor: Arc<dyn TextExtractor>, llm: Arc<dyn LlmClient>) -> Self {
        Self { extractor, llm }
    }

    /// Extracts the uploaded file and turns its text into a question set.
    /// `params` must already be validated; no partial results are returned.
    pub async fn generate_from_file(
        &self,
        path: PathBuf,
        mime_type: String,
        params: GenerationParams,
    ) -> AppResult<QuestionSet> {
        let text = self.extract_text(path, mime_type).await?;
        self.generate_from_text(text, params).await
    }

    pub async fn generate_from_text(
        &self,
        text: String,
        params: GenerationParams,
    ) -> AppResult<QuestionSet> {
        let request = GenerationRequest::new(text, params)
            .map_err(|e| AppError::GenerationFailed(e.to_string()))?;

        let prompt = build_prompt(&request);
        let raw = self.llm.generate(&prompt).await?;
        let questions = normalize_response(&raw)?;

        log_count_mismatch(&questions, &params);
        Ok(questions)
    }

    async fn extract_text(&self, path: PathBuf, mime_type: String) -> AppResult<String> {
        let extractor = Arc::clone(&self.extractor);
        let text = tokio::task::spawn_blocking(move || extractor.extract(&path, &mime_type))
            .await
            .map_err(|e| AppError::InternalError(format!("Extraction task failed: {}", e)))?
            .map_err(|e| match e {
                AppError::FileProcessing(_) => e,
                other => AppError::FileProcessing(other.to_string()),
            })?;

        log::info!("Extracted {} characters of text", text.chars().count());
        Ok(text)
    }
}

fn log_count_mismatch(questions: &QuestionSet, params: &GenerationParams) {
    let (wanted_objective, wanted_theory) = params.effective_counts();
    let theory = questions
        .iter()
        .filter(|q| q.question_type == QuestionType::Theory)
        .count();
    let objective = questions.len() - theory;

    if objective != wanted_objective as usize || theory != wanted_theory as usize {
        log::warn!(
            "Model returned {} objective / {} theory questions, {} / {} requested",
            objective,
            theory,
            wanted_objective,
            wanted_theory
        );
    } else {
        log::info!("Generated {} questions", questions.len());
    }
}
