use std::sync::Arc;

use crate::{
    config::Config,
    errors::AppResult,
    repositories::{FileKeyValueStore, KeyValueStore},
    services::{
        history_service::HistoryService,
        llm_client::{LlmClient, OpenAiCompatibleClient},
        question_service::QuestionService,
        text_extractor::{DocumentTextExtractor, TextExtractor},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub question_service: Arc<QuestionService>,
    pub history_service: Arc<HistoryService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let extractor: Arc<dyn TextExtractor> = Arc::new(DocumentTextExtractor);
        let client = OpenAiCompatibleClient::new(&config);
        log::info!("Question generation model: {}", client.model());
        let llm: Arc<dyn LlmClient> = Arc::new(client);
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileKeyValueStore::open(&config.history_dir).await?);

        Ok(Self::from_parts(config, extractor, llm, store))
    }

    /// Wires the services from explicit collaborators.
    pub fn from_parts(
        config: Config,
        extractor: Arc<dyn TextExtractor>,
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            question_service: Arc::new(QuestionService::new(extractor, llm)),
            history_service: Arc::new(HistoryService::new(store)),
            config: Arc::new(config),
        }
    }
}
