pub mod history_service;
pub mod http_helpers;
pub mod llm_client;
pub mod prompt_builder;
pub mod question_service;
pub mod response_normalizer;
pub mod text_extractor;
