use std::{env, path::PathBuf};

use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_LLM_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_LLM_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub frontend_url: String,
    pub llm_api_key: SecretString,
    pub llm_api_base: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub history_dir: PathBuf,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            web_server_port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            llm_api_key: SecretString::from(env::var("GEMINI_API_KEY").unwrap_or_default()),
            llm_api_base: env::var("LLM_API_BASE")
                .unwrap_or_else(|_| DEFAULT_LLM_API_BASE.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(120),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            history_dir: env::var("HISTORY_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
        }
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }

    /// Underlying failure causes are only sent to clients outside production.
    pub fn expose_error_details(&self) -> bool {
        self.is_development()
    }

    /// Validate that production-critical configuration is set
    pub fn validate_for_production(&self) -> AppResult<()> {
        use secrecy::ExposeSecret;

        if self.is_development() {
            return Ok(());
        }

        if self.llm_api_key.expose_secret().trim().is_empty() {
            return Err(AppError::InternalError(
                "GEMINI_API_KEY is not set. Set it or run with APP_ENV=development.".to_string(),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(AppError::InternalError(
                "MAX_UPLOAD_BYTES must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 3000,
            frontend_url: "http://localhost:5173".to_string(),
            llm_api_key: SecretString::from("test_api_key".to_string()),
            llm_api_base: "http://localhost:9999/v1".to_string(),
            llm_model: "test-model".to_string(),
            llm_timeout_secs: 5,
            upload_dir: env::temp_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            history_dir: env::temp_dir(),
            app_env: "development".to_string(),
        }
    }
}
