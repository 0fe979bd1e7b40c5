use std::{io::Write, path::Path};

use actix_multipart::{Field, Multipart};
use actix_web::{post, web, HttpRequest, HttpResponse};
use futures::StreamExt;
use tempfile::NamedTempFile;

use crate::{
    app_state::AppState,
    errors::{AppError, AppResult},
    middleware::get_request_id,
    models::{
        domain::GenerationParams,
        dto::{request::GenerateQuestionsRequestDto, response::GenerateQuestionsResponse},
    },
    services::http_helpers::{generation_failure, success_json},
};

const MAX_TEXT_FIELD_BYTES: usize = 1024;

/// An upload held in `UPLOAD_DIR` for the duration of one request.
pub struct UploadedFile {
    pub file: NamedTempFile,
    pub filename: String,
    pub mime_type: String,
    pub size: usize,
}

impl UploadedFile {
    fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            log::warn!("Failed to remove upload {}: {}", path.display(), e);
        }
    }
}

#[derive(Default)]
pub struct GenerateForm {
    pub upload: Option<UploadedFile>,
    pub question_type: Option<String>,
    pub objective_count: Option<String>,
    pub theory_count: Option<String>,
}

#[post("/api/generate")]
pub async fn generate_questions(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let request_id = get_request_id(&req).unwrap_or_else(|| "-".to_string());
    let expose_details = state.config.expose_error_details();

    let form = match read_generate_form(
        payload,
        &state.config.upload_dir,
        state.config.max_upload_bytes,
    )
    .await
    {
        Ok(form) => form,
        Err(err @ AppError::PayloadTooLarge(_)) => return Err(err),
        Err(err) => {
            log::error!("[{}] Failed to read upload: {}", request_id, err);
            return Ok(generation_failure(&err, expose_details));
        }
    };

    let Some(upload) = form.upload else {
        return Err(AppError::MissingUpload("No file uploaded".to_string()));
    };

    log::info!(
        "[{}] Received {} ({}, {} bytes)",
        request_id,
        upload.filename,
        upload.mime_type,
        upload.size
    );

    let dto = GenerateQuestionsRequestDto::from_form_fields(
        form.question_type.as_deref(),
        form.objective_count.as_deref(),
        form.theory_count.as_deref(),
    );

    let result = match GenerationParams::try_from(dto) {
        Ok(params) => {
            state
                .question_service
                .generate_from_file(
                    upload.file.path().to_path_buf(),
                    upload.mime_type.clone(),
                    params,
                )
                .await
        }
        Err(err) => Err(err),
    };

    upload.discard();

    match result {
        Ok(questions) => Ok(success_json(GenerateQuestionsResponse { questions })),
        Err(err) => {
            log::error!("[{}] Question generation failed: {}", request_id, err);
            Ok(generation_failure(&err, expose_details))
        }
    }
}

pub async fn read_generate_form(
    mut payload: Multipart,
    upload_dir: &Path,
    max_upload_bytes: usize,
) -> AppResult<GenerateForm> {
    let mut form = GenerateForm::default();

    while let Some(field) = payload.next().await {
        let mut field = field?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            "file" if form.upload.is_none() => {
                form.upload = store_upload(&mut field, upload_dir, max_upload_bytes).await?;
            }
            "type" => form.question_type = Some(read_text_field(&mut field).await?),
            "objectiveCount" => form.objective_count = Some(read_text_field(&mut field).await?),
            "theoryCount" => form.theory_count = Some(read_text_field(&mut field).await?),
            _ => {
                while let Some(chunk) = field.next().await {
                    chunk?;
                }
            }
        }
    }

    Ok(form)
}

async fn store_upload(
    field: &mut Field,
    upload_dir: &Path,
    max_upload_bytes: usize,
) -> AppResult<Option<UploadedFile>> {
    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .unwrap_or_default()
        .to_string();
    let mime_type = field
        .content_type()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(upload_dir)?;

    let mut size = 0usize;
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        size += chunk.len();
        if size > max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {} byte limit",
                max_upload_bytes
            )));
        }
        file.write_all(&chunk)?;
    }
    file.flush()?;

    // a file input submitted with nothing selected
    if filename.is_empty() && size == 0 {
        return Ok(None);
    }

    Ok(Some(UploadedFile {
        file,
        filename,
        mime_type,
        size,
    }))
}

async fn read_text_field(field: &mut Field) -> AppResult<String> {
    let mut value = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if value.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::ValidationError("Form field too large".to_string()));
        }
        value.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&value).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        repositories::InMemoryKeyValueStore,
        services::{llm_client::MockLlmClient, text_extractor::MockTextExtractor},
        test_utils::{fixtures, test_helpers::assert_error_status},
    };
    use actix_web::{http::header, http::StatusCode, test, App};
    use std::sync::Arc;

    const DOCUMENT: &str = "Water boils at 100 degrees. Ice melts at 0 degrees. \
        Steam is water vapour. Clouds are condensed vapour.";

    const COMPLETION: &str = "Here you go:\n```json\n{\"questions\":[{\"text\":\"At what temperature does water boil?\",\"options\":[\"50\",\"100\"],\"answer\":\"100\",\"explanation\":\"At sea level\",\"type\":\"objective\"},]}\n```\nHope this helps!";

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::test_config();
        config.upload_dir = dir.to_path_buf();
        config
    }

    fn state(config: Config, extractor: MockTextExtractor, llm: MockLlmClient) -> AppState {
        AppState::from_parts(
            config,
            Arc::new(extractor),
            Arc::new(llm),
            Arc::new(InMemoryKeyValueStore::new()),
        )
    }

    fn generate_request(fields: &[(&str, &str)], file: Option<fixtures::FilePart<'_>>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/generate")
            .insert_header((header::CONTENT_TYPE, fixtures::multipart_content_type()))
            .set_payload(fixtures::multipart_body(fields, file))
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[actix_web::test]
    async fn test_generate_returns_normalized_questions() {
        let uploads = tempfile::tempdir().unwrap();

        let mut extractor = MockTextExtractor::new();
        extractor
            .expect_extract()
            .withf(|_, mime| mime.starts_with("text/plain"))
            .times(1)
            .returning(|_, _| Ok(DOCUMENT.to_string()));
        let mut llm = MockLlmClient::new();
        llm.expect_generate()
            .withf(|prompt| prompt.contains("Create 3 objective questions."))
            .times(1)
            .returning(|_| Ok(COMPLETION.to_string()));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(config_in(uploads.path()), extractor, llm)))
                .service(generate_questions),
        )
        .await;

        let req = generate_request(
            &[("type", "objective"), ("objectiveCount", "3")],
            Some(("notes.txt", "text/plain", DOCUMENT.as_bytes())),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!({
                "questions": [{
                    "id": 1,
                    "text": "At what temperature does water boil?",
                    "options": ["50", "100"],
                    "answer": "100",
                    "explanation": "At sea level",
                    "type": "objective"
                }]
            })
        );
        assert!(dir_is_empty(uploads.path()), "upload should be removed");
    }

    #[actix_web::test]
    async fn test_generate_without_file_is_bad_request() {
        let uploads = tempfile::tempdir().unwrap();
        let mut llm = MockLlmClient::new();
        llm.expect_generate().never();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(
                    config_in(uploads.path()),
                    MockTextExtractor::new(),
                    llm,
                )))
                .service(generate_questions),
        )
        .await;

        let req = generate_request(&[("type", "both")], None).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({ "error": "No file uploaded" }));
    }

    #[actix_web::test]
    async fn test_negative_count_rejected_before_extraction() {
        let uploads = tempfile::tempdir().unwrap();
        let mut extractor = MockTextExtractor::new();
        extractor.expect_extract().never();
        let mut llm = MockLlmClient::new();
        llm.expect_generate().never();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(config_in(uploads.path()), extractor, llm)))
                .service(generate_questions),
        )
        .await;

        let req = generate_request(
            &[("type", "both"), ("objectiveCount", "-1")],
            Some(("notes.txt", "text/plain", DOCUMENT.as_bytes())),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!({
                "error": "Failed to generate questions",
                "details": "Failed to generate questions: Invalid question counts: must be positive numbers"
            })
        );
        assert!(dir_is_empty(uploads.path()));
    }

    #[actix_web::test]
    async fn test_extraction_failure_hides_details_in_production() {
        let uploads = tempfile::tempdir().unwrap();
        let mut config = config_in(uploads.path());
        config.app_env = "production".to_string();

        let mut extractor = MockTextExtractor::new();
        extractor
            .expect_extract()
            .returning(|_, mime| Err(AppError::UnsupportedFileType(mime.to_string())));
        let mut llm = MockLlmClient::new();
        llm.expect_generate().never();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(config, extractor, llm)))
                .service(generate_questions),
        )
        .await;

        let req = generate_request(&[], Some(("image.png", "image/png", b"\x89PNG")))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_error_status(resp.status());
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({ "error": "Failed to generate questions" }));
        assert!(dir_is_empty(uploads.path()));
    }

    #[actix_web::test]
    async fn test_oversized_upload_is_rejected() {
        let uploads = tempfile::tempdir().unwrap();
        let mut config = config_in(uploads.path());
        config.max_upload_bytes = 16;

        let mut extractor = MockTextExtractor::new();
        extractor.expect_extract().never();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(config, extractor, MockLlmClient::new())))
                .service(generate_questions),
        )
        .await;

        let req = generate_request(&[], Some(("notes.txt", "text/plain", DOCUMENT.as_bytes())))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(dir_is_empty(uploads.path()));
    }
}
