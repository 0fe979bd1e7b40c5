use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::SaveSessionRequest,
        response::{DeleteSessionResponse, HistoryResponse},
    },
};

#[get("/api/history")]
pub async fn list_sessions(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let sessions = state.history_service.list_sessions().await?;
    Ok(HttpResponse::Ok().json(HistoryResponse { sessions }))
}

#[get("/api/history/{id}")]
pub async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = state.history_service.get_session(&id).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/api/history")]
pub async fn save_session(
    state: web::Data<AppState>,
    request: web::Json<SaveSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let session = state
        .history_service
        .save_session(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(session))
}

#[delete("/api/history/{id}")]
pub async fn delete_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let sessions = state.history_service.delete_session(&id).await?;
    Ok(HttpResponse::Ok().json(DeleteSessionResponse {
        message: format!("Study session {} deleted", id),
        sessions,
    }))
}

#[delete("/api/history")]
pub async fn clear_history(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.history_service.clear_history().await?;
    Ok(HttpResponse::NoContent().finish())
}
