use actix_web::HttpResponse;

use crate::errors::{AppError, ErrorResponse};

pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate questions";

/// Collapses any pipeline failure into the generic 500 body; the cause is
/// only attached when `expose_details` is set.
pub fn generation_failure(err: &AppError, expose_details: bool) -> HttpResponse {
    HttpResponse::InternalServerError().json(
        ErrorResponse::new(GENERATION_FAILED_MESSAGE)
            .with_details(expose_details.then(|| err.to_string())),
    )
}

/// Creates a success JSON response
pub fn success_json<T: serde::Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(data)
}
