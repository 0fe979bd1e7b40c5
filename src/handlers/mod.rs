pub mod generate_handler;
pub mod health_handler;
pub mod history_handler;

use actix_web::web;

pub use generate_handler::generate_questions;
pub use health_handler::health_check;
pub use history_handler::{clear_history, delete_session, get_session, list_sessions, save_session};

/// Registers every route of the API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(generate_questions)
        .service(list_sessions)
        .service(get_session)
        .service(save_session)
        .service(delete_session)
        .service(clear_history);
}
