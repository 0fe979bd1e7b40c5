use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use studygen_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if let Err(e) = config.validate_for_production() {
        log::error!("{}", e);
        return Err(std::io::Error::other(e.to_string()));
    }

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = AppState::new(config.clone())
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let data = web::Data::new(state);

    log::info!(
        "Starting server at http://{}:{} (model {}, env {})",
        config.web_server_host,
        config.web_server_port,
        config.llm_model,
        config.app_env
    );

    let frontend_url = config.frontend_url.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers(vec![header::HeaderName::from_static(
                studygen_server::middleware::REQUEST_ID_HEADER,
            )])
            .max_age(3600);

        App::new()
            .app_data(data.clone())
            .wrap(RequestIdMiddleware)
            .wrap(Logger::default())
            .wrap(cors)
            .configure(handlers::configure)
    })
    .bind((config.web_server_host.as_str(), config.web_server_port))?
    .run()
    .await
}
