#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for hotel safety analysis.
//!
//! Exposes `POST /api/analyze`, which runs the full analysis pipeline for
//! one venue and returns the report as JSON, `GET /api/health`, and a bare
//! `GET /health` liveness probe.
//! Requests are independent; the shared [`Analyzer`] holds no per-request
//! state.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use hotel_safety_analyzer::Analyzer;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default port.
pub const DEFAULT_PORT: u16 = 5001;

/// Shared application state.
pub struct AppState {
    /// Analysis pipeline shared by all requests.
    pub analyzer: Analyzer,
}

/// Registers the `/api` routes and the unprefixed `/health` probe.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::status)).service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(handlers::json_error))
            .route("/health", web::get().to(handlers::health))
            .route("/analyze", web::post().to(handlers::analyze)),
    );
}

/// Bind address and port from `BIND_ADDR` and `PORT`.
#[must_use]
pub fn bind_from_env() -> (String, u16) {
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    (bind_addr, port)
}

/// Serves the API with an already-built analyzer.
///
/// # Errors
///
/// Returns an error if the server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn serve(analyzer: Analyzer, bind_addr: String, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(AppState { analyzer });

    log::info!(
        "Starting server on {bind_addr}:{port} (AI model: {})",
        state.analyzer.ai_model()
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

/// Starts the API server using configuration from the environment.
///
/// # Errors
///
/// Returns an error if the analyzer cannot be configured or the server
/// fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Configuring analyzer...");
    let analyzer = Analyzer::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;

    let (bind_addr, port) = bind_from_env();
    serve(analyzer, bind_addr, port).await
}
