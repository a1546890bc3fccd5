//! HTTP handler functions for the hotel safety API.

use actix_web::{HttpRequest, HttpResponse, error, web};
use hotel_safety_server_models::{AnalyzeRequest, ApiError, ApiHealth, ApiStatus};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /health`
pub async fn status() -> HttpResponse {
    HttpResponse::Ok().json(ApiStatus::healthy())
}

/// Rejects unreadable JSON bodies with a 400 in the [`ApiError`] shape.
pub fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected request body: {err}");
    let response =
        HttpResponse::BadRequest().json(ApiError::new(format!("Invalid request body: {err}")));
    error::InternalError::from_response(err, response).into()
}

/// `POST /api/analyze`
///
/// Runs a full analysis for `hotel_name`, biased toward `location` when
/// given. Returns the report on success, 400 when the name is missing and
/// 500 when the analysis fails.
pub async fn analyze(
    state: web::Data<AppState>,
    body: web::Json<AnalyzeRequest>,
) -> HttpResponse {
    let Some(query) = body.query() else {
        return HttpResponse::BadRequest().json(ApiError::new("Missing hotel_name"));
    };

    log::info!("Analyzing '{query}'");

    match state.analyzer.run(query, body.location.as_deref()).await {
        Ok(report) => {
            log::info!(
                "Analysis complete for '{}': {}/100 ({})",
                report.hotel_info.name,
                report.safety_score,
                report.verdict
            );
            HttpResponse::Ok().json(report)
        }
        Err(e) => {
            log::error!("Analysis of '{query}' failed: {e}");
            HttpResponse::InternalServerError().json(ApiError::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use hotel_safety_ai::providers::{AiSettings, DEFAULT_TIMEOUT, ProviderKind};
    use hotel_safety_analyzer::{Analyzer, AnalyzerConfig, DEFAULT_LOCATION};
    use hotel_safety_scoring::ScoringConfig;

    use crate::{AppState, configure};

    fn state() -> web::Data<AppState> {
        let config = AnalyzerConfig {
            serpapi_key: None,
            serpapi_base_url: None,
            overpass_url: Some("http://127.0.0.1:9/api/interpreter".to_string()),
            fetch_timeout: std::time::Duration::from_secs(1),
            ai: AiSettings {
                kind: ProviderKind::Gemini,
                api_key: None,
                model: "gemini-2.5-flash".to_string(),
                base_url: None,
                timeout: DEFAULT_TIMEOUT,
            },
            scoring: ScoringConfig::default(),
            default_location: DEFAULT_LOCATION.to_string(),
        };
        web::Data::new(AppState {
            analyzer: Analyzer::new(&config).unwrap(),
        })
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn missing_name_is_bad_request() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        for payload in [
            serde_json::json!({}),
            serde_json::json!({"hotel_name": ""}),
            serde_json::json!({"hotel_name": "   ", "location": "@18.5,73.9,14z"}),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/analyze")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Missing hotel_name");
        }
    }

    #[actix_web::test]
    async fn bare_health_reports_status() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!({"status": "healthy"}));
    }

    #[actix_web::test]
    async fn unreadable_body_is_bad_request_with_error_body() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let requests = [
            test::TestRequest::post()
                .uri("/api/analyze")
                .insert_header(("content-type", "text/plain"))
                .set_payload("hotel_name=Radisson")
                .to_request(),
            test::TestRequest::post()
                .uri("/api/analyze")
                .set_json(serde_json::json!({"hotel_name": 42}))
                .to_request(),
            test::TestRequest::post()
                .uri("/api/analyze")
                .insert_header(("content-type", "application/json"))
                .set_payload("{\"hotel_name\": ")
                .to_request(),
        ];

        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert!(
                body["error"]
                    .as_str()
                    .is_some_and(|e| e.starts_with("Invalid request body"))
            );
        }
    }

    #[actix_web::test]
    async fn pipeline_failure_is_server_error() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/analyze")
            .set_json(serde_json::json!({"hotel_name": "Radisson Blu Pune"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("SERPAPI_KEY"));
    }
}
