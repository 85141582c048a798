pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppState;
use crate::handlers::{
    sop::{
        create_sop, delete_sop, get_sop, get_sop_terminology, list_sops, retry_sop, sop_compliance_report, update_sop,
        update_sop_status, validate_sop, USER_ID_HEADER,
    },
    validation::{
        comprehensive_validation, content_compliance_report, extract_sop_sections, health_check, supported_frameworks,
        validate_content, validation_status,
    },
};
use crate::middleware::metrics::{metrics_handler, metrics_middleware};

pub fn create_app(state: AppState) -> Router {
    let cors_origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(cors_origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
        ]);

    Router::new()
        .nest(
            "/api/sops",
            Router::new()
                .route("/", post(create_sop).get(list_sops))
                .route("/:job_id", get(get_sop).put(update_sop).delete(delete_sop))
                .route("/:job_id/status", put(update_sop_status))
                .route("/:job_id/validate", post(validate_sop))
                .route("/:job_id/retry", post(retry_sop))
                .route("/:job_id/terminology", get(get_sop_terminology))
                .route("/:job_id/compliance-report", post(sop_compliance_report)),
        )
        .nest(
            "/api/validation",
            Router::new()
                .route("/validate", post(validate_content))
                .route("/compliance-report", post(content_compliance_report))
                .route("/comprehensive", post(comprehensive_validation))
                .route("/extract-sections", post(extract_sop_sections))
                .route("/status", get(validation_status))
                .route("/frameworks", get(supported_frameworks)),
        )
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum::middleware::from_fn(metrics_middleware)),
        )
}
