use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    config::AppState,
    middleware::error_handling::{AppError, Result},
    models::{
        compliance::{ComplianceReport, ComprehensiveValidation, ContentComplianceRequest, SupportedFramework},
        sop::SopContent,
        validation::{ExtractSectionsRequest, ValidateContentRequest, ValidationResponse, ValidationServiceStatus},
    },
    services::section_extractor::{extract_sections, parse_generated_sop},
};

fn ensure_within_limit(state: &AppState, text: &str) -> Result<()> {
    let length = text.chars().count();
    if length > state.config.max_sop_length {
        return Err(AppError::InvalidInput(format!(
            "SOP text is {} characters; the limit is {}",
            length, state.config.max_sop_length
        )));
    }
    Ok(())
}

/// Stateless scoring of caller-supplied SOP text
pub async fn validate_content(
    State(state): State<AppState>,
    Json(request): Json<ValidateContentRequest>,
) -> Result<Json<ValidationResponse>> {
    ensure_within_limit(&state, &request.full_text)?;

    let sections = request
        .sections
        .unwrap_or_else(|| extract_sections(&request.full_text));
    let (result, breakdown) = state
        .validator
        .validate_with_breakdown(&sections, &request.full_text, &request.frameworks);

    Ok(Json(ValidationResponse { result, breakdown }))
}

pub async fn content_compliance_report(
    State(state): State<AppState>,
    Json(request): Json<ContentComplianceRequest>,
) -> Result<Json<ComplianceReport>> {
    ensure_within_limit(&state, &request.full_text)?;

    let sections = request
        .sections
        .unwrap_or_else(|| extract_sections(&request.full_text));
    let report = state.checker.generate_compliance_report(
        &request.full_text,
        &sections,
        &request.frameworks,
        request.metadata,
    );
    Ok(Json(report))
}

/// Five-part comprehensive validation of caller-supplied SOP text
pub async fn comprehensive_validation(
    State(state): State<AppState>,
    Json(request): Json<ValidateContentRequest>,
) -> Result<Json<ComprehensiveValidation>> {
    ensure_within_limit(&state, &request.full_text)?;

    let sections = request
        .sections
        .unwrap_or_else(|| extract_sections(&request.full_text));
    let result = state
        .pharmaceutical_validator
        .comprehensive_validation(&request.full_text, &sections, &request.frameworks);
    Ok(Json(result))
}

pub async fn extract_sop_sections(
    State(state): State<AppState>,
    Json(request): Json<ExtractSectionsRequest>,
) -> Result<Json<SopContent>> {
    ensure_within_limit(&state, &request.full_text)?;
    Ok(Json(parse_generated_sop(&request.full_text)))
}

pub async fn validation_status(State(state): State<AppState>) -> Json<ValidationServiceStatus> {
    Json(state.validator.service_status())
}

pub async fn supported_frameworks(State(state): State<AppState>) -> Json<Vec<SupportedFramework>> {
    Json(state.checker.supported_frameworks())
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "sop-author",
        "timestamp": Utc::now(),
    }))
}
