use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use validator::Validate;

use crate::{
    config::AppState,
    middleware::error_handling::{AppError, Result},
    models::{
        compliance::{ComplianceReport, ComplianceReportRequest},
        sop::{
            CreateSopRequest, SopDeleted, SopJobCreated, SopRecord, SopRetryResponse, SopSearchFilters, UpdateSopRequest,
            UpdateStatusRequest,
        },
        validation::{TerminologyMatch, ValidationResponse},
    },
};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity from `X-User-Id`, `anonymous` when absent
pub fn caller_id(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

pub async fn create_sop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateSopRequest>,
) -> Result<(StatusCode, Json<SopJobCreated>)> {
    request.validate().map_err(AppError::Validation)?;

    let record = state.workflow.create_job(request, &caller_id(&headers)).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SopJobCreated {
            job_id: record.job_id,
            status: record.status,
            message: "SOP generation job created".to_string(),
            regulatory_frameworks: record.regulatory_frameworks,
        }),
    ))
}

pub async fn list_sops(
    State(state): State<AppState>,
    Query(filters): Query<SopSearchFilters>,
) -> Result<Json<Vec<SopRecord>>> {
    let records = state.workflow.list_jobs(&filters).await?;
    Ok(Json(records))
}

pub async fn get_sop(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<SopRecord>> {
    let record = state.workflow.get_job(&job_id).await?;
    Ok(Json(record))
}

pub async fn update_sop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateSopRequest>,
) -> Result<Json<SopRecord>> {
    request.validate().map_err(AppError::Validation)?;

    let record = state
        .workflow
        .update_metadata(&job_id, request, &caller_id(&headers))
        .await?;
    Ok(Json(record))
}

pub async fn delete_sop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<SopDeleted>> {
    let record = state.workflow.delete_job(&job_id, &caller_id(&headers)).await?;
    Ok(Json(SopDeleted {
        job_id: record.job_id,
        message: "SOP deleted successfully".to_string(),
    }))
}

pub async fn update_sop_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<SopRecord>> {
    let record = state
        .workflow
        .transition(&job_id, request.status, &caller_id(&headers))
        .await?;
    Ok(Json(record))
}

pub async fn validate_sop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<ValidationResponse>> {
    let response = state.workflow.validate_job(&job_id, &caller_id(&headers)).await?;
    Ok(Json(response))
}

pub async fn retry_sop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<SopRetryResponse>> {
    let record = state.workflow.retry_job(&job_id, &caller_id(&headers)).await?;
    Ok(Json(SopRetryResponse {
        job_id: record.job_id,
        status: record.status,
        retry_count: record.retry_count,
        message: "SOP generation restarted".to_string(),
    }))
}

pub async fn get_sop_terminology(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Vec<TerminologyMatch>>> {
    let terms = state.workflow.terminology(&job_id).await?;
    Ok(Json(terms))
}

pub async fn sop_compliance_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Json(request): Json<ComplianceReportRequest>,
) -> Result<Json<ComplianceReport>> {
    let report = state
        .workflow
        .compliance_report(&job_id, request.metadata, &caller_id(&headers))
        .await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_caller_id_defaults_to_anonymous() {
        let mut headers = HeaderMap::new();
        assert_eq!(caller_id(&headers), "anonymous");

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        assert_eq!(caller_id(&headers), "anonymous");

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("qa.lead"));
        assert_eq!(caller_id(&headers), "qa.lead");
    }
}
