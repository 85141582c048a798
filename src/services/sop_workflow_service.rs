/// SOP job orchestration
/// Owns the job lifecycle: creation, background generation, validation,
/// retries, review transitions and compliance reports.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::middleware::error_handling::{AppError, Result};
use crate::middleware::metrics;
use crate::models::compliance::ComplianceReport;
use crate::models::sop::{CreateSopRequest, SopRecord, SopSearchFilters, SopStatus, UpdateSopRequest};
use crate::models::validation::{TerminologyMatch, ValidationResponse};
use crate::repositories::SopRepository;
use crate::services::audit_service::AuditService;
use crate::services::llm_client::{GenerationRequest, GenerationStatus, SopTextGenerator};
use crate::services::regulatory_checker::RegulatoryChecker;
use crate::services::validation_service::SopValidationService;

pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct SopWorkflowService {
    repository: Arc<dyn SopRepository>,
    generator: Arc<dyn SopTextGenerator>,
    validator: Arc<SopValidationService>,
    checker: Arc<RegulatoryChecker>,
    audit: AuditService,
    max_retry_attempts: u32,
}

impl SopWorkflowService {
    pub fn new(
        repository: Arc<dyn SopRepository>,
        generator: Arc<dyn SopTextGenerator>,
        validator: Arc<SopValidationService>,
        checker: Arc<RegulatoryChecker>,
        audit: AuditService,
    ) -> Self {
        Self {
            repository,
            generator,
            validator,
            checker,
            audit,
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
        }
    }

    pub fn with_max_retry_attempts(mut self, max_retry_attempts: u32) -> Self {
        self.max_retry_attempts = max_retry_attempts;
        self
    }

    /// Store a new pending job and start generating it in the background
    pub async fn create_job(&self, request: CreateSopRequest, user_id: &str) -> Result<SopRecord> {
        let record = self.submit_job(request, user_id).await?;
        self.spawn_generation(record.job_id.clone());
        Ok(record)
    }

    /// Store a new pending job without starting generation
    pub async fn submit_job(&self, request: CreateSopRequest, user_id: &str) -> Result<SopRecord> {
        let job_id = Uuid::new_v4().to_string();
        let record = SopRecord::new(job_id, request, user_id.to_string());
        self.repository.insert(&record).await?;

        tracing::info!(job_id = %record.job_id, user_id = %user_id, "SOP generation job created: {}", record.title);
        self.audit
            .log_sop_created(user_id, &record.job_id, &record.title, &record.regulatory_frameworks)
            .await;

        Ok(record)
    }

    fn spawn_generation(&self, job_id: String) {
        let workflow = self.clone();
        tokio::spawn(async move {
            if let Err(e) = workflow.run_generation(&job_id).await {
                tracing::error!(job_id = %job_id, "SOP generation task failed: {}", e);
            }
        });
    }

    /// Generate, parse and validate one pending job
    pub async fn run_generation(&self, job_id: &str) -> Result<SopRecord> {
        let mut record = self.load(job_id).await?;
        advance_status(&mut record, SopStatus::Processing)?;
        self.repository.update(&record).await?;

        let request = GenerationRequest::from_record(&record);
        let outcome = self.generator.generate(&request).await;

        record.model_used = Some(outcome.model_used.clone());
        record.generation_time_seconds = Some(outcome.generation_time_seconds);

        match (outcome.status, outcome.sop_content) {
            (GenerationStatus::Completed, Some(content)) => {
                let result = self.validator.validate_content(&content, &record.regulatory_frameworks);
                record.sop_content = Some(content);
                record.content_quality_score = outcome.quality_score;
                record.error_message = None;
                record.apply_validation(&result);
                advance_status(&mut record, SopStatus::Completed)?;
                record.completed_at = Some(Utc::now());
                self.repository.update(&record).await?;

                self.audit.log_validation("system", job_id, &result).await;
            }
            _ => {
                let message = outcome
                    .error_message
                    .unwrap_or_else(|| "SOP generation produced no content".to_string());
                record.error_message = Some(message);
                record.retry_count += 1;
                advance_status(&mut record, SopStatus::Failed)?;
                self.repository.update(&record).await?;
            }
        }

        metrics::record_generation_job(record.status);
        self.audit
            .log_generation_finished(
                job_id,
                record.status,
                &outcome.model_used,
                outcome.generation_time_seconds,
                record.error_message.as_deref(),
            )
            .await;

        Ok(record)
    }

    pub async fn get_job(&self, job_id: &str) -> Result<SopRecord> {
        self.load(job_id).await
    }

    pub async fn list_jobs(&self, filters: &SopSearchFilters) -> Result<Vec<SopRecord>> {
        self.repository.list(filters).await
    }

    /// Re-run the scorer on stored content; the new result replaces the old one.
    /// Only the validation snapshot is written, so a concurrent status change survives.
    pub async fn validate_job(&self, job_id: &str, user_id: &str) -> Result<ValidationResponse> {
        let record = self.load(job_id).await?;
        let content = match (&record.sop_content, record.status.has_content()) {
            (Some(content), true) => content.clone(),
            _ => {
                return Err(AppError::Conflict(format!(
                    "SOP job {} has no generated content to validate (status: {})",
                    job_id, record.status
                )))
            }
        };

        let (result, breakdown) =
            self.validator
                .validate_with_breakdown(&content.sections, &content.full_text, &record.regulatory_frameworks);
        self.repository.update_validation(job_id, &result).await?;

        self.audit.log_validation(user_id, job_id, &result).await;
        Ok(ValidationResponse { result, breakdown })
    }

    pub async fn retry_job(&self, job_id: &str, user_id: &str) -> Result<SopRecord> {
        let max_retry_attempts = self.max_retry_attempts;
        let record = self
            .repository
            .modify(
                job_id,
                Box::new(move |record: &mut SopRecord| {
                    if record.status != SopStatus::Failed {
                        return Err(AppError::Conflict(format!(
                            "Only failed SOP jobs can be retried (status: {})",
                            record.status
                        )));
                    }
                    if record.retry_count >= max_retry_attempts {
                        return Err(AppError::Conflict(format!(
                            "Maximum retry attempts ({}) exceeded",
                            max_retry_attempts
                        )));
                    }
                    advance_status(record, SopStatus::Pending)?;
                    record.error_message = None;
                    Ok(())
                }),
            )
            .await?;

        self.audit.log_retry(user_id, job_id, record.retry_count).await;
        self.spawn_generation(record.job_id.clone());
        Ok(record)
    }

    /// Reviewer-driven status change. Approval needs a passing latest validation.
    pub async fn transition(&self, job_id: &str, target: SopStatus, user_id: &str) -> Result<SopRecord> {
        if !matches!(target, SopStatus::UnderReview | SopStatus::Approved | SopStatus::Rejected) {
            return Err(AppError::BadRequest(format!(
                "Status {} cannot be set manually",
                target
            )));
        }

        let mut from = None;
        let record = self
            .repository
            .modify(
                job_id,
                Box::new(|record: &mut SopRecord| {
                    if target == SopStatus::Approved {
                        let passing = record.latest_validation.as_ref().map_or(false, |v| v.is_valid);
                        if !passing {
                            return Err(AppError::Conflict(
                                "SOP cannot be approved without a passing validation".to_string(),
                            ));
                        }
                    }
                    from = Some(record.status);
                    advance_status(record, target)
                }),
            )
            .await?;

        if let Some(from) = from {
            self.audit.log_status_change(user_id, job_id, from, target).await;
        }
        Ok(record)
    }

    /// Edit title, description, priority or department under change control
    pub async fn update_metadata(&self, job_id: &str, update: UpdateSopRequest, user_id: &str) -> Result<SopRecord> {
        if update.is_empty() {
            return Err(AppError::BadRequest("No SOP fields to update".to_string()));
        }

        let mut old_values = serde_json::Value::Null;
        let record = self
            .repository
            .modify(
                job_id,
                Box::new(|record: &mut SopRecord| {
                    old_values = record.apply_metadata(&update);
                    Ok(())
                }),
            )
            .await?;

        tracing::info!(job_id = %job_id, user_id = %user_id, "SOP metadata updated under change control");
        let new_values = serde_json::to_value(&update)?;
        self.audit
            .log_metadata_update(user_id, job_id, &record.title, old_values, new_values)
            .await;
        Ok(record)
    }

    /// Remove a job. The critical audit entry is written before the record goes.
    pub async fn delete_job(&self, job_id: &str, user_id: &str) -> Result<SopRecord> {
        let record = self.load(job_id).await?;
        self.audit.log_deletion(user_id, &record).await;

        let removed = self.repository.delete(job_id).await?;
        tracing::warn!(job_id = %job_id, user_id = %user_id, "SOP deleted: {}", removed.title);
        Ok(removed)
    }

    pub async fn compliance_report(
        &self,
        job_id: &str,
        metadata: BTreeMap<String, serde_json::Value>,
        user_id: &str,
    ) -> Result<ComplianceReport> {
        let record = self.load(job_id).await?;
        let content = record.sop_content.as_ref().ok_or_else(|| {
            AppError::Conflict(format!("SOP job {} has no generated content", job_id))
        })?;

        let mut metadata = metadata;
        metadata
            .entry("title".to_string())
            .or_insert_with(|| serde_json::Value::String(record.title.clone()));
        metadata
            .entry("job_id".to_string())
            .or_insert_with(|| serde_json::Value::String(record.job_id.clone()));

        let report = self.checker.generate_compliance_report(
            &content.full_text,
            &content.sections,
            &record.regulatory_frameworks,
            metadata,
        );

        self.audit
            .log_compliance_report(user_id, job_id, &report.report_id, report.overall_compliance.is_compliant)
            .await;
        Ok(report)
    }

    pub async fn terminology(&self, job_id: &str) -> Result<Vec<TerminologyMatch>> {
        let record = self.load(job_id).await?;
        Ok(record
            .sop_content
            .as_ref()
            .map(|content| self.validator.matched_terminology(&content.full_text))
            .unwrap_or_default())
    }

    async fn load(&self, job_id: &str) -> Result<SopRecord> {
        self.repository
            .get(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("SOP job {} not found", job_id)))
    }

}

fn advance_status(record: &mut SopRecord, next: SopStatus) -> Result<()> {
    if !record.status.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "Cannot move SOP from {} to {}",
            record.status, next
        )));
    }
    tracing::info!(job_id = %record.job_id, from = %record.status, to = %next, "SOP status transition");
    record.status = next;
    record.updated_at = Some(Utc::now());
    Ok(())
}
