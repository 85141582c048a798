/// GMP audit trail for SOP jobs
/// Creations, edits, deletions, generations, validations, status changes and
/// reports are all recorded through an `AuditSink`. Sinks never fail the caller.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::models::audit::{AuditAction, AuditEvent, AuditSeverity};
use crate::models::sop::{SopRecord, SopStatus};
use crate::models::validation::ValidationResult;

const SOP_RESOURCE: &str = "sop";

pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent) -> BoxFuture<'_, ()>;
}

/// Writes each event as a structured `audit` log line
#[derive(Debug, Default, Clone)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            tracing::info!(
                target: "audit",
                event_id = %event.id,
                user_id = %event.user_id,
                action = event.action.as_str(),
                resource_type = %event.resource_type,
                resource_id = %event.resource_id,
                severity = ?event.severity,
                checksum = %event.checksum,
                "{}",
                event.description
            );
        })
    }
}

/// Keeps events in memory; used by tests and single-node deployments without a database
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditSink {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }

    pub async fn events_for(&self, resource_id: &str) -> Vec<AuditEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.resource_id == resource_id)
            .cloned()
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.events.write().await.push(event);
        })
    }
}

/// Domain-level audit helpers over a sink
#[derive(Clone)]
pub struct AuditService {
    sink: Arc<dyn AuditSink>,
}

impl AuditService {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub async fn log_sop_created(&self, user_id: &str, job_id: &str, title: &str, frameworks: &[String]) {
        let event = AuditEvent::new(user_id, AuditAction::Create, SOP_RESOURCE, job_id, format!("SOP generation requested: {}", title))
            .with_details(serde_json::json!({
                "title": title,
                "regulatory_frameworks": frameworks,
            }));
        self.sink.record(event).await;
    }

    pub async fn log_generation_finished(
        &self,
        job_id: &str,
        status: SopStatus,
        model_used: &str,
        generation_time_seconds: f64,
        error_message: Option<&str>,
    ) {
        let severity = if status == SopStatus::Failed {
            AuditSeverity::Error
        } else {
            AuditSeverity::Info
        };
        let event = AuditEvent::new("system", AuditAction::Generate, SOP_RESOURCE, job_id, format!("SOP generation {}", status))
            .with_severity(severity)
            .with_details(serde_json::json!({
                "status": status,
                "model_used": model_used,
                "generation_time_seconds": generation_time_seconds,
                "error_message": error_message,
            }));
        self.sink.record(event).await;
    }

    /// Recorded on every validation run, automatic or on demand
    pub async fn log_validation(&self, user_id: &str, job_id: &str, result: &ValidationResult) {
        let severity = if result.is_valid {
            AuditSeverity::Info
        } else {
            AuditSeverity::Warning
        };
        let event = AuditEvent::new(
            user_id,
            AuditAction::Validate,
            SOP_RESOURCE,
            job_id,
            format!("SOP validated with compliance score {:.2}", result.compliance_score),
        )
        .with_severity(severity)
        .with_details(serde_json::json!({
            "compliance_score": result.compliance_score,
            "is_valid": result.is_valid,
            "validation_errors": result.validation_errors.len(),
            "missing_sections": result.missing_sections,
            "regulatory_issues": result.regulatory_issues.len(),
        }));
        self.sink.record(event).await;
    }

    pub async fn log_status_change(&self, user_id: &str, job_id: &str, from: SopStatus, to: SopStatus) {
        let action = match to {
            SopStatus::Approved => AuditAction::Approve,
            SopStatus::Rejected => AuditAction::Reject,
            SopStatus::UnderReview => AuditAction::Review,
            _ => AuditAction::Update,
        };
        let event = AuditEvent::new(user_id, action, SOP_RESOURCE, job_id, format!("SOP status changed from {} to {}", from, to))
            .with_details(serde_json::json!({ "from": from, "to": to }));
        self.sink.record(event).await;
    }

    /// Change-control record of a metadata edit with the values before and after
    pub async fn log_metadata_update(
        &self,
        user_id: &str,
        job_id: &str,
        title: &str,
        old_values: serde_json::Value,
        new_values: serde_json::Value,
    ) {
        let event = AuditEvent::new(user_id, AuditAction::Update, SOP_RESOURCE, job_id, format!("Updated SOP: {}", title))
            .with_details(serde_json::json!({
                "regulatory_impact": "Change control - SOP modification",
                "old_values": old_values,
                "new_values": new_values,
            }));
        self.sink.record(event).await;
    }

    /// Written before the record is removed
    pub async fn log_deletion(&self, user_id: &str, record: &SopRecord) {
        let event = AuditEvent::new(
            user_id,
            AuditAction::Delete,
            SOP_RESOURCE,
            &record.job_id,
            format!("Deleted SOP: {}", record.title),
        )
        .with_severity(AuditSeverity::Critical)
        .with_details(serde_json::json!({
            "regulatory_impact": "Critical - SOP deletion requires investigation",
            "old_values": {
                "title": record.title,
                "description": record.description,
                "status": record.status,
                "created_by": record.created_by,
                "created_at": record.created_at.to_rfc3339(),
                "department": record.department,
            },
        }));
        self.sink.record(event).await;
    }

    pub async fn log_retry(&self, user_id: &str, job_id: &str, retry_count: u32) {
        let event = AuditEvent::new(user_id, AuditAction::Retry, SOP_RESOURCE, job_id, "SOP generation retry requested")
            .with_details(serde_json::json!({ "retry_count": retry_count }));
        self.sink.record(event).await;
    }

    pub async fn log_compliance_report(&self, user_id: &str, job_id: &str, report_id: &str, is_compliant: bool) {
        let event = AuditEvent::new(user_id, AuditAction::Report, SOP_RESOURCE, job_id, format!("Compliance report {} generated", report_id))
            .with_details(serde_json::json!({
                "report_id": report_id,
                "is_compliant": is_compliant,
            }));
        self.sink.record(event).await;
    }
}
