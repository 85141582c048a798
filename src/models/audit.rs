use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Validate,
    Review,
    Approve,
    Reject,
    Retry,
    Generate,
    Report,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Validate => "validate",
            AuditAction::Review => "review",
            AuditAction::Approve => "approve",
            AuditAction::Reject => "reject",
            AuditAction::Retry => "retry",
            AuditAction::Generate => "generate",
            AuditAction::Report => "report",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Immutable audit trail entry with a SHA-256 checksum over its identifying fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub severity: AuditSeverity,
    pub description: String,
    pub gmp_relevance: bool,
    pub details: serde_json::Value,
    pub checksum: String,
}

impl AuditEvent {
    pub fn new(
        user_id: &str,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        description: impl Into<String>,
    ) -> Self {
        let mut event = Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user_id: user_id.to_string(),
            action,
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            severity: AuditSeverity::Info,
            description: description.into(),
            gmp_relevance: true,
            details: serde_json::Value::Null,
            checksum: String::new(),
        };
        event.checksum = event.compute_checksum();
        event
    }

    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self.checksum = self.compute_checksum();
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self.checksum = self.compute_checksum();
        self
    }

    pub fn compute_checksum(&self) -> String {
        let canonical = format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            self.id,
            self.timestamp.to_rfc3339(),
            self.user_id,
            self.action.as_str(),
            self.resource_type,
            self.resource_id,
            self.description,
            self.details,
        );
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }

    /// True when no checksummed field has changed since the event was built
    pub fn verify_checksum(&self) -> bool {
        self.checksum == self.compute_checksum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_detects_tampering() {
        let event = AuditEvent::new("qa.lead", AuditAction::Validate, "sop", "job-42", "Validated SOP")
            .with_details(serde_json::json!({ "compliance_score": 81.5 }));
        assert!(event.verify_checksum());
        assert_eq!(event.checksum.len(), 64);

        let mut tampered = event.clone();
        tampered.description = "Approved SOP".to_string();
        assert!(!tampered.verify_checksum());
    }
}
