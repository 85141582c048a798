use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::validation::ValidationResult;

/// Lifecycle of one SOP generation job.
///
/// ```text
/// Pending -> Processing -> Completed -> UnderReview -> Approved | Rejected
///                       \-> Failed -> Pending (retry)   \-> Approved | Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SopStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    UnderReview,
    Approved,
    Rejected,
}

impl SopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SopStatus::Pending => "pending",
            SopStatus::Processing => "processing",
            SopStatus::Completed => "completed",
            SopStatus::Failed => "failed",
            SopStatus::UnderReview => "under_review",
            SopStatus::Approved => "approved",
            SopStatus::Rejected => "rejected",
        }
    }

    pub fn can_transition_to(&self, next: SopStatus) -> bool {
        use SopStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Completed, UnderReview)
                | (Completed, Approved)
                | (Completed, Rejected)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (Failed, Pending)
        )
    }

    /// Generated content exists and may be re-validated
    pub fn has_content(&self) -> bool {
        matches!(
            self,
            SopStatus::Completed | SopStatus::UnderReview | SopStatus::Approved | SopStatus::Rejected
        )
    }
}

impl fmt::Display for SopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SopStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SopStatus::Pending),
            "processing" => Ok(SopStatus::Processing),
            "completed" => Ok(SopStatus::Completed),
            "failed" => Ok(SopStatus::Failed),
            "under_review" => Ok(SopStatus::UnderReview),
            "approved" => Ok(SopStatus::Approved),
            "rejected" => Ok(SopStatus::Rejected),
            other => Err(format!("Unknown SOP status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SopPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PharmaceuticalDepartment {
    #[default]
    Production,
    QualityControl,
    QualityAssurance,
    RegulatoryAffairs,
    Manufacturing,
    Packaging,
    Warehouse,
    Maintenance,
}

impl PharmaceuticalDepartment {
    pub fn as_str(&self) -> &'static str {
        match self {
            PharmaceuticalDepartment::Production => "production",
            PharmaceuticalDepartment::QualityControl => "quality_control",
            PharmaceuticalDepartment::QualityAssurance => "quality_assurance",
            PharmaceuticalDepartment::RegulatoryAffairs => "regulatory_affairs",
            PharmaceuticalDepartment::Manufacturing => "manufacturing",
            PharmaceuticalDepartment::Packaging => "packaging",
            PharmaceuticalDepartment::Warehouse => "warehouse",
            PharmaceuticalDepartment::Maintenance => "maintenance",
        }
    }
}

/// Generated SOP text plus its extracted sections. Never mutated after parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SopContent {
    pub full_text: String,
    pub sections: BTreeMap<String, String>,
    pub word_count: usize,
    pub section_count: usize,
}

/// Persisted SOP job. The latest validation overwrites the previous snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopRecord {
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub department: PharmaceuticalDepartment,
    pub priority: SopPriority,
    pub regulatory_frameworks: Vec<String>,
    pub template_content: Option<String>,
    pub guideline_content: Option<String>,
    pub status: SopStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub sop_content: Option<SopContent>,
    pub compliance_score: Option<f64>,
    pub gmp_compliance_indicators: Option<BTreeMap<String, bool>>,
    pub validation_errors: Vec<String>,
    pub latest_validation: Option<ValidationResult>,
    pub content_quality_score: Option<f64>,
    pub model_used: Option<String>,
    pub generation_time_seconds: Option<f64>,
    pub error_message: Option<String>,
    pub retry_count: u32,
}

impl SopRecord {
    pub fn new(job_id: String, request: CreateSopRequest, created_by: String) -> Self {
        Self {
            job_id,
            title: request.title,
            description: request.description,
            department: request.department,
            priority: request.priority,
            regulatory_frameworks: request.regulatory_frameworks,
            template_content: request.template_content,
            guideline_content: request.guideline_content,
            status: SopStatus::Pending,
            created_by,
            created_at: Utc::now(),
            updated_at: None,
            completed_at: None,
            sop_content: None,
            compliance_score: None,
            gmp_compliance_indicators: None,
            validation_errors: Vec::new(),
            latest_validation: None,
            content_quality_score: None,
            model_used: None,
            generation_time_seconds: None,
            error_message: None,
            retry_count: 0,
        }
    }

    /// Store a fresh validation snapshot, replacing whatever was there
    pub fn apply_validation(&mut self, result: &ValidationResult) {
        self.compliance_score = Some(result.compliance_score);
        self.gmp_compliance_indicators = Some(result.gmp_compliance_indicators.clone());
        self.validation_errors = if result.is_valid {
            Vec::new()
        } else {
            result.validation_errors.clone()
        };
        self.latest_validation = Some(result.clone());
        self.updated_at = Some(Utc::now());
    }

    /// Apply the supplied metadata fields and return the previous values
    pub fn apply_metadata(&mut self, update: &UpdateSopRequest) -> serde_json::Value {
        let old_values = serde_json::json!({
            "title": self.title,
            "description": self.description,
            "status": self.status,
            "priority": self.priority,
            "department": self.department,
        });

        if let Some(ref title) = update.title {
            self.title = title.clone();
        }
        if let Some(ref description) = update.description {
            self.description = description.clone();
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(department) = update.department {
            self.department = department;
        }
        self.updated_at = Some(Utc::now());

        old_values
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSopRequest {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: String,
    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub description: String,
    #[serde(default)]
    pub department: PharmaceuticalDepartment,
    #[serde(default)]
    pub priority: SopPriority,
    #[serde(default)]
    pub regulatory_frameworks: Vec<String>,
    pub template_content: Option<String>,
    pub guideline_content: Option<String>,
}

/// Metadata edit under change control. Status changes go through the status endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSopRequest {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<SopPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<PharmaceuticalDepartment>,
}

impl UpdateSopRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.priority.is_none() && self.department.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: SopStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct SopSearchFilters {
    pub status: Option<SopStatus>,
    pub created_by: Option<String>,
    pub min_compliance_score: Option<f64>,
    pub limit: Option<usize>,
}

impl SopSearchFilters {
    pub fn matches(&self, record: &SopRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(ref created_by) = self.created_by {
            if &record.created_by != created_by {
                return false;
            }
        }
        if let Some(min_score) = self.min_compliance_score {
            if record.compliance_score.map_or(true, |score| score < min_score) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SopJobCreated {
    pub job_id: String,
    pub status: SopStatus,
    pub message: String,
    pub regulatory_frameworks: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SopDeleted {
    pub job_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SopRetryResponse {
    pub job_id: String,
    pub status: SopStatus,
    pub retry_count: u32,
    pub message: String,
}
