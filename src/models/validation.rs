use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one compliance-scoring run. Built fresh on every call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub compliance_score: f64,
    pub validation_errors: Vec<String>,
    pub missing_sections: Vec<String>,
    pub regulatory_issues: Vec<String>,
    pub gmp_compliance_indicators: BTreeMap<String, bool>,
    pub recommendations: Vec<String>,
}

impl ValidationResult {
    /// Result returned when scoring itself could not complete
    pub fn system_failure(reason: impl std::fmt::Display) -> Self {
        Self {
            is_valid: false,
            compliance_score: 0.0,
            validation_errors: vec![format!("Validation system error: {}", reason)],
            missing_sections: Vec::new(),
            regulatory_issues: Vec::new(),
            gmp_compliance_indicators: BTreeMap::new(),
            recommendations: vec!["Contact system administrator - validation service error".to_string()],
        }
    }
}

/// The four weighted sub-scores behind a `ValidationResult`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValidationBreakdown {
    pub section_score: f64,
    pub regulatory_score: f64,
    pub terminology_score: f64,
    pub gmp_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerminologyMatch {
    pub term: String,
    pub definition: String,
    pub regulatory_source: String,
    pub category: String,
    pub is_approved: bool,
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationServiceStatus {
    pub status: String,
    pub regulatory_frameworks: Vec<String>,
    pub terminology_database_size: usize,
    pub gmp_indicators_count: usize,
    pub validation_capabilities: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// Stateless validation request. Sections are extracted from the text when omitted.
/// Length is bounded by the configured maximum SOP length.
#[derive(Debug, Deserialize)]
pub struct ValidateContentRequest {
    pub full_text: String,
    pub sections: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub frameworks: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractSectionsRequest {
    pub full_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub result: ValidationResult,
    pub breakdown: Option<ValidationBreakdown>,
}
