use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-framework result of the pattern-based check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameworkComplianceResult {
    pub framework: String,
    pub framework_name: String,
    pub jurisdiction: String,
    pub compliance_score: f64,
    pub pattern_score: f64,
    pub element_score: f64,
    pub documentation_score: f64,
    pub matched_patterns: Vec<String>,
    pub matched_elements: Vec<String>,
    pub matched_documentation: Vec<String>,
    pub missing_requirements: Vec<String>,
    pub compliant: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegulatoryComplianceResult {
    pub overall_compliant: bool,
    pub compliance_score: f64,
    pub framework_results: Vec<FrameworkComplianceResult>,
    pub missing_requirements: Vec<String>,
    pub recommendations: Vec<String>,
    pub checked_frameworks: Vec<String>,
    pub document_type: String,
    pub check_timestamp: DateTime<Utc>,
}

/// ALCOA+ data integrity assessment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataIntegrityResult {
    pub data_integrity_score: f64,
    pub matched_principles: Vec<String>,
    pub missing_principles: Vec<String>,
    pub total_principles: usize,
    pub compliant: bool,
    pub alcoa_plus_ready: bool,
}

/// 21 CFR Part 11 electronic records assessment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElectronicRecordsResult {
    pub electronic_records_score: f64,
    pub pattern_score: f64,
    pub requirement_score: f64,
    pub matched_patterns: Vec<String>,
    pub matched_requirements: Vec<String>,
    pub missing_requirements: Vec<String>,
    pub cfr_part_11_compliant: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleComplianceResult {
    pub rule_name: String,
    pub compliance_score: f64,
    pub requirement_score: f64,
    pub pattern_score: f64,
    pub matched_requirements: Vec<String>,
    pub matched_patterns: Vec<String>,
    pub missing_requirements: Vec<String>,
    pub compliant: bool,
    pub critical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentQualityMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub has_numbered_steps: bool,
    pub has_bullet_points: bool,
    pub has_headers: bool,
    pub has_tables: bool,
    pub professional_language_score: f64,
    pub adequate_length: bool,
    pub well_structured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentQualityAssessment {
    pub quality_score: f64,
    pub metrics: ContentQualityMetrics,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionCompletenessResult {
    pub completeness_score: f64,
    pub present_sections: Vec<String>,
    pub missing_sections: Vec<String>,
    pub incomplete_sections: Vec<String>,
    pub total_required_sections: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverallCompliance {
    pub is_compliant: bool,
    pub compliance_score: f64,
    pub critical_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Secondary, stricter compliance report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub document_metadata: BTreeMap<String, serde_json::Value>,
    pub frameworks_checked: Vec<String>,
    pub overall_compliance: OverallCompliance,
    pub regulatory_compliance: RegulatoryComplianceResult,
    pub data_integrity: DataIntegrityResult,
    pub electronic_records: ElectronicRecordsResult,
    pub change_control: RuleComplianceResult,
    pub deviation_management: RuleComplianceResult,
    pub qualification_validation: RuleComplianceResult,
    pub content_quality: ContentQualityAssessment,
    pub section_completeness: SectionCompletenessResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportedFramework {
    pub key: String,
    pub name: String,
    pub jurisdiction: String,
    pub scope: String,
    pub element_count: usize,
    pub documentation_requirements: usize,
    pub pattern_count: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct ComplianceReportRequest {
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ContentComplianceRequest {
    pub full_text: String,
    pub sections: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

// ============================================================================
// Comprehensive validation
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoundTerm {
    pub term: String,
    pub definition: String,
    pub category: String,
    pub regulatory_source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerminologyAssessment {
    pub terminology_score: f64,
    pub found_terms: Vec<FoundTerm>,
    pub missing_critical_terms: Vec<String>,
    pub total_pharmaceutical_terms: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameworkPatternResult {
    pub framework: String,
    pub score: f64,
    pub matched_patterns: Vec<String>,
    pub total_patterns: usize,
    pub compliant: bool,
}

/// Reference-pattern coverage. Unknown frameworks still count in the average.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternComplianceResult {
    pub overall_compliance_score: f64,
    pub framework_results: Vec<FrameworkPatternResult>,
    pub frameworks_evaluated: usize,
    pub compliant_frameworks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GmpCategoryResult {
    pub category: String,
    pub description: String,
    pub score: f64,
    pub weight: f64,
    pub weighted_score: f64,
    pub matched_keywords: Vec<String>,
    pub total_keywords: usize,
    pub compliant: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GmpRequirementsResult {
    pub gmp_compliance_score: f64,
    pub category_results: Vec<GmpCategoryResult>,
    pub compliant_categories: usize,
    pub total_categories: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ComprehensiveScoreSummary {
    pub terminology_score: f64,
    pub regulatory_score: f64,
    pub gmp_score: f64,
    pub completeness_score: f64,
    pub quality_score: f64,
    pub overall_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComprehensiveValidationDetails {
    pub terminology: TerminologyAssessment,
    pub regulatory_compliance: PatternComplianceResult,
    pub gmp_compliance: GmpRequirementsResult,
    pub section_completeness: SectionCompletenessResult,
    pub content_quality: ContentQualityAssessment,
}

/// Five-part validation combining terminology, reference patterns, GMP
/// requirements, section completeness and content quality
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComprehensiveValidation {
    pub is_valid: bool,
    pub overall_score: f64,
    pub validation_timestamp: DateTime<Utc>,
    pub summary: ComprehensiveScoreSummary,
    pub detailed_results: ComprehensiveValidationDetails,
    pub recommendations: Vec<String>,
}
