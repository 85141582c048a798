/// Comprehensive pharmaceutical validation
/// Five weighted parts: terminology, regulatory reference patterns, GMP
/// requirement categories, section completeness and content quality

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use regex::{Regex, RegexBuilder};

use crate::models::compliance::{
    ComprehensiveScoreSummary, ComprehensiveValidation, ComprehensiveValidationDetails, FoundTerm,
    FrameworkPatternResult, GmpCategoryResult, GmpRequirementsResult, PatternComplianceResult,
    TerminologyAssessment,
};
use crate::services::content_quality::{assess_content_quality, check_section_completeness};
use crate::services::knowledge_base::{extended_terminology, KnowledgeBaseError, PharmaceuticalTerm, RegulatoryKnowledgeBase};

pub const TERMINOLOGY_WEIGHT: f64 = 0.20;
pub const REGULATORY_WEIGHT: f64 = 0.25;
pub const GMP_WEIGHT: f64 = 0.25;
pub const COMPLETENESS_WEIGHT: f64 = 0.20;
pub const QUALITY_WEIGHT: f64 = 0.10;

pub const VALIDITY_THRESHOLD: f64 = 70.0;
pub const MIN_TERMINOLOGY_SCORE: f64 = 50.0;
const FRAMEWORK_PATTERN_THRESHOLD: f64 = 50.0;
const GMP_CATEGORY_THRESHOLD: f64 = 30.0;
const REGULATORY_RECOMMENDATION_THRESHOLD: f64 = 70.0;

/// Terms every SOP is expected to use; the terminology score is measured against these
pub const CRITICAL_TERMS: [&str; 5] = ["gmp", "validation", "qualification", "batch", "deviation"];

/// GMP requirement category with its keywords and weight (weights sum to 100)
pub struct GmpRequirement {
    pub category: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    pub weight: f64,
}

pub const GMP_REQUIREMENTS: [GmpRequirement; 7] = [
    GmpRequirement {
        category: "personnel",
        description: "Personnel qualification and training requirements",
        keywords: &["training", "qualification", "competency", "authorization", "personnel"],
        weight: 15.0,
    },
    GmpRequirement {
        category: "facilities",
        description: "Facility design and environmental controls",
        keywords: &["facility", "building", "hvac", "environmental", "design"],
        weight: 10.0,
    },
    GmpRequirement {
        category: "equipment",
        description: "Equipment qualification and maintenance",
        keywords: &["equipment", "qualification", "calibration", "maintenance", "iq", "oq", "pq"],
        weight: 20.0,
    },
    GmpRequirement {
        category: "materials",
        description: "Material handling and control",
        keywords: &["material", "component", "raw material", "storage", "handling"],
        weight: 10.0,
    },
    GmpRequirement {
        category: "production",
        description: "Production procedures and controls",
        keywords: &["production", "manufacturing", "process", "procedure", "batch"],
        weight: 20.0,
    },
    GmpRequirement {
        category: "quality_control",
        description: "Quality control testing and procedures",
        keywords: &["quality control", "testing", "analysis", "specification", "method"],
        weight: 15.0,
    },
    GmpRequirement {
        category: "documentation",
        description: "Documentation and record keeping",
        keywords: &["documentation", "record", "batch record", "logbook", "signature"],
        weight: 10.0,
    },
];

pub fn combine_scores(summary_parts: [f64; 5]) -> f64 {
    let [terminology, regulatory, gmp, completeness, quality] = summary_parts;
    terminology * TERMINOLOGY_WEIGHT
        + regulatory * REGULATORY_WEIGHT
        + gmp * GMP_WEIGHT
        + completeness * COMPLETENESS_WEIGHT
        + quality * QUALITY_WEIGHT
}

pub struct PharmaceuticalValidator {
    terminology: Vec<PharmaceuticalTerm>,
    reference_patterns: BTreeMap<String, Vec<(String, Regex)>>,
}

impl PharmaceuticalValidator {
    pub fn new(knowledge_base: &RegulatoryKnowledgeBase) -> Result<Self, KnowledgeBaseError> {
        let mut reference_patterns = BTreeMap::new();
        for spec in &knowledge_base.frameworks {
            let patterns = spec
                .reference_patterns
                .iter()
                .map(|source| {
                    let re = RegexBuilder::new(source)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| KnowledgeBaseError::InvalidPattern {
                            context: spec.key.clone(),
                            source: e,
                        })?;
                    Ok((source.clone(), re))
                })
                .collect::<Result<Vec<_>, KnowledgeBaseError>>()?;
            reference_patterns.insert(spec.key.clone(), patterns);
        }

        Ok(Self {
            terminology: extended_terminology(),
            reference_patterns,
        })
    }

    pub fn standard() -> Result<Arc<Self>, KnowledgeBaseError> {
        Ok(Arc::new(Self::new(&RegulatoryKnowledgeBase::standard())?))
    }

    /// Terms present literally or with underscores read as spaces
    pub fn check_terminology(&self, content: &str) -> TerminologyAssessment {
        let content_lower = content.to_lowercase();

        let found_terms: Vec<FoundTerm> = self
            .terminology
            .iter()
            .filter(|term| {
                let lower = term.term.to_lowercase();
                content_lower.contains(lower.as_str()) || content_lower.contains(lower.replace('_', " ").as_str())
            })
            .map(|term| FoundTerm {
                term: term.term.clone(),
                definition: term.definition.clone(),
                category: term.category.clone(),
                regulatory_source: term.regulatory_source.clone(),
            })
            .collect();

        let missing_critical_terms: Vec<String> = CRITICAL_TERMS
            .iter()
            .filter(|critical| !found_terms.iter().any(|t| t.term == **critical))
            .map(|critical| critical.to_string())
            .collect();

        TerminologyAssessment {
            terminology_score: (found_terms.len() as f64 / CRITICAL_TERMS.len() as f64 * 100.0).min(100.0),
            found_terms,
            missing_critical_terms,
            total_pharmaceutical_terms: self.terminology.len(),
        }
    }

    /// Reference-pattern coverage per framework. Names match keys ignoring case only;
    /// unknown names add nothing but still count in the average.
    pub fn check_regulatory_patterns<S: AsRef<str>>(&self, content: &str, frameworks: &[S]) -> PatternComplianceResult {
        let mut framework_results = Vec::new();

        for name in frameworks {
            let name = name.as_ref();
            let Some(patterns) = self.reference_patterns.get(&name.to_lowercase()) else {
                tracing::debug!("No reference patterns for framework '{}'", name);
                continue;
            };

            let matched_patterns: Vec<String> = patterns
                .iter()
                .filter(|(_, re)| re.is_match(content))
                .map(|(source, _)| source.clone())
                .collect();
            let score = if patterns.is_empty() {
                0.0
            } else {
                matched_patterns.len() as f64 / patterns.len() as f64 * 100.0
            };

            framework_results.push(FrameworkPatternResult {
                framework: name.to_string(),
                score,
                matched_patterns,
                total_patterns: patterns.len(),
                compliant: score >= FRAMEWORK_PATTERN_THRESHOLD,
            });
        }

        let overall_compliance_score = if frameworks.is_empty() {
            0.0
        } else {
            framework_results.iter().map(|r| r.score).sum::<f64>() / frameworks.len() as f64
        };

        PatternComplianceResult {
            overall_compliance_score,
            compliant_frameworks: framework_results.iter().filter(|r| r.compliant).count(),
            frameworks_evaluated: frameworks.len(),
            framework_results,
        }
    }

    pub fn check_gmp_requirements(&self, content: &str) -> GmpRequirementsResult {
        let content_lower = content.to_lowercase();

        let category_results: Vec<GmpCategoryResult> = GMP_REQUIREMENTS
            .iter()
            .map(|requirement| {
                let matched_keywords: Vec<String> = requirement
                    .keywords
                    .iter()
                    .filter(|keyword| content_lower.contains(**keyword))
                    .map(|keyword| keyword.to_string())
                    .collect();
                let score = matched_keywords.len() as f64 / requirement.keywords.len() as f64 * 100.0;

                GmpCategoryResult {
                    category: requirement.category.to_string(),
                    description: requirement.description.to_string(),
                    score,
                    weight: requirement.weight,
                    weighted_score: score * requirement.weight / 100.0,
                    matched_keywords,
                    total_keywords: requirement.keywords.len(),
                    compliant: score >= GMP_CATEGORY_THRESHOLD,
                }
            })
            .collect();

        GmpRequirementsResult {
            gmp_compliance_score: category_results.iter().map(|r| r.weighted_score).sum(),
            compliant_categories: category_results.iter().filter(|r| r.compliant).count(),
            total_categories: category_results.len(),
            category_results,
        }
    }

    /// Valid when the overall score reaches 70, no report section is missing
    /// and terminology scores at least 50
    pub fn comprehensive_validation<S: AsRef<str>>(
        &self,
        content: &str,
        sections: &BTreeMap<String, String>,
        frameworks: &[S],
    ) -> ComprehensiveValidation {
        let terminology = self.check_terminology(content);
        let regulatory_compliance = self.check_regulatory_patterns(content, frameworks);
        let gmp_compliance = self.check_gmp_requirements(content);
        let section_completeness = check_section_completeness(sections);
        let content_quality = assess_content_quality(content);

        let overall_score = combine_scores([
            terminology.terminology_score,
            regulatory_compliance.overall_compliance_score,
            gmp_compliance.gmp_compliance_score,
            section_completeness.completeness_score,
            content_quality.quality_score,
        ]);

        let is_valid = overall_score >= VALIDITY_THRESHOLD
            && section_completeness.missing_sections.is_empty()
            && terminology.terminology_score >= MIN_TERMINOLOGY_SCORE;

        let mut recommendations = content_quality.recommendations.clone();
        if !terminology.missing_critical_terms.is_empty() {
            recommendations.push(format!(
                "Include critical pharmaceutical terms: {}",
                terminology.missing_critical_terms.join(", ")
            ));
        }
        if !section_completeness.missing_sections.is_empty() {
            recommendations.push(format!(
                "Add missing sections: {}",
                section_completeness.missing_sections.join(", ")
            ));
        }
        if regulatory_compliance.overall_compliance_score < REGULATORY_RECOMMENDATION_THRESHOLD {
            recommendations.push("Improve regulatory compliance by referencing applicable guidelines".to_string());
        }

        tracing::info!(
            "Comprehensive validation completed - Score: {:.2}% (valid: {})",
            overall_score,
            is_valid
        );

        ComprehensiveValidation {
            is_valid,
            overall_score,
            validation_timestamp: Utc::now(),
            summary: ComprehensiveScoreSummary {
                terminology_score: terminology.terminology_score,
                regulatory_score: regulatory_compliance.overall_compliance_score,
                gmp_score: gmp_compliance.gmp_compliance_score,
                completeness_score: section_completeness.completeness_score,
                quality_score: content_quality.quality_score,
                overall_score,
            },
            detailed_results: ComprehensiveValidationDetails {
                terminology,
                regulatory_compliance,
                gmp_compliance,
                section_completeness,
                content_quality,
            },
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Arc<PharmaceuticalValidator> {
        PharmaceuticalValidator::standard().unwrap()
    }

    fn full_sections() -> BTreeMap<String, String> {
        ["purpose", "scope", "responsibilities", "procedure", "materials", "documentation", "references", "safety"]
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    format!("The {} section covers the controlled manufacturing activity.", name),
                )
            })
            .collect()
    }

    const RICH_SOP: &str = "\
# Cleaning of the fluid bed dryer

This cGMP procedure follows 21 CFR Part 211 and Current Good Manufacturing Practice per FDA guidance.
Personnel training and qualification are required before operation; competency and authorization are recorded.

The facility and building HVAC environmental design are qualified. Equipment calibration and maintenance
follow IQ, OQ and PQ. Raw material and component storage and handling are controlled.

1. Production staff shall follow the manufacturing process procedure for each batch.
2. Quality control testing and analysis must meet the specification and the approved method.
3. Documentation: every batch record, logbook entry and signature is mandatory and standard.
- Any deviation is investigated under GMP; validation status is confirmed.";

    #[test]
    fn test_weights_sum_to_one() {
        assert!((combine_scores([100.0; 5]) - 100.0).abs() < 1e-9);
        assert!((combine_scores([0.0, 0.0, 0.0, 0.0, 100.0]) - 10.0).abs() < 1e-9);
        let total: f64 = GMP_REQUIREMENTS.iter().map(|r| r.weight).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_terminology_counts_spaced_forms_and_lists_missing_critical_terms() {
        let result = validator().check_terminology("GMP batch with change control in place");
        let terms: Vec<&str> = result.found_terms.iter().map(|t| t.term.as_str()).collect();

        assert_eq!(terms, vec!["gmp", "batch", "change_control"]);
        assert_eq!(result.missing_critical_terms, vec!["validation", "qualification", "deviation"]);
        assert!((result.terminology_score - 60.0).abs() < 1e-9);
        assert_eq!(result.total_pharmaceutical_terms, 15);
    }

    #[test]
    fn test_unknown_frameworks_dilute_the_pattern_average() {
        let v = validator();
        let text = "Per 21 CFR 211 and cGMP.";

        let known = v.check_regulatory_patterns(text, &["fda_21_cfr_211"]);
        assert_eq!(known.overall_compliance_score, 50.0);
        assert_eq!(known.compliant_frameworks, 1);

        let diluted = v.check_regulatory_patterns(text, &["fda_21_cfr_211", "not_a_framework"]);
        assert_eq!(diluted.overall_compliance_score, 25.0);
        assert_eq!(diluted.framework_results.len(), 1);
        assert_eq!(diluted.frameworks_evaluated, 2);

        let separated = v.check_regulatory_patterns(text, &["FDA-21-CFR-211"]);
        assert!(separated.framework_results.is_empty());
        assert_eq!(separated.overall_compliance_score, 0.0);

        let none = v.check_regulatory_patterns(text, &Vec::<String>::new());
        assert_eq!(none.overall_compliance_score, 0.0);
    }

    #[test]
    fn test_gmp_category_threshold() {
        let result = validator().check_gmp_requirements("Training of personnel.");
        let personnel = &result.category_results[0];

        assert_eq!(personnel.category, "personnel");
        assert_eq!(personnel.score, 40.0);
        assert_eq!(personnel.weighted_score, 6.0);
        assert!(personnel.compliant);
        assert_eq!(result.compliant_categories, 1);
        assert_eq!(result.total_categories, 7);
    }

    #[test]
    fn test_rich_sop_is_valid() {
        let result = validator().comprehensive_validation(RICH_SOP, &full_sections(), &["fda_21_cfr_211"]);

        assert_eq!(result.summary.terminology_score, 100.0);
        assert_eq!(result.summary.regulatory_score, 100.0);
        assert_eq!(result.summary.completeness_score, 100.0);
        assert!(result.detailed_results.terminology.missing_critical_terms.is_empty());
        assert!(result.overall_score >= VALIDITY_THRESHOLD, "score {}", result.overall_score);
        assert!(result.is_valid);
        assert!(!result
            .recommendations
            .iter()
            .any(|r| r.starts_with("Include critical pharmaceutical terms")));
    }

    #[test]
    fn test_missing_section_blocks_validity_regardless_of_score() {
        let mut sections = full_sections();
        sections.remove("safety");

        let result = validator().comprehensive_validation(RICH_SOP, &sections, &["fda_21_cfr_211"]);
        assert!(!result.is_valid);
        assert!(result.recommendations.contains(&"Add missing sections: safety".to_string()));
    }

    #[test]
    fn test_empty_content_recommendations() {
        let result = validator().comprehensive_validation("", &BTreeMap::new(), &["who_gmp"]);

        assert!(!result.is_valid);
        assert_eq!(result.summary.terminology_score, 0.0);
        assert!(result.recommendations.contains(
            &"Include critical pharmaceutical terms: gmp, validation, qualification, batch, deviation".to_string()
        ));
        assert_eq!(
            result.recommendations.last().map(String::as_str),
            Some("Improve regulatory compliance by referencing applicable guidelines")
        );
        assert_eq!(result.recommendations[0], "Increase content length - aim for at least 200 words");
    }
}
