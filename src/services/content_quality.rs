// ============================================================================
// Content Quality Heuristics
// ============================================================================
//
// Readability and structure signals for SOP text. These feed the secondary
// compliance report and the generation quality score; they never contribute
// to the primary compliance score.
//
// ============================================================================

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::compliance::{ContentQualityAssessment, ContentQualityMetrics, SectionCompletenessResult};
use crate::models::sop::SopContent;

static SENTENCE_END_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());
static NUMBERED_STEP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\s+").unwrap());
static BULLET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[•\-\*]\s+").unwrap());
static MARKDOWN_HEADER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());
static TABLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|.*\|").unwrap());

static PROFESSIONAL_INDICATORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["shall", "must", "required", "mandatory", "procedure", "specification", "standard"]
        .iter()
        .map(|word| Regex::new(&format!(r"(?i)\b{}\b", word)).unwrap())
        .collect()
});

/// Sections checked by the report's completeness summary
pub const COMPLETENESS_SECTIONS: [&str; 8] = [
    "purpose", "scope", "responsibilities", "procedure",
    "materials", "documentation", "references", "safety",
];
const COMPLETENESS_MIN_LENGTH: usize = 30;

/// Sections counted by the generation quality score
const GENERATION_SECTIONS: [&str; 6] = [
    "purpose", "scope", "procedure", "responsibilities", "materials", "documentation",
];

const GENERATION_TERMS: [&str; 18] = [
    "gmp", "fda", "validation", "qualification", "compliance", "batch",
    "lot", "deviation", "capa", "quality control", "quality assurance", "manufacturing",
    "equipment", "cleaning", "sterile", "aseptic", "contamination", "specification",
];

pub fn assess_content_quality(text: &str) -> ContentQualityAssessment {
    let word_count = text.split_whitespace().count();
    let paragraph_count = text.split("\n\n").filter(|p| !p.trim().is_empty()).count();

    let matched_indicators = PROFESSIONAL_INDICATORS.iter().filter(|re| re.is_match(text)).count();
    let professional_language_score =
        (matched_indicators as f64 / PROFESSIONAL_INDICATORS.len() as f64 * 100.0).min(100.0);

    let metrics = ContentQualityMetrics {
        word_count,
        sentence_count: SENTENCE_END_REGEX.find_iter(text).count(),
        paragraph_count,
        has_numbered_steps: NUMBERED_STEP_REGEX.is_match(text),
        has_bullet_points: BULLET_REGEX.is_match(text),
        has_headers: MARKDOWN_HEADER_REGEX.is_match(text),
        has_tables: TABLE_REGEX.is_match(text),
        professional_language_score,
        adequate_length: word_count >= 200,
        well_structured: paragraph_count >= 3,
    };

    let structure_factors = [
        metrics.has_numbered_steps,
        metrics.has_bullet_points,
        metrics.has_headers,
        metrics.adequate_length,
        metrics.well_structured,
    ];
    let structure_score = structure_factors.iter().filter(|present| **present).count() as f64 * 20.0;

    ContentQualityAssessment {
        quality_score: (structure_score + professional_language_score) / 2.0,
        recommendations: quality_recommendations(&metrics),
        metrics,
    }
}

fn quality_recommendations(metrics: &ContentQualityMetrics) -> Vec<String> {
    let mut recommendations = Vec::new();

    if metrics.word_count < 200 {
        recommendations.push("Increase content length - aim for at least 200 words".to_string());
    }
    if !metrics.has_numbered_steps {
        recommendations.push("Add numbered steps to improve procedure clarity".to_string());
    }
    if !metrics.has_headers {
        recommendations.push("Include section headers for better organization".to_string());
    }
    if metrics.paragraph_count < 3 {
        recommendations.push("Break content into more paragraphs for better readability".to_string());
    }
    if metrics.professional_language_score < 50.0 {
        recommendations.push("Use more professional pharmaceutical terminology".to_string());
    }
    if !metrics.has_bullet_points && !metrics.has_numbered_steps {
        recommendations.push("Use bullet points or numbered lists for better structure".to_string());
    }

    recommendations
}

/// Presence of the eight report sections; a key matches when it contains the section name
pub fn check_section_completeness(sections: &BTreeMap<String, String>) -> SectionCompletenessResult {
    let mut present_sections = Vec::new();
    let mut missing_sections = Vec::new();
    let mut incomplete_sections = Vec::new();

    for required in COMPLETENESS_SECTIONS {
        let found = sections
            .iter()
            .find(|(key, _)| key.to_lowercase().contains(required))
            .map(|(_, body)| body);

        match found {
            Some(body) if body.trim().chars().count() > COMPLETENESS_MIN_LENGTH => {
                present_sections.push(required.to_string())
            }
            Some(_) => incomplete_sections.push(required.to_string()),
            None => missing_sections.push(required.to_string()),
        }
    }

    SectionCompletenessResult {
        completeness_score: present_sections.len() as f64 / COMPLETENESS_SECTIONS.len() as f64 * 100.0,
        present_sections,
        missing_sections,
        incomplete_sections,
        total_required_sections: COMPLETENESS_SECTIONS.len(),
    }
}

/// Heuristic 0-100 quality score attached to each generation result
pub fn generation_quality_score(content: &SopContent) -> f64 {
    let completed_sections = GENERATION_SECTIONS
        .iter()
        .filter(|section| {
            content
                .sections
                .get(**section)
                .map(|body| body.chars().count() > 50)
                .unwrap_or(false)
        })
        .count();
    let section_score = completed_sections as f64 / GENERATION_SECTIONS.len() as f64 * 40.0;

    let length_score = match content.word_count {
        n if n >= 2000 => 30.0,
        n if n >= 1000 => 20.0,
        n if n >= 500 => 10.0,
        _ => 5.0,
    };

    let text_lower = content.full_text.to_lowercase();
    let found_terms = GENERATION_TERMS.iter().filter(|term| text_lower.contains(**term)).count();
    let terminology_score = (found_terms as f64 / GENERATION_TERMS.len() as f64 * 20.0).min(20.0);

    let structure_score = if content.section_count >= 6 { 10.0 } else { 5.0 };

    let score = section_score + length_score + terminology_score + structure_score;
    tracing::debug!(
        "Quality score calculated: {:.2}/100 (sections: {:.2}, length: {}, terminology: {:.2}, structure: {})",
        score, section_score, length_score, terminology_score, structure_score
    );

    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_professional_text_scores_high() {
        let text = "\
# Purpose

Operators shall follow this procedure. All steps must be recorded.

1. Verify the standard weights.
2. Record the specification limits.

- Mandatory checks are required before release.
| Step | Owner |";
        let assessment = assess_content_quality(text);

        assert!(assessment.metrics.has_headers);
        assert!(assessment.metrics.has_numbered_steps);
        assert!(assessment.metrics.has_bullet_points);
        assert!(assessment.metrics.has_tables);
        assert!(assessment.metrics.well_structured);
        assert_eq!(assessment.metrics.professional_language_score, 100.0);
        // four of five structure factors (too short), full professional score
        assert_eq!(assessment.quality_score, 90.0);
        assert_eq!(
            assessment.recommendations,
            vec!["Increase content length - aim for at least 200 words"]
        );
    }

    #[test]
    fn test_empty_text_quality() {
        let assessment = assess_content_quality("");
        assert_eq!(assessment.quality_score, 0.0);
        assert_eq!(assessment.metrics.word_count, 0);
        assert_eq!(assessment.recommendations.len(), 6);
    }

    #[test]
    fn test_section_completeness_classifies_sections() {
        let mut sections = BTreeMap::new();
        sections.insert("purpose".to_string(), "Defines the cleaning of tablet presses in area B.".to_string());
        sections.insert("scope".to_string(), "Area B only.".to_string());

        let result = check_section_completeness(&sections);
        assert_eq!(result.present_sections, vec!["purpose"]);
        assert_eq!(result.incomplete_sections, vec!["scope"]);
        assert_eq!(result.missing_sections.len(), 6);
        assert_eq!(result.completeness_score, 12.5);
    }

    #[test]
    fn test_generation_quality_score_bands() {
        let long_body = "Detailed GMP content covering validation and cleaning of equipment used in manufacturing.";
        let mut sections = BTreeMap::new();
        for section in GENERATION_SECTIONS {
            sections.insert(section.to_string(), long_body.to_string());
        }
        let full_text = long_body.repeat(6);
        let content = SopContent {
            word_count: full_text.split_whitespace().count(),
            section_count: sections.len(),
            sections,
            full_text,
        };

        // 40 (sections) + 5 (length) + 5/18*20 (gmp, validation, cleaning, equipment, manufacturing) + 10
        let score = generation_quality_score(&content);
        assert_eq!(score, 60.56);
    }
}
