// Regulatory knowledge base
// Static terminology, framework and GMP indicator registries shared read-only
// by the compliance scorer and the pattern-based regulatory checker.

pub mod frameworks;
pub mod gmp_indicators;
pub mod terminology;

pub use frameworks::{normalize_framework_key, standard_frameworks, RegulatoryFrameworkSpec};
pub use gmp_indicators::{standard_gmp_indicators, GmpIndicatorSpec};
pub use terminology::{extended_terminology, standard_terminology, PharmaceuticalTerm};

use serde::Serialize;
use thiserror::Error;

/// Sections required when no selected framework is recognized
pub const DEFAULT_REQUIRED_SECTIONS: [&str; 8] = [
    "purpose", "scope", "definitions", "responsibilities",
    "materials", "procedure", "documentation", "references",
];

#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("GMP indicator '{0}' has no keywords")]
    EmptyIndicator(String),

    #[error("GMP indicator weights sum to {0}, expected 100")]
    IndicatorWeights(f64),

    #[error("Framework '{0}' defines no mandatory elements or compliance keywords")]
    EmptyFramework(String),

    #[error("Invalid pattern for {context}: {source}")]
    InvalidPattern {
        context: String,
        #[source]
        source: regex::Error,
    },
}

/// Bundle of the three immutable registries.
///
/// Built once at startup and shared behind an `Arc`; tests construct their
/// own fixtures directly.
#[derive(Debug, Clone, Serialize)]
pub struct RegulatoryKnowledgeBase {
    pub terminology: Vec<PharmaceuticalTerm>,
    pub frameworks: Vec<RegulatoryFrameworkSpec>,
    pub gmp_indicators: Vec<GmpIndicatorSpec>,
    pub default_required_sections: Vec<String>,
}

impl RegulatoryKnowledgeBase {
    pub fn standard() -> Self {
        Self {
            terminology: standard_terminology(),
            frameworks: standard_frameworks(),
            gmp_indicators: standard_gmp_indicators(),
            default_required_sections: DEFAULT_REQUIRED_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Look up a framework by user-supplied name (case and separator insensitive)
    pub fn framework(&self, name: &str) -> Option<&RegulatoryFrameworkSpec> {
        let key = normalize_framework_key(name);
        self.frameworks.iter().find(|f| f.key == key)
    }

    /// Case-insensitive lookup without separator normalization.
    /// "FDA-21-CFR-211" is not a registry key here.
    pub fn framework_by_key(&self, name: &str) -> Option<&RegulatoryFrameworkSpec> {
        let key = name.to_lowercase();
        self.frameworks.iter().find(|f| f.key == key)
    }

    pub fn framework_keys(&self) -> Vec<String> {
        self.frameworks.iter().map(|f| f.key.clone()).collect()
    }

    /// Check the structural invariants the scorers rely on
    pub fn verify(&self) -> Result<(), KnowledgeBaseError> {
        for indicator in &self.gmp_indicators {
            if indicator.keywords.is_empty() {
                return Err(KnowledgeBaseError::EmptyIndicator(indicator.category.clone()));
            }
        }

        if !self.gmp_indicators.is_empty() {
            let total: f64 = self.gmp_indicators.iter().map(|i| i.weight).sum();
            if (total - 100.0).abs() > 0.001 {
                return Err(KnowledgeBaseError::IndicatorWeights(total));
            }
        }

        for framework in &self.frameworks {
            if framework.mandatory_elements.is_empty() && framework.compliance_keywords.is_empty() {
                return Err(KnowledgeBaseError::EmptyFramework(framework.key.clone()));
            }
        }

        Ok(())
    }
}

impl Default for RegulatoryKnowledgeBase {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_knowledge_base_verifies() {
        assert!(RegulatoryKnowledgeBase::standard().verify().is_ok());
    }

    #[test]
    fn test_framework_lookup_is_case_and_separator_insensitive() {
        let kb = RegulatoryKnowledgeBase::standard();
        assert_eq!(kb.framework("FDA-21-CFR-211").map(|f| f.key.as_str()), Some("fda_21_cfr_211"));
        assert_eq!(kb.framework("EMA_GMP").map(|f| f.key.as_str()), Some("ema_gmp"));
        assert!(kb.framework("not_a_real_framework").is_none());
    }

    #[test]
    fn test_framework_by_key_ignores_case_only() {
        let kb = RegulatoryKnowledgeBase::standard();
        assert_eq!(kb.framework_by_key("ICH_Q10").map(|f| f.key.as_str()), Some("ich_q10"));
        assert!(kb.framework_by_key("FDA-21-CFR-211").is_none());
        assert!(kb.framework_by_key("who gmp").is_none());
    }

    #[test]
    fn test_verify_rejects_unbalanced_weights() {
        let mut kb = RegulatoryKnowledgeBase::standard();
        kb.gmp_indicators[0].weight += 5.0;
        assert!(matches!(kb.verify(), Err(KnowledgeBaseError::IndicatorWeights(_))));
    }

    #[test]
    fn test_verify_rejects_indicator_without_keywords() {
        let mut kb = RegulatoryKnowledgeBase::standard();
        kb.gmp_indicators[2].keywords.clear();
        assert!(matches!(kb.verify(), Err(KnowledgeBaseError::EmptyIndicator(ref c)) if c == "cleaning_validation"));
    }
}
