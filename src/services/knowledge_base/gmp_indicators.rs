use serde::{Deserialize, Serialize};

/// GMP topic category with its descriptive keywords and importance weight.
/// Weights across one registry sum to 100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GmpIndicatorSpec {
    pub category: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub weight: f64,
}

impl GmpIndicatorSpec {
    pub fn new(category: &str, description: &str, keywords: &[&str], weight: f64) -> Self {
        Self {
            category: category.to_string(),
            description: description.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            weight,
        }
    }

    /// Number of keywords found in already-lowercased text
    pub fn matched_keywords(&self, text_lower: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| text_lower.contains(keyword.to_lowercase().as_str()))
            .count()
    }
}

pub fn standard_gmp_indicators() -> Vec<GmpIndicatorSpec> {
    vec![
        GmpIndicatorSpec::new(
            "personnel_qualification",
            "Personnel training and qualification requirements",
            &["training", "qualification", "competency", "authorization"],
            15.0,
        ),
        GmpIndicatorSpec::new(
            "equipment_validation",
            "Equipment installation, operational, and performance qualification",
            &["iq", "oq", "pq", "qualification", "calibration", "maintenance"],
            20.0,
        ),
        GmpIndicatorSpec::new(
            "cleaning_validation",
            "Cleaning procedures and validation requirements",
            &["cleaning", "validation", "residue", "acceptance criteria", "sanitization"],
            15.0,
        ),
        GmpIndicatorSpec::new(
            "batch_documentation",
            "Batch record completion and review requirements",
            &["batch record", "documentation", "signature", "review", "approval"],
            20.0,
        ),
        GmpIndicatorSpec::new(
            "change_control",
            "Change management and control procedures",
            &["change control", "modification", "impact assessment", "approval"],
            10.0,
        ),
        GmpIndicatorSpec::new(
            "deviation_management",
            "Deviation handling and investigation procedures",
            &["deviation", "investigation", "root cause", "corrective action"],
            10.0,
        ),
        GmpIndicatorSpec::new(
            "contamination_control",
            "Contamination prevention and control measures",
            &["contamination", "cross-contamination", "segregation", "isolation"],
            10.0,
        ),
    ]
}
