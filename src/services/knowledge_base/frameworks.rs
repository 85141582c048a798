use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Static description of one regulatory standard.
///
/// The inline scorer reads `required_sections`, `mandatory_elements` and
/// `compliance_keywords` with plain substring matching. The pattern-based
/// checker reads `inspection_elements`, `documentation_requirements` and the
/// `reference_patterns` regex sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegulatoryFrameworkSpec {
    pub key: String,
    pub name: String,
    pub jurisdiction: String,
    pub scope: String,
    pub required_sections: Vec<String>,
    pub mandatory_elements: Vec<String>,
    pub compliance_keywords: Vec<String>,
    pub documentation_requirements: BTreeMap<String, bool>,
    pub inspection_elements: Vec<String>,
    pub reference_patterns: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn required_docs(items: &[&str]) -> BTreeMap<String, bool> {
    items.iter().map(|s| (s.to_string(), true)).collect()
}

/// Normalize a user-supplied framework name to a registry key.
///
/// `"FDA-21-CFR-211"`, `"fda 21 cfr 211"` and `"fda_21_cfr_211"` all map to
/// `"fda_21_cfr_211"`.
pub fn normalize_framework_key(name: &str) -> String {
    name.trim().to_lowercase().replace(['-', ' '], "_")
}

pub fn standard_frameworks() -> Vec<RegulatoryFrameworkSpec> {
    vec![
        RegulatoryFrameworkSpec {
            key: "fda_21_cfr_211".to_string(),
            name: "FDA 21 CFR Part 211 - Current Good Manufacturing Practice".to_string(),
            jurisdiction: "United States".to_string(),
            scope: "Finished pharmaceuticals".to_string(),
            required_sections: strings(&[
                "purpose", "scope", "responsibilities", "procedure",
                "materials", "documentation", "references",
            ]),
            mandatory_elements: strings(&[
                "written procedures", "batch records", "quality control",
                "personnel qualification", "equipment maintenance",
            ]),
            compliance_keywords: strings(&[
                "gmp", "validation", "qualification", "batch record",
                "deviation", "change control", "training",
            ]),
            documentation_requirements: required_docs(&[
                "electronic_records", "electronic_signatures", "audit_trail", "data_integrity",
            ]),
            inspection_elements: strings(&[
                "written procedures",
                "batch production records",
                "laboratory control records",
                "equipment maintenance records",
                "personnel training records",
                "change control procedures",
                "deviation handling procedures",
            ]),
            reference_patterns: strings(&[
                r"\b21\s*CFR\s*(?:Part\s*)?211\b",
                r"\bcGMP\b",
                r"\bCurrent\s+Good\s+Manufacturing\s+Practice\b",
                r"\bFDA\s+(?:guidance|guideline|regulation)s?\b",
            ]),
        },
        RegulatoryFrameworkSpec {
            key: "ich_q7".to_string(),
            name: "ICH Q7 - Good Manufacturing Practice for APIs".to_string(),
            jurisdiction: "International".to_string(),
            scope: "Active Pharmaceutical Ingredients".to_string(),
            required_sections: strings(&[
                "purpose", "scope", "procedure", "quality_control",
                "documentation", "personnel", "materials",
            ]),
            mandatory_elements: strings(&[
                "quality management system", "api manufacturing",
                "contamination control", "cleaning validation",
            ]),
            compliance_keywords: strings(&[
                "api", "intermediate", "contamination", "cross-contamination",
                "cleaning", "validation", "impurity",
            ]),
            documentation_requirements: required_docs(&[
                "written_procedures", "batch_documentation", "laboratory_records", "change_control",
            ]),
            inspection_elements: strings(&[
                "quality management system",
                "personnel qualifications",
                "building and facility controls",
                "equipment maintenance",
                "material management",
                "production procedures",
                "packaging and identification",
                "laboratory controls",
            ]),
            reference_patterns: strings(&[
                r"\bICH\s*Q7\b",
                r"\bAPI\s+(?:manufacturing|production)\b",
                r"\bActive\s+Pharmaceutical\s+Ingredients?\b",
                r"\bGMP\s+guide\s+for\s+APIs\b",
            ]),
        },
        RegulatoryFrameworkSpec {
            key: "ich_q10".to_string(),
            name: "ICH Q10 - Pharmaceutical Quality System".to_string(),
            jurisdiction: "International".to_string(),
            scope: "Quality management system".to_string(),
            required_sections: strings(&[
                "purpose", "scope", "quality_management", "procedure",
                "continuous_improvement", "documentation",
            ]),
            mandatory_elements: strings(&[
                "pharmaceutical quality system", "lifecycle approach",
                "management responsibility", "resource management",
            ]),
            compliance_keywords: strings(&[
                "quality system", "lifecycle", "continual improvement",
                "management review", "risk management",
            ]),
            documentation_requirements: required_docs(&[
                "quality_manual", "management_review", "corrective_actions", "preventive_actions",
            ]),
            inspection_elements: strings(&[
                "management responsibility",
                "resource management",
                "product realization",
                "measurement and improvement",
                "continual improvement",
                "risk management",
            ]),
            reference_patterns: strings(&[
                r"\bICH\s*Q10\b",
                r"\bPharmaceutical\s+Quality\s+System\b",
                r"\bPQS\b",
                r"\bquality\s+management\s+system\b",
            ]),
        },
        RegulatoryFrameworkSpec {
            key: "who_gmp".to_string(),
            name: "WHO Good Manufacturing Practices".to_string(),
            jurisdiction: "Global".to_string(),
            scope: "Pharmaceutical products".to_string(),
            required_sections: strings(&[
                "purpose", "scope", "personnel", "premises", "equipment",
                "procedure", "quality_control", "documentation",
            ]),
            mandatory_elements: strings(&[
                "quality management", "personnel hygiene", "building design",
                "equipment qualification", "batch documentation",
            ]),
            compliance_keywords: strings(&[
                "sterile", "non-sterile", "contamination", "qualification",
                "validation", "change control", "recall",
            ]),
            documentation_requirements: required_docs(&[
                "specifications", "manufacturing_formulas", "processing_instructions", "packaging_instructions",
            ]),
            inspection_elements: strings(&[
                "quality management",
                "personnel qualifications",
                "premises and equipment",
                "documentation",
                "production procedures",
                "quality control",
                "contract manufacture",
                "complaints and product recall",
            ]),
            reference_patterns: strings(&[
                r"\bWHO\s+GMP\b",
                r"\bWorld\s+Health\s+Organization\b.*GMP",
                r"\bWHO\s+(?:guidance|guideline)s?\b",
            ]),
        },
        RegulatoryFrameworkSpec {
            key: "ema_gmp".to_string(),
            name: "EMA Good Manufacturing Practice Guidelines".to_string(),
            jurisdiction: "European Union".to_string(),
            scope: "Medicinal products".to_string(),
            required_sections: strings(&[
                "purpose", "scope", "responsibilities", "procedure",
                "quality_control", "documentation", "references",
            ]),
            mandatory_elements: strings(&[
                "pharmaceutical quality system", "qualified person",
                "outsourced activities", "self-inspection",
            ]),
            compliance_keywords: strings(&[
                "eudralex", "marketing authorization", "qualified person",
                "pharmacovigilance", "quality risk management", "validation",
            ]),
            documentation_requirements: required_docs(&[
                "marketing_authorization", "batch_records", "analytical_records", "stability_data",
            ]),
            inspection_elements: strings(&[
                "pharmaceutical quality system",
                "personnel responsibilities",
                "premises and equipment",
                "documentation procedures",
                "production operations",
                "quality control systems",
                "outsourced activities",
                "complaints and recalls",
            ]),
            reference_patterns: strings(&[
                r"\bEMA\s+GMP\b",
                r"\bEuropean\s+Medicines\s+Agency\b",
                r"\bEudraLex\b",
                r"\bVolume\s+4\b",
            ]),
        },
    ]
}
