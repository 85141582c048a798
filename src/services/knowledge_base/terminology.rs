use serde::{Deserialize, Serialize};

/// One entry of the pharmaceutical terminology database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PharmaceuticalTerm {
    pub term: String,
    pub definition: String,
    pub regulatory_source: String,
    pub category: String,
}

impl PharmaceuticalTerm {
    pub fn new(term: &str, definition: &str, regulatory_source: &str, category: &str) -> Self {
        Self {
            term: term.to_string(),
            definition: definition.to_string(),
            regulatory_source: regulatory_source.to_string(),
            category: category.to_string(),
        }
    }

    /// Case-insensitive presence of the entry itself in already-lowercased text.
    /// Snake-cased entries only match their literal form.
    pub fn appears_in(&self, text_lower: &str) -> bool {
        text_lower.contains(self.term.to_lowercase().as_str())
    }
}

pub fn standard_terminology() -> Vec<PharmaceuticalTerm> {
    vec![
        PharmaceuticalTerm::new(
            "gmp",
            "Good Manufacturing Practice - quality system for pharmaceutical manufacturing",
            "21 CFR 211",
            "quality_system",
        ),
        PharmaceuticalTerm::new(
            "validation",
            "Establishing documented evidence providing high assurance of process consistency",
            "FDA Guidance",
            "quality_assurance",
        ),
        PharmaceuticalTerm::new(
            "qualification",
            "Action of proving and documenting that equipment operates as intended",
            "21 CFR 211.68",
            "equipment",
        ),
        PharmaceuticalTerm::new(
            "deviation",
            "Departure from an approved instruction or established standard",
            "ICH Q10",
            "quality_control",
        ),
        PharmaceuticalTerm::new(
            "batch",
            "Specific quantity of drug produced in one cycle of manufacture",
            "21 CFR 210.3",
            "manufacturing",
        ),
        PharmaceuticalTerm::new(
            "lot",
            "Batch or specific portion of a batch having uniform characteristics",
            "21 CFR 210.3",
            "manufacturing",
        ),
        PharmaceuticalTerm::new(
            "capa",
            "Corrective and Preventive Action system for addressing quality issues",
            "21 CFR 820.100",
            "quality_system",
        ),
        PharmaceuticalTerm::new(
            "change_control",
            "Systematic approach for proposing, evaluating, and implementing changes",
            "ICH Q10",
            "quality_system",
        ),
        PharmaceuticalTerm::new(
            "cleaning_validation",
            "Documented evidence that cleaning procedures remove residues",
            "FDA Guidance",
            "validation",
        ),
        PharmaceuticalTerm::new(
            "cross_contamination",
            "Contamination of material or product with another material or product",
            "WHO GMP",
            "contamination_control",
        ),
    ]
}

/// Standard terminology plus the API and microbiology terms used by the
/// comprehensive validator
pub fn extended_terminology() -> Vec<PharmaceuticalTerm> {
    let mut terms = standard_terminology();
    terms.extend([
        PharmaceuticalTerm::new("api", "Active Pharmaceutical Ingredient", "ICH Q7", "manufacturing"),
        PharmaceuticalTerm::new("sterile", "Free from viable microorganisms", "USP <71>", "contamination_control"),
        PharmaceuticalTerm::new("aseptic", "Preventing microbial contamination", "FDA Guidance", "manufacturing"),
        PharmaceuticalTerm::new("bioburden", "Level of microbial contamination", "USP <61>", "microbiology"),
        PharmaceuticalTerm::new("endotoxin", "Toxic substances in bacterial cell walls", "USP <85>", "microbiology"),
    ]);
    terms
}
