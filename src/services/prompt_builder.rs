/// SOP generation prompt assembly
/// Combines the request, regulatory framework context, department focus and
/// GMP/ALCOA+ requirements into one prompt for the text generator

use crate::models::sop::PharmaceuticalDepartment;
use crate::services::knowledge_base::normalize_framework_key;

const SYSTEM_PROMPT: &str = "\
You are an expert pharmaceutical manufacturing SOP authoring assistant with deep knowledge of:
- FDA 21 CFR Part 211 and related regulations
- ICH guidelines (Q7, Q9, Q10)
- WHO and EMA GMP requirements
- Data integrity (ALCOA+) principles
- Equipment qualification and validation
- Quality risk management
- Change control and deviation management

CRITICAL REQUIREMENTS:
1. Follow the provided SOP template structure EXACTLY
2. Incorporate regulatory compliance language throughout
3. Use professional pharmaceutical terminology
4. Write in formal, precise language suitable for regulatory inspection
5. Embed data integrity and GMP principles naturally

OUTPUT FORMAT: Generate ONLY the complete SOP document following the template structure.
Do not include commentary, explanations, or metadata.";

/// Section skeleton used when the request carries no template
pub const DEFAULT_TEMPLATE: &str = "\
1. Title Page
2. Purpose
3. Scope
4. Definitions
5. Responsibilities
6. Materials
7. Procedure
8. Acceptance Criteria
9. Documentation
10. References
11. Revision History";

const DEFAULT_GUIDELINE: &str = "Current Good Manufacturing Practice for finished pharmaceuticals and APIs.";

const GMP_PRINCIPLES: [&str; 10] = [
    "Manufacturing processes are clearly defined and controlled",
    "Critical processes are validated to ensure consistency and compliance",
    "All necessary facilities are provided including qualified personnel, adequate space, equipment and systems",
    "Clear instructions and procedures are written in clear, unambiguous language",
    "Operators are trained to carry out instructions correctly",
    "Records are made during manufacture to show all steps were followed",
    "Any significant deviations are fully recorded and investigated",
    "Records of manufacture and distribution enable complete history tracing",
    "Distribution minimizes any risk to product quality",
    "System exists to recall any batch of product from sale or supply",
];

const ALCOA_GUIDANCE: &str = "\
DATA INTEGRITY (ALCOA+) PRINCIPLES TO EMBED:
- Attributable: All data must be traceable to the individual who created it
- Legible: Data must be recorded clearly and permanently
- Contemporaneous: Data must be recorded at the time the work is performed
- Original: First capture of data or certified true copy
- Accurate: Data must be correct and without errors
- Plus: Complete, Consistent, Enduring, Available when needed";

fn framework_context(key: &str) -> Option<&'static str> {
    match key {
        "fda_21_cfr_211" => Some(
            "FDA 21 CFR Part 211 - Current Good Manufacturing Practice for Finished Pharmaceuticals:\n\
             - Requires written procedures, batch records, and laboratory controls\n\
             - Covers organization, personnel, buildings, equipment, production controls",
        ),
        "ich_q7" => Some(
            "ICH Q7 - Good Manufacturing Practice Guide for Active Pharmaceutical Ingredients:\n\
             - Emphasizes quality management system and personnel qualifications\n\
             - Covers material management, production, packaging, and storage",
        ),
        "ich_q10" => Some(
            "ICH Q10 - Pharmaceutical Quality System:\n\
             - Integrates quality system elements throughout product lifecycle\n\
             - Emphasizes continual improvement and risk management",
        ),
        "who_gmp" => Some(
            "WHO GMP Guidelines:\n\
             - Covers quality management, personnel, premises and equipment\n\
             - Emphasizes documentation and record keeping",
        ),
        "ema_gmp" => Some(
            "EMA GMP Guidelines (EudraLex Volume 4):\n\
             - Details quality management system requirements\n\
             - Emphasizes risk management and contamination control",
        ),
        _ => None,
    }
}

fn department_context(department: PharmaceuticalDepartment) -> &'static str {
    match department {
        PharmaceuticalDepartment::Production => {
            "- Focus on batch manufacturing processes and controls\n- Detail batch record completion and review processes"
        }
        PharmaceuticalDepartment::QualityControl => {
            "- Emphasize analytical testing procedures and acceptance criteria\n- Detail out-of-specification (OOS) investigation procedures"
        }
        PharmaceuticalDepartment::QualityAssurance => {
            "- Focus on review and approval processes\n- Emphasize change control and deviation management"
        }
        PharmaceuticalDepartment::RegulatoryAffairs => {
            "- Emphasize regulatory submission requirements\n- Detail pharmacovigilance and adverse event reporting"
        }
        PharmaceuticalDepartment::Manufacturing => {
            "- Focus on equipment operation and maintenance\n- Include cleaning validation procedures"
        }
        PharmaceuticalDepartment::Packaging => {
            "- Emphasize label control and verification procedures\n- Detail packaging line changeover procedures"
        }
        PharmaceuticalDepartment::Warehouse => {
            "- Focus on storage condition monitoring and control\n- Address quarantine and release procedures"
        }
        PharmaceuticalDepartment::Maintenance => {
            "- Include equipment qualification (IQ/OQ/PQ) procedures\n- Detail calibration and verification procedures"
        }
    }
}

/// Inputs for one generation prompt
#[derive(Debug, Clone)]
pub struct SopPromptInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub template_content: Option<&'a str>,
    pub guideline_content: Option<&'a str>,
    pub regulatory_frameworks: &'a [String],
    pub department: PharmaceuticalDepartment,
}

pub fn build_sop_prompt(input: &SopPromptInput<'_>) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n\nGenerate a comprehensive Standard Operating Procedure (SOP) with the following specifications:\n\n");

    prompt.push_str(&format!("TITLE: {}\n\n", input.title));
    prompt.push_str(&format!("SCOPE/DESCRIPTION:\n{}\n\n", input.description));
    prompt.push_str(&format!(
        "TEMPLATE STRUCTURE TO FOLLOW:\n{}\n\n",
        input.template_content.unwrap_or(DEFAULT_TEMPLATE)
    ));
    prompt.push_str(&format!(
        "REGULATORY GUIDELINE REFERENCE:\n{}\n\n",
        input.guideline_content.unwrap_or(DEFAULT_GUIDELINE)
    ));

    let contexts: Vec<&str> = input
        .regulatory_frameworks
        .iter()
        .filter_map(|name| framework_context(&normalize_framework_key(name)))
        .collect();
    if !contexts.is_empty() {
        prompt.push_str("APPLICABLE REGULATORY FRAMEWORKS:\n");
        for context in contexts {
            prompt.push_str(context);
            prompt.push_str("\n\n");
        }
    }

    prompt.push_str(&format!(
        "DEPARTMENT CONTEXT: {}\n{}\n\n",
        input.department.as_str().to_uppercase(),
        department_context(input.department)
    ));

    prompt.push_str("GOOD MANUFACTURING PRACTICE (GMP) REQUIREMENTS:\n");
    for (i, principle) in GMP_PRINCIPLES.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, principle));
    }
    prompt.push('\n');
    prompt.push_str(ALCOA_GUIDANCE);
    prompt.push_str("\n\nGenerate the complete SOP document now.");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_known_frameworks_only() {
        let frameworks = vec!["FDA-21-CFR-211".to_string(), "made_up".to_string()];
        let prompt = build_sop_prompt(&SopPromptInput {
            title: "Cleaning of Fluid Bed Dryer",
            description: "Cleaning between product changeovers",
            template_content: None,
            guideline_content: None,
            regulatory_frameworks: &frameworks,
            department: PharmaceuticalDepartment::Manufacturing,
        });

        assert!(prompt.contains("TITLE: Cleaning of Fluid Bed Dryer"));
        assert!(prompt.contains("FDA 21 CFR Part 211 - Current Good Manufacturing Practice"));
        assert!(!prompt.contains("made_up"));
        assert!(prompt.contains("DEPARTMENT CONTEXT: MANUFACTURING"));
        assert!(prompt.contains("7. Procedure"));
        assert!(prompt.contains("10. System exists to recall any batch"));
    }

    #[test]
    fn test_custom_template_replaces_default() {
        let prompt = build_sop_prompt(&SopPromptInput {
            title: "Label reconciliation",
            description: "Reconcile printed labels after packaging",
            template_content: Some("Purpose\nProcedure"),
            guideline_content: Some("EU GMP Annex 1"),
            regulatory_frameworks: &[],
            department: PharmaceuticalDepartment::Packaging,
        });

        assert!(prompt.contains("TEMPLATE STRUCTURE TO FOLLOW:\nPurpose\nProcedure"));
        assert!(!prompt.contains("11. Revision History"));
        assert!(!prompt.contains("APPLICABLE REGULATORY FRAMEWORKS"));
        assert!(prompt.contains("EU GMP Annex 1"));
    }
}
