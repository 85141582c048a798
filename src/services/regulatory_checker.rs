/// Pattern-based regulatory compliance checker
/// Regex-driven framework checks, ALCOA+ data integrity, 21 CFR Part 11
/// electronic records and the combined compliance report

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};

use crate::models::compliance::{
    ComplianceReport, DataIntegrityResult, ElectronicRecordsResult, FrameworkComplianceResult,
    OverallCompliance, RegulatoryComplianceResult, RuleComplianceResult, SupportedFramework,
};
use crate::services::content_quality::{assess_content_quality, check_section_completeness};
use crate::services::knowledge_base::{KnowledgeBaseError, RegulatoryFrameworkSpec, RegulatoryKnowledgeBase};

pub const FRAMEWORK_THRESHOLD: f64 = 70.0;
pub const DATA_INTEGRITY_THRESHOLD: f64 = 80.0;
pub const ELECTRONIC_RECORDS_THRESHOLD: f64 = 75.0;
pub const RULE_THRESHOLD: f64 = 60.0;
pub const REPORT_THRESHOLD: f64 = 75.0;

pub const ALCOA_PLUS_PRINCIPLES: [&str; 9] = [
    "attributable", "legible", "contemporaneous", "original", "accurate",
    "complete", "consistent", "enduring", "available",
];

/// Static definition of a rule-based check
#[derive(Debug, Clone)]
pub struct ComplianceRuleSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub requirements: &'static [&'static str],
    pub patterns: &'static [&'static str],
    pub critical: bool,
}

pub const ELECTRONIC_RECORDS_RULE: ComplianceRuleSpec = ComplianceRuleSpec {
    name: "electronic_records",
    description: "21 CFR Part 11 electronic records compliance",
    requirements: &[
        "closed system controls",
        "open system controls",
        "signature manifestations",
        "signature/record linking",
        "electronic signature components",
        "controls for identification codes",
    ],
    patterns: &[
        r"\belectronic\s+records?\b",
        r"\belectronic\s+signatures?\b",
        r"\b21\s*CFR\s*(?:Part\s*)?11\b",
        r"\bclosed\s+system\b",
        r"\bopen\s+system\b",
        r"\baudit\s+trail\b",
    ],
    critical: true,
};

pub const CHANGE_CONTROL_RULE: ComplianceRuleSpec = ComplianceRuleSpec {
    name: "change_control",
    description: "Change control procedures",
    requirements: &[
        "change request", "impact assessment", "risk evaluation",
        "approval process", "implementation", "verification", "documentation",
    ],
    patterns: &[
        r"\bchange\s+control\b",
        r"\bchange\s+request\b",
        r"\bimpact\s+assessment\b",
        r"\brisk\s+evaluation\b",
        r"\bapproval\s+process\b",
    ],
    critical: false,
};

pub const DEVIATION_MANAGEMENT_RULE: ComplianceRuleSpec = ComplianceRuleSpec {
    name: "deviation_management",
    description: "Deviation handling and investigation",
    requirements: &[
        "deviation identification", "immediate actions", "investigation",
        "root cause analysis", "corrective actions", "preventive actions",
        "effectiveness check",
    ],
    patterns: &[
        r"\bdeviation\b",
        r"\binvestigation\b",
        r"\broot\s+cause\b",
        r"\bcorrective\s+action\b",
        r"\bpreventive\s+action\b",
        r"\bCAPA\b",
    ],
    critical: false,
};

pub const QUALIFICATION_VALIDATION_RULE: ComplianceRuleSpec = ComplianceRuleSpec {
    name: "qualification_validation",
    description: "Equipment qualification and process validation",
    requirements: &[
        "installation qualification", "operational qualification",
        "performance qualification", "process validation",
        "cleaning validation", "method validation",
    ],
    patterns: &[
        r"\bIQ\b", r"\bOQ\b", r"\bPQ\b", r"\bqualification\b",
        r"\bvalidation\b", r"\bcleaning\s+validation\b", r"\bmethod\s+validation\b",
    ],
    critical: true,
};

fn compile(source: &str, context: &str) -> Result<Regex, KnowledgeBaseError> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|source| KnowledgeBaseError::InvalidPattern {
            context: context.to_string(),
            source,
        })
}

struct CompiledRule {
    spec: ComplianceRuleSpec,
    patterns: Vec<(String, Regex)>,
}

impl CompiledRule {
    fn new(spec: ComplianceRuleSpec) -> Result<Self, KnowledgeBaseError> {
        let patterns = spec
            .patterns
            .iter()
            .map(|source| Ok((source.to_string(), compile(source, spec.name)?)))
            .collect::<Result<Vec<_>, KnowledgeBaseError>>()?;
        Ok(Self { spec, patterns })
    }

    fn matched_patterns(&self, content: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|(_, re)| re.is_match(content))
            .map(|(source, _)| source.clone())
            .collect()
    }
}

struct CompiledFramework {
    patterns: Vec<(String, Regex)>,
}

fn dedup_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

fn ratio(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64 * 100.0
    }
}

/// Stricter secondary compliance engine.
///
/// All regexes are compiled in `new`; every check after construction is infallible.
pub struct RegulatoryChecker {
    knowledge_base: Arc<RegulatoryKnowledgeBase>,
    frameworks: BTreeMap<String, CompiledFramework>,
    alcoa_patterns: Vec<Regex>,
    electronic_records: CompiledRule,
    change_control: CompiledRule,
    deviation_management: CompiledRule,
    qualification_validation: CompiledRule,
}

impl RegulatoryChecker {
    pub fn new(knowledge_base: Arc<RegulatoryKnowledgeBase>) -> Result<Self, KnowledgeBaseError> {
        let mut frameworks = BTreeMap::new();
        for spec in &knowledge_base.frameworks {
            let patterns = spec
                .reference_patterns
                .iter()
                .map(|source| Ok((source.clone(), compile(source, &spec.key)?)))
                .collect::<Result<Vec<_>, KnowledgeBaseError>>()?;
            frameworks.insert(spec.key.clone(), CompiledFramework { patterns });
        }

        let alcoa_patterns = ALCOA_PLUS_PRINCIPLES
            .iter()
            .map(|principle| compile(&format!(r"\b{}\b", principle), "data_integrity"))
            .collect::<Result<Vec<_>, KnowledgeBaseError>>()?;

        Ok(Self {
            knowledge_base,
            frameworks,
            alcoa_patterns,
            electronic_records: CompiledRule::new(ELECTRONIC_RECORDS_RULE)?,
            change_control: CompiledRule::new(CHANGE_CONTROL_RULE)?,
            deviation_management: CompiledRule::new(DEVIATION_MANAGEMENT_RULE)?,
            qualification_validation: CompiledRule::new(QUALIFICATION_VALIDATION_RULE)?,
        })
    }

    fn check_framework(&self, content: &str, supplied_name: &str, spec: &RegulatoryFrameworkSpec) -> FrameworkComplianceResult {
        let content_lower = content.to_lowercase();

        let matched_patterns: Vec<String> = self
            .frameworks
            .get(&spec.key)
            .map(|compiled| {
                compiled
                    .patterns
                    .iter()
                    .filter(|(_, re)| re.is_match(content))
                    .map(|(source, _)| source.clone())
                    .collect()
            })
            .unwrap_or_default();
        let pattern_score = ratio(matched_patterns.len(), spec.reference_patterns.len());

        let mut matched_elements = Vec::new();
        let mut missing_requirements = Vec::new();
        for element in &spec.inspection_elements {
            let lower = element.to_lowercase();
            let variants = [lower.clone(), lower.replace('_', " "), lower.replace(' ', "_"), lower.replace('-', " ")];
            if variants.iter().any(|v| content_lower.contains(v.as_str())) {
                matched_elements.push(element.clone());
            } else {
                missing_requirements.push(element.clone());
            }
        }
        let element_score = ratio(matched_elements.len(), spec.inspection_elements.len());

        let mut matched_documentation = Vec::new();
        for (requirement, required) in &spec.documentation_requirements {
            if !required {
                continue;
            }
            let lower = requirement.to_lowercase();
            let variants = [lower.replace('_', " "), lower.replace('_', "-"), lower.clone()];
            if variants.iter().any(|v| content_lower.contains(v.as_str())) {
                matched_documentation.push(requirement.clone());
            } else {
                missing_requirements.push(requirement.clone());
            }
        }
        let documentation_score = ratio(matched_documentation.len(), spec.documentation_requirements.len());

        let compliance_score = pattern_score * 0.3 + element_score * 0.4 + documentation_score * 0.3;

        FrameworkComplianceResult {
            framework: supplied_name.to_string(),
            framework_name: spec.name.clone(),
            jurisdiction: spec.jurisdiction.clone(),
            compliance_score,
            pattern_score,
            element_score,
            documentation_score,
            matched_patterns,
            matched_elements,
            matched_documentation,
            missing_requirements,
            compliant: compliance_score >= FRAMEWORK_THRESHOLD,
        }
    }

    pub fn check_regulatory_compliance<S: AsRef<str>>(
        &self,
        content: &str,
        frameworks: &[S],
        document_type: &str,
    ) -> RegulatoryComplianceResult {
        let mut framework_results: Vec<FrameworkComplianceResult> = Vec::new();
        let mut checked_keys: Vec<String> = Vec::new();

        for name in frameworks {
            let name = name.as_ref();
            match self.knowledge_base.framework(name) {
                Some(spec) if checked_keys.contains(&spec.key) => {}
                Some(spec) => {
                    checked_keys.push(spec.key.clone());
                    framework_results.push(self.check_framework(content, name, spec));
                }
                None => tracing::warn!("Unknown regulatory framework: {}", name),
            }
        }

        let compliance_score = if framework_results.is_empty() {
            0.0
        } else {
            framework_results.iter().map(|r| r.compliance_score).sum::<f64>() / framework_results.len() as f64
        };

        let missing_requirements: Vec<String> = framework_results
            .iter()
            .flat_map(|r| r.missing_requirements.iter().cloned())
            .collect();

        let recommendations = regulatory_recommendations(compliance_score, &framework_results, &missing_requirements);

        RegulatoryComplianceResult {
            overall_compliant: compliance_score >= FRAMEWORK_THRESHOLD && missing_requirements.is_empty(),
            compliance_score,
            framework_results,
            missing_requirements,
            recommendations,
            checked_frameworks: frameworks.iter().map(|f| f.as_ref().to_string()).collect(),
            document_type: document_type.to_string(),
            check_timestamp: Utc::now(),
        }
    }

    /// ALCOA+ check: word-boundary match with a plain substring fallback
    pub fn check_data_integrity(&self, content: &str) -> DataIntegrityResult {
        let content_lower = content.to_lowercase();
        let mut matched_principles = Vec::new();
        let mut missing_principles = Vec::new();

        for (principle, pattern) in ALCOA_PLUS_PRINCIPLES.iter().zip(&self.alcoa_patterns) {
            if pattern.is_match(content) || content_lower.contains(principle) {
                matched_principles.push(principle.to_string());
            } else {
                missing_principles.push(principle.to_string());
            }
        }

        let data_integrity_score = ratio(matched_principles.len(), ALCOA_PLUS_PRINCIPLES.len());

        DataIntegrityResult {
            data_integrity_score,
            alcoa_plus_ready: missing_principles.is_empty(),
            matched_principles,
            missing_principles,
            total_principles: ALCOA_PLUS_PRINCIPLES.len(),
            compliant: data_integrity_score >= DATA_INTEGRITY_THRESHOLD,
        }
    }

    /// 21 CFR Part 11: a requirement counts when all of its words occur
    pub fn check_electronic_records(&self, content: &str) -> ElectronicRecordsResult {
        let rule = &self.electronic_records;
        let content_lower = content.to_lowercase();

        let matched_patterns = rule.matched_patterns(content);
        let (matched_requirements, missing_requirements): (Vec<&str>, Vec<&str>) = rule
            .spec
            .requirements
            .iter()
            .copied()
            .partition(|requirement| requirement.split_whitespace().all(|word| content_lower.contains(word)));

        let pattern_score = ratio(matched_patterns.len(), rule.spec.patterns.len());
        let requirement_score = ratio(matched_requirements.len(), rule.spec.requirements.len());
        let electronic_records_score = (pattern_score + requirement_score) / 2.0;

        ElectronicRecordsResult {
            electronic_records_score,
            pattern_score,
            requirement_score,
            matched_patterns,
            matched_requirements: matched_requirements.into_iter().map(String::from).collect(),
            missing_requirements: missing_requirements.into_iter().map(String::from).collect(),
            cfr_part_11_compliant: electronic_records_score >= ELECTRONIC_RECORDS_THRESHOLD,
        }
    }

    fn check_rule(&self, content: &str, rule: &CompiledRule) -> RuleComplianceResult {
        let content_lower = content.to_lowercase();

        let matched_patterns = rule.matched_patterns(content);
        let (matched_requirements, missing_requirements): (Vec<&str>, Vec<&str>) = rule
            .spec
            .requirements
            .iter()
            .copied()
            .partition(|requirement| requirement.split_whitespace().any(|word| content_lower.contains(word)));

        let requirement_score = if rule.spec.requirements.is_empty() {
            100.0
        } else {
            ratio(matched_requirements.len(), rule.spec.requirements.len())
        };
        let pattern_score = if rule.spec.patterns.is_empty() {
            requirement_score
        } else {
            ratio(matched_patterns.len(), rule.spec.patterns.len())
        };
        let compliance_score = (requirement_score + pattern_score) / 2.0;

        RuleComplianceResult {
            rule_name: rule.spec.name.to_string(),
            compliance_score,
            requirement_score,
            pattern_score,
            matched_requirements: matched_requirements.into_iter().map(String::from).collect(),
            matched_patterns,
            missing_requirements: missing_requirements.into_iter().map(String::from).collect(),
            compliant: compliance_score >= RULE_THRESHOLD,
            critical: rule.spec.critical,
        }
    }

    pub fn check_change_control(&self, content: &str) -> RuleComplianceResult {
        self.check_rule(content, &self.change_control)
    }

    pub fn check_deviation_management(&self, content: &str) -> RuleComplianceResult {
        self.check_rule(content, &self.deviation_management)
    }

    pub fn check_qualification_validation(&self, content: &str) -> RuleComplianceResult {
        self.check_rule(content, &self.qualification_validation)
    }

    pub fn generate_compliance_report<S: AsRef<str>>(
        &self,
        content: &str,
        sections: &BTreeMap<String, String>,
        frameworks: &[S],
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> ComplianceReport {
        self.generate_compliance_report_at(content, sections, frameworks, metadata, Utc::now())
    }

    pub fn generate_compliance_report_at<S: AsRef<str>>(
        &self,
        content: &str,
        sections: &BTreeMap<String, String>,
        frameworks: &[S],
        metadata: BTreeMap<String, serde_json::Value>,
        now: DateTime<Utc>,
    ) -> ComplianceReport {
        let regulatory = self.check_regulatory_compliance(content, frameworks, "sop");
        let data_integrity = self.check_data_integrity(content);
        let electronic_records = self.check_electronic_records(content);
        let change_control = self.check_change_control(content);
        let deviation_management = self.check_deviation_management(content);

        let scores = [
            regulatory.compliance_score,
            data_integrity.data_integrity_score,
            electronic_records.electronic_records_score,
            change_control.compliance_score,
            deviation_management.compliance_score,
        ];
        let compliance_score = scores.iter().sum::<f64>() / scores.len() as f64;

        let mut critical_issues = Vec::new();
        if !data_integrity.compliant {
            critical_issues.push("Data integrity (ALCOA+)".to_string());
        }
        if !electronic_records.cfr_part_11_compliant {
            critical_issues.push("21 CFR Part 11 electronic records".to_string());
        }
        if !regulatory.overall_compliant {
            critical_issues.push("Regulatory framework compliance".to_string());
        }

        let mut recommendations = regulatory.recommendations.clone();
        if !data_integrity.compliant {
            recommendations.push(format!(
                "Address data integrity gaps: {}",
                data_integrity.missing_principles.join(", ")
            ));
        }
        if !electronic_records.cfr_part_11_compliant {
            recommendations.push("Implement 21 CFR Part 11 electronic records controls".to_string());
        }
        if compliance_score < REPORT_THRESHOLD {
            recommendations.push(
                "Comprehensive revision required to meet pharmaceutical compliance standards".to_string(),
            );
        }

        let report_id = format!("COMP-{}", now.format("%Y%m%d-%H%M%S"));
        tracing::info!(
            "Compliance report {} generated - Score: {:.2}% ({} critical issues)",
            report_id,
            compliance_score,
            critical_issues.len()
        );

        ComplianceReport {
            report_id,
            generated_at: now,
            document_metadata: metadata,
            frameworks_checked: frameworks.iter().map(|f| f.as_ref().to_string()).collect(),
            overall_compliance: OverallCompliance {
                is_compliant: compliance_score >= REPORT_THRESHOLD && critical_issues.is_empty(),
                compliance_score,
                critical_issues,
                recommendations: dedup_in_order(recommendations),
            },
            regulatory_compliance: regulatory,
            data_integrity,
            electronic_records,
            change_control,
            deviation_management,
            qualification_validation: self.check_qualification_validation(content),
            content_quality: assess_content_quality(content),
            section_completeness: check_section_completeness(sections),
        }
    }

    pub fn supported_frameworks(&self) -> Vec<SupportedFramework> {
        self.knowledge_base
            .frameworks
            .iter()
            .map(|spec| SupportedFramework {
                key: spec.key.clone(),
                name: spec.name.clone(),
                jurisdiction: spec.jurisdiction.clone(),
                scope: spec.scope.clone(),
                element_count: spec.inspection_elements.len(),
                documentation_requirements: spec.documentation_requirements.len(),
                pattern_count: spec.reference_patterns.len(),
            })
            .collect()
    }
}

fn regulatory_recommendations(
    compliance_score: f64,
    framework_results: &[FrameworkComplianceResult],
    missing_requirements: &[String],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if compliance_score < 50.0 {
        recommendations.push("Critical: Comprehensive revision required for regulatory compliance".to_string());
    } else if compliance_score < 70.0 {
        recommendations.push("Major improvements needed to meet regulatory standards".to_string());
    } else if compliance_score < 85.0 {
        recommendations.push("Minor improvements recommended for optimal compliance".to_string());
    }

    for result in framework_results.iter().filter(|r| !r.compliant) {
        recommendations.push(format!("Address {} compliance gaps", result.framework));
        if !result.missing_requirements.is_empty() {
            let first: Vec<&str> = result.missing_requirements.iter().take(3).map(|s| s.as_str()).collect();
            recommendations.push(format!("Add {} required elements: {}", result.framework, first.join(", ")));
        }
    }

    if !missing_requirements.is_empty() {
        let first: Vec<&str> = missing_requirements.iter().take(5).map(|s| s.as_str()).collect();
        recommendations.push(format!("Implement missing regulatory requirements: {}", first.join(", ")));
    }

    dedup_in_order(recommendations)
}
