pub mod audit_service;
pub mod content_quality;
pub mod knowledge_base;
pub mod llm_client;
pub mod pharmaceutical_validator;
pub mod prompt_builder;
pub mod regulatory_checker;
pub mod section_extractor;
pub mod sop_workflow_service;
pub mod validation_service;

pub use audit_service::{AuditService, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use knowledge_base::RegulatoryKnowledgeBase;
pub use llm_client::{OllamaClient, SopTextGenerator};
pub use pharmaceutical_validator::PharmaceuticalValidator;
pub use regulatory_checker::RegulatoryChecker;
pub use sop_workflow_service::SopWorkflowService;
pub use validation_service::SopValidationService;
