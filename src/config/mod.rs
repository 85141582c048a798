pub mod database;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::repositories::SopRepository;
use crate::services::knowledge_base::KnowledgeBaseError;
use crate::services::{
    AuditService, AuditSink, PharmaceuticalValidator, RegulatoryChecker, RegulatoryKnowledgeBase, SopTextGenerator,
    SopValidationService, SopWorkflowService,
};

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub database_url: Option<String>,
    pub ollama: OllamaConfig,
    pub max_sop_length: usize,
    pub max_retry_attempts: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let cors_origins = var(
            "CORS_ORIGINS",
            "http://localhost:3000,http://localhost:5173,http://localhost:8080",
        )
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

        let timeout_secs: u64 = var("OLLAMA_TIMEOUT_SECS", "300")
            .parse()
            .context("OLLAMA_TIMEOUT_SECS must be a number of seconds")?;

        Ok(Self {
            server_host: var("SERVER_HOST", "0.0.0.0"),
            server_port: var("SERVER_PORT", "9000")
                .parse()
                .context("SERVER_PORT must be a valid port")?,
            cors_origins,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            ollama: OllamaConfig {
                host: var("OLLAMA_HOST", "http://localhost:11434"),
                model: var("OLLAMA_MODEL", "mistral:7b-instruct"),
                timeout: Duration::from_secs(timeout_secs),
            },
            max_sop_length: var("MAX_SOP_LENGTH", "50000")
                .parse()
                .context("MAX_SOP_LENGTH must be a positive integer")?,
            max_retry_attempts: var("MAX_RETRY_ATTEMPTS", "3")
                .parse()
                .context("MAX_RETRY_ATTEMPTS must be a positive integer")?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub validator: Arc<SopValidationService>,
    pub checker: Arc<RegulatoryChecker>,
    pub pharmaceutical_validator: Arc<PharmaceuticalValidator>,
    pub workflow: SopWorkflowService,
}

impl AppState {
    /// Wire the scoring engine and workflow around the given collaborators
    pub fn new(
        config: AppConfig,
        repository: Arc<dyn SopRepository>,
        generator: Arc<dyn SopTextGenerator>,
        audit_sink: Arc<dyn AuditSink>,
    ) -> std::result::Result<Self, KnowledgeBaseError> {
        let knowledge_base = Arc::new(RegulatoryKnowledgeBase::standard());
        knowledge_base.verify()?;

        let validator = Arc::new(SopValidationService::new(knowledge_base.clone()));
        let pharmaceutical_validator = Arc::new(PharmaceuticalValidator::new(&knowledge_base)?);
        let checker = Arc::new(RegulatoryChecker::new(knowledge_base)?);
        let workflow = SopWorkflowService::new(
            repository,
            generator,
            validator.clone(),
            checker.clone(),
            AuditService::new(audit_sink),
        )
        .with_max_retry_attempts(config.max_retry_attempts);

        Ok(Self {
            config: Arc::new(config),
            validator,
            checker,
            pharmaceutical_validator,
            workflow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server_address(), "0.0.0.0:9000");
        assert_eq!(config.cors_origins.len(), 3);
        assert!(config.database_url.is_none());
        assert_eq!(config.ollama.model, "mistral:7b-instruct");
        assert_eq!(config.ollama.timeout, Duration::from_secs(300));
        assert_eq!(config.max_sop_length, 50000);
        assert_eq!(config.max_retry_attempts, 3);
    }

    #[test]
    fn test_overrides_and_invalid_numbers() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SERVER_PORT", "8088"),
            ("CORS_ORIGINS", "https://qa.example.com, "),
            ("DATABASE_URL", "postgres://localhost/sops"),
        ]))
        .unwrap();
        assert_eq!(config.server_port, 8088);
        assert_eq!(config.cors_origins, vec!["https://qa.example.com"]);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/sops"));

        assert!(AppConfig::from_lookup(lookup(&[("SERVER_PORT", "ninety")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("MAX_RETRY_ATTEMPTS", "-1")])).is_err());
    }
}
