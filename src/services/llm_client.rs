/// Text generation collaborator for SOP jobs
/// `SopTextGenerator` is the seam the workflow depends on; `OllamaClient`
/// is the production adapter for a local Ollama model server

use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::middleware::error_handling::{AppError, Result};
use crate::models::sop::{PharmaceuticalDepartment, SopContent, SopRecord};
use crate::services::content_quality::generation_quality_score;
use crate::services::prompt_builder::{build_sop_prompt, SopPromptInput};
use crate::services::section_extractor::parse_generated_sop;

// ============================================================================
// Generator contract
// ============================================================================

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub title: String,
    pub description: String,
    pub template_content: Option<String>,
    pub guideline_content: Option<String>,
    pub regulatory_frameworks: Vec<String>,
    pub department: PharmaceuticalDepartment,
}

impl GenerationRequest {
    pub fn from_record(record: &SopRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            template_content: record.template_content.clone(),
            guideline_content: record.guideline_content.clone(),
            regulatory_frameworks: record.regulatory_frameworks.clone(),
            department: record.department,
        }
    }

    pub fn prompt(&self) -> String {
        build_sop_prompt(&SopPromptInput {
            title: &self.title,
            description: &self.description,
            template_content: self.template_content.as_deref(),
            guideline_content: self.guideline_content.as_deref(),
            regulatory_frameworks: &self.regulatory_frameworks,
            department: self.department,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub status: GenerationStatus,
    pub sop_content: Option<SopContent>,
    pub error_message: Option<String>,
    pub model_used: String,
    pub generation_time_seconds: f64,
    pub quality_score: Option<f64>,
}

impl GenerationOutcome {
    /// Parse raw model output into a completed outcome
    pub fn from_generated_text(text: &str, model_used: &str, generation_time_seconds: f64) -> Self {
        let content = parse_generated_sop(text);
        Self {
            status: GenerationStatus::Completed,
            quality_score: Some(generation_quality_score(&content)),
            sop_content: Some(content),
            error_message: None,
            model_used: model_used.to_string(),
            generation_time_seconds,
        }
    }

    pub fn failed(error_message: impl Into<String>, model_used: &str, generation_time_seconds: f64) -> Self {
        Self {
            status: GenerationStatus::Failed,
            sop_content: None,
            error_message: Some(error_message.into()),
            model_used: model_used.to_string(),
            generation_time_seconds,
            quality_score: None,
        }
    }
}

/// Anything that can turn a generation request into SOP text.
///
/// Implementations report failures inside the outcome instead of returning an error.
pub trait SopTextGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> BoxFuture<'a, GenerationOutcome>;
}

// ============================================================================
// Ollama adapter
// ============================================================================

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    repeat_penalty: f32,
    num_predict: u32,
    num_ctx: u32,
}

impl Default for OllamaOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.9,
            top_k: 40,
            repeat_penalty: 1.1,
            num_predict: 4000,
            num_ctx: 8192,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}

pub struct OllamaClient {
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            http_client,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// True when the configured model is listed by the server
    pub async fn check_model_availability(&self) -> Result<bool> {
        let response = self
            .http_client
            .get(self.url("/api/tags"))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!("Ollama returned {}", response.status())));
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Ollama tags: {}", e)))?;

        let available = tags.models.iter().any(|m| m.name == self.model);
        if !available {
            let names: Vec<&str> = tags.models.iter().map(|m| m.name.as_str()).collect();
            tracing::warn!("Model {} not found. Available models: {:?}", self.model, names);
        }
        Ok(available)
    }

    /// Single non-streaming completion
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let request = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions::default(),
        };

        let response = self
            .http_client
            .post(self.url("/api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Ollama API error ({}): {}", status, error_body);
            return Err(AppError::Upstream(format!("Ollama returned error {}", status)));
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Ollama response: {}", e)))?;

        if body.response.trim().is_empty() {
            return Err(AppError::Upstream("Empty response from Ollama model".to_string()));
        }
        Ok(body.response)
    }
}

impl SopTextGenerator for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> BoxFuture<'a, GenerationOutcome> {
        Box::pin(async move {
            let start = Instant::now();
            tracing::info!("Starting SOP generation for: {}", request.title);

            match self.generate_text(&request.prompt()).await {
                Ok(text) => {
                    let elapsed = start.elapsed().as_secs_f64();
                    tracing::info!("SOP generation completed in {:.2} seconds", elapsed);
                    GenerationOutcome::from_generated_text(&text, &self.model, elapsed)
                }
                Err(e) => {
                    let message = format!("SOP generation failed: {}", e);
                    tracing::error!("{}", message);
                    GenerationOutcome::failed(message, &self.model, start.elapsed().as_secs_f64())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_generation_options() {
        let request = OllamaGenerateRequest {
            model: "mistral:7b-instruct",
            prompt: "Generate",
            stream: false,
            options: OllamaOptions::default(),
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["num_predict"], 4000);
        assert_eq!(value["options"]["num_ctx"], 8192);
        assert!((value["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_outcome_from_generated_text_is_parsed_and_scored() {
        let outcome = GenerationOutcome::from_generated_text("Purpose\nDefine the line clearance.", "mistral", 1.5);

        assert_eq!(outcome.status, GenerationStatus::Completed);
        let content = outcome.sop_content.unwrap();
        assert_eq!(content.sections["purpose"], "Define the line clearance.");
        assert!(outcome.quality_score.is_some());
        assert!(outcome.error_message.is_none());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = OllamaClient::new("http://localhost:11434/", "mistral", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/api/generate"), "http://localhost:11434/api/generate");
        assert_eq!(client.model_name(), "mistral");
    }
}
