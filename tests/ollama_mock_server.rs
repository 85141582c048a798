// Mock Ollama Server for Testing
// Simulates the /api/tags and /api/generate endpoints
// Run with: cargo test --test ollama_mock_server

use axum::{extract::State, http::StatusCode, response::Json, routing::get, routing::post, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use sop_author::models::sop::PharmaceuticalDepartment;
use sop_author::services::llm_client::{GenerationRequest, GenerationStatus, OllamaClient, SopTextGenerator};

// ============================================================================
// Mock State
// ============================================================================

#[derive(Debug, Default)]
pub struct MockOllamaState {
    pub models: Vec<String>,
    pub response_text: String,
    pub fail_generation: bool,
    pub received_prompts: Vec<Value>,
}

type SharedState = Arc<RwLock<MockOllamaState>>;

// ============================================================================
// Mock Endpoints
// ============================================================================

async fn tags(State(state): State<SharedState>) -> Json<Value> {
    let state = state.read().await;
    let models: Vec<Value> = state.models.iter().map(|name| json!({ "name": name })).collect();
    Json(json!({ "models": models }))
}

async fn generate(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut state = state.write().await;
    state.received_prompts.push(payload.clone());

    if state.fail_generation {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(Json(json!({
        "model": payload["model"],
        "response": state.response_text,
        "done": true,
    })))
}

pub fn create_ollama_mock_server(state: SharedState) -> Router {
    Router::new()
        .route("/api/tags", get(tags))
        .route("/api/generate", post(generate))
        .with_state(state)
}

pub async fn start_mock_server(initial: MockOllamaState) -> (String, SharedState) {
    let state: SharedState = Arc::new(RwLock::new(initial));
    let app = create_ollama_mock_server(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

fn generation_request() -> GenerationRequest {
    GenerationRequest {
        title: "Cleaning of the tablet press".to_string(),
        description: "Cleaning of the rotary tablet press between campaigns".to_string(),
        template_content: None,
        guideline_content: None,
        regulatory_frameworks: vec!["ich_q7".to_string()],
        department: PharmaceuticalDepartment::Production,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_model_availability() {
        let (url, _) = start_mock_server(MockOllamaState {
            models: vec!["mistral:7b-instruct".to_string()],
            ..Default::default()
        })
        .await;

        let present = OllamaClient::new(&url, "mistral:7b-instruct", Duration::from_secs(5)).unwrap();
        assert!(present.check_model_availability().await.unwrap());

        let absent = OllamaClient::new(&url, "llama3:8b", Duration::from_secs(5)).unwrap();
        assert!(!absent.check_model_availability().await.unwrap());
    }

    #[tokio::test]
    async fn test_generation_parses_sections() {
        let (url, state) = start_mock_server(MockOllamaState {
            response_text: "Purpose\nDefine tablet press cleaning.\nProcedure\nDismantle, wash and dry all parts.".to_string(),
            ..Default::default()
        })
        .await;

        let client = OllamaClient::new(&url, "mistral:7b-instruct", Duration::from_secs(5)).unwrap();
        let outcome = client.generate(&generation_request()).await;

        assert_eq!(outcome.status, GenerationStatus::Completed);
        assert_eq!(outcome.model_used, "mistral:7b-instruct");
        let content = outcome.sop_content.unwrap();
        assert_eq!(content.sections["procedure"], "Dismantle, wash and dry all parts.");
        assert!(outcome.quality_score.is_some());

        let state = state.read().await;
        let sent = &state.received_prompts[0];
        assert_eq!(sent["stream"], false);
        assert_eq!(sent["options"]["num_predict"], 4000);
        assert!(sent["prompt"].as_str().unwrap().contains("TITLE: Cleaning of the tablet press"));
        assert!(sent["prompt"].as_str().unwrap().contains("ICH Q7"));
    }

    #[tokio::test]
    async fn test_server_error_becomes_failed_outcome() {
        let (url, _) = start_mock_server(MockOllamaState {
            fail_generation: true,
            ..Default::default()
        })
        .await;

        let client = OllamaClient::new(&url, "mistral:7b-instruct", Duration::from_secs(5)).unwrap();
        let outcome = client.generate(&generation_request()).await;

        assert_eq!(outcome.status, GenerationStatus::Failed);
        assert!(outcome.sop_content.is_none());
        assert!(outcome.error_message.unwrap().starts_with("SOP generation failed"));
    }

    #[tokio::test]
    async fn test_empty_response_is_an_error() {
        let (url, _) = start_mock_server(MockOllamaState::default()).await;

        let client = OllamaClient::new(&url, "mistral:7b-instruct", Duration::from_secs(5)).unwrap();
        assert!(client.generate_text("Generate").await.is_err());
    }
}
