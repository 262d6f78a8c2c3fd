//! HTTP relay server
//!
//! A stateless passthrough: `POST /api/chat` wraps one user message in a
//! chat-completion request to the configured upstream API and returns the
//! first choice's content. Holds no conversation state; every request is
//! independent.

use crate::config::ServerConfig;
use crate::error::{Result, RougechatError};
use crate::relay::{ChatRequest, ChatResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// Shared state for the relay routes
#[derive(Clone)]
pub struct RelayState {
    http: Client,
    config: ServerConfig,
}

impl RelayState {
    /// Build relay state from the server configuration
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("rougechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RougechatError::Relay(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }
}

/// Upstream chat-completion request body
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<CompletionMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// Message structure for the upstream API
#[derive(Debug, Serialize, Deserialize)]
struct CompletionMessage {
    role: String,
    content: String,
}

/// Upstream chat-completion response body
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

/// Error responses of the chat route
///
/// The wire bodies mirror what browser clients of this relay have always
/// received: a 400 with `Message is required`, the upstream's own status
/// with its error body attached as `details`, or a plain 500.
enum RelayError {
    MissingMessage,
    // Status carried as a bare u16: the upstream client and this server
    // speak different http crate versions.
    Upstream { status: u16, details: serde_json::Value },
    Internal(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::MissingMessage => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Message is required"})),
            )
                .into_response(),
            RelayError::Upstream { status, details } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                Json(json!({"error": "Upstream API error", "details": details})),
            )
                .into_response(),
            RelayError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error", "message": message})),
            )
                .into_response(),
        }
    }
}

/// Create the relay router
///
/// CORS is wide open; the relay fronts browser clients on other origins and
/// carries no credentials of its own.
pub fn create_router(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors)
}

async fn chat(
    State(state): State<RelayState>,
    Json(request): Json<ChatRequest>,
) -> std::result::Result<Json<ChatResponse>, RelayError> {
    if request.message.is_empty() {
        return Err(RelayError::MissingMessage);
    }

    tracing::info!("Relaying message ({} chars)", request.message.len());

    let upstream = &state.config.upstream;
    let url = format!(
        "{}/chat/completions",
        upstream.api_base.trim_end_matches('/')
    );

    let body = CompletionRequest {
        model: upstream.model.clone(),
        messages: vec![CompletionMessage {
            role: "user".to_string(),
            content: request.message.clone(),
        }],
        temperature: upstream.temperature,
        max_tokens: upstream.max_tokens,
    };

    let mut upstream_request = state.http.post(&url).json(&body);
    if let Some(key) = &upstream.api_key {
        upstream_request = upstream_request.bearer_auth(key);
    }

    let response = upstream_request.send().await.map_err(|e| {
        tracing::error!("Upstream request failed: {}", e);
        RelayError::Internal(e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        let details = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);
        tracing::error!("Upstream returned {}: {}", status, details);
        return Err(RelayError::Upstream {
            status: status.as_u16(),
            details,
        });
    }

    let completion: CompletionResponse = response.json().await.map_err(|e| {
        tracing::error!("Failed to parse upstream response: {}", e);
        RelayError::Internal(e.to_string())
    })?;

    let reply = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| RelayError::Internal("Upstream returned no choices".to_string()))?;

    Ok(Json(ChatResponse { response: reply }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Bind the configured listen address and serve the relay until shutdown
pub async fn run_server(config: &ServerConfig) -> Result<()> {
    if config.upstream.api_key.is_none() {
        tracing::warn!("No upstream API key configured; set OPENAI_API_KEY");
    }

    let state = RelayState::new(config)?;
    let app = create_router(state);

    let addr: SocketAddr = config.listen.parse().map_err(|e| {
        RougechatError::Config(format!("Invalid listen address '{}': {}", config.listen, e))
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Relay listening on {} (upstream model {})",
        addr,
        config.upstream.model
    );
    axum::serve(listener, app).await?;
    Ok(())
}
