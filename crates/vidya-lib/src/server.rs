//! HTTP API for the college widget.
//!
//! Runs on port 5000 by default. CORS-permissive so the widget can be
//! embedded on the college's own site.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use vidya_core::facts::{FactStore, FactsError};
use vidya_core::language::Language;
use vidya_core::types::{ChatMessage, Fact, InvalidFact, NewFact};

use crate::chat::{ChatError, ChatReply, ChatService};
use crate::config::ServerConfig;
use crate::llm::{ChatModel, GroqClient};
use crate::storage::{self, Storage, StorageError};
use crate::tts::{BROWSER_TIER, SpeakError, SpeechDispatcher, SpeechOutcome, TierAttempt};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to read facts file {path}: {source}")]
    ReadFacts {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Facts(#[from] FactsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub chat: Arc<ChatService>,
    pub speech: Arc<SpeechDispatcher>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn Storage>,
        model: Arc<dyn ChatModel>,
        speech: SpeechDispatcher,
        config: &ServerConfig,
    ) -> Self {
        let chat = ChatService::new(
            storage.clone(),
            model,
            config.college_name.clone(),
            config.chat.clone(),
        );
        Self {
            storage,
            chat: Arc::new(chat),
            speech: Arc::new(speech),
        }
    }

    /// Load facts, open storage and build the provider clients.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        let facts = load_facts(config.facts_path.as_deref())?;
        let storage = storage::open(config.database_url.as_deref(), facts).await?;
        let model: Arc<dyn ChatModel> = Arc::new(GroqClient::new(&config.groq));
        let speech = SpeechDispatcher::from_config(config);

        info!(
            "chat model: {} ({})",
            model.id(),
            if model.is_configured() { "configured" } else { "not configured, canned replies only" }
        );
        info!("tts tiers: {}", speech.available_tiers().join(" → "));

        Ok(Self::new(storage, model, speech, config))
    }
}

fn load_facts(path: Option<&Path>) -> Result<FactStore, StartupError> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|source| StartupError::ReadFacts {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(FactStore::from_json(&json)?)
        }
        None => Ok(FactStore::bundled()?),
    }
}

/// Build the axum router with shared [`AppState`].
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/college-info", get(list_facts).post(create_fact))
        .route("/api/college-info/categories", get(categories))
        .route("/api/college-info/search", get(search_facts))
        .route("/api/college-info/{category}", get(facts_by_category))
        .route("/api/chat", post(chat))
        .route("/api/chat/{session_id}", get(chat_history))
        .route("/api/tts", post(tts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Build state from `config`, bind and serve until the process exits.
pub async fn serve(config: ServerConfig) -> Result<(), StartupError> {
    let state = AppState::from_config(&config).await?;
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("vidya listening on http://{addr}");
    axum::serve(listener, router(state))
        .await
        .map_err(StartupError::Serve)
}

// ─── Errors ────────────────────────────────────────────────────────────────

/// A failed request, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            Self::NotFound(m) => (StatusCode::NOT_FOUND, m),
            Self::Internal(m) => {
                error!("request failed: {m}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::Storage(e) => e.into(),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

/// Malformed or incomplete JSON bodies get the same `{"error"}` shape.
impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<InvalidFact> for ApiError {
    fn from(e: InvalidFact) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<SpeakError> for ApiError {
    fn from(e: SpeakError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

// ─── Request / response types ──────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    storage: &'static str,
    tts_providers: Vec<&'static str>,
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    message: String,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Deserialize)]
struct TtsRequest {
    text: String,
}

#[derive(Serialize)]
struct BrowserFallbackResponse {
    error: &'static str,
    fallback: &'static str,
    text: String,
    language: Language,
    attempts: Vec<TierAttempt>,
}

// ─── Handlers ──────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        storage: state.storage.kind(),
        tts_providers: state.speech.available_tiers(),
    })
}

async fn list_facts(State(state): State<AppState>) -> Result<Json<Vec<Fact>>, ApiError> {
    Ok(Json(state.storage.all_facts().await?))
}

async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let mut categories: Vec<String> = Vec::new();
    for fact in state.storage.all_facts().await? {
        if !categories.contains(&fact.category) {
            categories.push(fact.category);
        }
    }
    Ok(Json(categories))
}

async fn search_facts(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Fact>>, ApiError> {
    let q = params.q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("query parameter 'q' is required".into()));
    }
    Ok(Json(state.storage.search_facts(q).await?))
}

async fn facts_by_category(
    State(state): State<AppState>,
    UrlPath(category): UrlPath<String>,
) -> Result<Json<Vec<Fact>>, ApiError> {
    let facts = state.storage.facts_by_category(&category).await?;
    if facts.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no information for category '{category}'"
        )));
    }
    Ok(Json(facts))
}

async fn create_fact(
    State(state): State<AppState>,
    body: Result<Json<NewFact>, JsonRejection>,
) -> Result<(StatusCode, Json<Fact>), ApiError> {
    let Json(fact) = body?;
    let fact = state.storage.create_fact(fact.normalized()?).await?;
    info!("fact #{} added to '{}'", fact.id, fact.category);
    Ok((StatusCode::CREATED, Json(fact)))
}

async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(req) = body?;
    let session_id = req
        .session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    Ok(Json(state.chat.reply(&session_id, &req.message).await?))
}

async fn chat_history(
    State(state): State<AppState>,
    UrlPath(session_id): UrlPath<String>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    Ok(Json(state.storage.messages_for_session(&session_id).await?))
}

async fn tts(
    State(state): State<AppState>,
    body: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body?;
    match state.speech.speak(&req.text).await? {
        SpeechOutcome::Audio {
            provider,
            audio,
            language,
        } => Ok((
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(audio.content_type)),
                (
                    header::HeaderName::from_static("x-tts-provider"),
                    HeaderValue::from_static(provider),
                ),
                (
                    header::HeaderName::from_static("x-tts-language"),
                    HeaderValue::from_static(language.code()),
                ),
            ],
            audio.data,
        )
            .into_response()),
        SpeechOutcome::BrowserFallback {
            text,
            language,
            attempts,
        } => Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(BrowserFallbackResponse {
                error: "no server-side speech provider available",
                fallback: BROWSER_TIER,
                text,
                language,
                attempts,
            }),
        )
            .into_response()),
    }
}
