//! HTTP routes for the article functions.
//!
//! JSON in, JSON out. Input errors map to 400, everything else to 500 with
//! the human-readable message in an `{"error": ...}` body.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use contentpilot_core::publisher::{self, PublishConfig};
use contentpilot_core::scheduler::{self, RunConfig, SilentProgress};
use contentpilot_core::{consultant, generator};
use contentpilot_gemini::GeminiClient;
use contentpilot_github::GithubClient;
use contentpilot_knowledge::{KnowledgeBase, format_knowledge_base};
use contentpilot_shared::{AppConfig, ContentPilotError, PromptLanguage};

// ---------------------------------------------------------------------------
// State & router
// ---------------------------------------------------------------------------

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub gemini: GeminiClient,
    pub github: GithubClient,
    pub kb: KnowledgeBase,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-article", post(generate_article))
        .route("/api/ask-consultant", post(ask_consultant))
        .route("/api/knowledge-base", get(knowledge_base))
        .route("/api/publish-scheduled", post(publish_scheduled))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Wrapper mapping domain errors onto the HTTP status contract.
pub struct ApiError(ContentPilotError);

impl From<ContentPilotError> for ApiError {
    fn from(e: ContentPilotError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ContentPilotError::Input { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
        }

        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Extract a required, non-blank string field from a request body.
fn require_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ContentPilotError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ContentPilotError::input(format!("{name} is required"))),
    }
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateArticleRequest {
    prompt: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateArticleResponse {
    message: String,
    slug: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct AskConsultantRequest {
    question: Option<String>,
}

#[derive(Debug, Serialize)]
struct AskConsultantResponse {
    answer: String,
}

#[derive(Debug, Serialize)]
struct KnowledgeBaseResponse {
    context: String,
}

#[derive(Debug, Serialize)]
struct PublishScheduledResponse {
    due: usize,
    published: usize,
    failed: usize,
    plan_updated: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Generate a single article from a prompt and commit it to the blog.
async fn generate_article(
    State(state): State<AppState>,
    Json(req): Json<GenerateArticleRequest>,
) -> Result<Json<GenerateArticleResponse>, ApiError> {
    let prompt = require_field(req.prompt.as_deref(), "prompt")?;

    let language = match req.language.as_deref() {
        Some(raw) => raw
            .parse::<PromptLanguage>()
            .map_err(ContentPilotError::input)?,
        None => state.config.content.language,
    };

    info!(prompt, %language, "generate-article request");

    let draft = generator::generate_draft(&state.gemini, prompt, language).await?;
    let publish_config = PublishConfig::from_content(&state.config.content);
    let article = publisher::publish_article(&state.github, &publish_config, &draft).await?;

    Ok(Json(GenerateArticleResponse {
        message: format!("Article \"{}\" created successfully!", article.title),
        slug: article.slug,
        path: article.path,
    }))
}

/// Answer a visitor question from the knowledge base.
async fn ask_consultant(
    State(state): State<AppState>,
    Json(req): Json<AskConsultantRequest>,
) -> Result<Json<AskConsultantResponse>, ApiError> {
    let question = require_field(req.question.as_deref(), "question")?;

    info!(question, "ask-consultant request");

    let answer = consultant::answer_question(&state.gemini, &state.kb, question).await?;
    Ok(Json(AskConsultantResponse { answer }))
}

/// Return the formatted knowledge-base context block.
async fn knowledge_base(State(state): State<AppState>) -> Json<KnowledgeBaseResponse> {
    Json(KnowledgeBaseResponse {
        context: format_knowledge_base(&state.kb),
    })
}

/// Publish every scheduled article whose date has arrived.
async fn publish_scheduled(
    State(state): State<AppState>,
) -> Result<Json<PublishScheduledResponse>, ApiError> {
    info!("publish-scheduled request");

    let run_config = RunConfig {
        plan_path: state.config.content.plan_path.clone(),
        language: state.config.content.language,
        publish: PublishConfig::from_content(&state.config.content),
    };

    let report =
        scheduler::run_scheduled(&state.gemini, &state.github, &run_config, &SilentProgress)
            .await?;

    Ok(Json(PublishScheduledResponse {
        due: report.due,
        published: report.published,
        failed: report.failed,
        plan_updated: report.plan_updated,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
