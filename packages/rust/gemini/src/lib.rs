//! Gemini generateContent API client.
//!
//! Thin async wrapper over the `models/{model}:generateContent` endpoint.
//! Callers provide prompts; this crate handles the wire format, auth, and
//! extraction of the first candidate's text.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use contentpilot_shared::{ContentPilotError, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Default timeout in seconds for generation requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User-Agent string for Gemini requests.
const USER_AGENT: &str = concat!("ContentPilot/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    /// API base, e.g. `https://generativelanguage.googleapis.com`.
    pub api_base: String,
    /// API key, passed as the `key` query parameter.
    pub api_key: String,
    /// Model identifier, e.g. `gemini-1.5-pro-latest`.
    pub model: String,
    /// Timeout for generation requests in seconds.
    pub timeout_secs: u64,
}

impl GeminiOptions {
    /// Options for the given key and model against the public API.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Async client for the Gemini generateContent endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Build a client from options.
    pub fn new(opts: GeminiOptions) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(std::time::Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| {
                ContentPilotError::Generation(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            api_base: opts.api_base,
            api_key: opts.api_key,
            model: opts.model,
        })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text from a single user prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.request(GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: None,
        })
        .await
    }

    /// Generate text from a user prompt under a system instruction.
    pub async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.request(GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: Some(Content {
                role: Some("model"),
                parts: vec![Part { text: system }],
            }),
        })
        .await
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn request(&self, payload: GenerateContentRequest<'_>) -> Result<String> {
        // The key travels as a query parameter; errors report the endpoint
        // without it.
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );

        debug!(endpoint = %endpoint, "requesting generation");

        let response = self
            .http
            .post(format!("{endpoint}?key={}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ContentPilotError::Generation(format!("{endpoint}: {e}")))?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| {
            ContentPilotError::Generation(format!("{endpoint}: failed to read body: {e}"))
        })?;

        let body: GenerateContentResponse = serde_json::from_str(&raw).map_err(|e| {
            ContentPilotError::Generation(format!("{endpoint}: HTTP {status}: invalid body: {e}"))
        })?;

        if !status.is_success() {
            let detail = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(ContentPilotError::Generation(format!(
                "{endpoint}: {detail}"
            )));
        }

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text);

        match text {
            Some(text) if !text.is_empty() => {
                debug!(chars = text.len(), "generation complete");
                Ok(text)
            }
            _ => Err(ContentPilotError::Generation(format!(
                "{endpoint}: model returned no candidates"
            ))),
        }
    }
}
