//! Article generation: instruction templates, model-output parsing, validation.
//!
//! Wraps a blog-article request in a fixed instruction template demanding a
//! JSON object with `title`, `description`, and `content`, then parses and
//! validates the model's reply into an [`ArticleDraft`].

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use contentpilot_gemini::GeminiClient;
use contentpilot_shared::{ArticleDraft, ContentPilotError, PromptLanguage, Result};

/// Strips the Markdown code fences models tend to wrap around JSON output.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json|```").expect("valid regex"));

// ---------------------------------------------------------------------------
// Instruction templates
// ---------------------------------------------------------------------------

fn build_prompt(request: &str, language: PromptLanguage) -> String {
    match language {
        PromptLanguage::En => format!(
            "You are an expert SEO copywriter. Write a high-quality, structured blog article \
             based on the following request: \"{request}\". Your response MUST be a single JSON \
             object with \"title\", \"description\", and \"content\" fields."
        ),
        PromptLanguage::Ru => format!(
            "Ты — SEO-эксперт и копирайтер. Напиши качественную, структурированную статью для \
             блога на основе следующего запроса: \"{request}\".\n\n\
             Твой ответ ДОЛЖЕН БЫТЬ в формате JSON и содержать три поля: \"title\", \
             \"description\" и \"content\".\n\
             - \"title\": SEO-оптимизированный заголовок статьи (до 60 символов).\n\
             - \"description\": Краткое описание для мета-тега (до 160 символов).\n\
             - \"content\": Основной текст статьи в формате Markdown. Он должен быть хорошо \
             структурирован, с заголовками (h2, h3), списками и параграфами."
        ),
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate an article draft for a request.
///
/// Single attempt, no retry. Malformed model output fails with a parse
/// error rather than propagating a partial draft.
#[instrument(skip_all, fields(language = %language))]
pub async fn generate_draft(
    client: &GeminiClient,
    request: &str,
    language: PromptLanguage,
) -> Result<ArticleDraft> {
    if request.trim().is_empty() {
        return Err(ContentPilotError::input("prompt is required"));
    }

    let prompt = build_prompt(request, language);
    debug!(model = %client.model(), chars = prompt.len(), "requesting article draft");

    let raw = client.generate(&prompt).await?;
    parse_draft(&raw)
}

/// Parse model output into a validated draft.
///
/// Strips code fences, parses as JSON, and requires all three fields to be
/// present and strings.
pub fn parse_draft(raw: &str) -> Result<ArticleDraft> {
    let stripped = FENCE_RE.replace_all(raw, "");
    let stripped = stripped.trim();

    let value: serde_json::Value = serde_json::from_str(stripped)
        .map_err(|e| ContentPilotError::parse(format!("model output is not valid JSON: {e}")))?;

    Ok(ArticleDraft {
        title: require_string_field(&value, "title")?,
        description: require_string_field(&value, "description")?,
        content: require_string_field(&value, "content")?,
    })
}

fn require_string_field(value: &serde_json::Value, field: &str) -> Result<String> {
    match value.get(field) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ContentPilotError::parse(format!(
            "model output field {field:?} must be a string"
        ))),
        None => Err(ContentPilotError::parse(format!(
            "model output is missing field {field:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentpilot_gemini::GeminiOptions;

    #[test]
    fn parse_draft_strips_code_fences() {
        let raw = "```json\n{\"title\":\"T\",\"description\":\"D\",\"content\":\"## Body\"}\n```";
        let draft = parse_draft(raw).unwrap();
        assert_eq!(draft.title, "T");
        assert_eq!(draft.description, "D");
        assert_eq!(draft.content, "## Body");
    }

    #[test]
    fn parse_draft_accepts_bare_json() {
        let raw = r#"{"title":"T","description":"D","content":"Body"}"#;
        assert!(parse_draft(raw).is_ok());
    }

    #[test]
    fn parse_draft_rejects_missing_field() {
        let raw = r#"{"title":"T","description":"D"}"#;
        let err = parse_draft(raw).unwrap_err();
        assert!(matches!(err, ContentPilotError::Parse { .. }));
        assert!(err.to_string().contains("content"));
    }

    #[test]
    fn parse_draft_rejects_non_string_field() {
        let raw = r#"{"title":42,"description":"D","content":"Body"}"#;
        let err = parse_draft(raw).unwrap_err();
        assert!(err.to_string().contains("title"));
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn parse_draft_rejects_invalid_json() {
        let err = parse_draft("the model rambled instead").unwrap_err();
        assert!(matches!(err, ContentPilotError::Parse { .. }));
    }

    #[test]
    fn prompt_templates_embed_request() {
        let en = build_prompt("How to seal a basement", PromptLanguage::En);
        assert!(en.contains("\"How to seal a basement\""));
        assert!(en.contains("MUST be a single JSON object"));

        let ru = build_prompt("Как гидроизолировать подвал", PromptLanguage::Ru);
        assert!(ru.contains("\"Как гидроизолировать подвал\""));
        assert!(ru.contains("\"title\""));
    }

    #[tokio::test]
    async fn generate_draft_rejects_blank_request() {
        let client = GeminiClient::new(GeminiOptions::new("key", "model")).unwrap();
        let err = generate_draft(&client, "   ", PromptLanguage::En)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentPilotError::Input { .. }));
    }

    #[tokio::test]
    async fn generate_draft_parses_fenced_model_output() {
        let server = wiremock::MockServer::start().await;

        let model_text = "```json\n{\"title\":\"Dry Basements\",\"description\":\"A guide.\",\"content\":\"## Intro\\n\\nText.\"}\n```";
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": model_text}]}}]
        });

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path(
                "/v1beta/models/test-model:generateContent",
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body.to_string()))
            .mount(&server)
            .await;

        let client = GeminiClient::new(GeminiOptions {
            api_base: server.uri(),
            api_key: "test-key".into(),
            model: "test-model".into(),
            timeout_secs: 5,
        })
        .unwrap();

        let draft = generate_draft(&client, "Write about dry basements", PromptLanguage::En)
            .await
            .unwrap();
        assert_eq!(draft.title, "Dry Basements");
        assert_eq!(draft.content, "## Intro\n\nText.");
    }
}
