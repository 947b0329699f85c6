//! Application configuration for ContentPilot.
//!
//! User config lives at `~/.contentpilot/contentpilot.toml`.
//! Secrets are never stored in the file: the `[github]` and `[gemini]`
//! sections name the environment variables that hold them, and resolution
//! happens once at process start.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ContentPilotError, Result};
use crate::types::{ContentType, PromptLanguage};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contentpilot.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contentpilot";

// ---------------------------------------------------------------------------
// Config structs (matching contentpilot.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Target repository settings.
    #[serde(default)]
    pub github: GithubConfig,

    /// Generative endpoint settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Blog content settings.
    #[serde(default)]
    pub content: ContentConfig,
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Repository owner (user or organization).
    #[serde(default)]
    pub owner: String,

    /// Repository name.
    #[serde(default)]
    pub repo: String,

    /// Branch that receives commits.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Name of the env var holding the access token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Contents API base URL.
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            token_env: default_token_env(),
            api_base: default_github_api_base(),
        }
    }
}

fn default_branch() -> String {
    "main".into()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_github_api_base() -> String {
    "https://api.github.com".into()
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for article generation and consultant answers.
    #[serde(default = "default_model")]
    pub model: String,

    /// Generative API base URL.
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            api_base: default_gemini_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-1.5-pro-latest".into()
}
fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_timeout_secs() -> u64 {
    60
}

/// `[content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Repository path of the content plan document.
    #[serde(default = "default_plan_path")]
    pub plan_path: String,

    /// Repository directory that receives published articles.
    #[serde(default = "default_blog_dir")]
    pub blog_dir: String,

    /// Author label written into article front matter.
    #[serde(default = "default_author")]
    pub author: String,

    /// Cover image path written into article front matter.
    #[serde(default = "default_cover_image")]
    pub cover_image: String,

    /// Alt text for the cover image.
    #[serde(default = "default_cover_image_alt")]
    pub cover_image_alt: String,

    /// Taxonomy flag for generated articles.
    #[serde(default)]
    pub content_type: ContentType,

    /// Local path of the knowledge-base JSON document.
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: String,

    /// Language of the instruction template sent to the model.
    #[serde(default)]
    pub language: PromptLanguage,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            plan_path: default_plan_path(),
            blog_dir: default_blog_dir(),
            author: default_author(),
            cover_image: default_cover_image(),
            cover_image_alt: default_cover_image_alt(),
            content_type: ContentType::default(),
            knowledge_base: default_knowledge_base(),
            language: PromptLanguage::default(),
        }
    }
}

fn default_plan_path() -> String {
    "src/data/content-plan.json".into()
}
fn default_blog_dir() -> String {
    "src/content/blog".into()
}
fn default_author() -> String {
    "AI Generator".into()
}
fn default_cover_image() -> String {
    "src/assets/images/blog/blog-cover.jpg".into()
}
fn default_cover_image_alt() -> String {
    "AI generated article cover".into()
}
fn default_knowledge_base() -> String {
    "data/knowledge-base.json".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contentpilot/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContentPilotError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.contentpilot/contentpilot.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentPilotError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ContentPilotError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ContentPilotError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ContentPilotError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ContentPilotError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

// ---------------------------------------------------------------------------
// Startup validation
// ---------------------------------------------------------------------------

/// Check that the repository coordinates are set before any remote call is made.
pub fn validate_remote_config(config: &AppConfig) -> Result<()> {
    if config.github.owner.is_empty() || config.github.repo.is_empty() {
        return Err(ContentPilotError::config(
            "github.owner and github.repo must be set.\n\
             Run `contentpilot config init` and edit the generated file.",
        ));
    }
    Ok(())
}

/// Resolve the GitHub access token from the configured env var.
pub fn resolve_github_token(config: &AppConfig) -> Result<String> {
    let var_name = &config.github.token_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ContentPilotError::config(format!(
            "GitHub token not found. Set the {var_name} environment variable.\n\
             Create a fine-grained token with contents read/write access."
        ))),
    }
}

/// Resolve the Gemini API key from the configured env var.
pub fn resolve_gemini_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.gemini.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ContentPilotError::config(format!(
            "Gemini API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://aistudio.google.com/apikey"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("GEMINI_API_KEY"));
        assert!(toml_str.contains("GITHUB_TOKEN"));
        assert!(toml_str.contains("src/data/content-plan.json"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.github.branch, "main");
        assert_eq!(parsed.gemini.model, "gemini-1.5-pro-latest");
        assert_eq!(parsed.content.blog_dir, "src/content/blog");
        assert_eq!(parsed.content.language, PromptLanguage::En);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[github]
owner = "acme"
repo = "acme-site"

[content]
language = "ru"
author = "Редакция"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.github.owner, "acme");
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.content.language, PromptLanguage::Ru);
        assert_eq!(config.content.author, "Редакция");
        assert_eq!(config.content.plan_path, "src/data/content-plan.json");
        assert_eq!(config.gemini.timeout_secs, 60);
    }

    #[test]
    fn remote_config_validation() {
        let config = AppConfig::default();
        let result = validate_remote_config(&config);
        assert!(result.is_err());

        let mut config = AppConfig::default();
        config.github.owner = "acme".into();
        config.github.repo = "acme-site".into();
        assert!(validate_remote_config(&config).is_ok());
    }

    #[test]
    fn token_resolution_reports_var_name() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.github.token_env = "CP_TEST_NONEXISTENT_TOKEN_98765".into();
        let result = resolve_github_token(&config);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("CP_TEST_NONEXISTENT_TOKEN_98765")
        );
    }
}
