//! Shared types, error model, and configuration for ContentPilot.
//!
//! This crate is the foundation depended on by all other ContentPilot crates.
//! It provides:
//! - [`ContentPilotError`] — the unified error type
//! - Domain types ([`ContentTask`], [`ArticleDraft`], [`PublishedArticle`], [`Revision`])
//! - Configuration ([`AppConfig`], config loading, secret resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContentConfig, GeminiConfig, GithubConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_gemini_key, resolve_github_token,
    validate_remote_config,
};
pub use error::{ContentPilotError, Result};
pub use types::{
    ArticleDraft, ContentTask, ContentType, PromptLanguage, PublishedArticle, Revision,
    TaskStatus,
};
