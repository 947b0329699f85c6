//! Company knowledge base: data model, loading, and prompt-context formatting.
//!
//! The knowledge base is a hand-maintained JSON document describing the
//! company (profile, services, audience, links, FAQ). This crate parses it
//! and flattens it into the text block fed to the AI consultant as context.

pub mod format;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use contentpilot_shared::{ContentPilotError, Result};

pub use format::format_knowledge_base;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The full knowledge-base document. Every section is optional; the
/// formatter skips whatever is absent or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnowledgeBase {
    /// Company profile (name, tagline, about text).
    pub company_info: Option<CompanyInfo>,
    /// Offered services and products.
    pub services: Vec<Service>,
    /// Free-text description of the target audience.
    pub target_audience: Option<String>,
    /// Free-text unique selling points.
    pub usp: Option<String>,
    /// Social and review links.
    pub external_links: Option<ExternalLinks>,
    /// Frequently asked questions.
    pub faq: Vec<FaqEntry>,
}

/// Company profile block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyInfo {
    pub company_name: Option<String>,
    pub tagline: Option<String>,
    pub about_us: Option<String>,
}

/// One service or product entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    pub service_name: String,
    pub service_description: String,
    pub service_price: String,
}

/// Outbound link collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalLinks {
    pub social_links: Vec<LinkEntry>,
    pub review_links: Vec<LinkEntry>,
}

/// A platform/url pair (social profile or review site).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkEntry {
    pub platform: String,
    pub url: String,
}

/// A question/answer pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl KnowledgeBase {
    /// Company display name, if the profile provides one.
    pub fn company_name(&self) -> Option<&str> {
        self.company_info
            .as_ref()
            .and_then(|info| info.company_name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and parse a knowledge-base JSON document from disk.
pub fn load_knowledge_base(path: &Path) -> Result<KnowledgeBase> {
    debug!(path = %path.display(), "loading knowledge base");
    let raw = fs::read_to_string(path).map_err(|e| ContentPilotError::io(path, e))?;
    let kb: KnowledgeBase = serde_json::from_str(&raw)
        .map_err(|e| ContentPilotError::parse(format!("invalid knowledge base JSON: {e}")))?;
    Ok(kb)
}
