//! Core domain types for the ContentPilot publishing pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Revision
// ---------------------------------------------------------------------------

/// Opaque revision token identifying the exact version of a remote document.
///
/// Read alongside the content plan and passed back unmodified on write so the
/// store can reject the write if the document changed in the meantime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(pub String);

impl Revision {
    /// Borrow the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Revision {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Revision {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

// ---------------------------------------------------------------------------
// ContentTask
// ---------------------------------------------------------------------------

/// Lifecycle state of a content-plan task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting for its publish date.
    Scheduled,
    /// An article was generated and committed for this task.
    Published,
    /// Marked failed by an operator; never selected for publication.
    Failed,
}

/// A single entry in the remote content plan.
///
/// Identity is the `(prompt, publish_date)` pair; there is no surrogate key
/// in the stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTask {
    /// Topic request handed to the article generator.
    pub prompt: String,
    /// Earliest calendar date the article may be published.
    pub publish_date: NaiveDate,
    /// Current lifecycle state.
    pub status: TaskStatus,
}

impl ContentTask {
    /// Whether this task is due on the given date.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.status == TaskStatus::Scheduled && self.publish_date <= today
    }
}

// ---------------------------------------------------------------------------
// ArticleDraft
// ---------------------------------------------------------------------------

/// The three-field article payload parsed from generator output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    /// SEO headline.
    pub title: String,
    /// Meta description.
    pub description: String,
    /// Article body in Markdown.
    pub content: String,
}

// ---------------------------------------------------------------------------
// PublishedArticle
// ---------------------------------------------------------------------------

/// Receipt for a committed article. Identity is the repository `path`;
/// articles are created once and never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedArticle {
    /// URL slug the path was derived from.
    pub slug: String,
    /// Repository path of the committed document.
    pub path: String,
    /// Article title, echoed for reporting.
    pub title: String,
    /// Publish timestamp embedded in the front matter.
    pub date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// PromptLanguage
// ---------------------------------------------------------------------------

/// Language of the instruction template sent to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLanguage {
    /// English instruction template.
    #[default]
    En,
    /// Russian instruction template.
    Ru,
}

impl std::fmt::Display for PromptLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Ru => write!(f, "ru"),
        }
    }
}

impl std::str::FromStr for PromptLanguage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "ru" => Ok(Self::Ru),
            other => Err(format!("unknown language '{other}': expected 'en' or 'ru'")),
        }
    }
}

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// Blog taxonomy flag written into article front matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Long-form hub article.
    Pillar,
    /// Supporting article linked from a pillar.
    #[default]
    Cluster,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pillar => write!(f, "pillar"),
            Self::Cluster => write!(f, "cluster"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_task_wire_format() {
        let json = r#"{
            "prompt": "Why basement waterproofing matters",
            "publishDate": "2025-07-01",
            "status": "scheduled"
        }"#;

        let task: ContentTask = serde_json::from_str(json).expect("deserialize task");
        assert_eq!(task.prompt, "Why basement waterproofing matters");
        assert_eq!(task.publish_date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(task.status, TaskStatus::Scheduled);

        let out = serde_json::to_string(&task).expect("serialize task");
        assert!(out.contains("\"publishDate\":\"2025-07-01\""));
        assert!(out.contains("\"status\":\"scheduled\""));
    }

    #[test]
    fn task_due_selection() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let mut task = ContentTask {
            prompt: "topic".into(),
            publish_date: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
            status: TaskStatus::Scheduled,
        };

        // Dated today qualifies regardless of time of day.
        assert!(task.is_due(today));

        task.publish_date = NaiveDate::from_ymd_opt(2025, 7, 11).unwrap();
        assert!(!task.is_due(today));

        task.publish_date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        task.status = TaskStatus::Published;
        assert!(!task.is_due(today));

        task.status = TaskStatus::Failed;
        assert!(!task.is_due(today));
    }

    #[test]
    fn revision_is_transparent() {
        let rev = Revision::from("1ab2c3d4");
        let json = serde_json::to_string(&rev).expect("serialize");
        assert_eq!(json, "\"1ab2c3d4\"");

        let parsed: Revision = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, rev);
        assert_eq!(parsed.as_str(), "1ab2c3d4");
    }

    #[test]
    fn prompt_language_parsing() {
        assert_eq!("en".parse::<PromptLanguage>().unwrap(), PromptLanguage::En);
        assert_eq!("ru".parse::<PromptLanguage>().unwrap(), PromptLanguage::Ru);
        assert!("fr".parse::<PromptLanguage>().is_err());
        assert_eq!(PromptLanguage::default(), PromptLanguage::En);
    }

    #[test]
    fn draft_roundtrip() {
        let draft = ArticleDraft {
            title: "Ten signs your foundation needs attention".into(),
            description: "A homeowner's checklist".into(),
            content: "## Cracks\n\nHairline cracks are common...".into(),
        };

        let json = serde_json::to_string(&draft).expect("serialize");
        let parsed: ArticleDraft = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.title, draft.title);
        assert_eq!(parsed.content, draft.content);
    }
}
