//! Article document rendering: slug derivation and front-matter output.
//!
//! Builds the front-matter Markdown documents committed to the blog's
//! content collection, matching its schema field for field.

pub mod slug;

use chrono::{DateTime, SecondsFormat, Utc};

use contentpilot_shared::ContentType;

pub use slug::{SlugPolicy, slugify};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Front-matter fields for a published article document.
#[derive(Debug, Clone)]
pub struct ArticleMeta {
    /// Article title.
    pub title: String,
    /// Meta description.
    pub description: String,
    /// Author label.
    pub author: String,
    /// Publish timestamp.
    pub date: DateTime<Utc>,
    /// Cover image path.
    pub image: String,
    /// Cover image alt text.
    pub image_alt: String,
    /// Whether the article is featured on the landing page.
    pub is_featured: bool,
    /// Blog taxonomy flag.
    pub content_type: ContentType,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a complete article document: front matter followed by the Markdown body.
///
/// Field order matches the content collection schema. The date is RFC 3339
/// UTC with millisecond precision so the site's date parser accepts it.
pub fn render_article(meta: &ArticleMeta, body: &str) -> String {
    let mut doc = String::from("---\n");
    doc.push_str(&format!("title: \"{}\"\n", escape_yaml_string(&meta.title)));
    doc.push_str(&format!(
        "description: \"{}\"\n",
        escape_yaml_string(&meta.description)
    ));
    doc.push_str(&format!(
        "author: \"{}\"\n",
        escape_yaml_string(&meta.author)
    ));
    doc.push_str(&format!(
        "date: {}\n",
        meta.date.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    doc.push_str(&format!("image: {}\n", meta.image));
    doc.push_str(&format!(
        "imageAlt: \"{}\"\n",
        escape_yaml_string(&meta.image_alt)
    ));
    doc.push_str(&format!("isFeatured: {}\n", meta.is_featured));
    doc.push_str(&format!("contentType: \"{}\"\n", meta.content_type));
    doc.push_str("---\n\n");
    doc.push_str(body);
    doc.push('\n');
    doc
}

/// Escape special characters in a YAML string value.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
