//! Article publishing: front-matter rendering and the repository commit.

use chrono::Utc;
use tracing::{info, instrument};

use contentpilot_github::GithubClient;
use contentpilot_markdown::{ArticleMeta, SlugPolicy};
use contentpilot_shared::{ArticleDraft, ContentConfig, ContentType, PublishedArticle, Result};

// ---------------------------------------------------------------------------
// Publish config
// ---------------------------------------------------------------------------

/// Destination and front-matter settings for published articles.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Repository directory holding article documents.
    pub blog_dir: String,
    /// Front-matter author label.
    pub author: String,
    /// Front-matter cover image path.
    pub cover_image: String,
    /// Front-matter cover image alt text.
    pub cover_image_alt: String,
    /// Front-matter content type.
    pub content_type: ContentType,
    /// Slug derivation policy.
    pub slug_policy: SlugPolicy,
}

impl PublishConfig {
    /// Build from the content section of the app configuration.
    pub fn from_content(content: &ContentConfig) -> Self {
        Self {
            blog_dir: content.blog_dir.clone(),
            author: content.author.clone(),
            cover_image: content.cover_image.clone(),
            cover_image_alt: content.cover_image_alt.clone(),
            content_type: content.content_type,
            slug_policy: SlugPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

/// Render the draft and commit it to the blog directory.
///
/// The slug is derived from the title under the configured policy; each
/// call creates exactly one new file, never an update.
#[instrument(skip_all, fields(title = %draft.title))]
pub async fn publish_article(
    client: &GithubClient,
    config: &PublishConfig,
    draft: &ArticleDraft,
) -> Result<PublishedArticle> {
    let date = Utc::now();
    let slug = config.slug_policy.apply(&draft.title);
    let path = format!("{}/{slug}.md", config.blog_dir);

    let meta = ArticleMeta {
        title: draft.title.clone(),
        description: draft.description.clone(),
        author: config.author.clone(),
        date,
        image: config.cover_image.clone(),
        image_alt: config.cover_image_alt.clone(),
        is_featured: false,
        content_type: config.content_type,
    };
    let document = contentpilot_markdown::render_article(&meta, &draft.content);

    let message = format!("feat(blog): AI-generated article \"{}\"", draft.title);
    client.put_file(&path, &document, &message, None).await?;

    info!(%path, "article committed");

    Ok(PublishedArticle {
        slug,
        path,
        title: draft.title.clone(),
        date,
    })
}
