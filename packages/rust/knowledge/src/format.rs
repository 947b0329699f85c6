//! Knowledge-base to prompt-context formatting.
//!
//! Flattens a [`KnowledgeBase`] into one readable text block, section by
//! section. Sections whose source data is absent or empty are skipped;
//! missing company profile fields degrade to a placeholder instead.

use crate::KnowledgeBase;

/// Placeholder for company profile fields that were left blank.
const PLACEHOLDER: &str = "Not specified";

// ---------------------------------------------------------------------------
// Formatter
// ---------------------------------------------------------------------------

/// Render the knowledge base as a single prompt-context string.
///
/// Section order is fixed: company info, services, target audience, USP,
/// social links, review links, FAQ.
pub fn format_knowledge_base(kb: &KnowledgeBase) -> String {
    let mut context = String::from("This is the information about the company you represent:\n\n");

    if let Some(info) = &kb.company_info {
        context.push_str("**About the company:**\n");
        context.push_str(&format!("Name: {}\n", or_placeholder(&info.company_name)));
        context.push_str(&format!("Tagline: {}\n", or_placeholder(&info.tagline)));
        context.push_str(&format!("About us: {}\n\n", or_placeholder(&info.about_us)));
    }

    if !kb.services.is_empty() {
        context.push_str("**Services and products:**\n");
        for service in &kb.services {
            context.push_str(&format!("- Name: {}\n", service.service_name));
            context.push_str(&format!("  Description: {}\n", service.service_description));
            context.push_str(&format!("  Price: {}\n\n", service.service_price));
        }
    }

    if let Some(audience) = non_empty(&kb.target_audience) {
        context.push_str(&format!("**Our target audience:**\n{audience}\n\n"));
    }

    if let Some(usp) = non_empty(&kb.usp) {
        context.push_str(&format!("**Our unique selling points:**\n{usp}\n\n"));
    }

    if let Some(links) = &kb.external_links {
        if !links.social_links.is_empty() {
            context.push_str("**Our social media:**\n");
            for link in &links.social_links {
                context.push_str(&format!("- {}: {}\n", link.platform, link.url));
            }
            context.push('\n');
        }
        if !links.review_links.is_empty() {
            context.push_str("**Where to read reviews about us:**\n");
            for link in &links.review_links {
                context.push_str(&format!("- {}: {}\n", link.platform, link.url));
            }
            context.push('\n');
        }
    }

    if !kb.faq.is_empty() {
        context.push_str("**Frequently asked questions and answers:**\n");
        for entry in &kb.faq {
            context.push_str(&format!("- Question: {}\n", entry.question));
            context.push_str(&format!("  Answer: {}\n\n", entry.answer));
        }
    }

    context
}

fn or_placeholder(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => PLACEHOLDER,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
