//! AI consultant: answers visitor questions from the knowledge base.
//!
//! The model is pinned to the company's knowledge base via a system
//! instruction; it must not invent information beyond it.

use tracing::{debug, instrument};

use contentpilot_gemini::GeminiClient;
use contentpilot_knowledge::{KnowledgeBase, format_knowledge_base};
use contentpilot_shared::{ContentPilotError, Result};

/// Answer a visitor question using only the knowledge base as context.
#[instrument(skip_all)]
pub async fn answer_question(
    client: &GeminiClient,
    kb: &KnowledgeBase,
    question: &str,
) -> Result<String> {
    if question.trim().is_empty() {
        return Err(ContentPilotError::input("question is required"));
    }

    let system = build_system_prompt(kb);
    debug!(context_chars = system.len(), "consultant context assembled");

    client.generate_with_system(&system, question).await
}

/// Build the system instruction embedding the formatted knowledge base.
fn build_system_prompt(kb: &KnowledgeBase) -> String {
    let company = kb.company_name().unwrap_or("our company");
    let context = format_knowledge_base(kb);

    format!(
        "You are a friendly and professional AI consultant for the company \"{company}\".\n\
         Your job is to answer questions from visitors to the company's website.\n\
         Use ONLY the information provided below. Do not make anything up.\n\
         If you do not know the answer, politely say you do not have that information and \
         suggest contacting a manager.\n\
         Answer briefly and to the point, in the language the question was asked in.\n\n\
         --- BEGIN COMPANY INFORMATION ---\n\
         {context}\n\
         --- END COMPANY INFORMATION ---\n"
    )
}
