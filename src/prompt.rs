//! LLM prompt template for HR policy questions.

const PREAMBLE: &str = "You are an HR policy expert. Answer the following question about \
company HR policies based on the provided information.";

const NO_CONTEXT: &str = "No relevant policy information was found.";

/// Render the prompt handed to the language model.
///
/// `context` is the retrieved policy text (see
/// [`PolicyRetriever::query_text`](crate::retriever::PolicyRetriever::query_text)).
pub fn build_llm_prompt(question: &str, context: &str) -> String {
    let context = context.trim();
    let context = if context.is_empty() { NO_CONTEXT } else { context };

    format!(
        "{}\n\nQuestion: {}\n\nRelevant policy information:\n{}\n\nPlease provide a clear and concise answer.",
        PREAMBLE,
        question.trim(),
        context
    )
}
