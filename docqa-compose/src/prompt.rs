//! Prompt templates.

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

pub(crate) fn answer(context: &str, question: &str) -> String {
    format!(
        "Based on the following context from the document, answer the user's question accurately. \
         If the answer is not in the context, say so.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Answer:"
    )
}

pub(crate) fn section_summary(section: &str) -> String {
    format!("Summarize this section concisely, focusing on main points:\n\n{section}")
}

pub(crate) fn combined_summary(section_summaries: &str) -> String {
    format!("Create a comprehensive summary from these section summaries:\n\n{section_summaries}")
}

pub(crate) fn faq(content: &str, num_questions: usize) -> String {
    format!(
        "Based on this content, generate {num_questions} frequently asked questions with detailed answers:\n\n\
         {content}\n\n\
         Format as:\n\
         Q1: [Question]\n\
         A1: [Answer]\n\n\
         Q2: [Question]\n\
         A2: [Answer]\n\n\
         etc."
    )
}
