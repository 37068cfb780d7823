//! Prompt templates for document and checklist analysis.

/// Wraps extracted document text in the summary/analysis instructions.
pub fn document_prompt(text: &str) -> String {
    format!(
        "\nPlease analyze the following document and provide a comprehensive summary that includes:\n\
         \n\
         1. Main topic and purpose of the document\n\
         2. Key points and findings\n\
         3. Important facts, figures, or data mentioned\n\
         4. Conclusions or recommendations (if any)\n\
         5. Overall assessment and significance\n\
         \n\
         Document content:\n\
         {}\n\
         \n\
         Please provide a structured and detailed analysis:",
        text
    )
}

/// Builds the checklist prompt asking whether `documents` confirm `question`.
///
/// `documents` is the combined `\n\nDocument: {name}\n{text}` blocks of
/// every file attached to the question.
pub fn question_prompt(question: &str, context: Option<&str>, documents: &str) -> String {
    let context_line = match context.map(str::trim) {
        Some(ctx) if !ctx.is_empty() => format!("Additional context: {}", ctx),
        _ => String::new(),
    };

    format!(
        "\nAnalyze the following documents to determine if they provide evidence or confirmation for this health and safety question:\n\
         \n\
         Question: \"{}\"\n\
         \n\
         {}\n\
         \n\
         Documents to analyze:\n\
         {}\n\
         \n\
         Please provide:\n\
         1. YES or NO - Does the documentation confirm this question positively?\n\
         2. A detailed explanation of your reasoning\n\
         3. Specific evidence found in the documents (if any)\n\
         4. Any gaps or missing information\n\
         \n\
         Format your response as:\n\
         CONFIRMATION: [YES/NO]\n\
         ANALYSIS: [Your detailed analysis]\n",
        question, context_line, documents
    )
}

/// Appends one document block to the combined checklist text.
pub fn append_document(combined: &mut String, name: &str, text: &str) {
    combined.push_str(&format!("\n\nDocument: {}\n{}", name, text));
}

/// Appends the placeholder block for a document whose text could not be
/// extracted.
pub fn append_failed_document(combined: &mut String, name: &str) {
    combined.push_str(&format!(
        "\n\nDocument: {}\nError: Could not extract text from this document.",
        name
    ));
}

pub fn is_confirmed(analysis: &str) -> bool {
    analysis.to_lowercase().contains("confirmation: yes")
}
