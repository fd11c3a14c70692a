//! Prompt templates for grounded answers, fallback answers and structured analysis

/// Placeholder for the retrieved context in [`RAG_TEMPLATE`]
pub const CONTEXT_SLOT: &str = "{context}";
/// Placeholder for the question in [`RAG_TEMPLATE`]
pub const QUESTION_SLOT: &str = "{question}";

/// Grounded answer template bound into every retrieval chain
pub const RAG_TEMPLATE: &str = r#"You are a precise assistant. Use only the context below to answer.
If the context does not contain enough information, say "I don't know."

Context:
{context}

Question:
{question}

Answer:"#;

/// Separator between retrieved chunks in the context block
const CHUNK_SEPARATOR: &str = "\n\n";

/// Prompt builder for every template the service sends to the LLM
pub struct PromptBuilder;

impl PromptBuilder {
    /// Text used to query the index: the question, prefixed by extra context if any
    pub fn retrieval_query(question: &str, context: Option<&str>) -> String {
        match context.filter(|c| !c.trim().is_empty()) {
            Some(context) => format!("Context: {}\n\nQuestion: {}", context, question),
            None => question.to_string(),
        }
    }

    /// Fill `template` with retrieved chunks and the question
    ///
    /// The question is inserted verbatim. Slots are filled in one pass so
    /// chunk text containing `{question}` is left alone.
    pub fn fill_template(template: &str, chunks: &[String], question: &str) -> String {
        let context = chunks.join(CHUNK_SEPARATOR);
        let mut out = String::with_capacity(template.len() + context.len() + question.len());
        let mut rest = template;

        loop {
            let next_context = rest.find(CONTEXT_SLOT);
            let next_question = rest.find(QUESTION_SLOT);
            let (at, slot, value) = match (next_context, next_question) {
                (Some(c), Some(q)) if c < q => (c, CONTEXT_SLOT, context.as_str()),
                (Some(c), None) => (c, CONTEXT_SLOT, context.as_str()),
                (_, Some(q)) => (q, QUESTION_SLOT, question),
                (None, None) => break,
            };
            out.push_str(&rest[..at]);
            out.push_str(value);
            rest = &rest[at + slot.len()..];
        }

        out.push_str(rest);
        out
    }

    /// Direct-context prompt used when a session has no index
    pub fn fallback_prompt(documents: &[String], context: Option<&str>, question: &str) -> String {
        format!(
            "Based on the following documents and context, please answer the question:\n\
             Documents: {documents}\n\
             Context: {context}\n\
             Question: {question}\n\
             Please provide a comprehensive and accurate answer based on the available information.",
            documents = documents.join(" "),
            context = context.filter(|c| !c.trim().is_empty()).unwrap_or("No additional context"),
            question = question,
        )
    }

    pub fn summary_prompt(text: &str) -> String {
        format!("Please summarize the following text:\nText: {}\n\nSummary:", text)
    }

    /// Financial insights with a literal JSON shape example
    pub fn financial_prompt(financial_data: &str) -> String {
        format!(
            r#"Analyze the following financial data and provide comprehensive insights:
Financial Data: {financial_data}
Please provide insights on:
1. Key financial metrics
2. Trends and patterns
3. Risk assessment
4. Recommendations
5. Payment behavior analysis
Return the response in JSON format with the following structure:
{{
    "financial_metrics": {{}}, "trends": [], "risk_assessment": "",
    "recommendations": [], "payment_behavior": {{}}
}}"#
        )
    }

    pub fn payment_prompt(document_text: &str) -> String {
        format!(
            r#"Extract payment details from the following document:
Document: {document_text}
Please extract and return the following information in JSON format:
{{
    "payment_amount": "", "payment_method": "", "payment_date": "",
    "transaction_id": "", "recipient": "", "sender": "", "currency": "",
    "status": "", "description": "", "additional_details": {{}}
}}
If a field is not found, leave it empty. Be precise with amounts and dates."#
        )
    }

    pub fn validation_prompt(document_text: &str) -> String {
        format!(
            r#"Validate the following document for authenticity and completeness:
Document: {document_text}
Please analyze and return validation results in JSON format:
{{
    "is_valid": true/false, "confidence_score": 0.0-1.0,
    "validation_checks": {{
        "format_check": "pass/fail", "content_completeness": "pass/fail",
        "data_consistency": "pass/fail", "signature_presence": "pass/fail",
        "date_validity": "pass/fail"
    }},
    "issues_found": [], "recommendations": [], "document_type": "",
    "extraction_summary": {{}}
}}
Be thorough in your validation and provide specific details about any issues found."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_query() {
        assert_eq!(PromptBuilder::retrieval_query("Who paid?", None), "Who paid?");
        assert_eq!(PromptBuilder::retrieval_query("Who paid?", Some("  ")), "Who paid?");
        assert_eq!(
            PromptBuilder::retrieval_query("Who paid?", Some("Q3 invoices")),
            "Context: Q3 invoices\n\nQuestion: Who paid?"
        );
    }

    #[test]
    fn test_rag_prompt_embeds_chunks_and_question() {
        let chunks = vec!["Invoice #1 paid by card".to_string(), "Invoice #2 unpaid".to_string()];
        let prompt = PromptBuilder::fill_template(RAG_TEMPLATE, &chunks, "What was the payment method?");

        assert!(prompt.contains("Invoice #1 paid by card\n\nInvoice #2 unpaid"));
        assert!(prompt.contains("Question:\nWhat was the payment method?"));
        assert!(prompt.contains("say \"I don't know.\""));
        assert!(!prompt.contains(CONTEXT_SLOT));
    }

    #[test]
    fn test_slots_inside_chunks_are_not_expanded() {
        let chunks = vec!["template text {question} inside".to_string()];
        let prompt = PromptBuilder::fill_template(RAG_TEMPLATE, &chunks, "real question");
        assert!(prompt.contains("template text {question} inside"));
        assert_eq!(prompt.matches("real question").count(), 1);
    }

    #[test]
    fn test_fallback_prompt_placeholder() {
        let prompt = PromptBuilder::fallback_prompt(&[], None, "What is due?");
        assert!(prompt.contains("Context: No additional context"));
        assert!(prompt.contains("Question: What is due?"));

        let docs = vec!["doc one".to_string(), "doc two".to_string()];
        let prompt = PromptBuilder::fallback_prompt(&docs, Some("March only"), "What is due?");
        assert!(prompt.contains("Documents: doc one doc two"));
        assert!(prompt.contains("Context: March only"));
    }

    #[test]
    fn test_blank_context_uses_placeholder() {
        let prompt = PromptBuilder::fallback_prompt(&[], Some("   \n"), "What is due?");
        assert!(prompt.contains("Context: No additional context\n"));
        assert_eq!(
            PromptBuilder::retrieval_query("What is due?", Some("   \n")),
            "What is due?"
        );
    }

    #[test]
    fn test_analysis_prompts_carry_shape_examples() {
        let financial = PromptBuilder::financial_prompt("revenue 10k");
        assert!(financial.contains("\"payment_behavior\": {}"));
        assert!(financial.contains("Financial Data: revenue 10k"));

        let payment = PromptBuilder::payment_prompt("paid 50 EUR");
        assert!(payment.contains("\"transaction_id\": \"\""));

        let validation = PromptBuilder::validation_prompt("contract");
        assert!(validation.contains("\"signature_presence\": \"pass/fail\""));
    }
}
