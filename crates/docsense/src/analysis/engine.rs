//! Single-shot structured analysis of raw document text

use chrono::Utc;
use futures::future::join_all;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::LlmProvider;

use super::json::{extract_json, JsonExtraction};

/// Kind of structured analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Financial,
    Payment,
    Validation,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [Self::Financial, Self::Payment, Self::Validation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Payment => "payment",
            Self::Validation => "validation",
        }
    }

    fn prompt(&self, text: &str) -> String {
        match self {
            Self::Financial => PromptBuilder::financial_prompt(text),
            Self::Payment => PromptBuilder::payment_prompt(text),
            Self::Validation => PromptBuilder::validation_prompt(text),
        }
    }

    /// Prefix of the error message when generation fails
    fn failure_label(&self) -> &'static str {
        match self {
            Self::Financial => "Error generating financial insights",
            Self::Payment => "Error extracting payment details",
            Self::Validation => "Error validating document",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalysisKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "financial" => Ok(Self::Financial),
            "payment" => Ok(Self::Payment),
            "validation" => Ok(Self::Validation),
            other => Err(Error::invalid_input(format!("unknown analysis type: {}", other))),
        }
    }
}

/// How an analysis result was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    /// Model output contained a JSON object
    Parsed,
    /// Model answered but no JSON object could be recovered
    Degraded,
    /// Generation failed; fields carry an `error` message
    Failed,
}

/// Structured analysis result
///
/// Serializes as its field map only, so degraded and failed results keep the
/// same JSON shape as parsed ones (`{"raw_response": ..}` / `{"error": ..}`).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub status: AnalysisStatus,
    pub fields: Map<String, Value>,
}

impl AnalysisResult {
    fn from_extraction(extraction: JsonExtraction) -> Self {
        let status = if extraction.is_parsed() {
            AnalysisStatus::Parsed
        } else {
            AnalysisStatus::Degraded
        };
        Self {
            status,
            fields: extraction.into_fields(),
        }
    }

    fn failed(message: String) -> Self {
        let mut fields = Map::new();
        fields.insert("error".to_string(), Value::String(message));
        Self {
            status: AnalysisStatus::Failed,
            fields,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl Serialize for AnalysisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Merged output of [`AnalysisEngine::comprehensive`]
#[derive(Debug, Clone, Serialize)]
pub struct ComprehensiveReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_analysis: Option<AnalysisResult>,
    /// RFC 3339 time the report was assembled
    pub timestamp: String,
    /// Kinds executed, in request order
    pub analysis_type: Vec<AnalysisKind>,
}

/// Structured analysis engine
pub struct AnalysisEngine {
    llm: Arc<dyn LlmProvider>,
}

impl AnalysisEngine {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Run one kind of analysis. Generation failures become `Failed` results.
    pub async fn analyze(&self, kind: AnalysisKind, text: &str) -> Result<AnalysisResult> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("document text must not be empty"));
        }

        let prompt = kind.prompt(text);
        match self.llm.generate(&prompt).await {
            Ok(output) => {
                let result = AnalysisResult::from_extraction(extract_json(&output));
                if result.status == AnalysisStatus::Degraded {
                    tracing::warn!("{} analysis returned no JSON object", kind);
                }
                Ok(result)
            }
            Err(e) => {
                tracing::error!("{}: {}", kind.failure_label(), e);
                Ok(AnalysisResult::failed(format!("{}: {}", kind.failure_label(), e)))
            }
        }
    }

    pub async fn financial_insights(&self, text: &str) -> Result<AnalysisResult> {
        self.analyze(AnalysisKind::Financial, text).await
    }

    pub async fn payment_details(&self, text: &str) -> Result<AnalysisResult> {
        self.analyze(AnalysisKind::Payment, text).await
    }

    pub async fn validate(&self, text: &str) -> Result<AnalysisResult> {
        self.analyze(AnalysisKind::Validation, text).await
    }

    /// Run the selected kinds concurrently and merge them into one report.
    /// An empty selection runs all three; duplicates run once.
    pub async fn comprehensive(&self, text: &str, kinds: &[AnalysisKind]) -> Result<ComprehensiveReport> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("document text must not be empty"));
        }

        let requested: &[AnalysisKind] = if kinds.is_empty() {
            &AnalysisKind::ALL
        } else {
            kinds
        };

        let mut selected: Vec<AnalysisKind> = Vec::with_capacity(3);
        for kind in requested {
            if !selected.contains(kind) {
                selected.push(*kind);
            }
        }

        let results = join_all(selected.iter().map(|kind| self.analyze(*kind, text))).await;

        let mut report = ComprehensiveReport {
            financial_analysis: None,
            payment_analysis: None,
            validation_analysis: None,
            timestamp: Utc::now().to_rfc3339(),
            analysis_type: selected.clone(),
        };

        for (kind, result) in selected.into_iter().zip(results) {
            let result = result?;
            match kind {
                AnalysisKind::Financial => report.financial_analysis = Some(result),
                AnalysisKind::Payment => report.payment_analysis = Some(result),
                AnalysisKind::Validation => report.validation_analysis = Some(result),
            }
        }

        Ok(report)
    }

    /// Summarize text. Generation failures become an error sentence.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("text must not be empty"));
        }

        match self.llm.generate(&PromptBuilder::summary_prompt(text)).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::error!("Error generating summary: {}", e);
                Ok(format!("Error generating summary: {}", e))
            }
        }
    }
}
