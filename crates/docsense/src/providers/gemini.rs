//! Gemini providers over the Generative Language API (API-key auth)

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;
use super::retry::{AttemptError, RetryPolicy};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Output size of `text-embedding-004`; other models are measured from their first vector
const TEXT_EMBEDDING_004_DIMS: usize = 768;

fn build_http(config: &GeminiConfig) -> Result<(Client, String)> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::Config("GOOGLE_API_KEY is not set".to_string()))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    Ok((client, api_key))
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Gemini text generation client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: GeminiConfig,
    retry: RetryPolicy,
}

impl GeminiClient {
    /// Create a new Gemini client. Fails without an API key.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let (client, api_key) = build_http(config)?;
        Ok(Self {
            client,
            api_key,
            retry: RetryPolicy::new(config.max_retries),
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.generation_model
        )
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint();
        let url = url.as_str();

        self.retry
            .run("Gemini generation", || async move {
                let request = GenerateRequest {
                    contents: vec![Content {
                        role: "user",
                        parts: vec![Part {
                            text: prompt.to_string(),
                        }],
                    }],
                    generation_config: GenerationConfig {
                        temperature: self.config.temperature,
                    },
                };

                let response = self
                    .client
                    .post(url)
                    .header(API_KEY_HEADER, &self.api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::generation(format!("Gemini request failed: {}", e)))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(AttemptError::from_status(
                        status,
                        Error::generation(format!("Gemini generation failed ({}): {}", status, body)),
                    ));
                }

                let gen_response: GenerateResponse = response.json().await.map_err(|e| {
                    Error::generation(format!("Failed to parse Gemini response: {}", e))
                })?;

                gen_response
                    .into_text()
                    .ok_or_else(|| AttemptError::from(Error::generation("No text in Gemini response")))
            })
            .await
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!(
            "{}/models/{}",
            self.config.base_url, self.config.generation_model
        );
        match self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.generation_model
    }
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Serialize)]
struct EmbedContent {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini embedding provider
pub struct GeminiEmbedder {
    client: Client,
    api_key: String,
    config: GeminiConfig,
    retry: RetryPolicy,
}

impl GeminiEmbedder {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let (client, api_key) = build_http(config)?;
        Ok(Self {
            client,
            api_key,
            retry: RetryPolicy::new(config.max_retries),
            config: config.clone(),
        })
    }

    fn model_path(&self) -> String {
        format!("models/{}", self.config.embedding_model)
    }

    fn request_for(&self, text: &str) -> EmbedRequest {
        EmbedRequest {
            model: self.model_path(),
            content: EmbedContent {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
        }
    }

    async fn post<B, R>(&self, method: &str, body: &B) -> std::result::Result<R, AttemptError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}/{}:{}", self.config.base_url, self.model_path(), method);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Gemini embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::from_status(
                status,
                Error::embedding(format!("Gemini embedding failed ({}): {}", status, body)),
            ));
        }

        let parsed = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;
        Ok(parsed)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = self.request_for(text);
        let request = &request;
        self.retry
            .run("Gemini embedding", || async move {
                let response: EmbedResponse = self.post("embedContent", request).await?;
                Ok::<_, AttemptError>(response.embedding.values)
            })
            .await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = BatchEmbedRequest {
            requests: texts.iter().map(|t| self.request_for(t)).collect(),
        };
        let request = &request;

        self.retry
            .run("Gemini batch embedding", || async move {
                let response: BatchEmbedResponse =
                    self.post("batchEmbedContents", request).await?;
                Ok::<_, AttemptError>(response.embeddings.into_iter().map(|e| e.values).collect())
            })
            .await
    }

    fn dimensions(&self) -> usize {
        match self.config.embedding_model.as_str() {
            "text-embedding-004" => TEXT_EMBEDDING_004_DIMS,
            _ => 0,
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.embed("health check").await.is_ok())
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
