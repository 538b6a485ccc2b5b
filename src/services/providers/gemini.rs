/// Gemini text generation via the `generateContent` REST endpoint
use crate::{
    error::{AppError, AppResult},
    services::providers::TextGenerator,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, with its parts joined
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Clone)]
pub struct GeminiGenerator {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response.json().await?;
        let text = generated.into_text().ok_or_else(|| {
            AppError::ExternalApi("Gemini response contained no text".to_string())
        })?;

        tracing::info!(
            model = %self.model,
            prompt_chars = prompt.len(),
            response_chars = text.len(),
            provider = "gemini",
            "Text generated"
        );

        Ok(text)
    }
}
