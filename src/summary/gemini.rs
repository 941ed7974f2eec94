use crate::summary::{build_summary_prompt, Summarizer, EMPTY_SUMMARY_MESSAGE};
use crate::utils::{CsvSplitterError, Result, SummaryConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Google Generative Language API (`models/{model}:generateContent`).
pub struct GeminiSummarizer {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiSummarizer {
    pub fn new(config: &SummaryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint_or_default().trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key_from_env(),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    async fn call_api(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CsvSplitterError::RemoteService("API Key not found".to_string()))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let url = format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CsvSplitterError::RemoteService(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let api_response: GenerateContentResponse = response.json().await?;

        let text: String = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        debug!(chars = text.len(), "Gemini response received");

        if text.trim().is_empty() {
            Ok(EMPTY_SUMMARY_MESSAGE.to_string())
        } else {
            Ok(text)
        }
    }
}

impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, header: &[String], sample_rows: &[Vec<String>]) -> Result<String> {
        let prompt = build_summary_prompt(header, sample_rows);
        self.call_api(&prompt).await
    }
}
