use crate::summary::{build_summary_prompt, Summarizer, EMPTY_SUMMARY_MESSAGE};
use crate::utils::{CsvSplitterError, Result, SummaryConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub struct AnthropicSummarizer {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: usize,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

impl AnthropicSummarizer {
    pub fn new(config: &SummaryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint_or_default().trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key_from_env(),
            max_tokens: 512,
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

        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: Some(0.3),
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.endpoint))
            .header("Content-Type", "application/json")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
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

        let api_response: AnthropicResponse = response.json().await?;

        let text = api_response
            .content
            .into_iter()
            .find_map(|block| {
                if block.content_type == "text" {
                    block.text
                } else {
                    None
                }
            })
            .unwrap_or_default();

        debug!(chars = text.len(), "Anthropic response received");

        if text.trim().is_empty() {
            Ok(EMPTY_SUMMARY_MESSAGE.to_string())
        } else {
            Ok(text)
        }
    }
}

impl Summarizer for AnthropicSummarizer {
    async fn summarize(&self, header: &[String], sample_rows: &[Vec<String>]) -> Result<String> {
        let prompt = build_summary_prompt(header, sample_rows);
        self.call_api(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SummaryProvider;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_summarizer(endpoint: &str) -> AnthropicSummarizer {
        let config = SummaryConfig {
            provider: SummaryProvider::Anthropic,
            endpoint: format!("{}/", endpoint),
            model: "claude-test".to_string(),
            api_key_env: "CSV_SPLITTER_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        AnthropicSummarizer::new(&config).unwrap()
    }

    #[tokio::test]
    async fn returns_first_text_block() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "secret"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({"model": "claude-test"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "thinking"},
                    {"type": "text", "text": "Customer orders with one missing total."}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let summarizer = test_summarizer(&mock_server.uri()).with_api_key("secret");
        let columns = vec!["order".to_string(), "total".to_string()];
        let rows = vec![vec!["A1".to_string(), String::new()]];

        let summary = summarizer.summarize(&columns, &rows).await.unwrap();
        assert_eq!(summary, "Customer orders with one missing total.");
    }

    #[tokio::test]
    async fn server_error_is_remote_service_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let summarizer = test_summarizer(&mock_server.uri()).with_api_key("secret");

        assert!(matches!(
            summarizer.summarize(&["a".to_string()], &[]).await,
            Err(CsvSplitterError::RemoteService(_))
        ));
    }
}
