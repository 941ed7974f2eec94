//! Natural-language dataset summaries from a remote model.
//!
//! Only the header and a small leading sample are ever sent. Failures never
//! reach the caller of [`summarize_or_fallback`]; they are logged and replaced
//! by [`FALLBACK_MESSAGE`].

pub mod anthropic;
pub mod gemini;
pub mod prompt;

pub use anthropic::AnthropicSummarizer;
pub use gemini::GeminiSummarizer;
pub use prompt::build_summary_prompt;

use crate::csv_processor::{bounded_sample, Table};
use crate::utils::{Result, SummaryConfig, SummaryProvider};
use std::future::Future;
use tracing::{info, warn};

pub const FALLBACK_MESSAGE: &str =
    "Failed to analyze CSV data. Please ensure your API key is configured correctly.";

pub const EMPTY_SUMMARY_MESSAGE: &str = "Could not generate summary.";

pub trait Summarizer: Send + Sync {
    fn summarize(
        &self,
        header: &[String],
        sample_rows: &[Vec<String>],
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Provider picked from configuration.
pub enum ConfiguredSummarizer {
    Gemini(GeminiSummarizer),
    Anthropic(AnthropicSummarizer),
}

impl ConfiguredSummarizer {
    pub fn from_config(config: &SummaryConfig) -> Result<Self> {
        Ok(match config.provider {
            SummaryProvider::Gemini => Self::Gemini(GeminiSummarizer::new(config)?),
            SummaryProvider::Anthropic => Self::Anthropic(AnthropicSummarizer::new(config)?),
        })
    }
}

impl Summarizer for ConfiguredSummarizer {
    async fn summarize(&self, header: &[String], sample_rows: &[Vec<String>]) -> Result<String> {
        match self {
            Self::Gemini(s) => s.summarize(header, sample_rows).await,
            Self::Anthropic(s) => s.summarize(header, sample_rows).await,
        }
    }
}

pub async fn summarize_or_fallback<S: Summarizer>(
    summarizer: &S,
    header: &[String],
    sample_rows: &[Vec<String>],
) -> String {
    match summarizer.summarize(header, sample_rows).await {
        Ok(summary) => {
            info!(sample_rows = sample_rows.len(), "Summary generated");
            summary
        }
        Err(e) => {
            warn!(error = %e, "Summary request failed");
            FALLBACK_MESSAGE.to_string()
        }
    }
}

/// Sample rows to send for `table`, capped by count and prompt token budget.
pub fn summary_sample<'a>(table: &'a Table, config: &SummaryConfig) -> &'a [Vec<String>] {
    bounded_sample(
        &table.header,
        &table.rows,
        config.sample_rows,
        config.max_prompt_tokens,
    )
}


#[cfg(test)]
mod tests {
    use super::testing::StubSummarizer;
    use super::*;

    #[tokio::test]
    async fn fallback_replaces_errors() {
        let summary =
            summarize_or_fallback(&StubSummarizer::failing(), &["a".to_string()], &[]).await;
        assert_eq!(summary, FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn success_passes_through() {
        let summary =
            summarize_or_fallback(&StubSummarizer::replying("ok"), &["a".to_string()], &[]).await;
        assert_eq!(summary, "ok");
    }

    #[test]
    fn sample_is_capped_by_config() {
        let table = Table::new(
            vec!["n".into()],
            (0..50).map(|i| vec![i.to_string()]).collect(),
            "n.csv",
        );
        let config = SummaryConfig::default();
        assert_eq!(summary_sample(&table, &config).len(), 5);
    }

    #[tokio::test]
    async fn configured_provider_without_key_falls_back() {
        let config = SummaryConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key_env: "CSV_SPLITTER_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        let summarizer = ConfiguredSummarizer::from_config(&config).unwrap();
        assert!(matches!(summarizer, ConfiguredSummarizer::Gemini(_)));

        let summary = summarize_or_fallback(&summarizer, &["a".to_string()], &[]).await;
        assert_eq!(summary, FALLBACK_MESSAGE);
    }
}
