use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub split: SplitDefaults,
    pub summary: SummaryConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitDefaults {
    pub default_rows_per_file: usize,
    pub sanitize_formulas: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryProvider {
    Gemini,
    Anthropic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub provider: SummaryProvider,
    /// Base URL of the provider API. Empty means the provider's public endpoint.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub sample_rows: usize,
    pub max_prompt_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for SplitDefaults {
    fn default() -> Self {
        Self {
            default_rows_per_file: 100,
            sanitize_formulas: false,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            provider: SummaryProvider::Gemini,
            endpoint: String::new(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "API_KEY".to_string(),
            timeout_seconds: 60,
            sample_rows: 5,
            max_prompt_tokens: 4000,
        }
    }
}

impl SummaryConfig {
    pub fn endpoint_or_default(&self) -> &str {
        if !self.endpoint.is_empty() {
            return &self.endpoint;
        }
        match self.provider {
            SummaryProvider::Gemini => "https://generativelanguage.googleapis.com",
            SummaryProvider::Anthropic => "https://api.anthropic.com",
        }
    }

    /// Reads the credential from the configured environment variable.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> crate::utils::errors::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::utils::errors::CsvSplitterError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> crate::utils::errors::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::utils::errors::CsvSplitterError::Config(e.to_string()))
    }

    pub fn load_or_default(path: Option<&str>) -> Self {
        if let Some(p) = path {
            Self::load_from_file(p).unwrap_or_default()
        } else {
            Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [split]
            default_rows_per_file = 250

            [summary]
            provider = "anthropic"
            model = "claude-3-5-haiku-latest"
            "#,
        )
        .unwrap();

        assert_eq!(config.split.default_rows_per_file, 250);
        assert!(!config.split.sanitize_formulas);
        assert_eq!(config.summary.provider, SummaryProvider::Anthropic);
        assert_eq!(config.summary.sample_rows, 5);
        assert_eq!(config.summary.endpoint_or_default(), "https://api.anthropic.com");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = AppConfig::from_toml_str("[split\nfoo").unwrap_err();
        assert!(matches!(
            err,
            crate::utils::errors::CsvSplitterError::Config(_)
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_or_default(Some("/nonexistent/csv-splitter.toml"));
        assert_eq!(config.split.default_rows_per_file, 100);
        assert_eq!(config.summary.api_key_env, "API_KEY");
    }
}
