//! Configuration management
//!
//! All settings are read once at startup into a [`Config`] value that is
//! passed explicitly to every component. The YAML file is optional; every
//! field has a default. API keys may also come from a sibling `secret.yml`
//! (see [`secrets`]).

pub mod secrets;

use crate::error::{FinRouteError, Result};
use crate::data::DatasetKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use secrets::Secrets;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "finroute.yml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Location of the serialized vector store blob
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Tabular dataset locations
    #[serde(default)]
    pub datasets: DatasetPaths,

    /// Hard cap on analytical agent steps
    #[serde(default = "default_iteration_budget")]
    pub iteration_budget: usize,

    /// Number of candidates fetched from the vector store per general query
    #[serde(default = "default_retrieval_depth")]
    pub retrieval_depth: usize,

    /// SQLite document store backing the data API
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_service: LLMServiceConfig::default(),
            index_path: default_index_path(),
            datasets: DatasetPaths::default(),
            iteration_budget: default_iteration_budget(),
            retrieval_depth: default_retrieval_depth(),
            database_path: default_database_path(),
            server: ServerConfig::default(),
        }
    }
}

fn default_index_path() -> PathBuf {
    PathBuf::from("./tmp/vectorstore.bin")
}

fn default_iteration_budget() -> usize {
    20
}

fn default_retrieval_depth() -> usize {
    4
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./data/finroute.sqlite")
}

/// LLM service configuration for an OpenAI-compatible endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    #[serde(default = "default_url")]
    pub url: String,

    /// Model used for classification and answer generation
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Model used by the analytical agent
    #[serde(default = "default_analysis_model")]
    pub analysis_model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default = "default_embedding_url")]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (will be auto-detected if not specified)
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Sampling temperature for chat completions
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }

    /// Copy of this config that talks to the analysis model
    pub fn for_analysis(&self) -> Self {
        Self {
            model: self.analysis_model.clone(),
            ..self.clone()
        }
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            model: default_chat_model(),
            analysis_model: default_analysis_model(),
            embedding_url: default_embedding_url(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            api_key: default_api_key(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_url() -> String {
    std::env::var("FINROUTE_LLM_URL").unwrap_or_else(|_| "https://api.openai.com".to_string())
}

fn default_chat_model() -> String {
    std::env::var("FINROUTE_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string())
}

fn default_analysis_model() -> String {
    std::env::var("FINROUTE_ANALYSIS_MODEL").unwrap_or_else(|_| "gpt-4".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("FINROUTE_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "text-embedding-ada-002".to_string())
}

fn default_embedding_url() -> Option<String> {
    std::env::var("FINROUTE_EMBEDDING_URL").ok()
}

fn default_embedding_dimensions() -> Option<usize> {
    std::env::var("FINROUTE_EMBEDDING_DIMS")
        .ok()
        .and_then(|s| s.parse().ok())
}

fn default_api_key() -> Option<String> {
    std::env::var("FINROUTE_LLM_API_KEY").ok()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> u64 {
    120
}

/// Paths of the CSV inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetPaths {
    #[serde(default = "default_stock_weekly_data")]
    pub stock_weekly_data: PathBuf,
    #[serde(default = "default_news_sentiment")]
    pub news_sentiment: PathBuf,
    #[serde(default = "default_quarterly_earnings")]
    pub quarterly_earnings: PathBuf,
    #[serde(default = "default_cash_flow")]
    pub cash_flow: PathBuf,
    /// Corpus for the vector store
    #[serde(default = "default_company_overview")]
    pub company_overview: PathBuf,
}

impl DatasetPaths {
    /// Path of one analytical dataset
    pub fn path_for(&self, kind: DatasetKind) -> &Path {
        match kind {
            DatasetKind::StockWeeklyData => &self.stock_weekly_data,
            DatasetKind::NewsSentiment => &self.news_sentiment,
            DatasetKind::QuarterlyEarnings => &self.quarterly_earnings,
            DatasetKind::CashFlow => &self.cash_flow,
        }
    }
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            stock_weekly_data: default_stock_weekly_data(),
            news_sentiment: default_news_sentiment(),
            quarterly_earnings: default_quarterly_earnings(),
            cash_flow: default_cash_flow(),
            company_overview: default_company_overview(),
        }
    }
}

fn default_stock_weekly_data() -> PathBuf {
    PathBuf::from("./data/stock_weekly_data.csv")
}

fn default_news_sentiment() -> PathBuf {
    PathBuf::from("./data/news_sentiment.csv")
}

fn default_quarterly_earnings() -> PathBuf {
    PathBuf::from("./data/quarterly_earnings.csv")
}

fn default_cash_flow() -> PathBuf {
    PathBuf::from("./data/cash_flow.csv")
}

fn default_company_overview() -> PathBuf {
    PathBuf::from("./data/company_overview.csv")
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5001".to_string()
}

impl Config {
    /// Load config from a path.
    ///
    /// A missing file yields the defaults. A `secret.yml` in the same
    /// directory fills in the API key and database path when the config
    /// leaves them unset.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str::<Config>(&content)?
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Config::default()
        };

        let secrets_path = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .join(secrets::DEFAULT_SECRETS_FILE);
        if let Some(secrets) = Secrets::load_optional(&secrets_path)? {
            config.apply_secrets(secrets);
        }

        config.validate()?;
        Ok(config)
    }

    /// Fill unset credentials from a secrets file
    pub fn apply_secrets(&mut self, secrets: Secrets) {
        if self.llm_service.api_key.is_none() {
            self.llm_service.api_key = secrets.openai_key;
        }
        if let Some(db) = secrets.database_path {
            if self.database_path == default_database_path() {
                self.database_path = db;
            }
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.iteration_budget == 0 {
            return Err(FinRouteError::Config(
                "iteration_budget must be at least 1".to_string(),
            ));
        }
        if self.retrieval_depth < 3 {
            return Err(FinRouteError::Config(format!(
                "retrieval_depth must be at least 3, got {}",
                self.retrieval_depth
            )));
        }
        if self.llm_service.timeout_secs == 0 {
            return Err(FinRouteError::Config(
                "llm_service.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("finroute.yml")).unwrap();
        assert_eq!(config.iteration_budget, 20);
        assert_eq!(config.retrieval_depth, 4);
        assert_eq!(config.server.bind, "0.0.0.0:5001");
        assert_eq!(
            config.datasets.path_for(DatasetKind::CashFlow),
            Path::new("./data/cash_flow.csv")
        );
    }

    #[test]
    fn test_partial_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("finroute.yml");
        std::fs::write(
            &path,
            "iteration_budget: 5\nindex_path: /var/lib/finroute/index.bin\nllm_service:\n  model: local-model\n  url: http://localhost:8000\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.iteration_budget, 5);
        assert_eq!(config.index_path, PathBuf::from("/var/lib/finroute/index.bin"));
        assert_eq!(config.llm_service.model, "local-model");
        assert_eq!(config.llm_service.url, "http://localhost:8000");
        assert_eq!(config.retrieval_depth, 4);
    }

    #[test]
    fn test_secret_file_fills_api_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("finroute.yml");
        std::fs::write(&path, "llm_service:\n  url: http://localhost:8000\n").unwrap();
        std::fs::write(
            temp.path().join("secret.yml"),
            "OPENAI_KEY: sk-test\nDATABASE_PATH: /tmp/stock.sqlite\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.llm_service.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/stock.sqlite"));
    }

    #[test]
    fn test_explicit_key_wins_over_secret() {
        let mut config = Config::default();
        config.llm_service.api_key = Some("from-config".to_string());
        config.apply_secrets(Secrets {
            openai_key: Some("from-secret".to_string()),
            database_path: None,
        });
        assert_eq!(config.llm_service.api_key.as_deref(), Some("from-config"));
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let mut config = Config::default();
        config.iteration_budget = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retrieval_depth = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_analysis_model_override() {
        let mut llm = LLMServiceConfig::default();
        llm.model = "small".to_string();
        llm.analysis_model = "large".to_string();
        assert_eq!(llm.for_analysis().model, "large");
        assert_eq!(llm.embeddings_url(), llm.url);
    }
}
