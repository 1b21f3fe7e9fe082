use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub embeddings: EmbeddingsConfig,
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub predict: PredictConfig,
}

/// Dataset split locations
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Tab-separated (subject, predicate, object) file per split.
    pub train_path: PathBuf,
    pub valid_path: PathBuf,
    pub test_path: PathBuf,
}

/// Trained embedding locations
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    /// Directory containing one sub-directory per model
    /// (embeddings/<model>/training_factory.bin, embeddings/<model>/embeddings.bin).
    pub dir: PathBuf,
    /// Models to evaluate. Each must be one of the supported scoring models.
    pub models: Vec<String>,
}

/// Evaluation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Directory the predicate metrics CSV is written to and read back from.
    pub metrics_dir: PathBuf,
    /// Cutoffs for hits@k, ascending.
    #[serde(default = "default_hits_at")]
    pub hits_at: Vec<u32>,
    /// Log a progress line every this many test triples.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

/// Prediction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PredictConfig {
    /// Number of top-scoring candidates reported for target completion.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_hits_at() -> Vec<u32> {
    vec![1, 3, 5, 10]
}

fn default_progress_interval() -> usize {
    1000
}

fn default_top_k() -> usize {
    10
}

/// File name of the aggregated predicate metrics table.
pub const METRICS_FILE: &str = "predicate_metrics.csv";

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for the config file in this order:
    /// 1. Path specified in KGEVAL_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = std::env::var("KGEVAL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::load_from(&config_path)
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str).context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.embeddings.models.is_empty() {
            anyhow::bail!("embeddings.models must list at least one model");
        }

        for name in &self.embeddings.models {
            crate::models::ModelKind::from_name(name)
                .with_context(|| format!("embeddings.models entry '{}' is not supported", name))?;
        }

        if self.evaluation.hits_at.is_empty() {
            anyhow::bail!("evaluation.hits_at must list at least one cutoff");
        }

        if self.evaluation.hits_at.contains(&0) {
            anyhow::bail!("evaluation.hits_at cutoffs must be greater than 0");
        }

        if !self.evaluation.hits_at.windows(2).all(|w| w[0] < w[1]) {
            anyhow::bail!("evaluation.hits_at cutoffs must be strictly ascending");
        }

        if self.evaluation.progress_interval == 0 {
            anyhow::bail!("evaluation.progress_interval must be greater than 0");
        }

        if self.predict.top_k == 0 {
            anyhow::bail!("predict.top_k must be greater than 0");
        }

        Ok(())
    }

    /// Directory holding one model's converted factory and embedding store
    pub fn model_dir(&self, model: &str) -> PathBuf {
        self.embeddings.dir.join(model.to_lowercase())
    }

    /// Path of the aggregated predicate metrics CSV
    pub fn metrics_path(&self) -> PathBuf {
        self.evaluation.metrics_dir.join(METRICS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config(temp_dir: &TempDir) -> String {
        let root = temp_dir.path().to_str().unwrap().replace('\\', "\\\\");
        format!(
            r#"
[dataset]
train_path = "{root}/wikidata5m_transductive_train.txt"
valid_path = "{root}/wikidata5m_transductive_valid.txt"
test_path = "{root}/wikidata5m_transductive_test.txt"

[embeddings]
dir = "{root}/embeddings"
models = ["complex", "distmult", "simple", "transe"]

[evaluation]
metrics_dir = "{root}/metrics"
hits_at = [1, 3, 5, 10]
progress_interval = 500

[predict]
top_k = 25
"#
        )
    }

    #[test]
    fn test_config_load_success() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, create_test_config(&temp_dir)).unwrap();

        let config = Config::load_from(&config_path);
        assert!(config.is_ok(), "Config::load_from failed: {:?}", config.err());
        let config = config.unwrap();
        assert_eq!(config.embeddings.models.len(), 4);
        assert_eq!(config.evaluation.hits_at, vec![1, 3, 5, 10]);
        assert_eq!(config.evaluation.progress_interval, 500);
        assert_eq!(config.predict.top_k, 25);
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let minimal = r#"
[dataset]
train_path = "train.txt"
valid_path = "valid.txt"
test_path = "test.txt"

[embeddings]
dir = "embeddings"
models = ["transe"]

[evaluation]
metrics_dir = "metrics"
"#;
        fs::write(&config_path, minimal).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.evaluation.hits_at, vec![1, 3, 5, 10]);
        assert_eq!(config.evaluation.progress_interval, 1000);
        assert_eq!(config.predict.top_k, 10);
        assert_eq!(
            config.metrics_path(),
            PathBuf::from("metrics").join(METRICS_FILE)
        );
    }

    #[test]
    fn test_config_rejects_unknown_model() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let content = create_test_config(&temp_dir).replace("\"transe\"", "\"rotate\"");
        fs::write(&config_path, content).unwrap();

        let config = Config::load_from(&config_path);
        assert!(config.is_err());
        assert!(config.unwrap_err().to_string().contains("rotate"));
    }

    #[test]
    fn test_config_rejects_unsorted_hits_at() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let content = create_test_config(&temp_dir).replace("[1, 3, 5, 10]", "[10, 1]");
        fs::write(&config_path, content).unwrap();

        let config = Config::load_from(&config_path);
        assert!(config.is_err());
        assert!(config.unwrap_err().to_string().contains("ascending"));
    }

    #[test]
    fn test_config_invalid_path() {
        let config = Config::load_from(Path::new("nonexistent.toml"));
        assert!(config.is_err());
    }

    #[test]
    fn test_model_dir_lowercases() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, create_test_config(&temp_dir)).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert!(config
            .model_dir("ComplEx")
            .ends_with(Path::new("embeddings").join("complex")));
    }
}
