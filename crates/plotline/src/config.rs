//! Configuration management for Plotline
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Command line flags take precedence over anything loaded here.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SearchError;

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV_VAR: &str = "PLOTLINE_CONFIG";

const LOCAL_CONFIG_PATHS: [&str; 2] = [".plotline.json", "plotline.json"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  /// Hugging Face model repository used for neural embeddings
  #[serde(default = "default_model_id")]
  pub model_id: String,
  /// Dataset used when no path is given on the command line
  #[serde(default = "default_movies_path")]
  pub movies_path: PathBuf,
  /// Number of results returned when no count is given
  #[serde(default = "default_top_n")]
  pub top_n: usize,
  /// Plots embedded per model call
  #[serde(default = "default_batch_size")]
  pub batch_size: usize,
  /// Vector width for the lexical fallback model
  #[serde(default = "default_lexical_dimensions")]
  pub lexical_dimensions: usize,
}

fn default_model_id() -> String {
  "sentence-transformers/all-MiniLM-L6-v2".to_string()
}
fn default_movies_path() -> PathBuf {
  PathBuf::from("movies.csv")
}
fn default_top_n() -> usize {
  5
}
fn default_batch_size() -> usize {
  32
}
fn default_lexical_dimensions() -> usize {
  384
}

impl Default for Config {
  fn default() -> Self {
    Self {
      model_id: default_model_id(),
      movies_path: default_movies_path(),
      top_n: default_top_n(),
      batch_size: default_batch_size(),
      lexical_dimensions: default_lexical_dimensions(),
    }
  }
}

impl Config {
  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
      .with_context(|| format!("Invalid config file {}", path.display()))?;
    config.validate()?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
  }

  /// Load configuration from the environment, the working directory, the
  /// user config directory, or defaults, in that order
  pub fn load() -> Result<Self> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
      return Self::load_from_file(path);
    }

    for path in Self::search_paths() {
      if path.is_file() {
        return Self::load_from_file(path);
      }
    }

    Ok(Config::default())
  }

  /// Load from an explicit path when given, otherwise fall back to [`Config::load`]
  pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
    match path {
      Some(path) => Self::load_from_file(path),
      None => Self::load(),
    }
  }

  /// Save configuration to a file
  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(self)?;
    std::fs::write(path, content)?;
    Ok(())
  }

  /// Reject values that would make loading or searching meaningless
  pub fn validate(&self) -> Result<(), SearchError> {
    if self.model_id.trim().is_empty() {
      return Err(SearchError::validation("model_id must not be empty"));
    }
    if self.top_n == 0 {
      return Err(SearchError::validation("top_n must be a positive integer"));
    }
    if self.batch_size == 0 {
      return Err(SearchError::validation("batch_size must be a positive integer"));
    }
    if self.lexical_dimensions == 0 {
      return Err(SearchError::validation("lexical_dimensions must be a positive integer"));
    }
    Ok(())
  }

  fn search_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = LOCAL_CONFIG_PATHS.iter().map(PathBuf::from).collect();
    if let Some(config_dir) = dirs::config_dir() {
      paths.push(config_dir.join("plotline").join("config.json"));
    }
    paths
  }
}
