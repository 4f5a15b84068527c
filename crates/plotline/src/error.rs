use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
  #[error("Movies CSV file not found at path: {}", .path.display())]
  FileNotFound { path: PathBuf },

  #[error("{message}")]
  Validation { message: String },

  #[error("Embedding model unavailable: {message}")]
  ModelUnavailable { message: String },

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl SearchError {
  pub fn file_not_found(path: impl AsRef<Path>) -> Self {
    Self::FileNotFound { path: path.as_ref().to_path_buf() }
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation { message: message.into() }
  }

  pub fn model_unavailable(message: impl Into<String>) -> Self {
    Self::ModelUnavailable { message: message.into() }
  }

  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Validation { .. })
  }
}

impl From<csv::Error> for SearchError {
  fn from(err: csv::Error) -> Self {
    let message = err.to_string();
    match err.into_kind() {
      csv::ErrorKind::Io(io) => Self::Io(io),
      _ => Self::validation(format!("Malformed movies CSV: {message}")),
    }
  }
}

pub type Result<T> = std::result::Result<T, SearchError>;
