//! Movie dataset loading
//!
//! Reads a CSV with a header row containing at least `title` and `plot`.
//! Extra columns are ignored and column order is free. Rows with a blank
//! title or plot are dropped.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Result, SearchError};

pub const TITLE_COLUMN: &str = "title";
pub const PLOT_COLUMN: &str = "plot";

/// A raw (title, plot) pair as read from the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRow {
  pub title: String,
  pub plot: String,
}

impl MovieRow {
  pub fn new(title: impl Into<String>, plot: impl Into<String>) -> Self {
    Self { title: title.into(), plot: plot.into() }
  }

  fn is_blank(&self) -> bool {
    self.title.trim().is_empty() || self.plot.trim().is_empty()
  }
}

/// A loaded movie with its plot embedding. Identity is the row position.
#[derive(Debug, Clone)]
pub struct Movie {
  pub title: String,
  pub plot: String,
  pub embedding: Vec<f32>,
}

impl Movie {
  pub fn from_row(row: MovieRow, embedding: Vec<f32>) -> Self {
    Self { title: row.title, plot: row.plot, embedding }
  }
}

/// Load movie rows from a CSV file on disk
pub fn load_rows(path: impl AsRef<Path>) -> Result<Vec<MovieRow>> {
  let path = path.as_ref();
  if !path.is_file() {
    return Err(SearchError::file_not_found(path));
  }

  info!("Loading movies from {}", path.display());
  let file = File::open(path)?;
  let rows = read_rows(file)?;
  info!("Loaded {} movies", rows.len());

  Ok(rows)
}

/// Parse movie rows from any CSV source
pub fn read_rows<R: Read>(source: R) -> Result<Vec<MovieRow>> {
  let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(source);

  let headers = reader.headers()?.clone();
  if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
    return Err(SearchError::validation("Movies CSV file is empty"));
  }

  let (title_idx, plot_idx) = column_indices(&headers)?;
  debug!("Columns: title at {title_idx}, plot at {plot_idx}");

  let mut rows = Vec::new();
  let mut dropped = 0usize;

  for record in reader.records() {
    let record = record?;
    let row = MovieRow::new(
      record.get(title_idx).unwrap_or_default(),
      record.get(plot_idx).unwrap_or_default(),
    );

    if row.is_blank() {
      dropped += 1;
      continue;
    }
    rows.push(row);
  }

  if dropped > 0 {
    warn!("Dropped {dropped} rows with an empty title or plot");
  }

  if rows.is_empty() {
    return Err(SearchError::validation("No valid movie plots available after cleaning"));
  }

  Ok(rows)
}

fn column_indices(headers: &csv::StringRecord) -> Result<(usize, usize)> {
  let find = |name: &str| headers.iter().position(|h| h == name);

  match (find(TITLE_COLUMN), find(PLOT_COLUMN)) {
    (Some(title), Some(plot)) => Ok((title, plot)),
    (title, plot) => {
      let mut missing = Vec::new();
      if plot.is_none() {
        missing.push(PLOT_COLUMN);
      }
      if title.is_none() {
        missing.push(TITLE_COLUMN);
      }
      Err(SearchError::validation(format!(
        "Missing required columns in CSV: {}",
        missing.join(", ")
      )))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_read_rows_basic() {
    let csv = "title,plot\nSpy Movie,A spy in Paris\nAction Flick,Explosions in New York\n";
    let rows = read_rows(csv.as_bytes()).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], MovieRow::new("Spy Movie", "A spy in Paris"));
    assert_eq!(rows[1].title, "Action Flick");
  }

  #[test]
  fn test_read_rows_column_order_and_extra_columns() {
    let csv = "year,plot,title\n1999,A hacker wakes up,The Matrix\n";
    let rows = read_rows(csv.as_bytes()).unwrap();

    assert_eq!(rows, vec![MovieRow::new("The Matrix", "A hacker wakes up")]);
  }

  #[test]
  fn test_read_rows_quoted_fields() {
    let csv = "title,plot\n\"Paris, Je T'aime\",\"Love stories, set in Paris\"\n";
    let rows = read_rows(csv.as_bytes()).unwrap();

    assert_eq!(rows[0].title, "Paris, Je T'aime");
    assert_eq!(rows[0].plot, "Love stories, set in Paris");
  }

  #[test]
  fn test_read_rows_missing_plot_column() {
    let err = read_rows("title,summary\nA,B\n".as_bytes()).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("plot"));
  }

  #[test]
  fn test_read_rows_missing_both_columns_sorted() {
    let err = read_rows("name,summary\nA,B\n".as_bytes()).unwrap_err();
    assert_eq!(err.to_string(), "Missing required columns in CSV: plot, title");
  }

  #[test]
  fn test_read_rows_empty_input() {
    let err = read_rows("".as_bytes()).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("empty"));
  }

  #[test]
  fn test_read_rows_header_only() {
    let err = read_rows("title,plot\n".as_bytes()).unwrap_err();
    assert!(err.is_validation());
  }

  #[test]
  fn test_read_rows_drops_blank_rows() {
    let csv = "title,plot\nKeep,Real plot\nNo Plot,   \n,Orphan plot\n";
    let rows = read_rows(csv.as_bytes()).unwrap();

    assert_eq!(rows, vec![MovieRow::new("Keep", "Real plot")]);
  }

  #[test]
  fn test_read_rows_all_blank_fails() {
    let err = read_rows("title,plot\nA, \n".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("No valid movie plots"));
  }

  #[test]
  fn test_read_rows_ragged_row_is_validation() {
    let err = read_rows("title,plot\nA,B,C\n".as_bytes()).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("Malformed"));
  }

  #[test]
  fn test_load_rows_missing_path() {
    let err = load_rows("/definitely/not/here/movies.csv").unwrap_err();
    assert!(matches!(err, SearchError::FileNotFound { .. }));
  }
}
