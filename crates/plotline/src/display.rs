//! Display formatting utilities for CLI output

use anyhow::Result;
use clap::ValueEnum;
use colored::*;

use crate::search::SearchResult;

const WRAP_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
  #[default]
  Pretty,
  Json,
}

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.len() + 1 + word.len() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(current_line);
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

/// Render results as a numbered list with wrapped plots
pub fn render_pretty(query: &str, results: &[SearchResult]) -> String {
  let mut out = format!("Search results for query: '{}'\n", query.cyan());

  if results.is_empty() {
    out.push_str("No matches found\n");
    return out;
  }

  for (rank, result) in results.iter().enumerate() {
    out.push('\n');
    out.push_str(&format!(
      "{}. {} {}\n",
      rank + 1,
      result.title.yellow().bold(),
      format!("({:.4})", result.similarity).dimmed()
    ));
    for line in wrap_text(&result.plot, WRAP_WIDTH - 3) {
      out.push_str(&format!("   {line}\n"));
    }
  }

  out
}

/// Render results as a JSON array of `{title, plot, similarity}` objects
pub fn render_json(results: &[SearchResult]) -> Result<String> {
  Ok(serde_json::to_string_pretty(results)?)
}

pub fn render(format: OutputFormat, query: &str, results: &[SearchResult]) -> Result<String> {
  match format {
    OutputFormat::Pretty => Ok(render_pretty(query, results)),
    OutputFormat::Json => render_json(results),
  }
}
