use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::embedding_model::EmbeddingModel;
use crate::error::{Result, SearchError};
use crate::movies::{self, Movie, MovieRow};
use crate::similarity::cosine_similarity;

pub const DEFAULT_TOP_N: usize = 5;

/// A ranked movie, produced fresh for every query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
  pub title: String,
  pub plot: String,
  pub similarity: f32,
}

/// Holds an embedding model and the embedded movie table it searches
pub struct MovieSearcher<M: EmbeddingModel> {
  model: M,
  config: Config,
  movies: Option<Vec<Movie>>,
}

impl<M: EmbeddingModel> MovieSearcher<M> {
  pub fn new(model: M, config: Config) -> Self {
    Self { model, config, movies: None }
  }

  pub fn with_default_config(model: M) -> Self {
    Self::new(model, Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn model(&self) -> &M {
    &self.model
  }

  pub fn is_loaded(&self) -> bool {
    self.movies.is_some()
  }

  /// The loaded table in file order, empty before the first load
  pub fn movies(&self) -> &[Movie] {
    self.movies.as_deref().unwrap_or(&[])
  }

  /// Read a movies CSV and embed every plot, replacing any previously loaded table.
  /// Returns the number of movies loaded.
  pub fn load_movies(&mut self, path: impl AsRef<Path>) -> Result<usize> {
    let rows = movies::load_rows(path)?;
    self.load_rows(rows)
  }

  /// Embed already-parsed rows, replacing any previously loaded table
  pub fn load_rows(&mut self, rows: Vec<MovieRow>) -> Result<usize> {
    if rows.is_empty() {
      return Err(SearchError::validation("No valid movie plots available after cleaning"));
    }

    info!("Embedding {} plots with {}", rows.len(), self.model.model_name());
    let plots: Vec<String> = rows.iter().map(|row| row.plot.clone()).collect();
    let embeddings = self.embed_plots(&plots)?;

    let table: Vec<Movie> =
      rows.into_iter().zip(embeddings).map(|(row, embedding)| Movie::from_row(row, embedding)).collect();
    let count = table.len();
    self.movies = Some(table);

    Ok(count)
  }

  /// Rank every loaded movie against `query` and return the best `top_n`.
  ///
  /// Results are ordered by descending similarity; equal scores keep file
  /// order. Asking for more results than there are movies returns them all.
  pub fn search_movies(&mut self, query: &str, top_n: usize) -> Result<Vec<SearchResult>> {
    validate_query(query)?;
    if top_n == 0 {
      return Err(SearchError::validation("top_n must be a positive integer"));
    }

    let movies = match &self.movies {
      Some(movies) => movies,
      None => {
        return Err(SearchError::validation(
          "Movies data and embeddings are not loaded; call load_movies first",
        ))
      }
    };

    debug!("Embedding query '{query}'");
    let query_embedding = self
      .model
      .compute_embeddings(&[query.to_string()])
      .map_err(|e| SearchError::model_unavailable(format!("Failed to encode query: {e:#}")))?
      .into_iter()
      .next()
      .ok_or_else(|| SearchError::model_unavailable("Model returned no embedding for the query"))?;

    if let Some(first) = movies.first() {
      if first.embedding.len() != query_embedding.len() {
        return Err(SearchError::model_unavailable(format!(
          "Query embedding has {} dimensions but plots have {}",
          query_embedding.len(),
          first.embedding.len()
        )));
      }
    }

    let results = rank(&query_embedding, movies, top_n);
    debug!("Returning {} of {} movies", results.len(), movies.len());
    Ok(results)
  }

  fn embed_plots(&mut self, plots: &[String]) -> Result<Vec<Vec<f32>>> {
    let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(plots.len());

    for (index, batch) in plots.chunks(self.config.batch_size.max(1)).enumerate() {
      debug!("Embedding batch {} ({} plots)", index + 1, batch.len());

      let batch_embeddings = self
        .model
        .compute_embeddings(batch)
        .map_err(|e| SearchError::model_unavailable(format!("Error computing embeddings: {e:#}")))?;

      if batch_embeddings.len() != batch.len() {
        return Err(SearchError::model_unavailable(format!(
          "Model returned {} embeddings for {} plots",
          batch_embeddings.len(),
          batch.len()
        )));
      }
      embeddings.extend(batch_embeddings);
    }

    if let Some(first) = embeddings.first() {
      let dimensions = first.len();
      if dimensions == 0 || embeddings.iter().any(|e| e.len() != dimensions) {
        return Err(SearchError::model_unavailable("Model returned inconsistent embedding dimensions"));
      }
    }

    Ok(embeddings)
  }
}

fn validate_query(query: &str) -> Result<()> {
  if query.trim().is_empty() {
    return Err(SearchError::validation("Query must be a non-empty string"));
  }
  Ok(())
}

/// Score every movie against the query embedding and keep the best `top_n`.
///
/// Linear scan; the sort is stable so ties keep row order. NaN scores sort last.
pub fn rank(query_embedding: &[f32], movies: &[Movie], top_n: usize) -> Vec<SearchResult> {
  let mut scored: Vec<(usize, f32)> = movies
    .iter()
    .enumerate()
    .map(|(index, movie)| (index, cosine_similarity(query_embedding, &movie.embedding)))
    .collect();

  scored.sort_by(|a, b| descending(a.1, b.1));

  scored
    .into_iter()
    .take(top_n)
    .map(|(index, similarity)| SearchResult {
      title: movies[index].title.clone(),
      plot: movies[index].plot.clone(),
      similarity,
    })
    .collect()
}

fn descending(a: f32, b: f32) -> Ordering {
  match (a.is_nan(), b.is_nan()) {
    (true, true) => Ordering::Equal,
    (true, false) => Ordering::Greater,
    (false, true) => Ordering::Less,
    (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
  }
}
