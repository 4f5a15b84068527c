use anyhow::Result;
use plotline::{LexicalEmbeddingModel, MockEmbeddingModel, MovieSearcher, SearchError};
use std::path::PathBuf;

#[cfg(test)]
mod search_tests {
  use super::*;

  fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
  }

  fn loaded_searcher() -> MovieSearcher<LexicalEmbeddingModel> {
    let mut searcher = MovieSearcher::with_default_config(LexicalEmbeddingModel::default());
    searcher.load_movies(fixture("movies.csv")).unwrap();
    searcher
  }

  fn titles(results: &[plotline::SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.title.as_str()).collect()
  }

  #[test]
  fn test_load_counts_data_rows() -> Result<()> {
    let mut searcher = MovieSearcher::with_default_config(LexicalEmbeddingModel::default());
    let count = searcher.load_movies(fixture("movies.csv"))?;

    assert_eq!(count, 5);
    assert_eq!(searcher.movies().len(), 5);
    assert_eq!(searcher.movies()[0].title, "Spy Movie");
    assert!(searcher.movies().iter().all(|m| m.embedding.len() == 384));
    Ok(())
  }

  #[test]
  fn test_load_missing_file() {
    let mut searcher = MovieSearcher::with_default_config(LexicalEmbeddingModel::default());
    let err = searcher.load_movies(fixture("does_not_exist.csv")).unwrap_err();

    assert!(matches!(err, SearchError::FileNotFound { .. }));
    assert!(!searcher.is_loaded());
  }

  #[test]
  fn test_load_missing_column() {
    let mut searcher = MovieSearcher::with_default_config(LexicalEmbeddingModel::default());
    let err = searcher.load_movies(fixture("missing_plot.csv")).unwrap_err();

    assert!(err.is_validation());
    assert!(err.to_string().contains("plot"));
  }

  #[test]
  fn test_load_empty_file() {
    let mut searcher = MovieSearcher::with_default_config(LexicalEmbeddingModel::default());
    let err = searcher.load_movies(fixture("empty.csv")).unwrap_err();

    assert!(err.is_validation());
  }

  #[test]
  fn test_empty_query_is_validation() {
    let mut searcher = loaded_searcher();

    assert!(searcher.search_movies("", 5).unwrap_err().is_validation());
    assert!(searcher.search_movies("   \n", 5).unwrap_err().is_validation());
  }

  #[test]
  fn test_zero_top_n_is_validation() {
    let mut searcher = loaded_searcher();
    let err = searcher.search_movies("spy thriller in Paris", 0).unwrap_err();

    assert!(err.to_string().contains("top_n must be a positive integer"));
  }

  #[test]
  fn test_scores_are_non_increasing() -> Result<()> {
    let mut searcher = loaded_searcher();

    for query in ["spy thriller in Paris", "romantic movie in Paris", "ghost", "zzz"] {
      let results = searcher.search_movies(query, 5)?;
      assert!(results.windows(2).all(|pair| pair[0].similarity >= pair[1].similarity));
      assert!(results.iter().all(|r| (-1.0..=1.0).contains(&r.similarity)));
    }
    Ok(())
  }

  #[test]
  fn test_exact_plot_ranks_first() -> Result<()> {
    let mut searcher = loaded_searcher();
    let plot = searcher.movies()[4].plot.clone();

    let results = searcher.search_movies(&plot, 1)?;
    assert_eq!(titles(&results), vec!["Haunted Manor"]);
    assert!(results[0].similarity > 0.99);
    Ok(())
  }

  #[test]
  fn test_expected_titles_for_queries() -> Result<()> {
    let mut searcher = loaded_searcher();

    let spy = searcher.search_movies("spy thriller in Paris", 3)?;
    assert_eq!(spy[0].title, "Spy Movie");

    let romance = searcher.search_movies("romantic movie in Paris", 3)?;
    assert!(titles(&romance).contains(&"Romance in Paris"));

    let action = searcher.search_movies("explosions chase New York", 3)?;
    assert!(titles(&action).contains(&"Action Flick"));
    Ok(())
  }

  #[test]
  fn test_top_n_limits_results() -> Result<()> {
    let mut searcher = loaded_searcher();
    assert_eq!(searcher.search_movies("spy thriller in Paris", 2)?.len(), 2);
    Ok(())
  }

  #[test]
  fn test_top_n_larger_than_dataset_returns_all() -> Result<()> {
    let mut searcher = loaded_searcher();
    let results = searcher.search_movies("spy thriller in Paris", 50)?;

    assert_eq!(results.len(), 5);
    Ok(())
  }

  #[test]
  fn test_unmatched_query_keeps_file_order() -> Result<()> {
    let mut searcher = loaded_searcher();
    let results = searcher.search_movies("zzz qqq", 5)?;

    assert_eq!(
      titles(&results),
      vec!["Spy Movie", "Romance in Paris", "Action Flick", "Space Odyssey", "Haunted Manor"]
    );
    Ok(())
  }

  #[test]
  fn test_reload_replaces_table() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("one.csv");
    std::fs::write(&path, "title,plot\nSolo,A lone sailor crosses the ocean\n")?;

    let mut searcher = loaded_searcher();
    assert_eq!(searcher.load_movies(&path)?, 1);
    assert_eq!(searcher.search_movies("sailor", 5)?.len(), 1);
    Ok(())
  }

  #[test]
  fn test_long_plots_and_queries_are_accepted() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("epic.csv");
    let epic = "A lone sailor crosses the endless ocean on a voyage. ".repeat(200);
    assert!(epic.len() > 10_000);
    std::fs::write(&path, format!("title,plot\nEpic,{epic}\nShort,A ghost haunts a manor\n"))?;

    let mut searcher = MovieSearcher::with_default_config(LexicalEmbeddingModel::default());
    assert_eq!(searcher.load_movies(&path)?, 2);

    let query = "sailor ocean voyage ".repeat(700);
    let results = searcher.search_movies(&query, 5)?;
    assert_eq!(titles(&results), vec!["Epic", "Short"]);
    Ok(())
  }

  #[test]
  fn test_model_failure_on_load_is_model_unavailable() {
    let model = MockEmbeddingModel::new().with_failure_on(
      "Astronauts drift through a silent galaxy after their ship loses contact with Earth.",
    );
    let mut searcher = MovieSearcher::with_default_config(model);

    let err = searcher.load_movies(fixture("movies.csv")).unwrap_err();
    assert!(matches!(err, SearchError::ModelUnavailable { .. }));
    assert!(err.to_string().contains("Error computing embeddings"));
  }

  #[test]
  fn test_model_failure_on_query_is_model_unavailable() {
    let mut searcher = MovieSearcher::with_default_config(MockEmbeddingModel::new().with_failure_on("explode"));
    searcher.load_movies(fixture("movies.csv")).unwrap();

    let err = searcher.search_movies("explode", 3).unwrap_err();
    assert!(matches!(err, SearchError::ModelUnavailable { .. }));
  }
}
