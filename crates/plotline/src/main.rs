use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use plotline::display::{self, OutputFormat};
use plotline::{Config, EmbeddingModel, LexicalEmbeddingModel, MovieSearcher};

#[cfg(feature = "neural")]
use plotline::OnnxEmbeddingModel;

const DEMO_QUERY: &str = "spy thriller in Paris";

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum ModelKind {
  /// Transformer sentence embeddings via ONNX Runtime
  #[cfg(feature = "neural")]
  Neural,
  /// Hashed bag-of-words embeddings, no download required
  Lexical,
}

#[derive(Parser)]
#[command(name = "plotline")]
#[command(about = "Plotline - Semantic Movie Search\nFind movies whose plots match a free-text description")]
#[command(version)]
struct Args {
  /// Search query (space-separated words); a demo query is used when omitted
  query: Vec<String>,

  /// Movies CSV with `title` and `plot` columns
  #[arg(short, long)]
  movies: Option<PathBuf>,

  /// Number of results to return
  #[arg(short = 'n', long)]
  top_n: Option<usize>,

  /// Embedding backend
  #[arg(long, value_enum)]
  model: Option<ModelKind>,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
  format: OutputFormat,

  /// Configuration file path
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> Result<()> {
  let Args { query, movies, top_n, model, format, config, verbose } = Args::parse();
  init_logging(verbose);

  let mut config = Config::load_or_default(config.as_deref())?;
  if let Some(top_n) = top_n {
    config.top_n = top_n;
  }
  let movies_path = movies.unwrap_or_else(|| config.movies_path.clone());
  let query = if query.is_empty() { DEMO_QUERY.to_string() } else { query.join(" ") };
  let kind = model.unwrap_or_else(default_model_kind);
  debug!("Using {:?} model, dataset {}", kind, movies_path.display());

  let model = build_model(kind, &config)?;
  let top_n = config.top_n;
  let mut searcher = MovieSearcher::new(model, config);

  searcher.load_movies(&movies_path).context("Failed to load movies")?;
  let results = searcher.search_movies(&query, top_n).context("Error during search")?;

  println!("{}", display::render(format, &query, &results)?);
  Ok(())
}

fn init_logging(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("plotline=debug,ort=info,warn")
    } else {
      EnvFilter::new("plotline=info,ort=warn,warn")
    }
  });

  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

fn default_model_kind() -> ModelKind {
  #[cfg(feature = "neural")]
  {
    ModelKind::Neural
  }
  #[cfg(not(feature = "neural"))]
  {
    ModelKind::Lexical
  }
}

fn build_model(kind: ModelKind, config: &Config) -> Result<Box<dyn EmbeddingModel>> {
  match kind {
    #[cfg(feature = "neural")]
    ModelKind::Neural => {
      let model = OnnxEmbeddingModel::load(&config.model_id)?;
      Ok(Box::new(model))
    }
    ModelKind::Lexical => Ok(Box::new(LexicalEmbeddingModel::new(config.lexical_dimensions))),
  }
}
