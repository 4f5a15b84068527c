//! Plotline - Semantic Search over Movie Plots
//!
//! Loads a CSV of movie titles and plot summaries, embeds every plot with a
//! sentence-embedding model, and ranks plots against free-text queries by
//! cosine similarity.

pub mod config;
pub mod display;
pub mod embedding_model;
pub mod error;
pub mod lexical;
pub mod movies;
pub mod search;
pub mod similarity;

pub use config::Config;
pub use embedding_model::{EmbeddingModel, MockEmbeddingModel};
pub use error::{Result, SearchError};
pub use lexical::LexicalEmbeddingModel;
pub use movies::{Movie, MovieRow};
pub use search::{MovieSearcher, SearchResult, DEFAULT_TOP_N};

#[cfg(feature = "neural")]
pub use embedding_model::OnnxEmbeddingModel;
