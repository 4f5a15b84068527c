use anyhow::Result;

use crate::embedding_model::EmbeddingModel;
use crate::similarity::normalize;

/// Common English stop words to filter out
const STOP_WORDS: &[&str] = &[
  // Articles and determiners
  "the", "a", "an", "this", "that", "these", "those", // Conjunctions
  "and", "or", "but", "as", // Prepositions
  "in", "on", "at", "to", "for", "of", "with", "by", "over", "from", "into", "about", // Common verbs
  "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
  "would", "could", "should", // Pronouns
  "you", "your", "we", "our", "us", "they", "them", "their", "it", "its", "he", "she", "his",
  "her", "who", "when", "where",
];

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Split text into lower-cased terms, dropping punctuation and stop words.
///
/// Repeated terms are kept so term frequency carries into the embedding.
/// A trailing plural `s` is folded away ("explosions" and "explosion" share a term).
pub fn extract_terms(text: &str) -> Vec<String> {
  text
    .split_whitespace()
    .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
    .filter(|word| !word.is_empty() && !STOP_WORDS.contains(&word.as_str()))
    .map(fold_plural)
    .collect()
}

fn fold_plural(word: String) -> String {
  if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
    word[..word.len() - 1].to_string()
  } else {
    word
  }
}

fn fnv1a(bytes: &[u8]) -> u64 {
  bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME))
}

/// Hashed bag-of-words embedding. Works offline and is deterministic across
/// runs, at the cost of only matching shared vocabulary.
#[derive(Debug, Clone)]
pub struct LexicalEmbeddingModel {
  dimensions: usize,
}

impl LexicalEmbeddingModel {
  pub fn new(dimensions: usize) -> Self {
    Self { dimensions: dimensions.max(1) }
  }

  pub fn dimensions(&self) -> usize {
    self.dimensions
  }

  pub fn embed(&self, text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; self.dimensions];

    for term in extract_terms(text) {
      let hash = fnv1a(term.as_bytes());
      let bucket = (hash % self.dimensions as u64) as usize;
      let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
      vector[bucket] += sign;
    }

    normalize(vector)
  }
}

impl Default for LexicalEmbeddingModel {
  fn default() -> Self {
    Self::new(384)
  }
}

impl EmbeddingModel for LexicalEmbeddingModel {
  fn model_name(&self) -> &str {
    "lexical"
  }

  fn compute_embeddings(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    Ok(texts.iter().map(|text| self.embed(text)).collect())
  }
}
