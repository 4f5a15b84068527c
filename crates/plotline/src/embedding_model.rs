use anyhow::{anyhow, Result};

#[cfg(feature = "neural")]
pub use neural::OnnxEmbeddingModel;

/// Trait for computing text embeddings - allows for testing with mocks
pub trait EmbeddingModel {
  /// Human readable identifier, used in logs
  fn model_name(&self) -> &str;

  /// Embed a batch of texts, returning one vector per input in order
  fn compute_embeddings(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

impl<M: EmbeddingModel + ?Sized> EmbeddingModel for Box<M> {
  fn model_name(&self) -> &str {
    (**self).model_name()
  }

  fn compute_embeddings(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    (**self).compute_embeddings(texts)
  }
}

/// Mock embedding model for testing
pub struct MockEmbeddingModel {
  pub fail_on_texts: Vec<String>,
  pub response_embeddings: Vec<Vec<f32>>,
  pub calls: usize,
}

impl Default for MockEmbeddingModel {
  fn default() -> Self {
    Self::new()
  }
}

impl MockEmbeddingModel {
  pub fn new() -> Self {
    Self {
      fail_on_texts: vec![],
      response_embeddings: vec![vec![0.1, 0.2, 0.3]; 10],
      calls: 0,
    }
  }

  pub fn with_failure_on(mut self, text: impl Into<String>) -> Self {
    self.fail_on_texts.push(text.into());
    self
  }

  pub fn with_embeddings(mut self, embeddings: Vec<Vec<f32>>) -> Self {
    self.response_embeddings = embeddings;
    self
  }
}

impl EmbeddingModel for MockEmbeddingModel {
  fn model_name(&self) -> &str {
    "mock"
  }

  fn compute_embeddings(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    self.calls += 1;

    for text in texts {
      if self.fail_on_texts.contains(text) {
        return Err(anyhow!("Mock failure for text: {}", text));
      }
    }

    if self.response_embeddings.is_empty() {
      return Err(anyhow!("Mock has no embeddings configured"));
    }

    // Cycle through the configured embeddings
    Ok(
      (0..texts.len())
        .map(|i| self.response_embeddings[i % self.response_embeddings.len()].clone())
        .collect(),
    )
  }
}

#[cfg(feature = "neural")]
mod neural {
  use anyhow::{anyhow, bail, Result};
  use ndarray::{Array1, ArrayView2, ArrayView3};
  use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
  use ort::value::{DynValue, Tensor};
  use std::collections::HashMap;
  use std::path::{Path, PathBuf};
  use tokenizers::{Encoding, Tokenizer, TruncationParams};
  use tracing::{debug, info};

  use super::EmbeddingModel;
  use crate::error::SearchError;
  use crate::similarity::normalize;

  const TOKENIZER_FILE: &str = "tokenizer.json";
  const MODEL_FILE: &str = "onnx/model.onnx";
  // all-MiniLM-L6-v2 was trained on 256-token sequences
  const MAX_SEQUENCE_LENGTH: usize = 256;

  /// Sentence embedding model run through ONNX Runtime
  pub struct OnnxEmbeddingModel {
    model_id: String,
    session: Session,
    tokenizer: Tokenizer,
    input_names: Vec<String>,
  }

  struct ModelFiles {
    tokenizer_file: PathBuf,
    model_path: PathBuf,
  }

  struct Batch {
    ids: Vec<i64>,
    mask: Vec<i64>,
    token_type_ids: Vec<i64>,
    batch: usize,
    length: usize,
  }

  impl OnnxEmbeddingModel {
    /// Download (or reuse the cached copy of) a model from the Hugging Face Hub and load it
    pub fn load(model_id: &str) -> crate::Result<Self> {
      info!("Loading embedding model {model_id}");

      let files = download_model(model_id).map_err(|e| load_error(model_id, e))?;
      Self::load_from_files(model_id, &files.tokenizer_file, &files.model_path)
    }

    /// Load a model from a tokenizer file and an ONNX graph already on disk
    pub fn load_from_files(
      model_id: &str,
      tokenizer_file: &Path,
      model_path: &Path,
    ) -> crate::Result<Self> {
      let tokenizer = load_tokenizer(tokenizer_file).map_err(|e| load_error(model_id, e))?;
      initialize_onnx_runtime().map_err(|e| load_error(model_id, e))?;
      let session = create_model_session(model_path).map_err(|e| load_error(model_id, e))?;
      let input_names = session.inputs.iter().map(|input| input.name.to_string()).collect();

      info!("Embedding model {model_id} ready");
      Ok(Self { model_id: model_id.to_string(), session, tokenizer, input_names })
    }

    fn wants_input(&self, name: &str) -> bool {
      self.input_names.iter().any(|input| input == name)
    }
  }

  impl EmbeddingModel for OnnxEmbeddingModel {
    fn model_name(&self) -> &str {
      &self.model_id
    }

    fn compute_embeddings(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
      if texts.is_empty() {
        return Ok(vec![]);
      }

      let encodings = self
        .tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| anyhow!("Failed to encode texts: {}", e))?;
      let batch = batch_tokens(&encodings);
      debug!("Running inference on {} texts padded to {} tokens", batch.batch, batch.length);

      let shape = [batch.batch, batch.length];
      let mut inputs: HashMap<String, DynValue> = HashMap::new();
      inputs.insert(
        "input_ids".to_string(),
        Tensor::from_array((shape, batch.ids.into_boxed_slice()))?.into_dyn(),
      );
      inputs.insert(
        "attention_mask".to_string(),
        Tensor::from_array((shape, batch.mask.clone().into_boxed_slice()))?.into_dyn(),
      );
      if self.wants_input("token_type_ids") {
        inputs.insert(
          "token_type_ids".to_string(),
          Tensor::from_array((shape, batch.token_type_ids.into_boxed_slice()))?.into_dyn(),
        );
      }

      let outputs = self.session.run(inputs)?;
      let (dims, data) = extract_hidden_state(&outputs)?;

      mean_pool(data, &dims, &batch.mask)
    }
  }

  fn load_error(model_id: &str, err: anyhow::Error) -> SearchError {
    SearchError::model_unavailable(format!("Error loading model '{model_id}': {err:#}"))
  }

  fn initialize_onnx_runtime() -> Result<()> {
    ort::init()
      .with_name("plotline")
      .commit()
      .map_err(|e| anyhow!("Failed to initialize ONNX Runtime: {}", e))
      .map(|_| ())
  }

  fn download_model(model_id: &str) -> Result<ModelFiles> {
    let api = hf_hub::api::sync::Api::new()
      .map_err(|e| anyhow!("HF API initialization failed: {}", e))?;
    let repo = api.model(model_id.to_string());

    let tokenizer_file =
      repo.get(TOKENIZER_FILE).map_err(|e| anyhow!("Failed to download tokenizer: {}", e))?;
    let model_path =
      repo.get(MODEL_FILE).map_err(|e| anyhow!("Failed to download ONNX model: {}", e))?;

    Ok(ModelFiles { tokenizer_file, model_path })
  }

  fn load_tokenizer(path: &Path) -> Result<Tokenizer> {
    let mut tokenizer =
      Tokenizer::from_file(path).map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;

    tokenizer
      .with_truncation(Some(TruncationParams {
        max_length: MAX_SEQUENCE_LENGTH,
        ..Default::default()
      }))
      .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
    // Padding is applied by batch_tokens
    tokenizer.with_padding(None);

    Ok(tokenizer)
  }

  fn create_model_session(model_path: &Path) -> Result<Session> {
    Session::builder()
      .map_err(|e| anyhow!("Failed to create session builder: {}", e))?
      .with_optimization_level(GraphOptimizationLevel::Level3)
      .map_err(|e| anyhow!("Failed to set optimization level: {}", e))?
      .with_intra_threads(1)
      .map_err(|e| anyhow!("Failed to set thread count: {}", e))?
      .commit_from_file(model_path)
      .map_err(|e| anyhow!("Failed to load ONNX model: {}", e))
  }

  fn batch_tokens(encodings: &[Encoding]) -> Batch {
    let batch = encodings.len();
    let length = encodings.iter().map(|e| e.len()).max().unwrap_or(0);

    let mut ids = Vec::with_capacity(batch * length);
    let mut mask = Vec::with_capacity(batch * length);
    let mut token_type_ids = Vec::with_capacity(batch * length);

    for encoding in encodings {
      let encoding_ids = encoding.get_ids();
      let encoding_mask = encoding.get_attention_mask();

      for i in 0..length {
        if i < encoding_ids.len() {
          ids.push(encoding_ids[i] as i64);
          mask.push(encoding_mask[i] as i64);
        } else {
          ids.push(0);
          mask.push(0);
        }
        token_type_ids.push(0);
      }
    }

    Batch { ids, mask, token_type_ids, batch, length }
  }

  fn extract_hidden_state<'a>(outputs: &'a SessionOutputs<'_>) -> Result<(Vec<usize>, &'a [f32])> {
    let output = outputs
      .get("last_hidden_state")
      .or_else(|| outputs.get("token_embeddings"))
      .ok_or_else(|| {
        anyhow!(
          "No hidden state output found - available outputs: {:?}",
          outputs.keys().collect::<Vec<_>>()
        )
      })?;

    let (shape, data) = output.try_extract_tensor::<f32>()?;
    let dims = shape.iter().map(|&d| d as usize).collect();
    Ok((dims, data))
  }

  /// Average token vectors over real (non-padding) tokens, then scale to unit length
  pub(super) fn mean_pool(data: &[f32], dims: &[usize], mask: &[i64]) -> Result<Vec<Vec<f32>>> {
    let [batch, length, hidden] = dims else {
      bail!("Expected a [batch, tokens, hidden] output, got shape {:?}", dims);
    };

    let states = ArrayView3::from_shape((*batch, *length, *hidden), data)?;
    let mask = ArrayView2::from_shape((*batch, *length), mask)?;

    let mut embeddings = Vec::with_capacity(*batch);
    for (tokens, token_mask) in states.outer_iter().zip(mask.outer_iter()) {
      let mut pooled = Array1::<f32>::zeros(*hidden);
      let mut count = 0.0f32;

      for (token, &keep) in tokens.outer_iter().zip(token_mask.iter()) {
        if keep > 0 {
          pooled += &token;
          count += 1.0;
        }
      }

      if count > 0.0 {
        pooled /= count;
      }
      embeddings.push(normalize(pooled.to_vec()));
    }

    Ok(embeddings)
  }
}
