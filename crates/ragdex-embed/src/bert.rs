//! BERT sentence embedder running on candle

use anyhow::{Context, anyhow};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::api::sync::Api;
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use ragdex_core::{Embedder, Error, Result};

/// Longest token sequence the sentence-transformers MiniLM models were trained on
const MAX_SEQ_LEN: usize = 256;

/// Mean-pooled, L2-normalized BERT sentence embeddings
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_id: String,
    dimension: usize,
}

impl BertEmbedder {
    /// Download (or reuse the cached copy of) a model from the Hugging Face hub
    pub fn from_hub(model_id: &str) -> Result<Self> {
        info!(model = model_id, "fetching embedding model");

        let fetch = || -> anyhow::Result<_> {
            let repo = Api::new()?.model(model_id.to_string());
            Ok((
                repo.get("config.json")?,
                repo.get("tokenizer.json")?,
                repo.get("model.safetensors")?,
            ))
        };

        let (config_path, tokenizer_path, weights_path) =
            fetch().map_err(|e| Error::Embedding(format!("failed to fetch {}: {}", model_id, e)))?;

        Self::load(model_id, &config_path, &tokenizer_path, &weights_path)
    }

    /// Load a model from local files
    pub fn load(
        model_id: &str,
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
    ) -> Result<Self> {
        Self::load_inner(model_id, config_path, tokenizer_path, weights_path)
            .map_err(|e| Error::Embedding(format!("failed to load {}: {:#}", model_id, e)))
    }

    fn load_inner(
        model_id: &str,
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
    ) -> anyhow::Result<Self> {
        let device = Device::Cpu;

        let config: Config = serde_json::from_str(
            &std::fs::read_to_string(config_path)
                .with_context(|| format!("reading {}", config_path.display()))?,
        )
        .context("parsing model config")?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("loading tokenizer from {}: {}", tokenizer_path.display(), e))?;
        tokenizer
            .with_padding(None)
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("configuring truncation: {}", e))?;

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)? };
        let model = BertModel::load(vb, &config)?;

        Ok(Self {
            model,
            tokenizer,
            device,
            model_id: model_id.to_string(),
            dimension: config.hidden_size,
        })
    }

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("tokenization failed: {}", e))?;

        let token_count = encoding.get_ids().len();
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        // [1, tokens, hidden]
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = (hidden.sum(1)? / token_count as f64)?;
        let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        let embedding = pooled.broadcast_div(&norm)?.squeeze(0)?.to_vec1::<f32>()?;

        debug!(tokens = token_count, "encoded text");
        Ok(embedding)
    }
}

impl Embedder for BertEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text).map_err(|e| Error::Embedding(e.to_string()))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
