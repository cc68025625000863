//! Indexing operations shared by the HTTP API and the tool server

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use ragdex_core::{
    ChunkDocument, Embedder, Error, IndexCreation, IndexSummary, IngestionReport, Result,
    SearchEngine, SearchHit, SearchMode, SearchQuery, chunk_text,
};

use crate::loader::{DocumentFormat, StagedUpload};

/// Chunk size used for raw text when the caller gives none
pub const DEFAULT_TEXT_CHUNK_SIZE: usize = 200;
/// Chunk size used for uploaded files when the caller gives none
pub const DEFAULT_FILE_CHUNK_SIZE: usize = 500;
/// Index that uploads land in when the caller gives none
pub const DEFAULT_FILE_INDEX: &str = "rag_docs";
pub const DEFAULT_TOP_K: usize = 3;
/// Maximum number of documents returned by [`IndexingService::index_content`]
pub const INDEX_CONTENT_LIMIT: usize = 100;

/// Stateless façade over a search engine and an embedding model.
///
/// Cloning is cheap; every clone shares the same engine and model.
#[derive(Clone)]
pub struct IndexingService {
    engine: Arc<dyn SearchEngine>,
    embedder: Arc<dyn Embedder>,
    mode: SearchMode,
    staging_dir: PathBuf,
}

impl IndexingService {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        embedder: Arc<dyn Embedder>,
        mode: SearchMode,
    ) -> Self {
        Self {
            engine,
            embedder,
            mode,
            staging_dir: std::env::temp_dir(),
        }
    }

    /// Stage uploads under `dir` instead of the system temp directory
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Create an index if needed and record its description.
    ///
    /// Creating an existing index is not an error. Without a description the
    /// stored one, if any, is reported back unchanged.
    pub async fn create_index(
        &self,
        index_name: &str,
        description: Option<&str>,
    ) -> Result<IndexCreation> {
        require_index_name(index_name)?;

        let created = self
            .engine
            .create_index(index_name, self.embedder.dimension())
            .await?;

        let description = match description {
            Some(description) => {
                self.engine.write_meta(index_name, description).await?;
                description.to_string()
            }
            None => self.engine.read_meta(index_name).await?.unwrap_or_default(),
        };

        info!(index = index_name, created, "index ready");

        Ok(IndexCreation {
            index: index_name.to_string(),
            created,
            description,
        })
    }

    /// Split text into chunks and index each one with its embedding.
    ///
    /// The index must already exist; the engine would otherwise create one
    /// without the vector mapping on the first write.
    pub async fn index_text(
        &self,
        index_name: &str,
        label: &str,
        content: &str,
        chunk_size: usize,
    ) -> Result<IngestionReport> {
        require_index_name(index_name)?;
        let chunks = chunk_text(content, chunk_size)?;
        self.require_index(index_name).await?;

        for (i, chunk) in chunks.iter().enumerate() {
            let embedding = self.encode(chunk).await?;
            let document = ChunkDocument {
                description: format!("{} - chunk {}", label, i + 1),
                content: chunk.clone(),
                embedding,
            };
            let id = self.engine.index_document(index_name, &document).await?;
            debug!(index = index_name, id = %id, chunk = i + 1, "chunk indexed");
        }

        info!(
            index = index_name,
            source = label,
            chunks = chunks.len(),
            "document indexed"
        );

        Ok(IngestionReport {
            index: index_name.to_string(),
            source: label.to_string(),
            chunks_indexed: chunks.len(),
        })
    }

    /// Extract text from an uploaded `.txt` or `.docx` file and index it.
    ///
    /// The upload lives in a uniquely named staging file that is removed
    /// before this returns, on success and on failure alike.
    pub async fn index_file(
        &self,
        index_name: &str,
        filename: &str,
        bytes: &[u8],
        chunk_size: usize,
    ) -> Result<IngestionReport> {
        require_index_name(index_name)?;
        let format = DocumentFormat::from_filename(filename)?;

        let staged = StagedUpload::write(&self.staging_dir, format, bytes)?;
        debug!(path = %staged.path().display(), "upload staged");

        let path = staged.path().to_path_buf();
        let text = tokio::task::spawn_blocking(move || format.extract(&path))
            .await
            .map_err(|e| Error::Other(format!("text extraction task failed: {}", e)))??;

        self.index_text(index_name, filename, &text, chunk_size).await
    }

    /// Rank the documents of an index against a natural-language query
    pub async fn search(
        &self,
        index_name: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        require_index_name(index_name)?;
        if top_k == 0 {
            return Err(Error::InvalidInput("top_k must be at least 1".to_string()));
        }
        let vector = self.encode(query).await?;

        let hits = self
            .engine
            .search(
                index_name,
                &SearchQuery {
                    text: query.to_string(),
                    vector,
                    top_k,
                    mode: self.mode,
                },
            )
            .await?;

        debug!(index = index_name, hits = hits.len(), "search complete");
        Ok(hits)
    }

    /// Every index with its description
    pub async fn list_indices(&self) -> Result<Vec<IndexSummary>> {
        self.engine.list_indices().await
    }

    /// Up to [`INDEX_CONTENT_LIMIT`] stored chunks, excluding the metadata document
    pub async fn index_content(&self, index_name: &str) -> Result<Vec<SearchHit>> {
        require_index_name(index_name)?;
        self.engine.match_all(index_name, INDEX_CONTENT_LIMIT).await
    }

    pub async fn delete_index(&self, index_name: &str) -> Result<()> {
        require_index_name(index_name)?;
        self.engine.delete_index(index_name).await?;
        info!(index = index_name, "index deleted");
        Ok(())
    }

    async fn require_index(&self, index_name: &str) -> Result<()> {
        if self.engine.index_exists(index_name).await? {
            Ok(())
        } else {
            Err(Error::NotFound(format!("Index '{}' not found", index_name)))
        }
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let embedder = Arc::clone(&self.embedder);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || embedder.encode(&text))
            .await
            .map_err(|e| Error::Embedding(format!("embedding task failed: {}", e)))?
    }
}

fn require_index_name(index_name: &str) -> Result<()> {
    if index_name.trim().is_empty() {
        return Err(Error::InvalidInput("index_name must not be empty".to_string()));
    }
    Ok(())
}
