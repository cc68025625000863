//! In-memory search engine

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;
use uuid::Uuid;

use ragdex_core::{
    ChunkDocument, Error, Result, SearchEngine, SearchHit, SearchMode, SearchQuery,
};

struct MemoryIndex {
    dimension: usize,
    description: Option<String>,
    documents: Vec<(String, ChunkDocument)>,
}

/// Search engine held entirely in process memory.
///
/// Mirrors the Elasticsearch contract closely enough to stand in for it:
/// k-NN scores are `(1 + cosine) / 2`, hybrid scores are a term-overlap score
/// plus `cosine + 1.0` over documents matching at least one query term, and
/// vectors whose width differs from the index are rejected.
pub struct InMemorySearchEngine {
    indices: RwLock<BTreeMap<String, MemoryIndex>>,
}

impl InMemorySearchEngine {
    /// Create a new empty engine
    pub fn new() -> Self {
        Self {
            indices: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of chunk documents stored in an index
    pub fn document_count(&self, name: &str) -> Result<usize> {
        let indices = self.read()?;
        indices
            .get(name)
            .map(|index| index.documents.len())
            .ok_or_else(|| missing(name))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, MemoryIndex>>> {
        self.indices
            .read()
            .map_err(|e| Error::SearchEngine(format!("Lock error: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, MemoryIndex>>> {
        self.indices
            .write()
            .map_err(|e| Error::SearchEngine(format!("Lock error: {}", e)))
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }

    /// Fraction of query terms present in the document
    fn text_similarity(query: &str, document: &ChunkDocument) -> f32 {
        let haystack = format!("{} {}", document.description, document.content).to_lowercase();
        let query_lower = query.to_lowercase();
        let terms: Vec<&str> = query_lower.split_whitespace().collect();

        if terms.is_empty() {
            return 0.0;
        }

        let matches = terms.iter().filter(|term| haystack.contains(*term)).count();
        matches as f32 / terms.len() as f32
    }
}

impl Default for InMemorySearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(name: &str) -> Error {
    Error::NotFound(format!("Index '{}' not found", name))
}

#[async_trait]
impl SearchEngine for InMemorySearchEngine {
    async fn create_index(&self, name: &str, vector_dim: usize) -> Result<bool> {
        let mut indices = self.write()?;
        if indices.contains_key(name) {
            return Ok(false);
        }

        indices.insert(
            name.to_string(),
            MemoryIndex {
                dimension: vector_dim,
                description: None,
                documents: Vec::new(),
            },
        );
        Ok(true)
    }

    async fn index_exists(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(name))
    }

    async fn write_meta(&self, name: &str, description: &str) -> Result<()> {
        let mut indices = self.write()?;
        let index = indices.get_mut(name).ok_or_else(|| missing(name))?;
        index.description = Some(description.to_string());
        Ok(())
    }

    async fn read_meta(&self, name: &str) -> Result<Option<String>> {
        let indices = self.read()?;
        Ok(indices.get(name).and_then(|index| index.description.clone()))
    }

    async fn index_document(&self, name: &str, document: &ChunkDocument) -> Result<String> {
        let mut indices = self.write()?;
        let index = indices.get_mut(name).ok_or_else(|| missing(name))?;

        if document.embedding.len() != index.dimension {
            return Err(Error::SearchEngine(format!(
                "embedding has {} dimensions but index '{}' expects {}",
                document.embedding.len(),
                name,
                index.dimension
            )));
        }

        let id = Uuid::new_v4().to_string();
        index.documents.push((id.clone(), document.clone()));
        Ok(id)
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        let mut indices = self.write()?;
        indices.remove(name).map(|_| ()).ok_or_else(|| missing(name))
    }

    async fn index_names(&self) -> Result<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    async fn search(&self, name: &str, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let indices = self.read()?;
        let index = indices.get(name).ok_or_else(|| missing(name))?;

        if query.vector.len() != index.dimension {
            return Err(Error::SearchEngine(format!(
                "query vector has {} dimensions but index '{}' expects {}",
                query.vector.len(),
                name,
                index.dimension
            )));
        }

        let mut hits: Vec<SearchHit> = index
            .documents
            .iter()
            .filter_map(|(_, doc)| {
                let cosine = Self::cosine_similarity(&query.vector, &doc.embedding);
                let score = match query.mode {
                    SearchMode::Knn { .. } => (1.0 + cosine) / 2.0,
                    SearchMode::Hybrid => {
                        let text = Self::text_similarity(&query.text, doc);
                        if text == 0.0 {
                            return None;
                        }
                        text + cosine + 1.0
                    }
                };
                Some(SearchHit {
                    description: doc.description.clone(),
                    content: doc.content.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(query.top_k);
        Ok(hits)
    }

    async fn match_all(&self, name: &str, size: usize) -> Result<Vec<SearchHit>> {
        let indices = self.read()?;
        let index = indices.get(name).ok_or_else(|| missing(name))?;

        Ok(index
            .documents
            .iter()
            .take(size)
            .map(|(_, doc)| SearchHit {
                description: doc.description.clone(),
                content: doc.content.clone(),
                score: 1.0,
            })
            .collect())
    }
}
