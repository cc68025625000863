//! Elasticsearch REST client

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use ragdex_core::{
    ChunkDocument, Error, META_DOCUMENT_ID, Result, SearchEngine, SearchHit, SearchQuery,
};

use crate::config::SearchConfig;
use crate::query;

/// Elasticsearch client speaking the REST query-document protocol
pub struct ElasticsearchClient {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<MetaSource>,
}

#[derive(Deserialize)]
struct MetaSource {
    description: Option<String>,
}

#[derive(Deserialize)]
struct IndexResponse {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Deserialize)]
struct CatIndex {
    index: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source")]
    source: Option<HitSource>,
}

#[derive(Deserialize)]
struct HitSource {
    description: Option<String>,
    content: Option<String>,
}

impl From<Hit> for SearchHit {
    fn from(hit: Hit) -> Self {
        let source = hit.source.unwrap_or(HitSource {
            description: None,
            content: None,
        });
        SearchHit {
            description: source.description.unwrap_or_default(),
            content: source.content.unwrap_or_default(),
            score: hit.score.unwrap_or(0.0),
        }
    }
}

impl ElasticsearchClient {
    /// Create a new client from configuration
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let base_url = Url::parse(&config.endpoint).map_err(|e| {
            Error::Configuration(format!(
                "invalid Elasticsearch endpoint '{}': {}",
                config.endpoint, e
            ))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "Elasticsearch endpoint '{}' cannot be used as a base URL",
                config.endpoint
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Build `<endpoint>/<segment>/<segment>...` with each segment percent-encoded
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Turn a non-success response into an error carrying the engine's message
    async fn check(response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(Error::SearchEngine(format!(
            "{} failed with status {}: {}",
            context, status, body
        )))
    }
}

fn network(err: reqwest::Error) -> Error {
    Error::Network(err.to_string())
}

fn decode(err: reqwest::Error) -> Error {
    Error::Serialization(err.to_string())
}

#[async_trait]
impl SearchEngine for ElasticsearchClient {
    async fn create_index(&self, name: &str, vector_dim: usize) -> Result<bool> {
        if self.index_exists(name).await? {
            debug!(index = name, "index already exists");
            return Ok(false);
        }

        let response = self
            .client
            .put(self.url(&[name]))
            .json(&query::index_body(vector_dim))
            .send()
            .await
            .map_err(network)?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            // lost a creation race with another request
            if body.contains("resource_already_exists_exception") {
                return Ok(false);
            }
            return Err(Error::SearchEngine(format!(
                "create index '{}' failed with status 400: {}",
                name, body
            )));
        }

        Self::check(response, &format!("create index '{}'", name)).await?;
        info!(index = name, dims = vector_dim, "created index");
        Ok(true)
    }

    async fn index_exists(&self, name: &str) -> Result<bool> {
        let response = self
            .client
            .head(self.url(&[name]))
            .send()
            .await
            .map_err(network)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response, &format!("check index '{}'", name)).await?;
        Ok(true)
    }

    async fn write_meta(&self, name: &str, description: &str) -> Result<()> {
        let url = self.url(&[name, "_doc", META_DOCUMENT_ID]);
        let response = self
            .client
            .put(url)
            .query(&[("refresh", "true")])
            .json(&serde_json::json!({ "description": description }))
            .send()
            .await
            .map_err(network)?;

        Self::check(response, &format!("write metadata for '{}'", name)).await?;
        Ok(())
    }

    async fn read_meta(&self, name: &str) -> Result<Option<String>> {
        let url = self.url(&[name, "_doc", META_DOCUMENT_ID]);
        let response = self.client.get(url).send().await.map_err(network)?;

        // covers both a missing document and a missing index
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(response, &format!("read metadata for '{}'", name)).await?;
        let doc: GetResponse = response.json().await.map_err(decode)?;

        if !doc.found {
            return Ok(None);
        }
        Ok(doc.source.map(|s| s.description.unwrap_or_default()))
    }

    async fn index_document(&self, name: &str, document: &ChunkDocument) -> Result<String> {
        let url = self.url(&[name, "_doc"]);
        let response = self
            .client
            .post(url)
            .query(&[("refresh", "wait_for")])
            .json(document)
            .send()
            .await
            .map_err(network)?;

        let response = Self::check(response, &format!("index document into '{}'", name)).await?;
        let indexed: IndexResponse = response.json().await.map_err(decode)?;
        Ok(indexed.id)
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&[name]))
            .send()
            .await
            .map_err(network)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("Index '{}' not found", name)));
        }

        Self::check(response, &format!("delete index '{}'", name)).await?;
        info!(index = name, "deleted index");
        Ok(())
    }

    async fn index_names(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url(&["_cat", "indices"]))
            .query(&[("format", "json"), ("h", "index"), ("expand_wildcards", "open")])
            .send()
            .await
            .map_err(network)?;

        let response = Self::check(response, "list indices").await?;
        let indices: Vec<CatIndex> = response.json().await.map_err(decode)?;

        let mut names: Vec<String> = indices.into_iter().map(|i| i.index).collect();
        names.sort();
        Ok(names)
    }

    async fn search(&self, name: &str, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let body = query::search_body(query);
        debug!(index = name, mode = ?query.mode, top_k = query.top_k, "search");

        let response = self
            .client
            .post(self.url(&[name, "_search"]))
            .json(&body)
            .send()
            .await
            .map_err(network)?;

        let response = Self::check(response, &format!("search '{}'", name)).await?;
        let result: SearchResponse = response.json().await.map_err(decode)?;
        Ok(result.hits.hits.into_iter().map(SearchHit::from).collect())
    }

    async fn match_all(&self, name: &str, size: usize) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .post(self.url(&[name, "_search"]))
            .json(&query::match_all_body(size))
            .send()
            .await
            .map_err(network)?;

        let response = Self::check(response, &format!("read contents of '{}'", name)).await?;
        let result: SearchResponse = response.json().await.map_err(decode)?;
        Ok(result.hits.hits.into_iter().map(SearchHit::from).collect())
    }
}
