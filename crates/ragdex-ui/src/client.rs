//! HTTP client for the indexing API

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use std::time::Duration;

use ragdex_core::{Error, IndexSummary, Result, SearchHit};

use crate::config::UiConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateIndexResponse {
    pub message: String,
    pub index_description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListIndicesResponse {
    indices: Vec<IndexSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexContentResponse {
    pub index: String,
    pub documents: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Typed client for every indexing endpoint
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &UiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create_index(
        &self,
        index_name: &str,
        description: &str,
    ) -> Result<CreateIndexResponse> {
        let request = self
            .client
            .post(self.url("/create_index/"))
            .json(&json!({ "index_name": index_name, "description": description }));
        send(request).await
    }

    pub async fn index_text(
        &self,
        index_name: &str,
        description: &str,
        content: &str,
        chunk_size: usize,
    ) -> Result<MessageResponse> {
        let request = self
            .client
            .post(self.url("/index_document_chunked/"))
            .json(&json!({
                "index_name": index_name,
                "description": description,
                "content": content,
                "chunk_size": chunk_size
            }));
        send(request).await
    }

    /// Upload a local `.txt` or `.docx` file
    pub async fn index_file(
        &self,
        index_name: &str,
        path: &Path,
        chunk_size: usize,
    ) -> Result<MessageResponse> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("no file name in {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename));
        let request = self
            .client
            .post(self.url("/index_file/"))
            .query(&[
                ("index_name", index_name.to_string()),
                ("chunk_size", chunk_size.to_string()),
            ])
            .multipart(form);
        send(request).await
    }

    pub async fn search(&self, index_name: &str, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let request = self.client.get(self.url("/search/")).query(&[
            ("index_name", index_name.to_string()),
            ("query", query.to_string()),
            ("top_k", top_k.to_string()),
        ]);
        let response: SearchResponse = send(request).await?;
        Ok(response.results)
    }

    pub async fn list_indices(&self) -> Result<Vec<IndexSummary>> {
        let response: ListIndicesResponse = send(self.client.get(self.url("/list_indices/"))).await?;
        Ok(response.indices)
    }

    pub async fn index_content(&self, index_name: &str) -> Result<IndexContentResponse> {
        let request = self
            .client
            .get(self.url("/index_content/"))
            .query(&[("index_name", index_name)]);
        send(request).await
    }

    pub async fn delete_index(&self, index_name: &str) -> Result<MessageResponse> {
        let request = self
            .client
            .delete(self.url("/delete_index/"))
            .query(&[("index_name", index_name)]);
        send(request).await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::Network(format!("Indexing API request failed: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("invalid API response: {}", e)));
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|error| error.detail)
        .unwrap_or(body);

    Err(match status {
        StatusCode::NOT_FOUND => Error::NotFound(detail),
        s if s.is_client_error() => Error::InvalidInput(detail),
        s => Error::Other(format!("API returned {}: {}", s, detail)),
    })
}
