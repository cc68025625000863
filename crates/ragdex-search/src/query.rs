//! Elasticsearch request bodies

use serde_json::{Value, json};

use ragdex_core::{META_DOCUMENT_ID, SearchMode, SearchQuery};

/// Script used by hybrid mode to add vector similarity to the lexical score
pub const HYBRID_SCRIPT: &str = "_score + cosineSimilarity(params.query_vector, 'embedding') + 1.0";

/// Index settings and mappings for a chunk index
pub fn index_body(vector_dim: usize) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0
        },
        "mappings": {
            "properties": {
                "description": { "type": "text" },
                "content": { "type": "text" },
                "embedding": {
                    "type": "dense_vector",
                    "dims": vector_dim,
                    "index": true,
                    "similarity": "cosine"
                }
            }
        }
    })
}

/// Query body for the configured mode
pub fn search_body(query: &SearchQuery) -> Value {
    match query.mode {
        SearchMode::Knn { num_candidates } => knn_body(query, num_candidates),
        SearchMode::Hybrid => hybrid_body(query),
    }
}

fn knn_body(query: &SearchQuery, num_candidates: usize) -> Value {
    json!({
        "size": query.top_k,
        "knn": {
            "field": "embedding",
            "query_vector": query.vector,
            "k": query.top_k,
            // must never be below k
            "num_candidates": num_candidates.max(query.top_k)
        },
        "_source": ["description", "content"]
    })
}

fn hybrid_body(query: &SearchQuery) -> Value {
    json!({
        "size": query.top_k,
        "query": {
            "script_score": {
                "query": {
                    "bool": {
                        "must": {
                            "multi_match": {
                                "query": query.text,
                                "fields": ["description", "content"]
                            }
                        },
                        "must_not": without_meta()
                    }
                },
                "script": {
                    "source": HYBRID_SCRIPT,
                    "params": { "query_vector": query.vector }
                }
            }
        },
        "_source": ["description", "content"]
    })
}

/// Body listing stored chunks, metadata document excluded
pub fn match_all_body(size: usize) -> Value {
    json!({
        "size": size,
        "query": {
            "bool": {
                "must": { "match_all": {} },
                "must_not": without_meta()
            }
        }
    })
}

fn without_meta() -> Value {
    json!({ "ids": { "values": [META_DOCUMENT_ID] } })
}
