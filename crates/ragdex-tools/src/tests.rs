//! Tool server tests over streamable HTTP

#[cfg(test)]
mod session_tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use insta::assert_yaml_snapshot;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    use ragdex_embed::HashEmbedder;
    use ragdex_indexing::IndexingService;
    use ragdex_search::{InMemorySearchEngine, SearchMode};

    use crate::{ToolClient, ToolClientConfig, ToolGateway, result_value, router};

    async fn seeded_service() -> IndexingService {
        let service = IndexingService::new(
            Arc::new(InMemorySearchEngine::new()),
            Arc::new(HashEmbedder::new(64)),
            SearchMode::default(),
        );
        service
            .create_index("handbook", Some("employee handbook"))
            .await
            .unwrap();
        service
            .index_text(
                "handbook",
                "leave policy",
                "vacation requests need two weeks notice",
                200,
            )
            .await
            .unwrap();
        service
    }

    async fn spawn_tools() -> ToolClient {
        let app = router(seeded_service().await);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        ToolClient::new(&ToolClientConfig {
            server_url: format!("http://{}", addr),
            timeout_secs: 10,
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(seeded_service().await);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_catalog_over_http() {
        let client = spawn_tools().await;
        client.connect().await.unwrap();

        let tools = client.list_tools().await.unwrap();
        let mut names: Vec<String> = tools.iter().map(|tool| tool.name.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["list_indices", "search"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_list_indices_over_http() {
        let client = spawn_tools().await;

        let result = client.call_tool("list_indices", json!({})).await.unwrap();
        assert_ne!(result.is_error, Some(true));
        assert_yaml_snapshot!(result_value(&result), @r###"
        ---
        indices:
          - description: employee handbook
            index: handbook
        "###);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_search_over_http_defaults_top_k() {
        let client = spawn_tools().await;

        let result = client
            .call_tool(
                "search",
                json!({"index_name": "handbook", "query": "vacation notice"}),
            )
            .await
            .unwrap();

        let value = result_value(&result);
        let results = value["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["description"], "leave policy - chunk 1");
        assert!(results[0]["score"].is_number());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_search_on_missing_index_is_tool_error() {
        let client = spawn_tools().await;

        let result = client
            .call_tool("search", json!({"index_name": "ghost", "query": "x"}))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(result_value(&result).as_str().unwrap().contains("ghost"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unknown_tool_and_bad_arguments_are_protocol_errors() {
        let client = spawn_tools().await;

        assert!(client.call_tool("drop_everything", json!({})).await.is_err());
        assert!(
            client
                .call_tool("search", json!({"query": "no index"}))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let client = ToolClient::new(&ToolClientConfig {
            server_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
        });
        assert!(client.list_tools().await.is_err());
    }
}
