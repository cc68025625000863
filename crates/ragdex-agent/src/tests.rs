//! Agent runtime tests with a scripted model

#[cfg(test)]
mod runner_tests {
    use async_trait::async_trait;
    use insta::assert_yaml_snapshot;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use ragdex_core::{
        FunctionCall, GenerationRequest, LLMProvider, Message, Part, Result, Role, ToolSpec,
    };
    use ragdex_tools::{CallToolResult, Content, Tool, ToolGateway};

    use crate::roles::{
        CALL_TOOLS, GET_TOOLS, TOOL_DISCOVERY, TOOL_INVOCATION, get_tool_agent,
        google_search_agent, orchestrator_agent,
    };
    use crate::{AgentConfig, AgentRunner, Error, GeminiClient};

    /// Model that replays canned turns and records every request
    struct ScriptedLlm {
        replies: Mutex<VecDeque<Message>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<Message>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedLlm {
        async fn generate(&self, request: &GenerationRequest) -> Result<Message> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::LLMProvider("script exhausted".to_string()))
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    /// Tool server stand-in recording the calls it receives
    #[derive(Default)]
    struct MockGateway {
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl ToolGateway for MockGateway {
        async fn list_tools(&self) -> Result<Vec<Tool>> {
            let schema = json!({"type": "object"}).as_object().cloned().unwrap();
            Ok(vec![Tool::new("search", "Search an index", Arc::new(schema))])
        }

        async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), arguments.clone()));
            match name {
                "search" => Ok(CallToolResult::success(vec![
                    Content::json(json!({
                        "results": [{
                            "description": "leave policy - chunk 1",
                            "content": "vacation requests need two weeks notice",
                            "score": 0.92
                        }]
                    }))
                    .unwrap(),
                ])),
                other => Err(Error::ToolInvocation(format!("unknown tool '{}'", other))),
            }
        }
    }

    fn call(name: &str, args: Value) -> Message {
        Message {
            role: Role::Model,
            parts: vec![Part::FunctionCall(FunctionCall {
                name: name.to_string(),
                args,
            })],
        }
    }

    fn last_function_response(request: &GenerationRequest) -> Value {
        request
            .messages
            .last()
            .and_then(|message| {
                message.parts.iter().find_map(|part| match part {
                    Part::FunctionResponse(response) => Some(response.response.clone()),
                    _ => None,
                })
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_orchestrator_discovers_then_searches() {
        let llm = ScriptedLlm::new(vec![
            call(TOOL_DISCOVERY, json!({"request": "which tools exist?"})),
            call(GET_TOOLS, json!({})),
            Message::model("There is a search tool."),
            call(
                TOOL_INVOCATION,
                json!({"request": "search handbook for vacation notice"}),
            ),
            call(
                CALL_TOOLS,
                json!({
                    "tool_name": "search",
                    "args": "{\"index_name\": \"handbook\", \"query\": \"vacation notice\"}"
                }),
            ),
            Message::model("Vacation requests need two weeks notice."),
            Message::model("You need to request vacation two weeks in advance."),
        ]);
        let gateway = Arc::new(MockGateway::default());
        let runner = AgentRunner::new(llm.clone(), gateway.clone(), 8);

        let answer = runner
            .run(&orchestrator_agent(), "How early must I request vacation?")
            .await
            .unwrap();
        assert_eq!(answer, "You need to request vacation two weeks in advance.");

        let calls = gateway.calls.lock().unwrap().clone();
        assert_yaml_snapshot!(calls, @r###"
        ---
        - - search
          - index_name: handbook
            query: vacation notice
        "###);

        let requests = llm.requests();
        assert_eq!(requests.len(), 7);
        assert_eq!(requests[1].system_instruction, get_tool_agent().instruction);
        assert_eq!(requests[1].messages, vec![Message::user("which tools exist?")]);
        assert_eq!(
            last_function_response(&requests[2])["tools"][0]["name"],
            "search"
        );
        assert_eq!(
            last_function_response(&requests[3]),
            json!({"response": "There is a search tool."})
        );
        assert_eq!(
            last_function_response(&requests[5])["result"]["results"][0]["score"],
            json!(0.92)
        );
    }

    #[tokio::test]
    async fn test_tool_failure_is_reported_to_model() {
        let llm = ScriptedLlm::new(vec![
            call(CALL_TOOLS, json!({"tool_name": "drop_index", "args": {}})),
            Message::model("That tool does not exist."),
        ]);
        let runner = AgentRunner::new(llm.clone(), Arc::new(MockGateway::default()), 4);

        let answer = runner
            .run(&crate::roles::mcp_client_agent(), "drop everything")
            .await
            .unwrap();
        assert_eq!(answer, "That tool does not exist.");

        let response = last_function_response(&llm.requests()[1]);
        assert!(response["error"].as_str().unwrap().contains("drop_index"));
    }

    #[tokio::test]
    async fn test_role_cannot_use_foreign_functions() {
        let llm = ScriptedLlm::new(vec![
            call(CALL_TOOLS, json!({"tool_name": "search", "args": {}})),
            Message::model("ok"),
        ]);
        let gateway = Arc::new(MockGateway::default());
        let runner = AgentRunner::new(llm.clone(), gateway.clone(), 4);

        runner.run(&get_tool_agent(), "search please").await.unwrap();

        assert!(gateway.calls.lock().unwrap().is_empty());
        let response = last_function_response(&llm.requests()[1]);
        assert!(response["error"].as_str().unwrap().contains("not available"));
    }

    #[tokio::test]
    async fn test_turn_limit() {
        let llm = ScriptedLlm::new(vec![
            call(GET_TOOLS, json!({})),
            call(GET_TOOLS, json!({})),
            call(GET_TOOLS, json!({})),
        ]);
        let runner = AgentRunner::new(llm, Arc::new(MockGateway::default()), 2);

        let err = runner.run(&get_tool_agent(), "loop").await.unwrap_err();
        assert!(err.to_string().contains("within 2 turns"));
    }

    #[tokio::test]
    async fn test_web_search_role_requests_builtin_search() {
        let llm = ScriptedLlm::new(vec![Message::model("Rust 1.85 shipped edition 2024.")]);
        let runner = AgentRunner::new(llm.clone(), Arc::new(MockGateway::default()), 2);

        runner
            .run(&google_search_agent(), "rust 2024 edition release")
            .await
            .unwrap();

        assert_eq!(llm.requests()[0].tools, vec![ToolSpec::WebSearch]);
    }

    #[tokio::test]
    async fn test_converse_keeps_history() {
        let llm = ScriptedLlm::new(vec![Message::model("first"), Message::model("second")]);
        let runner = AgentRunner::new(llm.clone(), Arc::new(MockGateway::default()), 2);
        let role = google_search_agent();
        let mut history = Vec::new();

        runner
            .converse(&role, &mut history, "one".to_string())
            .await
            .unwrap();
        runner
            .converse(&role, &mut history, "two".to_string())
            .await
            .unwrap();

        assert_eq!(history.len(), 4);
        assert_eq!(llm.requests()[1].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_gemini_client_against_stub_server() {
        use axum::{Json, Router, routing::post};

        let app = Router::new().route(
            "/v1beta/models/{model}",
            post(|Json(body): Json<Value>| async move {
                let prompt = body["contents"][0]["parts"][0]["text"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": format!("echo: {}", prompt)}]},
                        "finishReason": "STOP"
                    }]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut config = AgentConfig::new("test-key");
        config.api_url = format!("http://{}", addr);
        let client = GeminiClient::new(config).unwrap();

        let reply = client
            .generate(&GenerationRequest {
                system_instruction: "be brief".to_string(),
                messages: vec![Message::user("hello")],
                tools: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(reply.text(), "echo: hello");
        assert_eq!(client.model_id(), "gemini-2.0-flash");
    }

    #[test]
    fn test_config_snapshot() {
        let config = AgentConfig::new("secret").with_model("gemini-2.5-flash");

        assert_yaml_snapshot!(config, @r###"
        ---
        model: gemini-2.5-flash
        api_url: "https://generativelanguage.googleapis.com"
        max_turns: 8
        timeout_secs: 120
        "###);
    }
}
