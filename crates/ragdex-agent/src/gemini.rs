//! Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use ragdex_core::{
    Error, FunctionCall, FunctionDeclaration, FunctionResponse, GenerationRequest, LLMProvider,
    Message, Part, Result, Role, ToolSpec,
};

use crate::config::AgentConfig;

/// Schema keywords the function-calling API accepts
const SCHEMA_KEYWORDS: &[&str] = &[
    "type",
    "description",
    "properties",
    "required",
    "items",
    "enum",
    "nullable",
];

/// Gemini API client
pub struct GeminiClient {
    config: AgentConfig,
    client: Client,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireFunctionDeclaration {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum WireTool {
    FunctionDeclarations(Vec<WireFunctionDeclaration>),
    GoogleSearch(Map<String, Value>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
}

impl GeminiClient {
    /// Create a new Gemini client from configuration
    pub fn new(config: AgentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl LLMProvider for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Message> {
        let body = build_request(request);
        debug!(model = %self.config.model, turns = body.contents.len(), "gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::LLMProvider(format!(
                "Gemini API request failed with status {}: {}",
                status, error_text
            )));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMProvider(format!("invalid Gemini response: {}", e)))?;

        parse_response(wire)
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

fn build_request(request: &GenerationRequest) -> WireRequest {
    let system_instruction = if request.system_instruction.is_empty() {
        None
    } else {
        Some(WireContent {
            role: None,
            parts: vec![WirePart {
                text: Some(request.system_instruction.clone()),
                ..Default::default()
            }],
        })
    };

    let contents = request.messages.iter().map(to_wire_content).collect();

    let tools = request
        .tools
        .iter()
        .map(|tool| match tool {
            ToolSpec::Functions(declarations) => {
                WireTool::FunctionDeclarations(declarations.iter().map(to_wire_declaration).collect())
            }
            ToolSpec::WebSearch => WireTool::GoogleSearch(Map::new()),
        })
        .collect();

    WireRequest {
        system_instruction,
        contents,
        tools,
    }
}

fn to_wire_content(message: &Message) -> WireContent {
    let role = match message.role {
        Role::User => "user",
        Role::Model => "model",
    };

    let parts = message
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => WirePart {
                text: Some(text.clone()),
                ..Default::default()
            },
            Part::FunctionCall(call) => WirePart {
                function_call: Some(call.clone()),
                ..Default::default()
            },
            Part::FunctionResponse(response) => WirePart {
                function_response: Some(response.clone()),
                ..Default::default()
            },
        })
        .collect();

    WireContent {
        role: Some(role.to_string()),
        parts,
    }
}

fn to_wire_declaration(declaration: &FunctionDeclaration) -> WireFunctionDeclaration {
    let parameters = match &declaration.parameters {
        Value::Null => None,
        schema => Some(sanitize_schema(schema)),
    };

    WireFunctionDeclaration {
        name: declaration.name.clone(),
        description: declaration.description.clone(),
        parameters,
    }
}

/// Reduce a JSON schema to the subset accepted for function parameters
pub fn sanitize_schema(schema: &Value) -> Value {
    let Value::Object(object) = schema else {
        return schema.clone();
    };

    let mut cleaned = Map::new();
    for (key, value) in object {
        if !SCHEMA_KEYWORDS.contains(&key.as_str()) {
            continue;
        }
        let value = match (key.as_str(), value) {
            ("properties", Value::Object(properties)) => Value::Object(
                properties
                    .iter()
                    .map(|(name, property)| (name.clone(), sanitize_schema(property)))
                    .collect(),
            ),
            ("items", items) => sanitize_schema(items),
            // e.g. ["string", "null"] for optional fields
            ("type", Value::Array(types)) => types
                .iter()
                .find(|t| t.as_str() != Some("null"))
                .cloned()
                .unwrap_or(Value::Null),
            _ => value.clone(),
        };
        cleaned.insert(key.clone(), value);
    }
    Value::Object(cleaned)
}

fn parse_response(wire: WireResponse) -> Result<Message> {
    let candidate = wire.candidates.into_iter().next().ok_or_else(|| {
        Error::LLMProvider(format!(
            "Gemini returned no candidates: {}",
            wire.prompt_feedback.unwrap_or(Value::Null)
        ))
    })?;

    let content = candidate.content.ok_or_else(|| {
        Error::LLMProvider(format!(
            "Gemini candidate has no content (finish reason {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })?;

    let parts = content
        .parts
        .into_iter()
        .filter_map(|part| {
            if let Some(call) = part.function_call {
                Some(Part::FunctionCall(call))
            } else if let Some(response) = part.function_response {
                Some(Part::FunctionResponse(response))
            } else {
                part.text.map(Part::Text)
            }
        })
        .collect();

    Ok(Message {
        role: Role::Model,
        parts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_schema_drops_unsupported_keywords() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "SearchArgs",
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {"type": "string", "description": "Search text"},
                "top_k": {"type": "integer", "format": "uint", "minimum": 0.0, "default": 3},
                "note": {"type": ["string", "null"]}
            }
        });

        assert_eq!(
            sanitize_schema(&schema),
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {"type": "string", "description": "Search text"},
                    "top_k": {"type": "integer"},
                    "note": {"type": "string"}
                }
            })
        );
    }

    #[test]
    fn test_parse_function_call_response() {
        let wire: WireResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Checking."},
                        {"functionCall": {"name": "get_tools", "args": {}}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let message = parse_response(wire).unwrap();
        assert_eq!(message.text(), "Checking.");
        assert_eq!(message.function_calls()[0].name, "get_tools");
    }

    #[test]
    fn test_blocked_response_is_error() {
        let wire: WireResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        let err = parse_response(wire).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_web_search_tool_serialization() {
        let request = GenerationRequest {
            system_instruction: String::new(),
            messages: vec![Message::user("rust 2024 edition")],
            tools: vec![ToolSpec::WebSearch],
        };

        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "rust 2024 edition"}]}],
                "tools": [{"googleSearch": {}}]
            })
        );
    }
}
