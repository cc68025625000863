//! Turn loop that executes an agent role against an LLM provider

use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

use ragdex_core::{
    Error, FunctionCall, FunctionResponse, GenerationRequest, LLMProvider, Message, Part, Result,
    Role, ToolSpec,
};
use ragdex_tools::{ToolGateway, result_value};

use crate::roles::{AgentRole, CALL_TOOLS, GET_TOOLS, RoleTool};

#[derive(Debug, Deserialize)]
struct CallToolsArgs {
    tool_name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize)]
struct DelegateArgs {
    request: String,
}

/// Runs roles: sends the conversation to the model, executes the functions
/// it asks for, and repeats until the model answers in plain text.
pub struct AgentRunner {
    llm: Arc<dyn LLMProvider>,
    tools: Arc<dyn ToolGateway>,
    max_turns: usize,
}

impl AgentRunner {
    pub fn new(llm: Arc<dyn LLMProvider>, tools: Arc<dyn ToolGateway>, max_turns: usize) -> Self {
        Self {
            llm,
            tools,
            max_turns,
        }
    }

    /// Answer a single prompt with a fresh conversation
    pub async fn run(&self, role: &AgentRole, prompt: &str) -> Result<String> {
        let mut history = Vec::new();
        self.converse(role, &mut history, prompt.to_string()).await
    }

    /// Answer a prompt as the next user turn of `history`.
    ///
    /// Sub-agents always start from a fresh conversation holding only the
    /// delegated request.
    pub fn converse<'a>(
        &'a self,
        role: &'a AgentRole,
        history: &'a mut Vec<Message>,
        prompt: String,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            history.push(Message::user(prompt));
            let request_tools = tool_specs(role);

            for turn in 1..=self.max_turns {
                let request = GenerationRequest {
                    system_instruction: role.instruction.to_string(),
                    messages: history.clone(),
                    tools: request_tools.clone(),
                };

                let reply = self.llm.generate(&request).await?;
                let calls: Vec<FunctionCall> =
                    reply.function_calls().into_iter().cloned().collect();
                history.push(reply);

                if calls.is_empty() {
                    let answer = history.last().map(Message::text).unwrap_or_default();
                    info!(agent = role.name, turns = turn, "agent answered");
                    return Ok(answer);
                }

                let mut responses = Vec::with_capacity(calls.len());
                for call in calls {
                    debug!(agent = role.name, function = %call.name, "function call");
                    let response = self.dispatch(role, &call).await;
                    responses.push(Part::FunctionResponse(FunctionResponse {
                        name: call.name,
                        response,
                    }));
                }
                history.push(Message {
                    role: Role::User,
                    parts: responses,
                });
            }

            Err(Error::LLMProvider(format!(
                "agent '{}' gave no answer within {} turns",
                role.name, self.max_turns
            )))
        })
    }

    /// Execute one function call; failures are reported back to the model
    async fn dispatch(&self, role: &AgentRole, call: &FunctionCall) -> Value {
        match self.try_dispatch(role, call).await {
            Ok(value) => value,
            Err(e) => {
                warn!(agent = role.name, function = %call.name, error = %e, "function call failed");
                json!({ "error": e.to_string() })
            }
        }
    }

    async fn try_dispatch(&self, role: &AgentRole, call: &FunctionCall) -> Result<Value> {
        match call.name.as_str() {
            GET_TOOLS if role.has_tool(RoleTool::GetTools) => {
                let tools = self.tools.list_tools().await?;
                Ok(json!({ "tools": tools }))
            }
            CALL_TOOLS if role.has_tool(RoleTool::CallTools) => {
                let args: CallToolsArgs = serde_json::from_value(call.args.clone())
                    .map_err(|e| Error::InvalidInput(format!("invalid call_tools arguments: {}", e)))?;
                let arguments = tool_arguments(args.args)?;

                let result = self.tools.call_tool(&args.tool_name, arguments).await?;
                Ok(json!({
                    "is_error": result.is_error.unwrap_or(false),
                    "result": result_value(&result)
                }))
            }
            name => {
                let agent = role.sub_agent(name).ok_or_else(|| {
                    Error::ToolInvocation(format!(
                        "'{}' is not available to agent '{}'",
                        name, role.name
                    ))
                })?;
                let args: DelegateArgs = serde_json::from_value(call.args.clone()).map_err(|e| {
                    Error::InvalidInput(format!("invalid request for '{}': {}", name, e))
                })?;

                info!(from = role.name, to = agent.name, "delegating");
                let mut history = Vec::new();
                let answer = self.converse(agent, &mut history, args.request).await?;
                Ok(json!({ "response": answer }))
            }
        }
    }
}

/// Argument mapping for a tool call, given either as an object or as JSON text
fn tool_arguments(args: Value) -> Result<Value> {
    match args {
        Value::Null => Ok(json!({})),
        Value::Object(_) => Ok(args),
        Value::String(text) if text.trim().is_empty() => Ok(json!({})),
        Value::String(text) => {
            let parsed: Value = serde_json::from_str(&text)
                .map_err(|e| Error::InvalidInput(format!("args is not valid JSON: {}", e)))?;
            if parsed.is_object() {
                Ok(parsed)
            } else {
                Err(Error::InvalidInput("args must be a JSON object".to_string()))
            }
        }
        _ => Err(Error::InvalidInput("args must be a JSON object".to_string())),
    }
}

fn tool_specs(role: &AgentRole) -> Vec<ToolSpec> {
    let mut specs = Vec::new();

    let declarations = role.function_declarations();
    if !declarations.is_empty() {
        specs.push(ToolSpec::Functions(declarations));
    }
    if role.has_tool(RoleTool::WebSearch) {
        specs.push(ToolSpec::WebSearch);
    }
    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_arguments_accepts_object_or_text() {
        assert_eq!(
            tool_arguments(json!({"query": "x"})).unwrap(),
            json!({"query": "x"})
        );
        assert_eq!(
            tool_arguments(json!("{\"top_k\": 2}")).unwrap(),
            json!({"top_k": 2})
        );
        assert_eq!(tool_arguments(Value::Null).unwrap(), json!({}));
        assert!(tool_arguments(json!("[1, 2]")).is_err());
        assert!(tool_arguments(json!(5)).is_err());
    }
}
