//! The static tree of agent roles

use serde::Serialize;
use serde_json::{Value, json};

use ragdex_core::FunctionDeclaration;

pub const ORCHESTRATOR: &str = "orchestrator_agent";
pub const TOOL_DISCOVERY: &str = "get_tool_agent";
pub const TOOL_INVOCATION: &str = "mcp_client_agent";
pub const WEB_SEARCH: &str = "google_search_agent";

/// Function that fetches the tool server catalog
pub const GET_TOOLS: &str = "get_tools";
/// Function that invokes a named tool on the tool server
pub const CALL_TOOLS: &str = "call_tools";

/// Capabilities a role may use directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTool {
    GetTools,
    CallTools,
    WebSearch,
}

/// One LLM-driven role: its prompt, its tools and the roles it may delegate to
#[derive(Debug, Clone, Serialize)]
pub struct AgentRole {
    pub name: &'static str,
    pub description: &'static str,
    pub instruction: &'static str,
    pub tools: Vec<RoleTool>,
    pub sub_agents: Vec<AgentRole>,
}

impl AgentRole {
    pub fn has_tool(&self, tool: RoleTool) -> bool {
        self.tools.contains(&tool)
    }

    pub fn sub_agent(&self, name: &str) -> Option<&AgentRole> {
        self.sub_agents.iter().find(|agent| agent.name == name)
    }

    /// Function declarations offered to the model for this role.
    ///
    /// Each sub-agent is offered as a function taking a single `request`.
    pub fn function_declarations(&self) -> Vec<FunctionDeclaration> {
        let mut declarations = Vec::new();

        if self.has_tool(RoleTool::GetTools) {
            declarations.push(FunctionDeclaration {
                name: GET_TOOLS.to_string(),
                description: "Fetch the tools offered by the tool server, with their \
                    descriptions and parameter schemas."
                    .to_string(),
                parameters: Value::Null,
            });
        }

        if self.has_tool(RoleTool::CallTools) {
            declarations.push(FunctionDeclaration {
                name: CALL_TOOLS.to_string(),
                description: "Call a tool offered by the tool server and return its result."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "tool_name": {
                            "type": "string",
                            "description": "Name of a tool offered by the tool server"
                        },
                        "args": {
                            "type": "string",
                            "description": "JSON object mapping argument names to values, e.g. {\"index_name\": \"docs\", \"query\": \"refund policy\"}"
                        }
                    },
                    "required": ["tool_name", "args"]
                }),
            });
        }

        for agent in &self.sub_agents {
            declarations.push(FunctionDeclaration {
                name: agent.name.to_string(),
                description: agent.description.to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "request": {
                            "type": "string",
                            "description": "What you need this agent to do"
                        }
                    },
                    "required": ["request"]
                }),
            });
        }

        declarations
    }
}

pub fn mcp_client_agent() -> AgentRole {
    AgentRole {
        name: TOOL_INVOCATION,
        description: "Runs RAG searches against the tool server on behalf of the \
            orchestrator and reports the results.",
        instruction: "You are an assistant that performs RAG searches by calling tools on the \
            tool server, following the orchestrator's request. Use call_tools with the tool \
            name and its arguments, then return the results to the orchestrator.",
        tools: vec![RoleTool::CallTools],
        sub_agents: Vec::new(),
    }
}

pub fn get_tool_agent() -> AgentRole {
    AgentRole {
        name: TOOL_DISCOVERY,
        description: "Fetches the tool server's tool catalog and returns it to the \
            orchestrator.",
        instruction: "You are an assistant that retrieves the list of tools offered by the \
            tool server together with their descriptions. When the orchestrator asks, call \
            get_tools and return what it reports.",
        tools: vec![RoleTool::GetTools],
        sub_agents: Vec::new(),
    }
}

pub fn google_search_agent() -> AgentRole {
    AgentRole {
        name: WEB_SEARCH,
        description: "Searches the web for the given keywords and returns the findings.",
        instruction: "You are a web search agent. Take the search keywords you are given, \
            search the web and return the results.",
        tools: vec![RoleTool::WebSearch],
        sub_agents: Vec::new(),
    }
}

pub fn orchestrator_agent() -> AgentRole {
    AgentRole {
        name: ORCHESTRATOR,
        description: "Answers user questions using information gathered by its sub-agents.",
        instruction: "You are an assistant that answers the user's request using information \
            gathered through your sub-agents. When a question arrives, first ask \
            get_tool_agent for the tool server's tool metadata to see which tools may help. \
            Then use mcp_client_agent to retrieve information relevant to the question from \
            the database. Finally, write the answer yourself from that information and \
            return it to the user.",
        tools: Vec::new(),
        sub_agents: vec![mcp_client_agent(), get_tool_agent()],
    }
}

/// Every role that can be run directly, entry point first
pub fn all_roles() -> Vec<AgentRole> {
    vec![
        orchestrator_agent(),
        get_tool_agent(),
        mcp_client_agent(),
        google_search_agent(),
    ]
}

/// Look up a role by its name or a short alias
pub fn find_role(name: &str) -> Option<AgentRole> {
    let name = match name {
        "orchestrator" => ORCHESTRATOR,
        "tool_discovery" | "tools" => TOOL_DISCOVERY,
        "tool_invocation" | "mcp" => TOOL_INVOCATION,
        "web_search" | "google_search" => WEB_SEARCH,
        other => other,
    };
    all_roles().into_iter().find(|role| role.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orchestrator_delegates_to_tool_roles_only() {
        let root = orchestrator_agent();
        let names: Vec<&str> = root.sub_agents.iter().map(|agent| agent.name).collect();

        assert_eq!(names, vec![TOOL_INVOCATION, TOOL_DISCOVERY]);
        assert!(root.sub_agent(WEB_SEARCH).is_none());
        assert!(root.tools.is_empty());
    }

    #[test]
    fn test_function_declarations_per_role() {
        let names = |role: AgentRole| -> Vec<String> {
            role.function_declarations()
                .into_iter()
                .map(|declaration| declaration.name)
                .collect()
        };

        assert_eq!(names(get_tool_agent()), vec![GET_TOOLS]);
        assert_eq!(names(mcp_client_agent()), vec![CALL_TOOLS]);
        assert!(names(google_search_agent()).is_empty());
        assert_eq!(
            names(orchestrator_agent()),
            vec![TOOL_INVOCATION, TOOL_DISCOVERY]
        );
    }

    #[test]
    fn test_find_role_by_alias() {
        assert_eq!(find_role("web_search").unwrap().name, WEB_SEARCH);
        assert_eq!(find_role(TOOL_DISCOVERY).unwrap().name, TOOL_DISCOVERY);
        assert!(find_role("planner").is_none());
    }
}
