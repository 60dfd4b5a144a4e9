//! The form agent: planner node, tool node, observers and the executor that wires them.

mod agent_node;
mod executor;
mod observer;
mod tool_node;

pub use agent_node::{
    interpret_response, parse_tool_arguments, AgentNode, AGENT_NODE,
    DEFAULT_MAX_INTERMEDIATE_STEPS,
};
pub use executor::{parse_output, FormAgent, FormAgentOptions};
pub use observer::{LoggingToolObserver, ToolObserver};
pub use tool_node::{ToolNode, TOOL_NODE};
