//! # Formloom
//!
//! Form-filling conversational agents on a small state graph. An LLM planner decides,
//! step by step, whether to answer or call a tool; forms are tools whose visible input
//! schema follows their lifecycle, so the planner collects one form at a time, field by
//! field, and asks for confirmation before anything is executed.
//!
//! ## Design principles
//!
//! - **Single state type**: every node reads and writes [`AgentState`]; a node returns the
//!   new state, nothing is merged behind its back.
//! - **Lifecycle-driven schemas**: a [`FormTool`] shows an empty payload while inactive,
//!   an all-optional payload while collecting and a single `confirm` flag once filled.
//!   The complete schema is only applied by validation at finalize time.
//! - **Recoverable errors stay in the graph**: validation, planner parse and tool failures
//!   become `AgentState::error` and the planner gets an error-correction prompt. Only
//!   [`AgentError`] leaves a run.
//!
//! ## Main modules
//!
//! - [`form`]: [`FormSchema`], [`FormDefinition`], [`FormTool`] and its state machine.
//! - [`tools`]: [`Tool`], [`ToolError`], [`ToolRegistry`], [`FormResetTool`].
//! - [`filter`]: [`select_tools`], which tools the planner sees this step.
//! - [`prompts`]: YAML prompt templates and [`PlannerPromptBuilder`].
//! - [`llm`]: [`LlmClient`] with [`MockLlm`] and [`ChatOpenAI`].
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], recursion limit.
//! - [`agent`]: [`AgentNode`], [`ToolNode`], [`ToolObserver`], [`FormAgent`].
//! - [`memory`]: [`ConversationMemory`], [`StateStore`] with in-memory and SQLite stores.
//! - [`runner`]: [`ConversationRunner`], one persisted turn per message.
//! - [`config`]: [`AgentConfig`] from environment variables.

pub mod agent;
pub mod config;
pub mod error;
pub mod filter;
pub mod form;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod outcome;
pub mod prompts;
pub mod runner;
pub mod state;
pub mod tools;

pub use agent::{
    parse_output, parse_tool_arguments, AgentNode, FormAgent, FormAgentOptions,
    LoggingToolObserver, ToolNode, ToolObserver, AGENT_NODE, DEFAULT_MAX_INTERMEDIATE_STEPS,
    TOOL_NODE,
};
pub use config::AgentConfig;
pub use error::AgentError;
pub use filter::select_tools;
pub use form::{
    describe, FieldSpec, FieldType, FormDefinition, FormRegistry, FormSchema, FormTool,
    FormToolSnapshot, FormToolState, FormValues, PayloadVariant, RestoreError, ValidationError,
};
pub use graph::{
    CompilationError, CompiledStateGraph, Next, Node, StateGraph, DEFAULT_RECURSION_LIMIT, END,
    START,
};
pub use llm::{ChatOpenAI, LlmClient, LlmError, LlmResponse, MockLlm, ToolCall};
pub use memory::{
    ConversationMemory, InMemoryStateStore, PersistedAgentState, SqliteStateStore, StateStore,
    StoreError,
};
pub use outcome::{StateUpdate, ToolOutcome};
pub use prompts::{FormAgentPrompts, InstructionKind, PlannerPromptBuilder, PlannerRequest};
pub use runner::{ConversationRunner, RunError, TurnReply, FALLBACK_REPLY};
pub use state::{AgentOutcome, AgentState, IntermediateStep, Message, ToolInvocation};
pub use tools::{AvailableTool, FormResetTool, Tool, ToolError, ToolRegistry, ToolSpec};
