//! Building blocks of the `formloom` binary: demo forms, the stderr observer and the
//! runner wiring from [`AgentConfig`].

pub mod forms;
pub mod observer;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use formloom::prompts::load_or_default;
use formloom::{
    AgentConfig, ChatOpenAI, CompilationError, ConversationRunner, FormAgent, FormAgentOptions,
    InMemoryStateStore, LlmClient, SqliteStateStore, StateStore, StoreError, ToolObserver,
    ToolRegistry,
};

pub use forms::demo_registry;
pub use observer::PrintingObserver;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("state store: {0}")]
    Store(#[from] StoreError),
    #[error("agent graph: {0}")]
    Graph(#[from] CompilationError),
}

/// SQLite store when `state_db_path` is set, else in-memory.
pub fn open_store(config: &AgentConfig) -> Result<Arc<dyn StateStore>, SetupError> {
    Ok(match &config.state_db_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using sqlite state store");
            Arc::new(SqliteStateStore::new(path)?)
        }
        None => Arc::new(InMemoryStateStore::new()),
    })
}

/// Wires planner, tools, prompts and store into a [`ConversationRunner`].
pub fn build_runner(
    config: &AgentConfig,
    llm: Arc<dyn LlmClient>,
    registry: ToolRegistry,
    observer: Option<Arc<dyn ToolObserver>>,
    prompts_dir: Option<&Path>,
) -> Result<ConversationRunner, SetupError> {
    let mut options = FormAgentOptions::from_config(config);
    options.prompts = load_or_default(prompts_dir);
    options.observer = observer;
    let agent = FormAgent::new(llm, Arc::new(registry), options)?;
    Ok(ConversationRunner::new(agent, open_store(config)?).with_history_length(config.history_length))
}

/// [`build_runner`] with the OpenAI planner and the demo tools.
pub fn build_demo_runner(
    config: &AgentConfig,
    verbose: bool,
    prompts_dir: Option<&Path>,
) -> Result<ConversationRunner, SetupError> {
    let observer: Option<Arc<dyn ToolObserver>> = if verbose {
        Some(Arc::new(PrintingObserver))
    } else {
        None
    };
    build_runner(
        config,
        Arc::new(ChatOpenAI::from_agent_config(config)),
        demo_registry(),
        observer,
        prompts_dir,
    )
}
