//! Formloom CLI binary: chat with the form agent from the command line.
//!
//! One-shot (`-m "..."` or positional words) or interactive (`-i`). Settings come from
//! the environment, `.env` and `~/.config/formloom/config.toml`.

mod logging;
mod repl;

use std::path::PathBuf;

use clap::Parser;

use formloom::AgentConfig;
use repl::{run_one_turn, run_repl_loop};

#[derive(Parser, Debug)]
#[command(name = "formloom")]
#[command(about = "Formloom: fill forms by chatting with an LLM agent")]
struct Args {
    /// User message (or pass as positional arguments)
    #[arg(short, long, value_name = "TEXT")]
    message: Option<String>,

    /// Positional args: user message when -m/--message is not used
    #[arg(trailing_var_arg = true)]
    rest: Vec<String>,

    /// Conversation id; reuse it with --db to continue a conversation later
    #[arg(short, long, value_name = "ID", env = "FORMLOOM_CONVERSATION")]
    conversation: Option<String>,

    /// Interactive REPL: after the first reply keep reading lines from stdin
    #[arg(short, long)]
    interactive: bool,

    /// SQLite file for conversation state (overrides STATE_DB_PATH)
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Directory with form_agent.yaml overriding the built-in prompts
    #[arg(long, value_name = "DIR")]
    prompts_dir: Option<PathBuf>,

    /// Print tool activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| (!self.rest.is_empty()).then(|| self.rest.join(" ")))
            .filter(|m| !m.trim().is_empty())
    }
}

fn new_conversation_id() -> String {
    format!("cli-{}", uuid::Uuid::new_v4())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = formloom_config::load_and_apply("formloom", None) {
        eprintln!("formloom: ignoring config: {}", e);
    }
    let _log_guard = logging::init()?;

    let args = Args::parse();
    let message = args.message();
    if !args.interactive && message.is_none() {
        eprintln!("formloom: provide a message via -m/--message or positional args");
        std::process::exit(1);
    }

    let mut config = AgentConfig::from_env();
    if let Some(db) = &args.db {
        config.state_db_path = Some(db.clone());
    }
    let runner =
        formloom_cli::build_demo_runner(&config, args.verbose, args.prompts_dir.as_deref())?;
    let conversation_id = args.conversation.clone().unwrap_or_else(new_conversation_id);
    tracing::info!(%conversation_id, model = %config.model, "formloom cli start");

    if let Some(text) = &message {
        println!("{}", run_one_turn(&runner, &conversation_id, text).await);
    }
    if args.interactive {
        if args.conversation.is_none() {
            eprintln!("conversation: {}", conversation_id);
        }
        run_repl_loop(&runner, &conversation_id).await?;
    }
    Ok(())
}
