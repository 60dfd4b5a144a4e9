//! Interactive REPL loop: read stdin, run one turn, print the reply, repeat.
//!
//! Used when `-i/--interactive` is passed. Every line goes to the same conversation id,
//! so the form in progress carries over between lines.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use formloom::{ConversationRunner, FALLBACK_REPLY};

pub fn is_quit_command(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    matches!(lower.as_str(), "quit" | "exit" | "/quit")
}

/// One turn; failures are logged and answered with the fallback reply.
pub async fn run_one_turn(runner: &ConversationRunner, conversation_id: &str, text: &str) -> String {
    match runner.handle_message(conversation_id, text).await {
        Ok(turn) => turn.reply,
        Err(e) => {
            tracing::error!(conversation_id, error = %e, "turn failed");
            eprintln!("error: {}", e);
            FALLBACK_REPLY.to_string()
        }
    }
}

/// Exits on EOF (Ctrl+D) or `quit`/`exit`/`/quit`; blank lines are skipped.
pub async fn run_repl_loop(
    runner: &ConversationRunner,
    conversation_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match reader.next_line().await? {
            None => break,
            Some(s) if s.trim().is_empty() => continue,
            Some(s) if is_quit_command(&s) => break,
            Some(s) => s,
        };
        println!("{}", run_one_turn(runner, conversation_id, &line).await);
    }
    println!("Bye.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use formloom::{AgentConfig, MockLlm, ToolRegistry};

    #[test]
    fn is_quit_command_matches_expected_tokens() {
        assert!(is_quit_command("quit"));
        assert!(is_quit_command(" EXIT "));
        assert!(is_quit_command("/quit"));
        assert!(!is_quit_command("continue"));
    }

    /// **Scenario**: A failing turn prints the fallback reply instead of aborting.
    #[tokio::test]
    async fn failed_turn_answers_with_fallback() {
        let llm = Arc::new(MockLlm::new().then_transport_error("offline"));
        let runner = formloom_cli::build_runner(
            &AgentConfig::default(),
            llm,
            ToolRegistry::new(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(run_one_turn(&runner, "c1", "hi").await, FALLBACK_REPLY);
    }
}
