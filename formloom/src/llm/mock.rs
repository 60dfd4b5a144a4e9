//! Scripted planner for tests and offline demos.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmClient, LlmError, LlmResponse};
use crate::prompts::PlannerRequest;

type Scripted = Result<LlmResponse, LlmError>;

#[derive(Default)]
struct Script {
    queue: VecDeque<Scripted>,
    last: Option<Scripted>,
    requests: Vec<PlannerRequest>,
}

/// Replays responses in order; once the script runs out the last response repeats.
///
/// With an empty script every call fails with [`LlmError::Parse`].
///
/// **Interaction**: Implements [`LlmClient`]; every request is recorded so tests can
/// inspect prompts, visible tools and the forced tool choice.
#[derive(Default)]
pub struct MockLlm {
    script: Mutex<Script>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, response: Scripted) -> Self {
        if let Ok(script) = self.script.get_mut() {
            script.queue.push_back(response);
        }
        self
    }

    /// Next reply is a final answer.
    pub fn then_answer(self, content: impl Into<String>) -> Self {
        self.push(Ok(LlmResponse::answer(content)))
    }

    /// Next reply is one tool call with `arguments` as raw JSON text.
    pub fn then_tool_call(self, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        self.push(Ok(LlmResponse::tool_call(name, arguments)))
    }

    pub fn then_response(self, response: LlmResponse) -> Self {
        self.push(Ok(response))
    }

    pub fn then_parse_error(self, message: impl Into<String>) -> Self {
        self.push(Err(LlmError::Parse(message.into())))
    }

    pub fn then_transport_error(self, message: impl Into<String>) -> Self {
        self.push(Err(LlmError::Transport(message.into())))
    }

    /// Planner that calls `name` on every step.
    pub fn always_tool_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self::new().then_tool_call(name, arguments)
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().map(|s| s.requests.len()).unwrap_or(0)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<PlannerRequest> {
        self.script
            .lock()
            .map(|s| s.requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, request: &PlannerRequest) -> Result<LlmResponse, LlmError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| LlmError::Transport("mock script poisoned".into()))?;
        script.requests.push(request.clone());
        if let Some(next) = script.queue.pop_front() {
            script.last = Some(next);
        }
        script
            .last
            .clone()
            .unwrap_or_else(|| Err(LlmError::Parse("mock has no scripted response".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::prompts::InstructionKind;

    fn request() -> PlannerRequest {
        PlannerRequest {
            messages: vec![],
            tools: vec![],
            tool_choice: None,
            kind: InstructionKind::Default,
        }
    }

    /// **Scenario**: Scripted replies come back in order and the last one repeats.
    #[tokio::test]
    async fn replays_in_order_then_repeats_last() {
        let llm = MockLlm::new()
            .then_parse_error("garbled")
            .then_answer("hello");
        assert!(matches!(
            llm.invoke(&request()).await,
            Err(LlmError::Parse(_))
        ));
        assert_eq!(llm.invoke(&request()).await.unwrap().content, "hello");
        assert_eq!(llm.invoke(&request()).await.unwrap().content, "hello");
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn empty_script_is_parse_error() {
        let llm = MockLlm::new();
        assert!(matches!(
            llm.invoke(&request()).await,
            Err(LlmError::Parse(_))
        ));
    }
}
