//! OpenAI Chat Completions planner (`async-openai`).
//!
//! The visible tools are sent as functions. A forced tool choice is expressed by
//! advertising only that tool and setting tool choice `required`, so the model can call
//! nothing else.

use async_trait::async_trait;
use tracing::{debug, trace};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolChoiceOption, ChatCompletionTools,
        CreateChatCompletionRequestArgs, FunctionCall, FunctionObject, ToolChoiceOptions,
    },
    Client,
};

use super::{LlmClient, LlmError, LlmResponse, LlmUsage, ToolCall};
use crate::config::AgentConfig;
use crate::prompts::PlannerRequest;
use crate::state::Message;
use crate::tools::ToolSpec;

pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl ChatOpenAI {
    /// Client with the default config (API key from `OPENAI_API_KEY`).
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
        }
    }

    /// Model, temperature, API key and base URL from [`AgentConfig`].
    pub fn from_agent_config(config: &AgentConfig) -> Self {
        let mut openai = OpenAIConfig::new();
        if let Some(key) = &config.openai_api_key {
            openai = openai.with_api_key(key);
        }
        if let Some(base) = &config.openai_base_url {
            openai = openai.with_api_base(base);
        }
        Self::with_config(openai, config.model.clone()).with_temperature(config.temperature)
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn messages_to_request(messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m {
                Message::System(s) => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(s.as_str()),
                ),
                Message::User(s) => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(s.as_str()),
                ),
                Message::Assistant(s) => {
                    ChatCompletionRequestMessage::Assistant((s.as_str()).into())
                }
                Message::ToolCall {
                    id,
                    name,
                    arguments,
                } => ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    tool_calls: Some(vec![ChatCompletionMessageToolCalls::Function(
                        ChatCompletionMessageToolCall {
                            id: id.clone(),
                            function: FunctionCall {
                                name: name.clone(),
                                arguments: arguments.clone(),
                            },
                        },
                    )]),
                    ..Default::default()
                }),
                Message::ToolResult { id, content } => {
                    ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
                        content: ChatCompletionRequestToolMessageContent::Text(content.clone()),
                        tool_call_id: id.clone(),
                    })
                }
            })
            .collect()
    }

    fn function_tool(spec: &ToolSpec) -> ChatCompletionTools {
        ChatCompletionTools::Function(ChatCompletionTool {
            function: FunctionObject {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: Some(spec.input_schema.clone()),
                ..Default::default()
            },
        })
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, request: &PlannerRequest) -> Result<LlmResponse, LlmError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(&request.messages));

        let forced = request
            .tool_choice
            .as_ref()
            .and_then(|name| request.tools.iter().find(|t| &t.name == name));
        let tools: Vec<ChatCompletionTools> = match forced {
            Some(spec) => vec![Self::function_tool(spec)],
            None => request.tools.iter().map(Self::function_tool).collect(),
        };
        let tools_count = tools.len();
        if !tools.is_empty() {
            args.tools(tools);
            let mode = if forced.is_some() {
                ToolChoiceOptions::Required
            } else {
                ToolChoiceOptions::Auto
            };
            args.tool_choice(ChatCompletionToolChoiceOption::Mode(mode));
        }
        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        let body = args
            .build()
            .map_err(|e| LlmError::Transport(format!("OpenAI request build failed: {}", e)))?;

        debug!(
            trace_id = %trace_id,
            model = %self.model,
            message_count = request.messages.len(),
            tools_count,
            tool_choice = ?request.tool_choice,
            kind = ?request.kind,
            "OpenAI chat create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&body) {
            trace!(trace_id = %trace_id, request = %js, "OpenAI request body");
        }

        let response = self
            .client
            .chat()
            .create(body)
            .await
            .map_err(|e| LlmError::Transport(format!("OpenAI API error: {}", e)))?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(trace_id = %trace_id, response = %js, "OpenAI response body");
        }

        let usage = response.usage.as_ref().map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse("OpenAI returned no choices".to_string()))?;

        let msg = choice.message;
        let tool_calls = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(ToolCall {
                    id: Some(f.id),
                    name: f.function.name,
                    arguments: f.function.arguments,
                }),
                _ => None,
            })
            .collect();

        Ok(LlmResponse {
            content: msg.content.unwrap_or_default(),
            tool_calls,
            usage,
        })
    }
}
