//! Core agent loop implementation.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::{ChatMessage, ChatRequest, LlmClient, LlmError, ToolCall};
use crate::tools::{ToolRegistry, WeatherError};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error("Max iterations ({0}) reached without completion")]
    MaxIterations(usize),
}

/// Ordered message history passed into and out of the agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// A conversation holding a single user message.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(text)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Content of the last entry, if any.
    pub fn final_content(&self) -> Option<&str> {
        self.last().and_then(|m| m.content.as_deref())
    }
}

/// The decide/act loop: given a conversation, return it extended up to the final answer.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn respond(
        &self,
        conversation: Conversation,
        tools: &ToolRegistry,
    ) -> Result<Conversation, AgentError>;
}

/// Fixed settings of a [`ToolLoop`].
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub model: String,
    pub temperature: f32,
    /// Prepended to every model call; not stored in the conversation.
    pub system_prompt: String,
    pub max_iterations: usize,
}

/// "Tools in a loop" runtime backed by a chat-completion client.
pub struct ToolLoop {
    llm: Arc<dyn LlmClient>,
    settings: LoopSettings,
}

impl ToolLoop {
    pub fn new(llm: Arc<dyn LlmClient>, settings: LoopSettings) -> Self {
        Self { llm, settings }
    }

    /// Execute a single tool call, folding failures into the result text.
    async fn execute_tool_call(&self, tool_call: &ToolCall, tools: &ToolRegistry) -> String {
        let args: serde_json::Value = serde_json::from_str(&tool_call.function.arguments)
            .unwrap_or(serde_json::Value::Null);

        match tools.execute(&tool_call.function.name, args).await {
            Ok(output) => output,
            Err(e) => format!("Error: {}", e),
        }
    }
}

#[async_trait]
impl AgentRuntime for ToolLoop {
    async fn respond(
        &self,
        mut conversation: Conversation,
        tools: &ToolRegistry,
    ) -> Result<Conversation, AgentError> {
        let tool_schemas = tools.get_tool_schemas();

        for iteration in 0..self.settings.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let mut messages = Vec::with_capacity(conversation.len() + 1);
            messages.push(ChatMessage::system(self.settings.system_prompt.clone()));
            messages.extend_from_slice(conversation.messages());

            let response = self
                .llm
                .chat_completion(ChatRequest {
                    model: &self.settings.model,
                    temperature: self.settings.temperature,
                    messages: &messages,
                    tools: Some(&tool_schemas),
                })
                .await?;

            if let Some(tool_calls) = response.tool_calls.filter(|calls| !calls.is_empty()) {
                conversation.push(ChatMessage::assistant_tool_calls(
                    response.content.clone(),
                    tool_calls.clone(),
                ));

                for tool_call in &tool_calls {
                    tracing::debug!(
                        tool = %tool_call.function.name,
                        args = %tool_call.function.arguments,
                        "Calling tool"
                    );
                    let result = self.execute_tool_call(tool_call, tools).await;
                    conversation.push(ChatMessage::tool_result(tool_call.id.clone(), result));
                }

                continue;
            }

            // No tool calls - this is the final response, returned as-is even when empty
            conversation.push(ChatMessage::assistant(response.content.unwrap_or_default()));
            return Ok(conversation);
        }

        Err(AgentError::MaxIterations(self.settings.max_iterations))
    }
}
