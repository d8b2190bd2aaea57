//! Wiring of the recipe agent: model client, instruction and the weather tool.

use std::sync::Arc;

use super::agent_loop::{AgentError, AgentRuntime, Conversation, LoopSettings, ToolLoop};
use super::prompt::build_system_prompt;
use crate::config::{ApiKey, Config};
use crate::llm::{LlmClient, OpenAiClient};
use crate::tools::{GetWeather, ToolRegistry, WeatherClient};

/// A ready-to-run recipe agent.
pub struct RecipeAgent {
    runtime: Arc<dyn AgentRuntime>,
    tools: ToolRegistry,
}

impl RecipeAgent {
    /// Build the agent against the OpenAI-compatible endpoint with the given credential.
    pub fn build(config: &Config, credential: ApiKey) -> Result<Self, AgentError> {
        let llm = OpenAiClient::new(&config.model, credential)?;
        Self::build_with_llm(config, Arc::new(llm))
    }

    /// Build the agent around any chat-completion client.
    pub fn build_with_llm(config: &Config, llm: Arc<dyn LlmClient>) -> Result<Self, AgentError> {
        let weather = WeatherClient::new(&config.weather)?;
        let settings = LoopSettings {
            model: config.model.model.clone(),
            temperature: config.model.temperature,
            system_prompt: build_system_prompt(config.prompt_policy),
            max_iterations: config.max_iterations,
        };

        Ok(Self::from_parts(
            Arc::new(ToolLoop::new(llm, settings)),
            Self::recipe_tools(weather),
        ))
    }

    /// Assemble from an arbitrary runtime and tool set.
    pub fn from_parts(runtime: Arc<dyn AgentRuntime>, tools: ToolRegistry) -> Self {
        Self { runtime, tools }
    }

    /// The single tool the recipe agent exposes.
    pub fn recipe_tools(weather: WeatherClient) -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(GetWeather::new(weather)));
        tools
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the conversation to its final message.
    pub async fn invoke(&self, conversation: Conversation) -> Result<Conversation, AgentError> {
        self.runtime.respond(conversation, &self.tools).await
    }
}
