//! Agent module - the recipe agent and the loop that drives it.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Prepend the system instruction to the conversation
//! 2. Call the LLM with the `get_weather` tool available
//! 3. If the LLM requests a tool call, execute it and feed the result back
//! 4. Repeat until the LLM produces a final response or max iterations is reached

mod agent_loop;
mod orchestrator;
mod prompt;

pub use agent_loop::{AgentError, AgentRuntime, Conversation, LoopSettings, ToolLoop};
pub use orchestrator::RecipeAgent;
pub use prompt::{build_system_prompt, PromptPolicy};
