//! System instructions for the recipe agent.

use std::fmt;
use std::str::FromStr;

/// Which fallback behavior the agent is instructed to follow.
///
/// Exactly one policy is active per process; they are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptPolicy {
    /// Recipe from weather and city; without weather, a recipe of the city.
    #[default]
    Graceful,
    /// As `Graceful`, but defaults to Paris when no city is found and turns
    /// away anything that is not a recipe request by asking for a city.
    Strict,
}

impl PromptPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptPolicy::Graceful => "graceful",
            PromptPolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for PromptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "graceful" | "a" => Ok(PromptPolicy::Graceful),
            "strict" | "b" => Ok(PromptPolicy::Strict),
            other => Err(format!("expected 'graceful' or 'strict', got: {}", other)),
        }
    }
}

const ROLE: &str = "You are CooKin, a cooking assistant that suggests one recipe suited to the \
current weather and to the place the user is in.";

const WORKFLOW: &str = r#"## How to answer

1. Find the name of the city in the user's message.
2. Call the `get_weather` tool with that city to get the current conditions.
3. Propose a recipe that fits both the weather (temperature, rain, sun, wind) and the local cuisine of the city: a title, the ingredients, and the steps."#;

const GRACEFUL_RULES: &str = r#"## Rules

- If the weather is not available (the tool answers "The weather API is not available"), just give a recipe of the city.
- If the message is not about a city, still answer with a recipe of the place it mentions, or ask which city the user is in.
- The response MUST be in French."#;

const STRICT_RULES: &str = r#"## Rules

- If the weather is not available (the tool answers "The weather API is not available"), give a traditional recipe of the city instead.
- If no city can be identified in the message, use Paris.
- Only talk about recipes. If the user asks about anything else, politely decline and ask for the name of their city.
- The response MUST be in French, whatever the language of the user."#;

/// Build the system instruction for a policy.
pub fn build_system_prompt(policy: PromptPolicy) -> String {
    let rules = match policy {
        PromptPolicy::Graceful => GRACEFUL_RULES,
        PromptPolicy::Strict => STRICT_RULES,
    };
    format!("{ROLE}\n\n{WORKFLOW}\n\n{rules}")
}
