//! # CooKin
//!
//! A cooking agent that looks up the weather of a city and answers, in
//! French, with a recipe suited to the weather and the place.
//!
//! This library provides:
//! - A `get_weather` tool backed by wttr.in
//! - A tool-based agent loop over an OpenAI-compatible chat API
//! - A response generator that always answers with text
//! - A small web form with per-session API keys
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive free text (usually a city)
//! 2. Call the LLM with the system instruction and the weather tool
//! 3. Execute any tool calls and feed the results back
//! 4. Return the content of the final message
//!
//! ## Example
//!
//! ```rust,ignore
//! use cookin::{config::Config, recipe::ResponseGenerator};
//!
//! let config = Config::from_env()?;
//! let key = config.require_api_key()?;
//! let generator = ResponseGenerator::new(config, key);
//! println!("{}", generator.generate("Lyon").await);
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod recipe;
pub mod tools;

pub use config::Config;

/// Install the tracing subscriber used by both binaries.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cookin=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
