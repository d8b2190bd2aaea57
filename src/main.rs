//! CooKin - command-line entry point
//!
//! Asks for a city on stdin and prints the generated recipe.

use std::io::{self, BufRead, Write};

use cookin::{config::Config, recipe::ResponseGenerator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cookin::init_tracing();

    let config = Config::from_env()?;
    tracing::debug!(
        model = %config.model.model,
        policy = %config.prompt_policy,
        "Loaded configuration"
    );

    print!("Enter your city: ");
    io::stdout().flush()?;
    let mut text = String::new();
    io::stdin().lock().read_line(&mut text)?;
    let text = text.trim_end_matches(['\r', '\n']);

    let response = match config.require_api_key() {
        Ok(key) => ResponseGenerator::new(config, key).generate(text).await,
        Err(e) => format!("Error: {}", e),
    };
    println!("{}", response);

    Ok(())
}
