//! CooKin web form - HTTP server entry point

use cookin::{api, config::Config};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cookin::init_tracing();

    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={} policy={}",
        config.model.model, config.prompt_policy
    );
    if config.api_key.is_some() {
        info!("OPENAI_API_KEY is ignored by the web server; each session supplies its own key");
    }

    api::serve(config).await?;

    Ok(())
}
