//! HTTP API and web form.
//!
//! Serves one HTML page plus a small JSON API. Each browser session keeps its
//! own OpenAI key in memory; nothing is persisted.

mod page;
mod routes;
mod session;
pub mod types;

pub use routes::{create_app, AppState, GeneratorFactory};
pub use session::{SessionStore, SESSION_COOKIE};

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;

/// Bind to the configured address and serve until the process exits.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config));
    let app = create_app(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
