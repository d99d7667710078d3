mod config;

use std::{error::Error, sync::Arc};

use config::Config;
use groq_api::GroqHandler;
use relay::RelayState;
use tracing::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!(
        "Starting... CARGO_PKG_NAME={}, CARGO_PKG_VERSION={}, version={}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        option_env!("LEARNING_ASSISTANT_VERSION").unwrap_or("(not defined at compile)")
    );

    let config = Config::from_env()?;

    let mut handler = GroqHandler::new(config.api_key);
    if let Some(api_base) = config.api_base {
        handler = handler.with_api_base(api_base);
    }
    info!(
        "Forwarding questions to {} model={} temperature={}",
        handler.api_base(),
        config.model.model,
        config.model.temperature
    );

    let state = RelayState::new(Arc::new(handler), config.model);
    relay::init(config.listen_addr, state)?;

    let _signal_err = tokio::signal::ctrl_c().await;
    info!("Received Ctrl-C, shutting down.");

    Ok(())
}
