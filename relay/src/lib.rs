//! The HTTP relay between the assistant interface and a chat completion provider.
//!
//! `POST /api/ask` takes `{question, subject?}`, wraps it with the tutor system
//! prompt and hands it to a `RequestHandler`. The reply is mapped onto a status
//! code and a small JSON body.

mod ask;
mod prompt;
pub use ask::{AskRequest, AskResponse, ErrorBody, RelayError, NO_RESPONSE};
pub use prompt::{build_request, user_message, SYSTEM_PROMPT};

use axum::{routing::any, Router};
use std::{error::Error, net::SocketAddr, sync::Arc};
use text_completion::RequestHandler;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const ASK_PATH: &str = "/api/ask";

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "llama3-70b-8192".to_string(),
            temperature: 0.7,
        }
    }
}

#[derive(Clone)]
pub struct RelayState {
    request_handler: Arc<dyn RequestHandler + Send + Sync>,
    model: Arc<ModelConfig>,
}

impl RelayState {
    pub fn new(
        request_handler: Arc<dyn RequestHandler + Send + Sync + 'static>,
        model: ModelConfig,
    ) -> Self {
        Self {
            request_handler,
            model: Arc::new(model),
        }
    }
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route(ASK_PATH, any(ask::ask))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves the relay in the background. Returns the bound address.
pub fn init(addr: SocketAddr, state: RelayState) -> Result<SocketAddr, Box<dyn Error + Send + Sync>> {
    let server = axum::Server::try_bind(&addr)?.serve(router(state).into_make_service());
    let local_addr = server.local_addr();
    info!("Relay listening on http://{}{}", local_addr, ASK_PATH);

    tokio::spawn(async move {
        let _ = server
            .await
            .map_err(|why| warn!("Relay server ended: {:?}", why));
    });
    Ok(local_addr)
}
