//! A client for OpenAI-compatible chat completion providers.
//!
//! `GroqHandler` implements `text_completion::RequestHandler` on top of the
//! `/chat/completions` endpoint. Groq is the default provider, any API with the
//! same request and response shape can be targeted with `with_api_base`.

mod models;
mod run_completion;
pub use run_completion::run_completion;

use std::fmt;
use text_completion::{CompletionRequest, CompletionResult, RequestHandler};
use tokio::sync::oneshot::Sender;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

#[derive(Clone)]
pub struct GroqHandler {
    api_key: String,
    api_base: String,
    client: reqwest::Client,
}

impl GroqHandler {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

// Never print the key.
impl fmt::Debug for GroqHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqHandler")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl RequestHandler for GroqHandler {
    fn answer_request(&self, request: CompletionRequest, result: Sender<CompletionResult>) {
        // reqwest::Client is a handle, the clone shares its connection pool.
        let handler = self.clone();
        tokio::spawn(async move {
            let r = run_completion(&handler, request).await;
            let _ = result.send(r);
        });
    }
}
