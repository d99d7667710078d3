//! An interface for handling chat completion requests
//!
//! This crate provides a `RequestHandler` trait that the relay uses to reach a
//! chat-completion provider, plus the provider-neutral request and outcome types.
//! The relay never links against a concrete provider.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot::{self, Sender};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// One chat completion call: the model, the ordered messages and the sampling temperature.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

/// What the provider answered, classified once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// 2xx with a first choice. `content` is empty when the choice carried none.
    Success { content: String },
    /// The provider answered, but rejected the call or the body lacks a first choice.
    /// `raw` is the provider payload, kept verbatim for diagnosis.
    MalformedResponse { raw: serde_json::Value },
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request to completion provider failed: {0}")]
    Transport(String),
    #[error("completion provider returned an unreadable body: {0}")]
    Decode(String),
    #[error("completion handler dropped the request")]
    Canceled,
}

pub type CompletionResult = Result<CompletionOutcome, CompletionError>;

pub trait RequestHandler {
    // `result` is answered at most once. Dropping it unanswered means the call was abandoned.
    fn answer_request(&self, request: CompletionRequest, result: Sender<CompletionResult>);
}

/// Runs one request through `handler` and waits for its single answer.
pub async fn complete(
    handler: &(dyn RequestHandler + Send + Sync),
    request: CompletionRequest,
) -> CompletionResult {
    let (tx, rx) = oneshot::channel();
    handler.answer_request(request, tx);
    rx.await.unwrap_or(Err(CompletionError::Canceled))
}
