use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

pub const ASK_PATH: &str = "/api/ask";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay answered {status}: {message:?}")]
    Rejected { status: u16, message: Option<String> },
    #[error("relay unreachable: {0}")]
    Unreachable(String),
    #[error("relay reply unreadable: {0}")]
    Unreadable(String),
}

impl RelayError {
    /// `Unreachable` and `Unreadable` both mean the relay could not be talked to.
    pub fn is_network(&self) -> bool {
        !matches!(self, RelayError::Rejected { .. })
    }
}

#[derive(Serialize, Debug)]
struct AskBody<'a> {
    question: &'a str,
    subject: &'a str,
}

#[derive(Deserialize, Debug)]
struct ReplyBody {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Talks to the relay's ask endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    ask_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            ask_url: format!("{}{}", base_url.trim_end_matches('/'), ASK_PATH),
        }
    }

    pub fn ask_url(&self) -> &str {
        &self.ask_url
    }

    pub async fn ask(&self, question: &str, subject: &str) -> Result<String, RelayError> {
        let response = self
            .client
            .post(&self.ask_url)
            .json(&AskBody { question, subject })
            .send()
            .await
            .map_err(|e| RelayError::Unreachable(e.to_string()))?;

        let status = response.status();
        let reply: ReplyBody = response
            .json()
            .await
            .map_err(|e| RelayError::Unreadable(e.to_string()))?;
        trace!("POST {} {} {:?}", self.ask_url, status, reply);

        if !status.is_success() {
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                message: reply.error.filter(|message| !message.is_empty()),
            });
        }
        reply
            .answer
            .ok_or_else(|| RelayError::Unreadable("reply has no answer".to_string()))
    }
}
