use serde_json::Value;
use text_completion::{CompletionError, CompletionOutcome, CompletionRequest, CompletionResult};
use tracing::*;

use crate::{models::classify, GroqHandler};

pub async fn run_completion(handler: &GroqHandler, request: CompletionRequest) -> CompletionResult {
    let url = handler.completions_url();
    trace!(
        "run_completion model={} temperature={} messages={:?}",
        request.model,
        request.temperature,
        request.messages
    );

    let response = handler
        .client
        .post(&url)
        .bearer_auth(&handler.api_key)
        .json(&request)
        .send()
        .await
        .map_err(|e| CompletionError::Transport(e.to_string()))?;

    let status = response.status();
    let raw: Value = response
        .json()
        .await
        .map_err(|e| CompletionError::Decode(e.to_string()))?;
    trace!("POST {} {} {:?}", url, status, raw);

    let outcome = classify(status.is_success(), raw);
    match &outcome {
        CompletionOutcome::Success { content } => {
            debug!(
                "run_completion model={} answered {} chars",
                request.model,
                content.chars().count()
            );
        }
        CompletionOutcome::MalformedResponse { raw } => {
            warn!("POST {} rejected, status={} body={}", url, status, raw);
        }
    }
    Ok(outcome)
}
