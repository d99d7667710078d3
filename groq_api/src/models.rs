use serde::Deserialize;
use serde_json::Value;
use text_completion::CompletionOutcome;

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Sorts a provider reply into a usable first choice or a verbatim payload for diagnosis.
pub(crate) fn classify(success: bool, raw: Value) -> CompletionOutcome {
    if !success {
        return CompletionOutcome::MalformedResponse { raw };
    }

    let first = ChatCompletionResponse::deserialize(&raw)
        .ok()
        .and_then(|response| response.choices.into_iter().next());

    match first {
        Some(choice) => CompletionOutcome::Success {
            content: choice
                .message
                .and_then(|message| message.content)
                .unwrap_or_default(),
        },
        None => CompletionOutcome::MalformedResponse { raw },
    }
}
