use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use text_completion::{complete, CompletionError, CompletionOutcome};
use thiserror::Error;
use tracing::*;

use crate::{prompt::build_request, RelayState};

pub const NO_RESPONSE: &str = "No response generated.";

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Question is required")]
    InvalidRequest,
    #[error("Internal server error.")]
    Upstream(#[from] CompletionError),
    #[error("Upstream API error")]
    UpstreamProtocol { details: Value },
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let error = self.to_string();
        match self {
            RelayError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "POST")],
                Json(ErrorBody {
                    error,
                    details: None,
                }),
            )
                .into_response(),
            RelayError::InvalidRequest => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error,
                    details: None,
                }),
            )
                .into_response(),
            RelayError::Upstream(why) => {
                error!("Completion call failed: {}", why);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error,
                        details: None,
                    }),
                )
                    .into_response()
            }
            RelayError::UpstreamProtocol { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error,
                    details: Some(details),
                }),
            )
                .into_response(),
        }
    }
}

pub(crate) async fn ask(
    State(state): State<RelayState>,
    method: Method,
    body: Bytes,
) -> Result<Json<AskResponse>, RelayError> {
    if method != Method::POST {
        debug!("ask rejected method={}", method);
        return Err(RelayError::MethodNotAllowed);
    }

    let request: AskRequest =
        serde_json::from_slice(&body).map_err(|_| RelayError::InvalidRequest)?;
    let question = request
        .question
        .filter(|question| !question.is_empty())
        .ok_or(RelayError::InvalidRequest)?;
    debug!(
        "ask subject={:?} question={} chars",
        request.subject,
        question.chars().count()
    );

    let completion = build_request(&state.model, &question, request.subject.as_deref());
    match complete(state.request_handler.as_ref(), completion).await? {
        CompletionOutcome::Success { content } if content.is_empty() => Ok(Json(AskResponse {
            answer: NO_RESPONSE.to_string(),
        })),
        CompletionOutcome::Success { content } => Ok(Json(AskResponse { answer: content })),
        CompletionOutcome::MalformedResponse { raw } => {
            Err(RelayError::UpstreamProtocol { details: raw })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{router, ModelConfig, SYSTEM_PROMPT};
    use axum::{body::Body, http::Request};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use text_completion::{CompletionRequest, CompletionResult, RequestHandler};
    use tokio::sync::oneshot::Sender;
    use tower::ServiceExt;

    struct FakeHandler {
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
        reply: fn() -> CompletionResult,
    }

    impl RequestHandler for FakeHandler {
        fn answer_request(&self, request: CompletionRequest, result: Sender<CompletionResult>) {
            self.seen.lock().unwrap().push(request);
            let _ = result.send((self.reply)());
        }
    }

    struct Harness {
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
        state: RelayState,
    }

    fn harness(reply: fn() -> CompletionResult) -> Harness {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler = FakeHandler {
            seen: seen.clone(),
            reply,
        };
        Harness {
            seen,
            state: RelayState::new(Arc::new(handler), ModelConfig::default()),
        }
    }

    fn answered() -> CompletionResult {
        Ok(CompletionOutcome::Success {
            content: "A stack is a LIFO data structure.".to_string(),
        })
    }

    async fn call(state: RelayState, method: Method, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri("/api/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_non_post_methods_are_405() {
        for method in [
            Method::GET,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ] {
            let h = harness(answered);
            let (status, body) = call(h.state, method.clone(), r#"{"question":"hi"}"#).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", method);
            assert_eq!(body, json!({"error": "Method not allowed"}));
            assert!(h.seen.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_or_empty_question_is_400() {
        for body in [
            r#"{}"#,
            r#"{"subject":"DBMS"}"#,
            r#"{"question":""}"#,
            r#"{"question":null,"subject":"Java"}"#,
            r#"not json"#,
            "",
        ] {
            let h = harness(answered);
            let (status, reply) = call(h.state, Method::POST, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
            assert_eq!(reply, json!({"error": "Question is required"}));
            assert!(h.seen.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_answer_is_first_choice_content() {
        let h = harness(answered);
        let (status, body) = call(
            h.state,
            Method::POST,
            r#"{"question":"What is a stack?","subject":"DBMS"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"answer": "A stack is a LIFO data structure."}));

        let seen = h.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "llama3-70b-8192");
        assert_eq!(seen[0].messages[0].content, SYSTEM_PROMPT);
        assert_eq!(seen[0].messages[1].content, "Subject: DBMS\n\nWhat is a stack?");
    }

    #[tokio::test]
    async fn test_question_without_subject_is_sent_verbatim() {
        let h = harness(answered);
        let (status, _) = call(h.state, Method::POST, r#"{"question":"What is a queue?","subject":""}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(h.seen.lock().unwrap()[0].messages[1].content, "What is a queue?");
    }

    #[tokio::test]
    async fn test_empty_content_falls_back() {
        let h = harness(|| {
            Ok(CompletionOutcome::Success {
                content: String::new(),
            })
        });
        let (status, body) = call(h.state, Method::POST, r#"{"question":"hello"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"answer": "No response generated."}));
    }

    #[tokio::test]
    async fn test_provider_rejection_is_500_with_details() {
        let h = harness(|| {
            Ok(CompletionOutcome::MalformedResponse {
                raw: json!({"error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}}),
            })
        });
        let (status, body) = call(h.state, Method::POST, r#"{"question":"hello"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "error": "Upstream API error",
                "details": {"error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}}
            })
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_generic_500() {
        let h = harness(|| Err(CompletionError::Transport("connection refused".to_string())));
        let (status, body) = call(h.state, Method::POST, r#"{"question":"hello"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error."}));
    }

    #[tokio::test]
    async fn test_dropped_handler_is_generic_500() {
        struct Silent;
        impl RequestHandler for Silent {
            fn answer_request(&self, _: CompletionRequest, _: Sender<CompletionResult>) {}
        }
        let state = RelayState::new(Arc::new(Silent), ModelConfig::default());
        let (status, body) = call(state, Method::POST, r#"{"question":"hello"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error."}));
    }

    #[tokio::test]
    async fn test_served_relay_answers_over_tcp() {
        let h = harness(answered);
        let addr = crate::init("127.0.0.1:0".parse().unwrap(), h.state).unwrap();

        let stream = tokio::net::TcpStream::connect(addr).await;
        assert!(stream.is_ok());
    }
}
