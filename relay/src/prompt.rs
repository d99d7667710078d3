use text_completion::{ChatMessage, CompletionRequest};

use crate::ModelConfig;

pub const SYSTEM_PROMPT: &str = "You are a highly knowledgeable and supportive AI tutor. \
Respond clearly, personally, and helpfully to student questions. \
Provide revision plans when asked.";

pub fn user_message(question: &str, subject: Option<&str>) -> String {
    match subject {
        Some(subject) if !subject.is_empty() => format!("Subject: {}\n\n{}", subject, question),
        _ => question.to_string(),
    }
}

pub fn build_request(model: &ModelConfig, question: &str, subject: Option<&str>) -> CompletionRequest {
    CompletionRequest {
        model: model.model.clone(),
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_message(question, subject)),
        ],
        temperature: model.temperature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_completion::ChatRole;

    #[test]
    fn test_user_message_with_subject() {
        assert_eq!(
            user_message("What is a stack?", Some("DBMS")),
            "Subject: DBMS\n\nWhat is a stack?"
        );
    }

    #[test]
    fn test_user_message_without_subject() {
        assert_eq!(user_message("What is a stack?", None), "What is a stack?");
        assert_eq!(user_message("What is a stack?", Some("")), "What is a stack?");
    }

    #[test]
    fn test_build_request() {
        let model = ModelConfig {
            model: "mixtral-8x7b-32768".to_string(),
            temperature: 0.2,
        };
        let request = build_request(&model, "Explain recursion", Some("Python"));

        assert_eq!(request.model, "mixtral-8x7b-32768");
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert_eq!(
            request.messages[1].content,
            "Subject: Python\n\nExplain recursion"
        );
    }
}
