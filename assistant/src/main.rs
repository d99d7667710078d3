use assistant::{speech::SpeechOutcome, AssistantInterface, Phase, RelayClient, View};
use std::{env, error::Error, path::PathBuf};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::watch,
};
use tracing::*;
use tracing_subscriber::EnvFilter;

const RELAY_URL_VAR: &str = "LEARNING_ASSISTANT_RELAY_URL";
const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000";

const HELP: &str = "Type a question and press enter. Commands:\n\
    - :subject <name>: Tags the next questions (Python, Machine Learning, Java, ReactJS, DBMS, ...).\n\
    - :clear: Clears the question, the answer and the error.\n\
    - :history: Prints the chat history.\n\
    - :export [dir]: Writes the chat history to chat_history.txt.\n\
    - :plan: Generates a revision plan from the chat history.\n\
    - :speak: Dictates the question.\n\
    - :quit: Leaves.";

#[derive(Debug, PartialEq)]
enum Command {
    Ask(String),
    Subject(String),
    Clear,
    History,
    Export(PathBuf),
    Plan,
    Speak,
    Help,
    Quit,
}

fn parse(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Ask(line.to_string());
    };
    let (name, arg) = rest
        .split_once(' ')
        .map(|(name, arg)| (name, arg.trim()))
        .unwrap_or((rest, ""));

    match name {
        "subject" => Command::Subject(arg.to_string()),
        "clear" => Command::Clear,
        "history" => Command::History,
        "export" if arg.is_empty() => Command::Export(PathBuf::from(".")),
        "export" => Command::Export(PathBuf::from(arg)),
        "plan" => Command::Plan,
        "speak" => Command::Speak,
        "quit" | "q" => Command::Quit,
        _ => Command::Help,
    }
}

/// Prints what changed between two views: the newly revealed characters, errors and plans.
fn changes(shown: &View, view: &View) -> String {
    let mut text = String::new();
    if view.phase == Phase::Submitting && view.loading && !shown.loading {
        text.push_str("Processing...\n");
    }
    let revealed = if view.response.starts_with(&shown.response) {
        shown.response.len()
    } else {
        0
    };
    text.push_str(&view.response[revealed..]);
    if shown.loading && !view.loading && view.phase == Phase::DisplayingAnswer {
        text.push('\n');
    }
    if !view.error.is_empty() && view.error != shown.error {
        text.push_str(&format!("Error: {}\n", view.error));
    }
    if !view.revision_plan.is_empty() && view.revision_plan != shown.revision_plan {
        text.push_str(&format!("Revision plan:\n{}\n", view.revision_plan));
    }
    text
}

async fn render(mut rx: watch::Receiver<View>) {
    let mut shown = View::default();
    let mut out = tokio::io::stdout();
    while rx.changed().await.is_ok() {
        let view = rx.borrow_and_update().clone();
        let text = changes(&shown, &view);
        if !text.is_empty() {
            let _ = out.write_all(text.as_bytes()).await;
            let _ = out.flush().await;
        }
        shown = view;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    info!(
        "Starting... CARGO_PKG_NAME={}, CARGO_PKG_VERSION={}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );

    let relay_url = env::var(RELAY_URL_VAR).unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());
    let client = RelayClient::new(&relay_url);
    info!("Asking {}", client.ask_url());
    let mut interface = AssistantInterface::new(client);
    let renderer = tokio::spawn(render(interface.subscribe()));

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse(&line) {
            Command::Ask(question) => {
                interface.set_input(question);
                interface.submit().await;
            }
            Command::Subject(subject) => interface.set_subject(subject),
            Command::Clear => interface.clear(),
            Command::History => {
                let exported = interface.export();
                if exported.is_empty() {
                    println!("(no history yet)");
                } else {
                    println!("{}", exported);
                }
            }
            Command::Export(dir) => match interface.export_to(&dir).await {
                Ok(path) => println!("History exported to {}", path.display()),
                Err(why) => println!("Export failed: {}", why),
            },
            Command::Plan => {
                if !interface.generate_revision_plan().await {
                    println!("Ask a question first.");
                }
            }
            Command::Speak => match interface.speech_input().await {
                Some(SpeechOutcome::Transcript(transcript)) => println!("Heard: {}", transcript),
                Some(SpeechOutcome::Cancelled) => println!("Nothing heard."),
                None => println!("Speech input is not available in this terminal."),
            },
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    drop(interface);
    let _ = renderer.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse("What is a stack?"),
            Command::Ask("What is a stack?".to_string())
        );
        assert_eq!(parse(""), Command::Ask(String::new()));
        assert_eq!(
            parse(":subject Machine Learning"),
            Command::Subject("Machine Learning".to_string())
        );
        assert_eq!(parse(":subject"), Command::Subject(String::new()));
        assert_eq!(parse(":clear"), Command::Clear);
        assert_eq!(parse(":export"), Command::Export(PathBuf::from(".")));
        assert_eq!(parse(":export /tmp"), Command::Export(PathBuf::from("/tmp")));
        assert_eq!(parse(":plan\r"), Command::Plan);
        assert_eq!(parse(":q"), Command::Quit);
        assert_eq!(parse(":what"), Command::Help);
    }

    #[test]
    fn test_changes_prints_only_new_characters() {
        let shown = View {
            loading: true,
            phase: Phase::DisplayingAnswer,
            response: "A st".to_string(),
            ..View::default()
        };
        let view = View {
            response: "A stack".to_string(),
            ..shown.clone()
        };
        assert_eq!(changes(&shown, &view), "ack");

        let done = View {
            loading: false,
            ..view.clone()
        };
        assert_eq!(changes(&view, &done), "\n");
    }

    #[test]
    fn test_changes_reports_error_and_plan() {
        let shown = View::default();
        let view = View {
            phase: Phase::Error,
            error: "Question is required".to_string(),
            revision_plan: "Day 1".to_string(),
            ..View::default()
        };
        assert_eq!(
            changes(&shown, &view),
            "Error: Question is required\nRevision plan:\nDay 1\n"
        );
    }
}
