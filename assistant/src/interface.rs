use futures::{pin_mut, StreamExt};
use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::sync::watch;
use tracing::*;

use crate::{
    client::{RelayClient, RelayError},
    history::{self, HistoryEntry},
    reveal::{reveal, DEFAULT_REVEAL_DELAY},
    speech::{SpeechOutcome, SpeechSession},
};

pub const REVISION_PLAN_PROMPT: &str =
    "Create a concise revision plan from the following conversation:\n";

const ASK_FAILED: &str = "Something went wrong.";
const ASK_UNREACHABLE: &str = "Failed to connect to server.";
const PLAN_FAILED: &str = "Could not generate revision.";
const PLAN_UNREACHABLE: &str = "Failed to generate revision plan.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    DisplayingAnswer,
    Error,
}

/// Everything a front-end renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    pub phase: Phase,
    pub loading: bool,
    pub input: String,
    pub subject: String,
    /// The answer revealed so far.
    pub response: String,
    pub error: String,
    pub history: Vec<HistoryEntry>,
    pub revision_plan: String,
}

/// The client side of the assistant.
///
/// Operations that talk to the relay borrow the interface mutably, so a new
/// submission cannot start while an answer is still being revealed.
/// Each change to the `View` is published to subscribers as it happens.
pub struct AssistantInterface {
    client: RelayClient,
    reveal_delay: Duration,
    view: watch::Sender<View>,
    speech: SpeechSession,
}

impl AssistantInterface {
    pub fn new(client: RelayClient) -> Self {
        let (view, _) = watch::channel(View::default());
        Self {
            client,
            reveal_delay: DEFAULT_REVEAL_DELAY,
            view,
            speech: SpeechSession::unavailable(),
        }
    }

    pub fn with_reveal_delay(mut self, reveal_delay: Duration) -> Self {
        self.reveal_delay = reveal_delay;
        self
    }

    pub fn with_speech(mut self, speech: SpeechSession) -> Self {
        self.speech = speech;
        self
    }

    pub fn view(&self) -> View {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.view.subscribe()
    }

    fn update(&self, modify: impl FnOnce(&mut View)) {
        self.view.send_modify(modify);
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        let input = input.into();
        self.update(|v| v.input = input);
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        let subject = subject.into();
        self.update(|v| v.subject = subject);
    }

    /// Sends the current input, reveals the answer and records it in the history.
    pub async fn submit(&mut self) -> Phase {
        let (question, subject) = {
            let view = self.view.borrow();
            (view.input.clone(), view.subject.clone())
        };
        self.update(|v| {
            v.phase = Phase::Submitting;
            v.loading = true;
            v.error.clear();
            v.response.clear();
        });

        match self.client.ask(&question, &subject).await {
            Ok(answer) => {
                self.update(|v| v.phase = Phase::DisplayingAnswer);
                let chars = reveal(&answer, self.reveal_delay);
                pin_mut!(chars);
                while let Some(c) = chars.next().await {
                    self.update(|v| v.response.push(c));
                }

                let entry = HistoryEntry {
                    subject,
                    question,
                    answer,
                };
                self.update(|v| {
                    v.history.push(entry);
                    v.loading = false;
                });
                debug!("submit answered, history={}", self.view.borrow().history.len());
            }
            Err(why) => {
                warn!("submit failed: {}", why);
                let message = match why {
                    RelayError::Rejected {
                        message: Some(message),
                        ..
                    } => message,
                    RelayError::Rejected { message: None, .. } => ASK_FAILED.to_string(),
                    _ => ASK_UNREACHABLE.to_string(),
                };
                self.update(|v| {
                    v.error = message;
                    v.phase = Phase::Error;
                    v.loading = false;
                });
            }
        }
        self.view.borrow().phase
    }

    /// Resets input, answer and error. Subject, history and revision plan are kept.
    pub fn clear(&mut self) {
        self.update(|v| {
            v.input.clear();
            v.response.clear();
            v.error.clear();
            v.phase = Phase::Idle;
        });
    }

    pub fn export(&self) -> String {
        history::export(&self.view.borrow().history)
    }

    pub async fn export_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let history = self.view.borrow().history.clone();
        let path = history::export_to(&history, dir).await?;
        info!("exported {} entries to {}", history.len(), path.display());
        Ok(path)
    }

    /// Asks the relay for a revision plan built from the whole history.
    /// Returns false without calling the relay when the history is empty.
    pub async fn generate_revision_plan(&mut self) -> bool {
        let (previous, subject, empty) = {
            let view = self.view.borrow();
            (view.phase, view.subject.clone(), view.history.is_empty())
        };
        if empty {
            return false;
        }
        let question = format!("{}{}", REVISION_PLAN_PROMPT, self.export());

        self.update(|v| {
            v.phase = Phase::Submitting;
            v.loading = true;
            v.revision_plan.clear();
        });

        match self.client.ask(&question, &subject).await {
            Ok(plan) => self.update(|v| {
                v.revision_plan = plan;
                v.phase = previous;
                v.loading = false;
            }),
            Err(why) => {
                warn!("revision plan failed: {}", why);
                let message = if why.is_network() {
                    PLAN_UNREACHABLE
                } else {
                    PLAN_FAILED
                };
                self.update(|v| {
                    v.error = message.to_string();
                    v.phase = Phase::Error;
                    v.loading = false;
                });
            }
        }
        true
    }

    /// Captures one utterance and, on a transcript, replaces the input with it.
    pub async fn speech_input(&mut self) -> Option<SpeechOutcome> {
        let outcome = self.speech.capture().await?;
        if let SpeechOutcome::Transcript(transcript) = &outcome {
            let transcript = transcript.clone();
            self.update(|v| v.input = transcript);
        }
        Some(outcome)
    }
}
