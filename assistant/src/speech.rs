//! Speech-to-text input.
//!
//! A capture is single-shot: the recognizer receives a `oneshot::Sender` and either
//! sends the final transcript of one utterance or drops the sender to cancel.

use tokio::sync::oneshot::{self, Sender};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            lang: "en-US".to_string(),
            continuous: false,
            interim_results: false,
        }
    }
}

pub trait SpeechRecognizer {
    fn start(&mut self, transcript: Sender<String>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    Transcript(String),
    Cancelled,
}

pub type BoxedRecognizer = Box<dyn SpeechRecognizer + Send>;
pub type RecognizerFactory = Box<dyn FnOnce(&RecognitionSettings) -> Option<BoxedRecognizer> + Send>;

enum Slot {
    Unopened(RecognizerFactory),
    Open(BoxedRecognizer),
    Unavailable,
}

/// Owns the recognizer: opened on first capture, released when the session drops.
pub struct SpeechSession {
    settings: RecognitionSettings,
    slot: Slot,
}

impl SpeechSession {
    pub fn new(settings: RecognitionSettings, factory: RecognizerFactory) -> Self {
        Self {
            settings,
            slot: Slot::Unopened(factory),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            settings: RecognitionSettings::default(),
            slot: Slot::Unavailable,
        }
    }

    fn recognizer(&mut self) -> Option<&mut BoxedRecognizer> {
        if matches!(self.slot, Slot::Unopened(_)) {
            let slot = std::mem::replace(&mut self.slot, Slot::Unavailable);
            if let Slot::Unopened(factory) = slot {
                match factory(&self.settings) {
                    Some(recognizer) => {
                        debug!("speech recognizer opened lang={}", self.settings.lang);
                        self.slot = Slot::Open(recognizer);
                    }
                    None => debug!("speech recognition unavailable"),
                }
            }
        }
        match &mut self.slot {
            Slot::Open(recognizer) => Some(recognizer),
            _ => None,
        }
    }

    /// Captures one utterance. `None` when no recognizer can be opened.
    pub async fn capture(&mut self) -> Option<SpeechOutcome> {
        let (tx, rx) = oneshot::channel();
        self.recognizer()?.start(tx);
        Some(match rx.await {
            Ok(transcript) => SpeechOutcome::Transcript(transcript),
            Err(_) => SpeechOutcome::Cancelled,
        })
    }
}

impl Drop for SpeechSession {
    fn drop(&mut self) {
        if matches!(self.slot, Slot::Open(_)) {
            debug!("speech recognizer released");
        }
    }
}
