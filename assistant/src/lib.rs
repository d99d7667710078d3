//! The client side of the learning assistant.
//!
//! `AssistantInterface` holds what a student sees: the question being typed, the
//! answer as it is revealed, the session history and the latest revision plan.
//! It talks to the relay over HTTP and never to the completion provider directly.

mod client;
mod history;
mod interface;
mod reveal;
pub mod speech;

pub use client::{RelayClient, RelayError, ASK_PATH};
pub use history::{HistoryEntry, EXPORT_FILE_NAME};
pub use interface::{AssistantInterface, Phase, View, REVISION_PLAN_PROMPT};
pub use reveal::DEFAULT_REVEAL_DELAY;
