use std::{
    fmt, io,
    path::{Path, PathBuf},
};

pub const EXPORT_FILE_NAME: &str = "chat_history.txt";
const ENTRY_SEPARATOR: &str = "\n\n";

/// One answered question, kept for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub subject: String,
    pub question: String,
    pub answer: String,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Subject: {}\nYou: {}\nAI: {}",
            self.subject, self.question, self.answer
        )
    }
}

pub fn export(history: &[HistoryEntry]) -> String {
    history
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

/// Writes the exported history to `dir/chat_history.txt`, replacing any previous export.
pub async fn export_to(history: &[HistoryEntry], dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join(EXPORT_FILE_NAME);
    tokio::fs::write(&path, export(history)).await?;
    Ok(path)
}
