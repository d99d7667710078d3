use futures::{stream, Stream, StreamExt};
use std::time::Duration;

pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(20);

/// Yields the characters of `text` one by one, each after `delay`.
pub fn reveal(text: &str, delay: Duration) -> impl Stream<Item = char> {
    let chars: Vec<char> = text.chars().collect();
    stream::iter(chars).then(move |c| async move {
        tokio::time::sleep(delay).await;
        c
    })
}
