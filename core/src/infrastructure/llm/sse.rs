use std::pin::pin;

use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Response;

use crate::domain::common::entities::app_errors::CoreError;

const DONE_MARKER: &str = "[DONE]";

/// Concatenates the text of every server-sent event, in arrival order.
///
/// `extract` pulls the text out of one `data:` payload; `None` means the
/// event carried no text. Stops at `[DONE]` or the end of the stream.
pub(crate) async fn collect_sse_text<F>(response: Response, mut extract: F) -> Result<String, CoreError>
where
    F: FnMut(&str) -> Result<Option<String>, CoreError>,
{
    let mut events = pin!(response.bytes_stream().eventsource());
    let mut text = String::new();
    let mut chunks = 0usize;

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| CoreError::Transport {
            status: None,
            message: format!("event stream interrupted: {e}"),
        })?;

        let data = event.data.trim();
        if data.is_empty() {
            continue;
        }
        if data == DONE_MARKER {
            break;
        }
        if let Some(chunk) = extract(data)? {
            text.push_str(&chunk);
            chunks += 1;
        }
    }

    tracing::debug!(chunks, chars = text.len(), "collected streamed reply");
    Ok(text)
}

pub(crate) fn invalid_chunk(error: serde_json::Error) -> CoreError {
    CoreError::Transport {
        status: None,
        message: format!("invalid stream chunk: {error}"),
    }
}
