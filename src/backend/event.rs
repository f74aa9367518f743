//! Normalized backend events and the fold that turns a turn's event stream
//! into one reply.

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::types::{AgentReply, TokenUsage};

/// One event from a backend's native stream, decoded into a tagged form.
///
/// Each backend adapter owns the decoding from its wire format into this
/// enum; nothing downstream inspects raw backend payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_kind", rename_all = "snake_case")]
pub enum BackendEvent {
    /// The backend announced the start of a turn.
    Started { session_id: Option<String> },
    /// A complete snapshot of the reply text so far. Later snapshots
    /// supersede earlier ones.
    Content { text: String },
    /// The backend's final result frame. `text` of `None` means the frame
    /// carried no result payload and leaves earlier content in place.
    Result {
        text: Option<String>,
        usage: Option<TokenUsage>,
    },
    /// A standalone usage report.
    Usage(TokenUsage),
    /// An event the adapter recognizes but has no use for; kept so verbose
    /// logging can show the full turn.
    Other { kind: String },
}

/// Fold a turn's event stream into one [`AgentReply`].
///
/// Last value wins: the latest `Content` or `Result` text becomes the reply
/// text, the latest usage report becomes the reply usage. A stream that ends
/// without text or usage yields an empty reply rather than an error.
pub async fn collect_reply<S>(stream: S, verbose: bool) -> Result<AgentReply>
where
    S: Stream<Item = Result<BackendEvent>>,
{
    futures::pin_mut!(stream);

    let mut reply = AgentReply::default();
    let mut saw_usage = false;

    while let Some(event) = stream.next().await {
        let event = event?;
        if verbose {
            info!(?event, "backend event");
        } else {
            debug!(?event, "backend event");
        }

        match event {
            BackendEvent::Started { .. } | BackendEvent::Other { .. } => {}
            BackendEvent::Content { text } => reply.text = text,
            BackendEvent::Result { text, usage } => {
                if let Some(text) = text {
                    reply.text = text;
                }
                if let Some(usage) = usage {
                    reply.usage = usage;
                    saw_usage = true;
                }
            }
            BackendEvent::Usage(usage) => {
                reply.usage = usage;
                saw_usage = true;
            }
        }
    }

    if reply.text.is_empty() {
        warn!("backend stream ended without a result text");
    }
    if !saw_usage {
        warn!("backend stream ended without a usage report");
    }

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;
    use crate::error::HowdahError;

    fn events(items: Vec<BackendEvent>) -> impl Stream<Item = Result<BackendEvent>> {
        stream::iter(items.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn latest_content_wins() {
        let reply = collect_reply(
            events(vec![
                BackendEvent::Started { session_id: None },
                BackendEvent::Content {
                    text: "draft".into(),
                },
                BackendEvent::Content {
                    text: "final".into(),
                },
            ]),
            false,
        )
        .await
        .unwrap();
        assert_eq!(reply.text, "final");
        assert!(reply.usage.is_zero());
    }

    #[tokio::test]
    async fn result_supersedes_content_and_carries_usage() {
        let reply = collect_reply(
            events(vec![
                BackendEvent::Content {
                    text: "working".into(),
                },
                BackendEvent::Result {
                    text: Some("done".into()),
                    usage: Some(TokenUsage::new(12, 34)),
                },
            ]),
            false,
        )
        .await
        .unwrap();
        assert_eq!(reply.text, "done");
        assert_eq!(reply.usage, TokenUsage::new(12, 34));
    }

    #[tokio::test]
    async fn result_without_text_keeps_earlier_content() {
        let reply = collect_reply(
            events(vec![
                BackendEvent::Content {
                    text: "answer".into(),
                },
                BackendEvent::Result {
                    text: None,
                    usage: Some(TokenUsage::new(1, 2)),
                },
            ]),
            false,
        )
        .await
        .unwrap();
        assert_eq!(reply.text, "answer");
        assert_eq!(reply.usage, TokenUsage::new(1, 2));
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_reply() {
        let reply = collect_reply(events(vec![]), false).await.unwrap();
        assert_eq!(reply, AgentReply::default());
    }

    #[tokio::test]
    async fn later_usage_report_replaces_earlier() {
        let reply = collect_reply(
            events(vec![
                BackendEvent::Usage(TokenUsage::new(5, 5)),
                BackendEvent::Usage(TokenUsage::new(7, 9)),
            ]),
            false,
        )
        .await
        .unwrap();
        assert_eq!(reply.usage, TokenUsage::new(7, 9));
    }

    #[tokio::test]
    async fn stream_error_propagates() {
        let items: Vec<Result<BackendEvent>> = vec![
            Ok(BackendEvent::Content {
                text: "partial".into(),
            }),
            Err(HowdahError::sdk("test", "boom")),
        ];
        let err = collect_reply(stream::iter(items), false).await.unwrap_err();
        assert!(matches!(err, HowdahError::Sdk { .. }));
    }
}
