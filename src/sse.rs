//! SSE - Relay degli eventi verso il browser come server-sent events
//!
//! Ogni evento viene scritto come `data: {json}\n\n` con un discriminatore
//! `type`. La pipeline gira in un task dedicato e scrive su un canale; lo
//! stream si chiude sempre con un evento `done`, anche in caso di errore.

use crate::clients::{Citation, LlmError};
use crate::core::AppError;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use futures_util::StreamExt;
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseEvent {
    Status {
        message: String,
    },
    Chunk {
        content: String,
    },
    Citations {
        citations: Vec<Citation>,
    },
    Metadata {
        model: String,
        chunks_used: usize,
        duration_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        conversation_id: Option<Uuid>,
    },
    Error {
        message: String,
    },
    Done,
}

impl SseEvent {
    pub fn status(message: impl Into<String>) -> Self {
        SseEvent::Status {
            message: message.into(),
        }
    }

    fn into_event(self) -> Event {
        Event::default().json_data(&self).unwrap_or_else(|e| {
            warn!("Failed to serialize SSE event: {:?}", e);
            Event::default().data(r#"{"type":"error","message":"Internal server error"}"#)
        })
    }
}

/// Il client ha chiuso la connessione
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

/// Motivo per cui una pipeline si è interrotta
#[derive(Debug)]
pub enum PipelineError {
    Disconnected,
    Failed(AppError),
}

impl From<SinkClosed> for PipelineError {
    fn from(_: SinkClosed) -> Self {
        PipelineError::Disconnected
    }
}

impl From<AppError> for PipelineError {
    fn from(err: AppError) -> Self {
        PipelineError::Failed(err)
    }
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        PipelineError::Failed(err.into())
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        PipelineError::Failed(err.into())
    }
}

/// Lato di scrittura dello stream, passato alla pipeline
#[derive(Clone)]
pub struct EventSink {
    tx: UnboundedSender<SseEvent>,
}

impl EventSink {
    pub fn send(&self, event: SseEvent) -> Result<(), SinkClosed> {
        self.tx.send(event).map_err(|_| SinkClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Avvia la pipeline in un task e restituisce la risposta SSE.
/// Garantisce un solo `done` finale; un errore produce un evento `error` prima di `done`.
pub fn relay<F, Fut>(pipeline: F) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    F: FnOnce(EventSink) -> Fut,
    Fut: Future<Output = Result<(), PipelineError>> + Send + 'static,
{
    let (tx, rx) = unbounded_channel::<SseEvent>();
    let task = pipeline(EventSink { tx: tx.clone() });

    tokio::spawn(async move {
        match task.await {
            Ok(()) => debug!("SSE pipeline completed"),
            Err(PipelineError::Disconnected) => debug!("SSE client disconnected"),
            Err(PipelineError::Failed(err)) => {
                warn!(status = %err.status(), "SSE pipeline failed: {}", err.message());
                let _ = tx.send(SseEvent::Error {
                    message: err.message().to_string(),
                });
            }
        }
        let _ = tx.send(SseEvent::Done);
    });

    let stream = UnboundedReceiverStream::new(rx).map(|event| Ok(event.into_event()));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Interpreta un body SSE (`data: {...}` separati da righe vuote) come lista di JSON
pub fn parse_sse_body(body: &str) -> Vec<serde_json::Value> {
    body.split("\n\n")
        .filter_map(|frame| {
            let data: String = frame
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(str::trim_start)
                .collect::<Vec<_>>()
                .join("\n");
            if data.is_empty() {
                return None;
            }
            serde_json::from_str(&data).ok()
        })
        .collect()
}
