//! Events delivered by an open stream channel and their interpretation.
//!
//! Transports translate whatever their event-source library yields into
//! `ChannelEvent`s. `interpret` then decides, without any I/O, what each
//! event means for the session: a fragment to merge, a clean close, a
//! terminal failure, or something to log and skip.

use crate::protocol::{
    CLOSED_CONNECTION_EVENT, DEFAULT_EVENT, ERROR_EVENT, PayloadKind, STREAM_NOT_FOUND,
    StreamErrorBody, StreamingPayload,
};
use futures::Stream;
use std::pin::Pin;

/// A stream of events from one open channel. Dropping it closes the channel.
pub type EventStream = Pin<Box<dyn Stream<Item = ChannelEvent> + Send>>;

/// Whether a transport error can still be followed by more events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Terminal,
}

/// A transport-level failure reported on the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ChannelError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Terminal,
            message: message.into(),
        }
    }
}

/// One event received on the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The connection was established.
    Opened,
    /// An SSE event. Unnamed events carry `DEFAULT_EVENT` or an empty name.
    Message { event: String, data: String },
    /// The transport reported a failure.
    Error(ChannelError),
}

impl ChannelEvent {
    /// Shorthand for an unnamed SSE event.
    pub fn data(data: impl Into<String>) -> Self {
        Self::Message {
            event: DEFAULT_EVENT.to_string(),
            data: data.into(),
        }
    }

    /// Shorthand for a named SSE event.
    pub fn named(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Message {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// What the session should do with a channel event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Merge `data` into the transcript under `message_id`.
    Fragment {
        message_id: String,
        kind: PayloadKind,
        data: Option<String>,
        name: Option<String>,
    },
    /// The backend failed one item but the stream continues.
    BackendError(String),
    /// The backend finished the stream.
    Closed,
    /// The stream id is unknown to the backend.
    NotFound,
    /// The backend or transport ended the stream with a failure.
    Failed(String),
    /// A recoverable transport error; more events may follow.
    Transient(String),
    /// Nothing to do (connection opened, unknown event, unusable payload).
    Ignored,
}

/// Classifies a channel event.
pub fn interpret(event: ChannelEvent) -> Signal {
    match event {
        ChannelEvent::Opened => Signal::Ignored,
        ChannelEvent::Error(err) => match err.kind {
            ErrorKind::Transient => Signal::Transient(err.message),
            ErrorKind::Terminal => Signal::Failed(err.message),
        },
        ChannelEvent::Message { event, data } => match event.as_str() {
            "" | DEFAULT_EVENT => interpret_payload(&data),
            CLOSED_CONNECTION_EVENT => Signal::Closed,
            ERROR_EVENT => interpret_error_event(&data),
            other => {
                tracing::debug!(event = %other, "Ignoring unknown stream event");
                Signal::Ignored
            }
        },
    }
}

fn interpret_payload(data: &str) -> Signal {
    let payload = match serde_json::from_str::<StreamingPayload>(data) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, data = %data, "Skipping malformed stream payload");
            return Signal::Ignored;
        }
    };

    match (payload.kind, payload.message_id) {
        (PayloadKind::Error, _) => Signal::BackendError(payload.data.unwrap_or_default()),
        (kind, Some(message_id)) => Signal::Fragment {
            message_id,
            kind,
            data: payload.data,
            name: payload.name,
        },
        (kind, None) => {
            tracing::warn!(?kind, "Skipping stream payload without message_id");
            Signal::Ignored
        }
    }
}

fn interpret_error_event(data: &str) -> Signal {
    let reason = serde_json::from_str::<StreamErrorBody>(data)
        .map(|body| body.error)
        .unwrap_or_else(|_| data.trim().to_string());

    if reason == STREAM_NOT_FOUND {
        Signal::NotFound
    } else {
        Signal::Failed(reason)
    }
}
