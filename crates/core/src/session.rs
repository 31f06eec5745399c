//! The chat session: transcript, input, and the submit/stream lifecycle.
//!
//! A session moves `Idle -> AwaitingStreamId -> Streaming -> Idle`. The
//! loading flag exposed to surfaces is simply "not idle". Every fragment is
//! folded into the transcript in place and forwarded to an optional observer
//! channel so a surface can render incrementally.

use crate::{
    backend::ChatBackend,
    channel::{ChannelEvent, Signal, interpret},
    error::ChatError,
    message::Message,
    transcript::{Transcript, TranscriptUpdate},
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Where the session is in the submit/stream lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingStreamId,
    Streaming,
}

/// Why a stream ended without a clean close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFailure {
    /// The backend does not know the stream id.
    NotFound,
    /// The backend reported a terminal error.
    Backend(String),
}

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The backend sent `closedConnection`.
    Completed,
    /// A terminal error closed the channel.
    Failed(StreamFailure),
    /// The channel ended without any termination event.
    Disconnected,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The input was empty after trimming; nothing happened.
    EmptyInput,
    /// A request is already in flight; nothing happened.
    Busy,
    /// The message was accepted and its reply will arrive on `stream_id`.
    Accepted { stream_id: String },
}

/// Notifications emitted to an observer while the session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Transcript(TranscriptUpdate),
    /// The backend failed one item of the stream; the stream continues.
    BackendError(String),
    Finished(StreamOutcome),
}

/// Whether the consume loop keeps reading after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop(StreamOutcome),
}

/// State of one chat conversation, scoped by a chat id generated at creation.
#[derive(Debug)]
pub struct ChatSession {
    chat_id: String,
    transcript: Transcript,
    input: String,
    phase: Phase,
    updates: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Creates an idle session with a fresh chat id and an empty transcript.
    pub fn new() -> Self {
        Self::with_chat_id(crate::new_id())
    }

    pub fn with_chat_id(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            transcript: Transcript::new(),
            input: String::new(),
            phase: Phase::Idle,
            updates: None,
        }
    }

    /// Returns a receiver for this session's `SessionEvent`s, replacing any
    /// previous observer.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.updates = Some(tx);
        rx
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Submits the current input.
    ///
    /// Does nothing when the trimmed input is empty or a request is already
    /// in flight. Otherwise appends the user message, clears the input and
    /// posts the trimmed text. On success the session waits for `consume`
    /// to open the stream. On failure it returns to idle; the user message
    /// stays in the transcript.
    #[instrument(skip_all, fields(chat_id = %self.chat_id))]
    pub async fn submit(&mut self, backend: &dyn ChatBackend) -> Result<Submission, ChatError> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return Ok(Submission::EmptyInput);
        }
        if self.is_loading() {
            debug!("Ignoring submit while a request is in flight");
            return Ok(Submission::Busy);
        }

        let update = self.transcript.push(Message::user(text.clone()));
        self.notify(SessionEvent::Transcript(update));
        self.input.clear();
        self.phase = Phase::AwaitingStreamId;

        match backend.post_message(&self.chat_id, &text).await {
            Ok(stream_id) => {
                info!(%stream_id, "Message accepted");
                Ok(Submission::Accepted { stream_id })
            }
            Err(e) => {
                error!(error = %e, "Failed to send message");
                self.phase = Phase::Idle;
                Err(e)
            }
        }
    }

    /// Opens the channel for `stream_id` and folds its events into the
    /// transcript until the stream ends. The channel is dropped on every
    /// exit path and the session is idle afterwards.
    #[instrument(skip_all, fields(chat_id = %self.chat_id, %stream_id))]
    pub async fn consume(
        &mut self,
        backend: &dyn ChatBackend,
        stream_id: &str,
    ) -> Result<StreamOutcome, ChatError> {
        let mut events = match backend.open_stream(&self.chat_id, stream_id).await {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "Failed to open event stream");
                self.phase = Phase::Idle;
                return Err(e);
            }
        };
        self.phase = Phase::Streaming;

        let outcome = loop {
            let Some(event) = events.next().await else {
                warn!("Event stream ended without a termination event");
                break StreamOutcome::Disconnected;
            };
            if let Control::Stop(outcome) = self.apply(event) {
                break outcome;
            }
        };
        drop(events);

        self.finish(outcome.clone());
        Ok(outcome)
    }

    /// Submits the current input and, when accepted, streams the reply.
    ///
    /// Returns `None` when the submission was ignored.
    pub async fn send(
        &mut self,
        backend: &dyn ChatBackend,
    ) -> Result<Option<StreamOutcome>, ChatError> {
        match self.submit(backend).await? {
            Submission::Accepted { stream_id } => {
                Ok(Some(self.consume(backend, &stream_id).await?))
            }
            Submission::EmptyInput | Submission::Busy => Ok(None),
        }
    }

    /// Applies one channel event to the session.
    ///
    /// Fragments are merged into the transcript. Transient errors, backend
    /// item errors and unusable events leave the stream open.
    pub fn apply(&mut self, event: ChannelEvent) -> Control {
        match interpret(event) {
            Signal::Fragment {
                message_id,
                kind,
                data,
                name,
            } => {
                debug!(%message_id, ?kind, ?name, "Merging fragment");
                let update = self.transcript.merge_fragment(&message_id, data.as_deref());
                self.notify(SessionEvent::Transcript(update));
                Control::Continue
            }
            Signal::BackendError(message) => {
                warn!(%message, "Backend reported an error inside the stream");
                self.notify(SessionEvent::BackendError(message));
                Control::Continue
            }
            Signal::Closed => {
                info!("Stream closed by backend");
                Control::Stop(StreamOutcome::Completed)
            }
            Signal::NotFound => {
                warn!("Backend does not know this stream");
                Control::Stop(StreamOutcome::Failed(StreamFailure::NotFound))
            }
            Signal::Failed(reason) => {
                error!(%reason, "Stream failed");
                Control::Stop(StreamOutcome::Failed(StreamFailure::Backend(reason)))
            }
            Signal::Transient(reason) => {
                warn!(%reason, "Transient stream error, keeping channel open");
                Control::Continue
            }
            Signal::Ignored => Control::Continue,
        }
    }

    fn finish(&mut self, outcome: StreamOutcome) {
        self.phase = Phase::Idle;
        self.notify(SessionEvent::Finished(outcome));
    }

    fn notify(&self, event: SessionEvent) {
        if let Some(tx) = &self.updates {
            if tx.send(event).is_err() {
                warn!("Failed to publish session event: receiver dropped.");
            }
        }
    }
}
