//! Transport to the chat backend.
//!
//! `ChatBackend` is the seam between the session state machine and the
//! network. `HttpBackend` implements it with `reqwest` for the JSON calls and
//! `reqwest-eventsource` for the server-sent-event channel.

use crate::{
    channel::{ChannelError, ChannelEvent, EventStream},
    error::ChatError,
    protocol::{HealthResponse, NewStreamResponse, PostMessageBody},
};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, Url};
use reqwest_eventsource::{Error as EventSourceError, Event, EventSource, retry::Never};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Defines the contract for talking to a chat backend.
///
/// Implementations must not retry: a failed POST is reported as an error and
/// a broken channel is reported through its `ChannelEvent`s.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Probes the backend's health endpoint.
    async fn health(&self) -> Result<HealthResponse, ChatError>;

    /// Submits a user message to a chat and returns the id of the stream
    /// that will carry the reply.
    async fn post_message(&self, chat_id: &str, message: &str) -> Result<String, ChatError>;

    /// Opens the event channel for a stream. The channel is closed when the
    /// returned stream is dropped.
    async fn open_stream(&self, chat_id: &str, stream_id: &str) -> Result<EventStream, ChatError>;
}

/// A `ChatBackend` that speaks HTTP/JSON and server-sent events.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Creates a backend rooted at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str) -> Result<Self, ChatError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a backend that reuses an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ChatError> {
        let base_url = Url::parse(base_url).map_err(|_| ChatError::Url(base_url.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ChatError::Url(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ChatError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ChatError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ChatError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                status,
                url: response.url().to_string(),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn health(&self) -> Result<HealthResponse, ChatError> {
        let url = self.endpoint(&["health"])?;
        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn post_message(&self, chat_id: &str, message: &str) -> Result<String, ChatError> {
        let url = self.endpoint(&["chats", chat_id, "messages"])?;
        debug!(%url, "Posting user message");
        let response = self
            .client
            .post(url)
            .json(&PostMessageBody {
                message: message.to_string(),
            })
            .send()
            .await?;
        let new_stream: NewStreamResponse = Self::read_json(response).await?;
        Ok(new_stream.stream_id)
    }

    async fn open_stream(&self, chat_id: &str, stream_id: &str) -> Result<EventStream, ChatError> {
        let url = self.endpoint(&["chats", chat_id, "streams", stream_id])?;
        info!(%url, "Opening event stream");
        let mut source = EventSource::new(self.client.get(url))
            .map_err(|e| ChatError::Channel(e.to_string()))?;
        source.set_retry_policy(Box::new(Never));

        Ok(Box::pin(source.map(|item| match item {
            Ok(Event::Open) => ChannelEvent::Opened,
            Ok(Event::Message(msg)) => ChannelEvent::Message {
                event: msg.event,
                data: msg.data,
            },
            Err(e) => ChannelEvent::Error(classify_transport_error(e)),
        })))
    }
}

/// Errors that can never turn into an event stream are terminal; everything
/// else may be followed by more events.
fn classify_transport_error(err: EventSourceError) -> ChannelError {
    match err {
        EventSourceError::InvalidStatusCode(status, _) => {
            ChannelError::terminal(format!("Unexpected status {status}"))
        }
        EventSourceError::InvalidContentType(content_type, _) => ChannelError::terminal(format!(
            "Unexpected content type {}",
            content_type.to_str().unwrap_or("<binary>")
        )),
        other => ChannelError::transient(other.to_string()),
    }
}
