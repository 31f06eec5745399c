//! LangChat Core
//!
//! Client-side logic for a streaming chat backend: the transcript and its
//! fragment merge rule, the JSON/SSE wire protocol, classification of
//! channel events, the `ChatBackend` transport seam with its HTTP
//! implementation, and the `ChatSession` state machine that ties them
//! together. Surfaces (such as the terminal client) drive a `ChatSession`
//! and render the `SessionEvent`s it emits.

pub mod backend;
pub mod channel;
pub mod error;
pub mod message;
pub mod protocol;
pub mod session;
pub mod transcript;

pub use backend::{ChatBackend, HttpBackend};
pub use error::ChatError;
pub use message::{Message, Role};
pub use session::{ChatSession, Phase, SessionEvent, StreamFailure, StreamOutcome, Submission};
pub use transcript::{Transcript, TranscriptUpdate};

/// Generates a random, UUID-shaped identifier.
///
/// Used for the per-session chat id and for user message ids. No
/// cryptographic strength is required.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
