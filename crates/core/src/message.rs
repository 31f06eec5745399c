use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Ai => write!(f, "ai"),
        }
    }
}

/// A single transcript entry.
///
/// User message ids are generated locally; AI message ids come from the
/// `message_id` of the streamed payloads that built the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Creates a user message with a freshly generated id.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: crate::new_id(),
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an AI message under a server-supplied id.
    pub fn ai(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Ai,
            content: content.into(),
        }
    }
}
