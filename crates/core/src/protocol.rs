//! Defines the JSON and SSE message formats exchanged with the chat backend.

use serde::{Deserialize, Serialize};

/// Named SSE event that signals a clean end of stream.
pub const CLOSED_CONNECTION_EVENT: &str = "closedConnection";
/// Named SSE event that signals a terminal backend failure.
pub const ERROR_EVENT: &str = "error";
/// Name given to unnamed SSE events by the event-stream parser.
pub const DEFAULT_EVENT: &str = "message";
/// Reason carried by the `error` event when the stream id is unknown.
pub const STREAM_NOT_FOUND: &str = "stream not found";

/// Request body of `POST /chats/{chat_id}/messages`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PostMessageBody {
    pub message: String,
}

/// Response body of `POST /chats/{chat_id}/messages`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewStreamResponse {
    pub stream_id: String,
}

/// Response body of `GET /health`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

/// Kind of content carried by a streamed payload.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// A piece of generated text.
    Text,
    /// A piece of a tool call's arguments.
    ToolCallChunk,
    /// The backend failed to produce one item of the stream.
    Error,
}

/// Data of a default (unnamed) SSE event.
///
/// `message_id` is absent only on `PayloadKind::Error` payloads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamingPayload {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: PayloadKind,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Data of a named `error` SSE event.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_payload_deserialization() {
        let payload: StreamingPayload =
            serde_json::from_str(r#"{"message_id":"m1","type":"text","data":"Hel"}"#).unwrap();
        assert_eq!(payload.message_id.as_deref(), Some("m1"));
        assert_eq!(payload.kind, PayloadKind::Text);
        assert_eq!(payload.data.as_deref(), Some("Hel"));
        assert_eq!(payload.name, None);
    }

    #[test]
    fn test_tool_call_chunk_with_null_data_and_name() {
        let payload: StreamingPayload = serde_json::from_str(
            r#"{"message_id":"m2","type":"tool_call_chunk","data":null,"name":"code_sandbox"}"#,
        )
        .unwrap();
        assert_eq!(payload.kind, PayloadKind::ToolCallChunk);
        assert_eq!(payload.data, None);
        assert_eq!(payload.name.as_deref(), Some("code_sandbox"));
    }

    #[test]
    fn test_error_payload_without_message_id() {
        let payload: StreamingPayload =
            serde_json::from_str(r#"{"type":"error","data":"boom"}"#).unwrap();
        assert_eq!(payload.kind, PayloadKind::Error);
        assert_eq!(payload.message_id, None);
        assert_eq!(payload.data.as_deref(), Some("boom"));
    }

    #[test]
    fn test_unknown_payload_kind_is_rejected() {
        let result =
            serde_json::from_str::<StreamingPayload>(r#"{"message_id":"m1","type":"image"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_post_message_body_shape() {
        let body = PostMessageBody {
            message: "hi".to_string(),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"message":"hi"}"#);
    }

    #[test]
    fn test_stream_error_body() {
        let body: StreamErrorBody = serde_json::from_str(r#"{"error":"stream not found"}"#).unwrap();
        assert_eq!(body.error, STREAM_NOT_FOUND);
    }
}
