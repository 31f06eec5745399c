//! The ordered, append-only list of chat messages and its fragment merge rule.

use crate::message::{Message, Role};

/// A change applied to the transcript, reported to observers for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptUpdate {
    /// A new entry was pushed at `index`.
    Appended {
        index: usize,
        role: Role,
        content: String,
    },
    /// `delta` was appended to the content of the entry at `index`.
    Extended { index: usize, delta: String },
}

/// Ordered sequence of user and AI messages.
///
/// Entries are never removed or reordered. Only the last entry is ever
/// extended by `merge_fragment`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }

    /// Appends a complete message.
    pub fn push(&mut self, message: Message) -> TranscriptUpdate {
        let update = TranscriptUpdate::Appended {
            index: self.entries.len(),
            role: message.role,
            content: message.content.clone(),
        };
        self.entries.push(message);
        update
    }

    /// Folds one streamed fragment into the transcript.
    ///
    /// If the last entry carries `message_id`, `data` is appended to it in
    /// place. Otherwise a new AI entry is started under `message_id`. Missing
    /// data counts as an empty fragment. Fragments of one message must
    /// arrive contiguously; an id that reappears after another message
    /// starts a second entry.
    pub fn merge_fragment(&mut self, message_id: &str, data: Option<&str>) -> TranscriptUpdate {
        let data = data.unwrap_or_default();
        match self.entries.last_mut() {
            Some(last) if last.id == message_id => {
                last.content.push_str(data);
                TranscriptUpdate::Extended {
                    index: self.entries.len() - 1,
                    delta: data.to_string(),
                }
            }
            _ => self.push(Message::ai(message_id, data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_with_one_id_concatenate_into_one_entry() {
        let mut transcript = Transcript::new();
        for piece in ["The ", "quick ", "brown ", "fox"] {
            transcript.merge_fragment("m1", Some(piece));
        }
        assert_eq!(transcript.len(), 1);
        let last = transcript.last().unwrap();
        assert_eq!(last.id, "m1");
        assert_eq!(last.role, Role::Ai);
        assert_eq!(last.content, "The quick brown fox");
    }

    #[test]
    fn test_new_id_appends_after_previous_entry() {
        let mut transcript = Transcript::new();
        transcript.merge_fragment("m1", Some("calling tool"));
        let update = transcript.merge_fragment("m2", Some("result"));

        assert_eq!(
            update,
            TranscriptUpdate::Appended {
                index: 1,
                role: Role::Ai,
                content: "result".to_string(),
            }
        );
        let contents: Vec<_> = transcript.entries().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["calling tool", "result"]);
    }

    #[test]
    fn test_missing_data_is_empty_fragment() {
        let mut transcript = Transcript::new();
        let first = transcript.merge_fragment("m1", None);
        assert_eq!(
            first,
            TranscriptUpdate::Appended {
                index: 0,
                role: Role::Ai,
                content: String::new(),
            }
        );
        transcript.merge_fragment("m1", Some("ok"));
        let extended = transcript.merge_fragment("m1", None);
        assert_eq!(
            extended,
            TranscriptUpdate::Extended {
                index: 0,
                delta: String::new(),
            }
        );
        assert_eq!(transcript.last().unwrap().content, "ok");
    }

    #[test]
    fn test_fragment_never_extends_user_message() {
        let mut transcript = Transcript::new();
        let user = Message::user("hi");
        let user_id = user.id.clone();
        transcript.push(user);

        transcript.merge_fragment("m1", Some("Hello"));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.entries()[0].content, "hi");
        assert_eq!(transcript.entries()[0].id, user_id);
    }

    #[test]
    fn test_only_last_entry_is_extended() {
        let mut transcript = Transcript::new();
        transcript.merge_fragment("m1", Some("a"));
        transcript.merge_fragment("m2", Some("b"));
        transcript.merge_fragment("m1", Some("c"));

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.entries()[0].content, "a");
        assert_eq!(transcript.entries()[2].id, "m1");
        assert_eq!(transcript.entries()[2].content, "c");
    }
}
