use serde::{Deserialize, Serialize};

pub const THINKING_TEXT: &str = "AI is thinking...";

/// The sender of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "AI Assistant",
            Role::System => "System",
        }
    }
}

/// A single entry in the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub pending: bool,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            pending: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// The "AI is thinking..." placeholder shown while an answer is awaited
    pub fn thinking() -> Self {
        Self {
            role: Role::Assistant,
            text: THINKING_TEXT.to_string(),
            pending: true,
        }
    }
}

/// Ordered, append-only chat log.
///
/// Entries are never edited. The only removal is of an entry tagged
/// `pending`, which is looked up by that tag rather than by a held handle.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Remove the first pending entry. Returns false if there was none.
    pub fn remove_pending(&mut self) -> bool {
        match self.messages.iter().position(|m| m.pending) {
            Some(idx) => {
                self.messages.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.messages.iter().any(|m| m.pending)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_pending_finds_tagged_entry() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("hi"));
        transcript.push(Message::thinking());
        transcript.push(Message::system("Knowledge uploaded successfully!"));

        assert!(transcript.remove_pending());
        assert_eq!(transcript.len(), 2);
        assert!(!transcript.has_pending());
        assert_eq!(transcript.messages()[1].role, Role::System);
    }

    #[test]
    fn test_remove_pending_when_already_gone() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("hi"));
        assert!(!transcript.remove_pending());
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_role_display_names() {
        assert_eq!(Role::User.display_name(), "You");
        assert_eq!(Role::Assistant.display_name(), "AI Assistant");
        assert_eq!(Role::System.display_name(), "System");
    }
}
