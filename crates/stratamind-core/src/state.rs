//! UI-agnostic connection and control types
//!
//! These are shared between the terminal UI and the one-shot CLI commands
//! and don't depend on any specific UI framework.

use serde::{Deserialize, Serialize};

/// Reachability of the StrataMind backend as last observed by a health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Offline,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Connecting to backend...",
            ConnectionState::Connected => "Backend Connected",
            ConnectionState::Offline => "Backend Offline",
        }
    }

    pub fn is_connected(&self) -> bool {
        *self == ConnectionState::Connected
    }
}

/// The four controls whose availability depends on the backend being reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    UploadButton,
    SendButton,
    QuestionInput,
    KnowledgeInput,
}

impl Control {
    pub fn all() -> [Control; 4] {
        [
            Control::UploadButton,
            Control::SendButton,
            Control::QuestionInput,
            Control::KnowledgeInput,
        ]
    }

    /// Label shown on the control while it is idle
    pub fn idle_label(&self) -> &'static str {
        match self {
            Control::UploadButton => "Upload Knowledge",
            Control::SendButton => "Send",
            Control::QuestionInput => "Ask",
            Control::KnowledgeInput => "Knowledge",
        }
    }

    /// Label shown while a request triggered by this control is in flight
    pub fn busy_label(&self) -> &'static str {
        match self {
            Control::UploadButton => "Uploading...",
            Control::SendButton => "Sending...",
            Control::QuestionInput | Control::KnowledgeInput => self.idle_label(),
        }
    }
}
