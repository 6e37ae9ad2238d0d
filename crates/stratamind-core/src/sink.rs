//! The boundary between the controller and whatever presents its output.

use tokio::sync::mpsc::UnboundedSender;

use crate::state::{ConnectionState, Control};
use crate::transcript::Message;

/// Presentation operations the controller needs.
///
/// Implementations must not block: they are called from async tasks.
pub trait UiSink: Send + Sync {
    fn show_status(&self, state: ConnectionState);
    /// Enable or disable all four dependent controls together.
    fn set_controls_enabled(&self, enabled: bool);
    fn set_busy(&self, control: Control, busy: bool);
    fn clear_input(&self, control: Control);
    fn append_message(&self, message: Message);
    /// Remove the pending placeholder, if one is still present.
    fn remove_pending(&self);
}

/// A sink call, as delivered to a UI event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Status(ConnectionState),
    ControlsEnabled(bool),
    Busy { control: Control, busy: bool },
    ClearInput(Control),
    Append(Message),
    RemovePending,
}

// A closed receiver means the UI has gone away; dropping the event is all that's left to do.
impl UiSink for UnboundedSender<UiEvent> {
    fn show_status(&self, state: ConnectionState) {
        let _ = self.send(UiEvent::Status(state));
    }

    fn set_controls_enabled(&self, enabled: bool) {
        let _ = self.send(UiEvent::ControlsEnabled(enabled));
    }

    fn set_busy(&self, control: Control, busy: bool) {
        let _ = self.send(UiEvent::Busy { control, busy });
    }

    fn clear_input(&self, control: Control) {
        let _ = self.send(UiEvent::ClearInput(control));
    }

    fn append_message(&self, message: Message) {
        let _ = self.send(UiEvent::Append(message));
    }

    fn remove_pending(&self) {
        let _ = self.send(UiEvent::RemovePending);
    }
}
