use std::collections::HashSet;

use crate::sink::UiEvent;
use crate::state::{ConnectionState, Control};
use crate::transcript::Transcript;

/// What a UI shows, rebuilt from the controller's [`UiEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub status: ConnectionState,
    pub controls_enabled: bool,
    busy: HashSet<Control>,
    pub transcript: Transcript,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Input clearing is left to the owner of the input buffers.
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Status(state) => self.status = state,
            UiEvent::ControlsEnabled(enabled) => self.controls_enabled = enabled,
            UiEvent::Busy { control, busy } => {
                if busy {
                    self.busy.insert(control);
                } else {
                    self.busy.remove(&control);
                }
            }
            UiEvent::ClearInput(_) => {}
            UiEvent::Append(message) => self.transcript.push(message),
            UiEvent::RemovePending => {
                self.transcript.remove_pending();
            }
        }
    }

    pub fn is_busy(&self, control: Control) -> bool {
        self.busy.contains(&control)
    }

    /// A control accepts input only while connected and not waiting on its own request.
    pub fn is_enabled(&self, control: Control) -> bool {
        self.controls_enabled && !self.is_busy(control)
    }

    pub fn label(&self, control: Control) -> &'static str {
        if self.is_busy(control) {
            control.busy_label()
        } else {
            control.idle_label()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Message;

    #[test]
    fn test_controls_start_disabled() {
        let view = ViewState::new();
        assert_eq!(view.status, ConnectionState::Connecting);
        assert!(Control::all().iter().all(|c| !view.is_enabled(*c)));
    }

    #[test]
    fn test_busy_disables_only_its_control() {
        let mut view = ViewState::new();
        view.apply(UiEvent::ControlsEnabled(true));
        view.apply(UiEvent::Busy { control: Control::SendButton, busy: true });

        assert!(!view.is_enabled(Control::SendButton));
        assert!(view.is_enabled(Control::UploadButton));
        assert_eq!(view.label(Control::SendButton), "Sending...");

        view.apply(UiEvent::Busy { control: Control::SendButton, busy: false });
        assert!(view.is_enabled(Control::SendButton));
        assert_eq!(view.label(Control::SendButton), "Send");
    }

    #[test]
    fn test_remove_pending_event() {
        let mut view = ViewState::new();
        view.apply(UiEvent::Append(Message::user("hi")));
        view.apply(UiEvent::Append(Message::thinking()));
        view.apply(UiEvent::RemovePending);
        view.apply(UiEvent::RemovePending);

        assert_eq!(view.transcript.len(), 1);
        assert!(!view.transcript.has_pending());
    }
}
