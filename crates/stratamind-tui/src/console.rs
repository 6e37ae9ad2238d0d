use stratamind_core::{ConnectionState, Control, Message, UiSink};
use tracing::debug;

/// Prints controller output for the one-shot commands.
///
/// Transcript lines go to stdout; status and progress go to stderr so the
/// answer can be piped on its own.
pub struct ConsoleSink;

impl UiSink for ConsoleSink {
    fn show_status(&self, state: ConnectionState) {
        eprintln!("[{}]", state.label());
    }

    fn set_controls_enabled(&self, enabled: bool) {
        debug!(enabled, "controls toggled");
    }

    fn set_busy(&self, control: Control, busy: bool) {
        if busy {
            eprintln!("{}", control.busy_label());
        }
    }

    fn clear_input(&self, _control: Control) {}

    fn append_message(&self, message: Message) {
        if message.pending {
            eprintln!("{}", message.text);
        } else {
            println!("{}: {}", message.role.display_name(), message.text);
        }
    }

    fn remove_pending(&self) {}
}
