use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {
            if app.follow_tail {
                app.scroll_transcript_to_bottom();
            }
        }
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Ui(ui_event) => app.apply_ui_event(ui_event),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Focus
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),

        // Editing
        KeyCode::Char('i') | KeyCode::Enter => app.start_editing(),

        // Transcript scrolling
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_transcript_down(app.half_page());
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_transcript_up(app.half_page());
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_transcript_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_transcript_up(1),
        KeyCode::PageDown => app.scroll_transcript_down(app.half_page()),
        KeyCode::PageUp => app.scroll_transcript_up(app.half_page()),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_transcript_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_transcript_to_bottom(),

        // Requests
        KeyCode::Char('u') => app.submit_knowledge(),
        KeyCode::Char('s') => app.submit_question(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }

    // A control can be disabled underneath us (e.g. the backend went offline)
    if !app.can_edit(app.focus) {
        app.input_mode = InputMode::Normal;
        return;
    }

    match (app.focus, key.code) {
        (FocusPane::Question, KeyCode::Enter) => app.submit_question(),
        (FocusPane::Knowledge, KeyCode::Char('s')) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.submit_knowledge();
        }
        (FocusPane::Knowledge, KeyCode::Enter) => {
            if let Some(input) = app.focused_input() {
                input.insert('\n');
            }
        }
        (_, code) => {
            let Some(input) = app.focused_input() else { return };
            match code {
                KeyCode::Backspace => input.backspace(),
                KeyCode::Delete => input.delete(),
                KeyCode::Left => input.left(),
                KeyCode::Right => input.right(),
                KeyCode::Home => input.home(),
                KeyCode::End => input.end(),
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert(c),
                _ => {}
            }
        }
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_transcript = app.transcript_area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::ScrollDown if in_transcript => app.scroll_transcript_down(3),
        MouseEventKind::ScrollUp if in_transcript => app.scroll_transcript_up(3),
        MouseEventKind::Down(_) => {
            // Click to focus
            if in_transcript {
                app.focus = FocusPane::Transcript;
            } else if app.knowledge_area.is_some_and(|r| point_in_rect(x, y, r)) {
                app.focus = FocusPane::Knowledge;
            } else if app.question_area.is_some_and(|r| point_in_rect(x, y, r)) {
                app.focus = FocusPane::Question;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use std::sync::Arc;
    use stratamind_core::{ChatController, Config, HttpBackend, UiEvent};
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn connected_app() -> App {
        let config = Config::new();
        let (tx, _rx) = mpsc::unbounded_channel::<UiEvent>();
        let controller = ChatController::new(Arc::new(HttpBackend::from_config(&config)), Arc::new(tx), &config);
        let mut app = App::new(controller, config.base_url());
        app.apply_ui_event(UiEvent::ControlsEnabled(true));
        app
    }

    #[test]
    fn test_typing_into_knowledge_keeps_newlines() {
        let mut app = connected_app();
        app.focus = FocusPane::Knowledge;
        handle_event(&mut app, key(KeyCode::Char('i'))).unwrap();
        for event in [key(KeyCode::Char('a')), key(KeyCode::Enter), key(KeyCode::Char('b'))] {
            handle_event(&mut app, event).unwrap();
        }
        assert_eq!(app.knowledge.text, "a\nb");
        assert!(app.question.text.is_empty());

        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_keys_ignored_while_offline() {
        let mut app = connected_app();
        handle_event(&mut app, key(KeyCode::Char('i'))).unwrap();
        assert_eq!(app.input_mode, InputMode::Editing);

        // Going offline drops the editing state; typing no longer reaches the input
        app.apply_ui_event(UiEvent::ControlsEnabled(false));
        handle_event(&mut app, key(KeyCode::Char('i'))).unwrap();
        handle_event(&mut app, key(KeyCode::Char('x'))).unwrap();
        assert!(app.question.text.is_empty());
    }

    #[test]
    fn test_ctrl_c_quits_while_editing() {
        let mut app = connected_app();
        app.input_mode = InputMode::Editing;
        let mut ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        ctrl_c.kind = KeyEventKind::Press;
        handle_event(&mut app, AppEvent::Key(ctrl_c)).unwrap();
        assert!(app.should_quit);
    }
}
