use ratatui::layout::Rect;
use stratamind_core::{ChatController, ChatError, Control, UiEvent, ViewState};
use tokio::task::JoinHandle;

use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Knowledge,
    Transcript,
    Question,
}

impl FocusPane {
    fn next(self) -> Self {
        match self {
            FocusPane::Knowledge => FocusPane::Transcript,
            FocusPane::Transcript => FocusPane::Question,
            FocusPane::Question => FocusPane::Knowledge,
        }
    }

    fn prev(self) -> Self {
        match self {
            FocusPane::Knowledge => FocusPane::Question,
            FocusPane::Transcript => FocusPane::Knowledge,
            FocusPane::Question => FocusPane::Transcript,
        }
    }

    /// The controller-gated input behind this pane, if it has one
    pub fn input_control(self) -> Option<Control> {
        match self {
            FocusPane::Knowledge => Some(Control::KnowledgeInput),
            FocusPane::Question => Some(Control::QuestionInput),
            FocusPane::Transcript => None,
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// An editable text buffer with a character-based cursor
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Lines split on '\n', each hard-wrapped every `width` characters
    pub fn wrapped_lines(&self, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut rows = Vec::new();
        for line in self.text.split('\n') {
            let chars: Vec<char> = line.chars().collect();
            if chars.is_empty() {
                rows.push(String::new());
            } else {
                rows.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
            }
        }
        rows
    }

    /// (row, column) of the cursor within `wrapped_lines(width)`
    ///
    /// A cursor just past a full row stays on that row, one column beyond its end.
    pub fn wrapped_cursor(&self, width: usize) -> (usize, usize) {
        let width = width.max(1);
        let mut row = 0;
        let mut remaining = self.cursor;
        for line in self.text.split('\n') {
            let len = line.chars().count();
            if remaining <= len {
                let mut offset = remaining / width;
                if remaining > 0 && remaining == len && remaining % width == 0 {
                    offset -= 1;
                }
                return (row + offset, remaining - offset * width);
            }
            row += len.div_ceil(width).max(1);
            remaining -= len + 1;
        }
        (row, 0)
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Controller output
    pub view: ViewState,
    pub controller: ChatController,
    pub backend_url: String,
    pub ask_task: Option<JoinHandle<Result<String, ChatError>>>,
    pub upload_task: Option<JoinHandle<Result<String, ChatError>>>,

    // Inputs
    pub knowledge: TextInput,
    pub question: TextInput,

    // Transcript scrolling
    pub transcript_scroll: u16,
    pub transcript_height: u16, // Height of transcript area for scroll calculations
    pub transcript_width: u16,  // Width of transcript area for wrap calculations
    pub follow_tail: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub knowledge_area: Option<Rect>,
    pub transcript_area: Option<Rect>,
    pub question_area: Option<Rect>,
}

impl App {
    pub fn new(controller: ChatController, backend_url: &str) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Question,

            view: ViewState::new(),
            controller,
            backend_url: backend_url.to_string(),
            ask_task: None,
            upload_task: None,

            knowledge: TextInput::default(),
            question: TextInput::default(),

            transcript_scroll: 0,
            transcript_height: 0,
            transcript_width: 0,
            follow_tail: true,

            animation_frame: 0,

            knowledge_area: None,
            transcript_area: None,
            question_area: None,
        }
    }

    pub fn apply_ui_event(&mut self, event: UiEvent) {
        let transcript_changed = matches!(event, UiEvent::Append(_) | UiEvent::RemovePending);

        match &event {
            UiEvent::ClearInput(Control::QuestionInput) => self.question.clear(),
            UiEvent::ClearInput(Control::KnowledgeInput) => self.knowledge.clear(),
            UiEvent::ControlsEnabled(false) => {
                // Nothing can be typed into a disabled input
                if self.input_mode == InputMode::Editing && self.focus != FocusPane::Transcript {
                    self.input_mode = InputMode::Normal;
                }
            }
            _ => {}
        }
        self.view.apply(event);

        if transcript_changed && self.follow_tail {
            self.scroll_transcript_to_bottom();
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            FocusPane::Knowledge => Some(&mut self.knowledge),
            FocusPane::Question => Some(&mut self.question),
            FocusPane::Transcript => None,
        }
    }

    pub fn can_edit(&self, pane: FocusPane) -> bool {
        pane.input_control().is_some_and(|c| self.view.is_enabled(c))
    }

    /// Enter editing mode on the focused input if it currently accepts input
    pub fn start_editing(&mut self) {
        if self.can_edit(self.focus) {
            self.input_mode = InputMode::Editing;
        }
    }

    fn task_running<T>(task: &Option<JoinHandle<T>>) -> bool {
        task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn can_send(&self) -> bool {
        self.view.is_enabled(Control::SendButton) && !Self::task_running(&self.ask_task)
    }

    pub fn can_upload(&self) -> bool {
        self.view.is_enabled(Control::UploadButton) && !Self::task_running(&self.upload_task)
    }

    /// Hand the question to the controller in a background task
    pub fn submit_question(&mut self) {
        if !self.can_send() {
            return;
        }
        let question = self.question.text.clone();
        let controller = self.controller.clone();
        self.follow_tail = true;
        self.ask_task = Some(tokio::spawn(async move { controller.ask(&question).await }));
    }

    pub fn submit_knowledge(&mut self) {
        if !self.can_upload() {
            return;
        }
        let text = self.knowledge.text.clone();
        let controller = self.controller.clone();
        self.follow_tail = true;
        self.upload_task = Some(tokio::spawn(async move { controller.upload(&text).await }));
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.view.transcript.has_pending() || !self.view.status.is_connected() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Number of rows the transcript occupies at the current width.
    ///
    /// Counts the pre-wrapped lines the renderer draws, so scrolling always
    /// agrees with what is on screen.
    pub fn transcript_line_count(&self) -> u16 {
        u16::try_from(ui::transcript_text(self).lines.len()).unwrap_or(u16::MAX)
    }

    fn max_transcript_scroll(&self) -> u16 {
        let visible_height = if self.transcript_height > 0 {
            self.transcript_height
        } else {
            20
        };
        self.transcript_line_count().saturating_sub(visible_height)
    }

    pub fn scroll_transcript_to_bottom(&mut self) {
        self.transcript_scroll = self.max_transcript_scroll();
        self.follow_tail = true;
    }

    pub fn scroll_transcript_down(&mut self, lines: u16) {
        let max_scroll = self.max_transcript_scroll();
        self.transcript_scroll = self.transcript_scroll.saturating_add(lines).min(max_scroll);
        self.follow_tail = self.transcript_scroll >= max_scroll;
    }

    pub fn scroll_transcript_up(&mut self, lines: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
        self.follow_tail = false;
    }

    pub fn scroll_transcript_top(&mut self) {
        self.transcript_scroll = 0;
        self.follow_tail = false;
    }

    pub fn half_page(&self) -> u16 {
        (self.transcript_height / 2).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stratamind_core::{Config, ConnectionState, HttpBackend, Message};
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let config = Config::new();
        let (tx, _rx) = mpsc::unbounded_channel::<UiEvent>();
        let controller = ChatController::new(Arc::new(HttpBackend::from_config(&config)), Arc::new(tx), &config);
        App::new(controller, config.base_url())
    }

    #[test]
    fn test_text_input_utf8_editing() {
        let mut input = TextInput::default();
        for c in "héllo".chars() {
            input.insert(c);
        }
        input.left();
        input.left();
        input.backspace();
        assert_eq!(input.text, "hélo");
        input.home();
        input.delete();
        assert_eq!(input.text, "élo");
        input.end();
        assert_eq!(input.cursor, 3);
    }

    fn input_with(text: &str) -> TextInput {
        let mut input = TextInput::default();
        for c in text.chars() {
            input.insert(c);
        }
        input
    }

    #[test]
    fn test_wrapped_cursor_multiline() {
        let mut input = input_with("ab\ncde");
        assert_eq!(input.wrapped_cursor(10), (1, 3));
        input.home();
        assert_eq!(input.wrapped_cursor(10), (0, 0));
    }

    #[test]
    fn test_long_knowledge_line_wraps_and_cursor_follows() {
        let mut input = input_with("ab\ncdefghi");
        assert_eq!(input.wrapped_lines(3), vec!["ab", "cde", "fgh", "i"]);
        assert_eq!(input.wrapped_cursor(3), (3, 1));

        input.backspace();
        assert_eq!(input.wrapped_lines(3), vec!["ab", "cde", "fgh"]);
        // Cursor after a full row stays on it rather than opening a new one
        assert_eq!(input.wrapped_cursor(3), (2, 3));

        input.left();
        input.left();
        input.left();
        assert_eq!(input.wrapped_cursor(3), (2, 0));
    }

    #[test]
    fn test_empty_lines_still_take_a_row() {
        let input = input_with("a\n\nb\n");
        assert_eq!(input.wrapped_lines(4), vec!["a", "", "b", ""]);
        assert_eq!(input.wrapped_cursor(4), (3, 0));
    }

    #[test]
    fn test_clear_input_events() {
        let mut app = test_app();
        app.question.insert('q');
        app.knowledge.insert('k');

        app.apply_ui_event(UiEvent::ClearInput(Control::QuestionInput));
        assert!(app.question.text.is_empty());
        assert_eq!(app.knowledge.text, "k");

        app.apply_ui_event(UiEvent::ClearInput(Control::KnowledgeInput));
        assert!(app.knowledge.text.is_empty());
        assert_eq!(app.knowledge.cursor, 0);
    }

    #[test]
    fn test_editing_requires_connection() {
        let mut app = test_app();
        app.start_editing();
        assert_eq!(app.input_mode, InputMode::Normal);

        app.apply_ui_event(UiEvent::Status(ConnectionState::Connected));
        app.apply_ui_event(UiEvent::ControlsEnabled(true));
        app.start_editing();
        assert_eq!(app.input_mode, InputMode::Editing);
        assert!(app.can_send());

        app.apply_ui_event(UiEvent::ControlsEnabled(false));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.can_send());
        assert!(!app.can_upload());
    }

    #[test]
    fn test_transcript_follows_new_messages() {
        let mut app = test_app();
        app.transcript_height = 4;
        app.transcript_width = 20;
        for i in 0..5 {
            app.apply_ui_event(UiEvent::Append(Message::user(format!("question {i}"))));
        }
        // 5 messages x 3 lines each
        assert_eq!(app.transcript_line_count(), 15);
        assert_eq!(app.transcript_scroll, 11);

        app.scroll_transcript_up(5);
        assert!(!app.follow_tail);
        app.apply_ui_event(UiEvent::Append(Message::system("later")));
        assert_eq!(app.transcript_scroll, 6);

        app.scroll_transcript_down(100);
        assert!(app.follow_tail);
        assert_eq!(app.transcript_scroll, 14);
    }
}
