use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use stratamind_core::{ConnectionState, Control, Role};
use crate::app::{App, FocusPane, InputMode};

const SPINNER: [&str; 3] = ["◐", "◓", "◑"];

/// Wrap text to fit within a given width, breaking at word boundaries.
/// Words longer than a whole row are split across rows.
pub fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        if current_len > 0 && current_len + 1 + word.len() <= width {
            current_line.push(' ');
            current_line.extend(word.iter());
            current_len += 1 + word.len();
            continue;
        }

        if current_len > 0 {
            lines.push(std::mem::take(&mut current_line));
        }
        while word.len() > width {
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        current_len = word.len();
        current_line = word.into_iter().collect();
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [knowledge_area, chat_area] = Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(60),
    ])
    .areas(body_area);

    render_knowledge(app, frame, knowledge_area);
    render_chat(app, frame, chat_area);
    render_footer(app, frame, footer_area);
}

fn status_span(app: &App) -> Span<'static> {
    let (icon, color) = match app.view.status {
        ConnectionState::Connecting => (SPINNER[app.animation_frame as usize % SPINNER.len()], Color::Yellow),
        ConnectionState::Connected => ("●", Color::Green),
        ConnectionState::Offline => ("▲", Color::Red),
    };
    Span::styled(
        format!(" {} {} ", icon, app.view.status.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" StrataMind ", Style::default().fg(Color::Cyan).bold()),
        status_span(app),
        Span::styled(app.backend_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Border colour for a pane: highlighted when focused, dimmed when its control is disabled
fn border_color(app: &App, pane: FocusPane, enabled: bool) -> Color {
    if !enabled {
        Color::DarkGray
    } else if app.focus == pane && app.input_mode == InputMode::Editing {
        Color::Yellow
    } else if app.focus == pane {
        Color::Cyan
    } else {
        Color::Gray
    }
}

fn render_knowledge(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, button_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.knowledge_area = Some(input_area);

    let enabled = app.view.is_enabled(Control::KnowledgeInput);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, FocusPane::Knowledge, enabled)))
        .title(" Knowledge ");

    let inner_height = input_area.height.saturating_sub(2);
    // One spare column so the cursor can sit after a full row
    let wrap_width = input_area.width.saturating_sub(3).max(1) as usize;
    let (cursor_row, cursor_col) = app.knowledge.wrapped_cursor(wrap_width);
    let scroll = (cursor_row as u16).saturating_sub(inner_height.saturating_sub(1));

    let text = if app.knowledge.text.is_empty() && app.input_mode != InputMode::Editing {
        let hint = "Paste facts or documents here, then upload them...";
        Text::from(
            wrap_text_to_width(hint, wrap_width)
                .into_iter()
                .map(|row| Line::from(Span::styled(row, Style::default().fg(Color::DarkGray))))
                .collect::<Vec<_>>(),
        )
    } else {
        Text::from(
            app.knowledge
                .wrapped_lines(wrap_width)
                .into_iter()
                .map(Line::from)
                .collect::<Vec<_>>(),
        )
    };

    let text_style = if enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input = Paragraph::new(text)
        .style(text_style)
        .block(block)
        .scroll((scroll, 0));
    frame.render_widget(input, input_area);

    if app.input_mode == InputMode::Editing && app.focus == FocusPane::Knowledge {
        frame.set_cursor_position((
            input_area.x + 1 + cursor_col as u16,
            input_area.y + 1 + cursor_row as u16 - scroll,
        ));
    }

    render_button(app, frame, button_area, Control::UploadButton, "u / Ctrl+S");
}

fn render_button(app: &App, frame: &mut Frame, area: Rect, control: Control, key_hint: &str) {
    let enabled = app.view.is_enabled(control);
    let style = if app.view.is_busy(control) {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)
    } else if enabled {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let label = if app.view.is_busy(control) {
        let spinner = SPINNER[app.animation_frame as usize % SPINNER.len()];
        format!("{} {}", spinner, app.view.label(control))
    } else {
        app.view.label(control).to_string()
    };

    let button = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} ", label), style),
        Span::styled(format!("({})", key_hint), Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if enabled { Color::Gray } else { Color::DarkGray })),
    );
    frame.render_widget(button, area);
}

/// The transcript as drawn, wrapped to the transcript's inner width
pub fn transcript_text(app: &App) -> Text<'static> {
    if app.view.transcript.is_empty() {
        return Text::from(Span::styled(
            "Upload some knowledge, then ask a question about it...",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let width = app.transcript_width as usize;
    let mut lines: Vec<Line> = Vec::new();

    for msg in app.view.transcript.messages() {
        let label_color = match msg.role {
            Role::User => Color::Cyan,
            Role::Assistant => Color::Yellow,
            Role::System => Color::Magenta,
        };
        lines.push(Line::from(Span::styled(
            format!("{}:", msg.role.display_name()),
            Style::default().fg(label_color).add_modifier(Modifier::BOLD),
        )));

        if msg.pending {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            let style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
            let text = format!("{}{}", msg.text.trim_end_matches('.'), dots);
            for row in wrap_text_to_width(&text, width) {
                lines.push(Line::from(Span::styled(row, style)));
            }
        } else {
            for line in msg.text.lines() {
                lines.extend(wrap_text_to_width(line, width).into_iter().map(Line::from));
            }
        }
        lines.push(Line::default());
    }

    Text::from(lines)
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [transcript_area, question_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store areas for mouse hit-testing
    app.transcript_area = Some(transcript_area);
    app.question_area = Some(question_area);

    // Store transcript dimensions for scroll calculations (inner size minus borders)
    app.transcript_height = transcript_area.height.saturating_sub(2);
    app.transcript_width = transcript_area.width.saturating_sub(2);
    if app.follow_tail {
        app.scroll_transcript_to_bottom();
    }

    let transcript_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, FocusPane::Transcript, true)))
        .title(" Chat ");

    let transcript = Paragraph::new(transcript_text(app))
        .block(transcript_block)
        .scroll((app.transcript_scroll, 0));
    frame.render_widget(transcript, transcript_area);

    // Question input at the bottom, with the send button state in the title
    let enabled = app.view.is_enabled(Control::QuestionInput);
    let send_state = if app.view.is_busy(Control::SendButton) {
        format!("{} {}", SPINNER[app.animation_frame as usize % SPINNER.len()], app.view.label(Control::SendButton))
    } else if app.view.is_enabled(Control::SendButton) {
        format!("Enter to {}", app.view.label(Control::SendButton).to_lowercase())
    } else {
        "offline".to_string()
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, FocusPane::Question, enabled)))
        .title(format!(" {} ({}) ", app.view.label(Control::QuestionInput), send_state));

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = question_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.question.cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.question.text
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input_style = if enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(visible_text)
        .style(input_style)
        .block(input_block);
    frame.render_widget(input, question_area);

    // Show cursor when editing
    if app.input_mode == InputMode::Editing && app.focus == FocusPane::Question {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((
            question_area.x + cursor_x + 1,
            question_area.y + 1,
        ));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.input_mode, app.focus) {
        (InputMode::Editing, FocusPane::Question) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
        (InputMode::Editing, _) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" newline ", label_style),
            Span::styled(" Ctrl+S ", key_style),
            Span::styled(" upload ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
        (InputMode::Normal, _) => {
            let mut hints = vec![
                Span::styled(" Tab ", key_style),
                Span::styled(" focus ", label_style),
            ];
            if app.can_edit(app.focus) {
                hints.extend(vec![
                    Span::styled(" i ", key_style),
                    Span::styled(" edit ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
            ]);
            if app.can_upload() {
                hints.extend(vec![
                    Span::styled(" u ", key_style),
                    Span::styled(" upload ", label_style),
                ]);
            }
            if app.can_send() {
                hints.extend(vec![
                    Span::styled(" s ", key_style),
                    Span::styled(" send ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
