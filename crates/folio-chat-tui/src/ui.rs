use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use folio_chat_core::{mask_credential, ChatRole, Provider, SessionState};

use crate::app::App;

/// Wrap text to fit within a given width, returning multiple lines
/// Uses word boundaries for wrapping (doesn't break mid-word)
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            // First word on line
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            // Word fits on current line
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            // Word doesn't fit, start new line
            lines.push(current_line);
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Wraps every line of a message body, keeping explicit line breaks and
/// blank lines the way the author typed them.
fn wrap_message(content: &str, width: usize) -> Vec<String> {
    content
        .split('\n')
        .flat_map(|line| wrap_text_to_width(line, width))
        .collect()
}

/// Cursor row and column (in characters) within a multi-line buffer.
fn cursor_row_col(text: &str, cursor: usize) -> (usize, usize) {
    let before: String = text.chars().take(cursor).collect();
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0);
    (row, col)
}

/// Furthest the chat can scroll, saturating for very long conversations.
fn max_scroll(total_lines: usize, visible_height: u16) -> u16 {
    u16::try_from(total_lines)
        .unwrap_or(u16::MAX)
        .saturating_sub(visible_height)
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

    if app.session.is_configured() {
        render_chat(app, frame, body_area);
    } else {
        render_config_form(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (status, color) = match app.session.state() {
        SessionState::Unconfigured => ("not configured", Color::DarkGray),
        SessionState::Idle => ("ready", Color::Green),
        SessionState::Awaiting => ("waiting for reply", Color::Yellow),
        SessionState::Error => ("last request failed", Color::Red),
    };

    let header = Line::from(vec![
        Span::styled(
            " AI Chat Integration ",
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(status, Style::default().fg(color)),
    ]);

    frame.render_widget(Paragraph::new(header), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.session.is_configured() {
        " Enter send | Alt+Enter newline | PgUp/PgDn scroll | Ctrl+X clear config | Ctrl+C quit "
    } else {
        " Type your API key | Up/Down provider | Enter save | Esc quit "
    };

    let footer = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}

fn render_config_form(app: &App, frame: &mut Frame, area: Rect) {
    let providers = Provider::all();

    // Calculate popup size and position (centered)
    let popup_width = 64.min(area.width.saturating_sub(4));
    let popup_height = (providers.len() as u16 + 12).min(area.height);

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Configure AI Assistant ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [intro_area, picker_area, key_area, status_area, error_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(providers.len() as u16 + 2),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let intro = Paragraph::new("Connect your own LLM API key to start chatting.")
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    frame.render_widget(intro, intro_area);

    // Provider picker
    let items: Vec<ListItem> = providers
        .iter()
        .map(|provider| {
            let style = if provider.is_supported() {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(provider.display_name()).style(style)
        })
        .collect();

    let selected = providers.iter().position(|p| *p == app.session.provider());
    let mut picker_state = ListState::default().with_selected(selected);

    let picker = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" LLM Provider "))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(picker, picker_area, &mut picker_state);

    // Credential field, fully masked so the cursor lines up with the text
    let credential = app.session.credential();
    let key_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" API Key ");
    let key_inner = key_block.inner(key_area);

    let char_count = credential.chars().count();
    let cursor = app.credential_cursor.position(credential);
    let inner_width = key_inner.width as usize;
    let offset = if inner_width > 0 && cursor >= inner_width { cursor + 1 - inner_width } else { 0 };

    let masked = Paragraph::new("*".repeat(char_count))
        .block(key_block)
        .style(Style::default().fg(Color::Cyan))
        .scroll((0, offset as u16));
    frame.render_widget(masked, key_area);

    frame.set_cursor_position((key_inner.x + (cursor - offset) as u16, key_inner.y));

    // Status line
    let status_text = if credential.is_empty() {
        "Enter your API key...".to_string()
    } else {
        format!("{} ({} characters)", mask_credential(credential), char_count)
    };
    let status = Paragraph::new(status_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, status_area);

    if let Some(error) = app.session.last_error() {
        let alert = Paragraph::new(Span::styled(
            format!("! {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .wrap(Wrap { trim: true });
        frame.render_widget(alert, error_area);
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let error_height = if app.session.last_error().is_some() { 1 } else { 0 };
    let input_lines = app.session.input().split('\n').count().clamp(1, 4) as u16;

    let [chat_area, error_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(error_height),
        Constraint::Length(input_lines + 2),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" AI Chat Assistant ({}) ", app.session.provider().vendor_name()));

    let wrap_width = app.chat_width as usize;
    let mut lines: Vec<Line> = Vec::new();

    for msg in app.session.messages() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    format!("You ({}):", msg.timestamp.format("%H:%M")),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in wrap_message(&msg.content, wrap_width) {
                    lines.push(Line::from(line));
                }
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    format!("AI ({}):", msg.timestamp.format("%H:%M")),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                for line in wrap_message(&msg.content, wrap_width) {
                    lines.push(Line::from(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if app.session.is_pending() {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let max_scroll = max_scroll(lines.len(), app.chat_height);
    if app.follow_tail {
        app.chat_scroll = max_scroll;
    } else {
        app.chat_scroll = app.chat_scroll.min(max_scroll);
        if app.chat_scroll == max_scroll {
            app.follow_tail = true;
        }
    }

    let chat_text = if lines.is_empty() {
        Text::from(Span::styled("Say hello...", Style::default().fg(Color::DarkGray)))
    } else {
        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    if let Some(error) = app.session.last_error() {
        let alert = Paragraph::new(Span::styled(
            format!(" ! {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(alert, error_area);
    }

    render_input(app, frame, input_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let pending = app.session.is_pending();
    let (title, border_color) = if pending {
        (" Waiting for reply... ", Color::DarkGray)
    } else {
        (" Type your message... ", Color::Yellow)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);
    let inner = block.inner(area);

    let input = app.session.input();
    let cursor = app.input_cursor.position(input);
    let (row, col) = cursor_row_col(input, cursor);

    // Keep the cursor inside the visible window
    let row_offset = row.saturating_sub((inner.height as usize).saturating_sub(1));
    let col_offset = col.saturating_sub((inner.width as usize).saturating_sub(1));

    let style = if pending {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(input)
        .block(block)
        .style(style)
        .scroll((row_offset as u16, col_offset as u16));
    frame.render_widget(paragraph, area);

    if !pending {
        frame.set_cursor_position((
            inner.x + (col - col_offset) as u16,
            inner.y + (row - row_offset) as u16,
        ));
    }
}
