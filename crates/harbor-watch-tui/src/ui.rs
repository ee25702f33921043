use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use harbor_watch_core::ChatRole;
use crate::app::App;

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
    render_dashboard(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.session.is_open() {
        render_chat_panel(app, frame, body_area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Harbor Watch ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("[{}]", app.backend.display_name()),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_dashboard(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Monitoring status ");

    let text = match app.session.context() {
        Some(context) if !context.trim().is_empty() => {
            Text::from(context.lines().map(Line::from).collect::<Vec<_>>())
        }
        _ => Text::from(Span::styled(
            "No monitoring context supplied. Start with --context or --context-file.",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let status = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    frame.render_widget(status, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode, mode_style) = if app.session.is_open() {
        (" CHAT ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" DASHBOARD ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let mut spans = vec![Span::styled(mode, mode_style), Span::raw(" ")];
    let hints: &[(&str, &str)] = if app.session.is_open() {
        &[("Enter", "send"), ("PgUp/PgDn", "scroll"), ("Esc", "close")]
    } else {
        &[("c", "chat"), ("q", "quit")]
    };
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Floating panel anchored to the bottom-right corner of `area`.
fn chat_panel_area(area: Rect) -> Rect {
    let width = 56.min(area.width.saturating_sub(2));
    let height = 20.min(area.height);
    let x = area.x + area.width.saturating_sub(width + 1);
    let y = area.y + area.height.saturating_sub(height);
    Rect::new(x, y, width, height)
}

fn render_chat_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup_area = chat_panel_area(area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Harbor Watch AI ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(inner);

    // Store chat area dimensions for scroll calculations
    app.chat_height = chat_area.height;
    app.chat_width = chat_area.width;

    let chat = Paragraph::new(chat_text(app))
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    render_chat_input(app, frame, input_area);
}

fn chat_text(app: &App) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();

    for msg in app.session.transcript() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "AI:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if app.session.is_loading() {
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

    if lines.is_empty() {
        return Text::from(Span::styled(
            "Ask about tides, water quality, or harbor traffic...",
            Style::default().fg(Color::DarkGray),
        ));
    }

    Text::from(lines)
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let (title, border) = if app.session.is_loading() {
        (" Waiting for reply ", Color::DarkGray)
    } else {
        (" Type your message ", Color::Cyan)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);
    let inner = block.inner(area);

    // Keep the cursor in view by scrolling long input horizontally
    let width = inner.width.max(1) as usize;
    let first_visible = app.input_cursor.saturating_sub(width - 1);
    let visible: String = app
        .session
        .pending_input()
        .chars()
        .skip(first_visible)
        .take(width)
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);

    if inner.width > 0 && inner.height > 0 {
        let cursor_x = (app.input_cursor - first_visible) as u16;
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}

/// Render `**bold**` runs; everything else is literal.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    // An even part count means the last ** was never closed
    let unclosed = parts.len() % 2 == 0;

    let mut spans: Vec<Span<'static>> = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        if i % 2 == 1 && !(unclosed && is_last) {
            if !part.is_empty() {
                spans.push(Span::styled(
                    part.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            }
        } else if i % 2 == 1 {
            spans.push(Span::raw(format!("**{}", part)));
        } else if !part.is_empty() {
            spans.push(Span::raw(part.to_string()));
        }
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}
