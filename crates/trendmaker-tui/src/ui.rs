use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use trendmaker_core::{Sender, Theme, BACKEND_ERROR_TEXT};
use crate::app::{App, FocusPane, InputMode};

const INPUT_PLACEHOLDER: &str = "e.g. I want to see Nike ads in Singapore";

/// Colors for one theme
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    bar_bg: Color,
    title: Color,
    border: Color,
    focus: Color,
    user: Color,
    agent: Color,
    error: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: Color::Reset,
                fg: Color::White,
                muted: Color::DarkGray,
                bar_bg: Color::DarkGray,
                title: Color::Cyan,
                border: Color::DarkGray,
                focus: Color::Cyan,
                user: Color::Cyan,
                agent: Color::Yellow,
                error: Color::LightRed,
            },
            Theme::Light => Self {
                bg: Color::White,
                fg: Color::Black,
                muted: Color::Gray,
                bar_bg: Color::Gray,
                title: Color::Blue,
                border: Color::Gray,
                focus: Color::Blue,
                user: Color::Blue,
                agent: Color::Magenta,
                error: Color::Red,
            },
        }
    }
}

/// Render a line of agent text, turning `**bold**` runs into bold spans.
/// An unclosed `**` is kept as literal text.
fn parse_markdown_line(text: &str, base: Style) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    let last = parts.len() - 1;
    let closed = parts.len() % 2 == 1;

    let mut spans: Vec<Span<'static>> = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let inside_bold = i % 2 == 1;
        if inside_bold && i == last && !closed {
            spans.push(Span::styled(format!("**{}", part), base));
        } else if part.is_empty() {
            continue;
        } else if inside_bold {
            spans.push(Span::styled(part.to_string(), base.add_modifier(Modifier::BOLD)));
        } else {
            spans.push(Span::styled(part.to_string(), base));
        }
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let palette = Palette::for_theme(app.theme);
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        area,
    );

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, &palette);

    // Body: resizable dashboard on the left, chat on the right
    let [dashboard_area, chat_area] = Layout::horizontal([
        Constraint::Percentage(app.dashboard_percent),
        Constraint::Min(0),
    ])
    .areas(body_area);

    app.body_area = Some(body_area);
    app.dashboard_area = Some(dashboard_area);

    render_dashboard(app, frame, dashboard_area, &palette);
    render_chat(app, frame, chat_area, &palette);
    render_footer(app, frame, footer_area, &palette);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let in_flight = app.chat.in_flight();
    let pending = if in_flight > 0 {
        format!(" [{} pending]", in_flight)
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" 🔍 TrendMaker ", Style::default().fg(palette.title).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(palette.fg),
        ),
        Span::styled(pending, Style::default().fg(palette.agent)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(palette.bar_bg));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Normal => &[
            ("i", "edit"),
            ("t", "theme"),
            ("</>", "resize"),
            ("j/k", "scroll"),
            ("Tab", "focus"),
            ("q", "quit"),
        ],
        InputMode::Editing => &[
            ("Enter", "send"),
            ("Esc", "normal"),
            ("Tab", "focus"),
            ("Ctrl-C", "quit"),
        ],
    };

    let key_style = Style::default().bg(palette.bar_bg).fg(palette.fg).bold();
    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), Style::default().fg(palette.muted)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn pane_block(title: &str, focused: bool, palette: &Palette) -> Block<'static> {
    let border = if focused { palette.focus } else { palette.border };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(palette.title).add_modifier(Modifier::BOLD),
        ))
}

fn render_dashboard(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let block = pane_block("Dashboard", app.focus == FocusPane::Dashboard, palette);
    let stats = app.stats();

    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<14}", label), Style::default().fg(palette.muted)),
            Span::styled(value, Style::default().fg(palette.fg)),
        ])
    };

    let failures_style = if stats.failures > 0 {
        Style::default().fg(palette.error)
    } else {
        Style::default().fg(palette.fg)
    };

    let lines = vec![
        row("Endpoint", app.endpoint.clone()),
        Line::default(),
        row("Sent", stats.sent.to_string()),
        row("Replies", stats.replies.to_string()),
        Line::from(vec![
            Span::styled(format!("{:<14}", "Failures"), Style::default().fg(palette.muted)),
            Span::styled(stats.failures.to_string(), failures_style),
        ]),
        row("In flight", stats.in_flight.to_string()),
        Line::default(),
        row("Theme", app.theme.as_str().to_string()),
        row(
            "Split",
            format!("{}% / {}%", app.dashboard_percent, 100 - app.dashboard_percent),
        ),
    ];

    let dashboard = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(dashboard, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let [messages_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.chat_area = Some(messages_area);

    // Inner size minus borders, used for scroll calculations
    app.chat_height = messages_area.height.saturating_sub(2);
    app.chat_width = messages_area.width.saturating_sub(2);
    app.on_layout_changed();

    let block = pane_block(
        "Marketing Strategy Assistant",
        app.focus == FocusPane::Chat,
        palette,
    );

    let chat = chat_paragraph(app)
        .block(block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, messages_area);

    render_input(app, frame, input_area, palette);
}

/// The chat log as drawn inside the chat pane, without border or scroll.
/// Also used to measure the wrapped height for auto-scroll.
pub fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let palette = Palette::for_theme(app.theme);

    let chat_text = if app.chat.log().is_empty() && !app.chat.is_awaiting() {
        Text::from(Span::styled(
            "Ask about brands, ad campaigns and regions...",
            Style::default().fg(palette.muted),
        ))
    } else {
        let mut lines: Vec<Line<'static>> = Vec::new();

        for msg in app.chat.log() {
            match msg.sender() {
                Sender::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(palette.user).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.text().lines() {
                        lines.push(Line::styled(line.to_string(), Style::default().fg(palette.fg)));
                    }
                }
                Sender::Agent => {
                    lines.push(Line::from(Span::styled(
                        "Agent:",
                        Style::default().fg(palette.agent).add_modifier(Modifier::BOLD),
                    )));
                    let base = if msg.text() == BACKEND_ERROR_TEXT {
                        Style::default().fg(palette.error)
                    } else {
                        Style::default().fg(palette.fg)
                    };
                    for line in msg.text().lines() {
                        lines.push(parse_markdown_line(line, base));
                    }
                }
            }
            lines.push(Line::default());
        }

        if app.chat.is_awaiting() {
            lines.push(Line::from(Span::styled(
                "Agent:",
                Style::default().fg(palette.agent).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    Paragraph::new(chat_text).wrap(Wrap { trim: false })
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let editing = app.input_mode == InputMode::Editing;
    let border = if editing || app.focus == FocusPane::Input {
        palette.agent
    } else {
        palette.border
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Ask (Enter to send) ");

    // Scroll horizontally to keep the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat.cursor();
    let scroll_offset = if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
    };

    let input = if app.chat.input().is_empty() {
        Paragraph::new(INPUT_PLACEHOLDER).style(Style::default().fg(palette.muted))
    } else {
        let visible_text: String = app
            .chat
            .input()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(palette.user))
    };

    frame.render_widget(input.block(input_block), area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use trendmaker_core::{AskBackend, AskError, Config};

    struct NoBackend;

    #[async_trait]
    impl AskBackend for NoBackend {
        async fn ask(&self, _message: &str) -> Result<String, AskError> {
            Err(AskError::Decode("unused".into()))
        }
    }

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(Config::new(), None, Arc::new(NoBackend), tx)
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_screen_shows_panes_and_placeholder() {
        let mut app = test_app();
        let screen = draw(&mut app, 100, 24);

        assert!(screen.contains("TrendMaker"));
        assert!(screen.contains("Dashboard"));
        assert!(screen.contains("Marketing Strategy Assistant"));
        assert!(screen.contains(INPUT_PLACEHOLDER));
        assert!(screen.contains("http://localhost:8000"));
    }

    #[test]
    fn test_conversation_is_rendered_in_order() {
        let mut app = test_app();
        app.chat.set_input("hello");
        let pending = app.chat.begin_send().unwrap();
        app.on_ask_completed(pending.id, Ok("hi there".into()));

        let screen = draw(&mut app, 100, 24);
        let you = screen.find("You:").unwrap();
        let hello = screen.find("hello").unwrap();
        let agent = screen.find("Agent:").unwrap();
        let reply = screen.find("hi there").unwrap();
        assert!(you < hello && hello < agent && agent < reply);
    }

    #[test]
    fn test_thinking_indicator_while_awaiting() {
        let mut app = test_app();
        app.chat.set_input("hello");
        app.chat.begin_send().unwrap();

        let screen = draw(&mut app, 100, 24);
        assert!(screen.contains("Thinking."));
        assert!(screen.contains("[1 pending]"));
    }

    #[test]
    fn test_newest_reply_visible_after_wrap_heavy_replies() {
        let mut app = test_app();
        draw(&mut app, 60, 20);
        assert_eq!(app.chat_width, 28);

        for round in 0..4 {
            app.chat.set_input(format!("question {}", round));
            let pending = app.chat.begin_send().unwrap();
            // 15-char words, one per wrapped line at 28 columns
            let reply: Vec<String> = (0..8)
                .map(|word| format!("reach-r{}-w{:02}-sg", round, word))
                .collect();
            app.on_ask_completed(pending.id, Ok(reply.join(" ")));
        }

        let screen = draw(&mut app, 60, 20);
        assert!(app.follow_chat);
        assert!(screen.contains("reach-r3-w07-sg"));
        assert!(!screen.contains("question 0"));
    }

    #[test]
    fn test_error_bubble_stays_in_view() {
        let mut app = test_app();
        draw(&mut app, 40, 12);
        for _ in 0..5 {
            app.chat.set_input("Nike ads in Singapore please");
            let pending = app.chat.begin_send().unwrap();
            app.on_ask_completed(pending.id, Err(AskError::Status { status: 502 }));
        }

        let screen = draw(&mut app, 40, 12);
        assert!(screen.contains("later."));
    }

    #[test]
    fn test_render_records_layout_for_mouse() {
        let mut app = test_app();
        app.dashboard_percent = 30;
        draw(&mut app, 100, 24);

        assert_eq!(app.dashboard_area.unwrap().width, 30);
        assert_eq!(app.body_area.unwrap().height, 22);
        // 22 body rows - 3 input rows - 2 borders
        assert_eq!(app.chat_height, 17);
    }

    #[test]
    fn test_markdown_bold() {
        let base = Style::default();
        let line = parse_markdown_line("Top brand: **Nike** in SG", base);
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "Nike");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));

        let unclosed = parse_markdown_line("a **b", base);
        let text: String = unclosed.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "a **b");
    }
}
