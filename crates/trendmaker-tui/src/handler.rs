use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => app.on_layout_changed(),
        AppEvent::Tick => app.tick_animation(),
        AppEvent::AskCompleted { id, outcome } => app.on_ask_completed(id, outcome),
    }
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

        // Back to typing
        KeyCode::Char('i') | KeyCode::Enter => start_editing(app),

        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('<') | KeyCode::Char('h') => app.shrink_dashboard(),
        KeyCode::Char('>') | KeyCode::Char('l') => app.grow_dashboard(),

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down(app.half_page());
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up(app.half_page());
        }
        KeyCode::PageDown => app.scroll_chat_down(app.chat_height.max(1)),
        KeyCode::PageUp => app.scroll_chat_up(app.chat_height.max(1)),
        KeyCode::Char('g') => app.scroll_chat_up(u16::MAX),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        // Tab cycles: Dashboard -> Chat -> Input -> Dashboard
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Dashboard => FocusPane::Chat,
                FocusPane::Chat => FocusPane::Input,
                FocusPane::Input => FocusPane::Dashboard,
            };
            if app.focus == FocusPane::Input {
                start_editing(app);
            }
        }

        _ => {}
    }
}

fn start_editing(app: &mut App) {
    app.focus = FocusPane::Input;
    app.input_mode = InputMode::Editing;
    app.chat.move_end();
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Chat;
        }
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Dashboard;
        }
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => app.chat.backspace(),
        KeyCode::Delete => app.chat.delete(),
        KeyCode::Left => app.chat.move_left(),
        KeyCode::Right => app.chat.move_right(),
        KeyCode::Home => app.chat.move_home(),
        KeyCode::End => app.chat.move_end(),
        KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char(c) => app.chat.insert_char(c),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);
    let over_chat = app.chat_area.is_some_and(|area| point_in_rect(x, y, area));

    match mouse.kind {
        MouseEventKind::ScrollUp if over_chat => app.scroll_chat_up(3),
        MouseEventKind::ScrollDown if over_chat => app.scroll_chat_down(3),
        MouseEventKind::Down(MouseButton::Left) => {
            let on_divider = app.divider_column().is_some_and(|col| x.abs_diff(col) <= 1)
                && app.body_area.is_some_and(|body| point_in_rect(x, y, body));
            if on_divider {
                app.dragging_divider = true;
            } else if over_chat {
                app.focus = FocusPane::Chat;
            } else if app.dashboard_area.is_some_and(|area| point_in_rect(x, y, area)) {
                app.focus = FocusPane::Dashboard;
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if app.dragging_divider => {
            app.drag_divider_to(x);
        }
        MouseEventKind::Up(MouseButton::Left) => app.finish_drag(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use trendmaker_core::{AskBackend, AskError, Config, Sender, Theme};

    struct FixedBackend;

    #[async_trait]
    impl AskBackend for FixedBackend {
        async fn ask(&self, _message: &str) -> Result<String, AskError> {
            Ok("Here are 10 Nike ads running in Singapore".to_string())
        }
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)));
        }
    }

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(Config::new(), None, Arc::new(FixedBackend), tx), rx)
    }

    #[tokio::test]
    async fn test_typing_and_enter_sends_message() {
        let (mut app, mut rx) = test_app();
        type_text(&mut app, "Nike ads in Singapore");
        assert_eq!(app.chat.input(), "Nike ads in Singapore");

        handle_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.chat.input(), "");
        assert_eq!(app.chat.log().len(), 1);

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event);

        let last = app.chat.log().last().unwrap();
        assert_eq!(last.sender(), Sender::Agent);
        assert_eq!(last.text(), "Here are 10 Nike ads running in Singapore");
    }

    #[tokio::test]
    async fn test_enter_on_blank_input_is_ignored() {
        let (mut app, mut rx) = test_app();
        type_text(&mut app, "   ");
        handle_event(&mut app, key(KeyCode::Enter));

        assert!(app.chat.log().is_empty());
        assert_eq!(app.chat.input(), "   ");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_normal_mode_keys() {
        let (mut app, _rx) = test_app();
        handle_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_event(&mut app, key(KeyCode::Char('t')));
        assert_eq!(app.theme, Theme::Light);

        handle_event(&mut app, key(KeyCode::Char('>')));
        assert_eq!(app.dashboard_percent, 55);
        handle_event(&mut app, key(KeyCode::Char('<')));
        handle_event(&mut app, key(KeyCode::Char('<')));
        assert_eq!(app.dashboard_percent, 45);

        // 'q' only quits outside editing
        handle_event(&mut app, key(KeyCode::Char('i')));
        handle_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.chat.input(), "q");

        handle_event(&mut app, key(KeyCode::Esc));
        handle_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_editing() {
        let (mut app, _rx) = test_app();
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let (mut app, _rx) = test_app();
        assert_eq!(app.focus, FocusPane::Input);

        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Dashboard);
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Chat);

        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_divider_drag_resizes_panes() {
        let (mut app, _rx) = test_app();
        app.body_area = Some(Rect::new(0, 1, 100, 20));
        app.dashboard_area = Some(Rect::new(0, 1, 50, 20));
        app.chat_area = Some(Rect::new(50, 1, 50, 20));

        let mouse = |kind, column| {
            AppEvent::Mouse(MouseEvent {
                kind,
                column,
                row: 5,
                modifiers: KeyModifiers::NONE,
            })
        };

        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 49));
        assert!(app.dragging_divider);
        handle_event(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 70));
        assert_eq!(app.dashboard_percent, 70);
        handle_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 70));
        assert!(!app.dragging_divider);
    }
}
