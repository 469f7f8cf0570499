use ratatui::layout::Rect;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use trendmaker_core::config::{clamp_dashboard_percent, Config, Theme};
use trendmaker_core::{AskBackend, AskError, ChatView, RequestId, Sender};

use crate::tui::AppEvent;
use crate::ui;

/// Dashboard width change per resize step, in percent
pub const RESIZE_STEP: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Dashboard,
    Chat,
    Input,
}

/// Counters shown on the dashboard pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub sent: usize,
    pub replies: usize,
    pub failures: usize,
    pub in_flight: usize,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Conversation
    pub chat: ChatView,
    pub backend: Arc<dyn AskBackend>,
    pub endpoint: String,

    // Chat scroll state
    pub chat_scroll: u16,
    pub follow_chat: bool, // jump to newest entry when the log changes
    pub chat_height: u16,  // inner height of the chat pane
    pub chat_width: u16,   // inner width of the chat pane

    // Layout and theme
    pub theme: Theme,
    pub dashboard_percent: u16,
    pub dragging_divider: bool,

    // Panel areas for mouse hit-testing (updated during render)
    pub body_area: Option<Rect>,
    pub dashboard_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    config: Config,
    config_path: Option<PathBuf>,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        backend: Arc<dyn AskBackend>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            chat: ChatView::new(),
            backend,
            endpoint: config.endpoint.clone(),

            chat_scroll: 0,
            follow_chat: true,
            chat_height: 0,
            chat_width: 0,

            theme: config.theme,
            dashboard_percent: clamp_dashboard_percent(config.dashboard_percent),
            dragging_divider: false,

            body_area: None,
            dashboard_area: None,
            chat_area: None,

            animation_frame: 0,

            config,
            config_path,
            events,
        }
    }

    /// Send the input buffer and spawn the request in the background.
    ///
    /// The reply comes back through [`AppEvent::AskCompleted`].
    pub fn submit(&mut self) {
        let Some(pending) = self.chat.begin_send() else {
            return;
        };

        self.follow_chat = true;
        self.scroll_chat_to_bottom();

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = backend.ask(&pending.message).await;
            if events
                .send(AppEvent::AskCompleted {
                    id: pending.id,
                    outcome,
                })
                .is_err()
            {
                debug!(id = pending.id, "event loop gone, dropping reply");
            }
        });
    }

    pub fn on_ask_completed(&mut self, id: RequestId, outcome: Result<String, AskError>) {
        if self.chat.complete(id, outcome) && self.follow_chat {
            self.scroll_chat_to_bottom();
        }
    }

    pub fn stats(&self) -> SessionStats {
        let log = self.chat.log();
        let failures = self.chat.failures();
        SessionStats {
            sent: log.count_by(Sender::User),
            replies: log.count_by(Sender::Agent).saturating_sub(failures),
            failures,
            in_flight: self.chat.in_flight(),
        }
    }

    pub fn tick_animation(&mut self) {
        if self.chat.is_awaiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Number of rendered lines in the chat pane at the current width,
    /// measured with the same word wrapping the renderer uses
    pub fn chat_total_lines(&self) -> usize {
        // Default to 50 columns until the first render reports the real width
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };
        ui::chat_paragraph(self).line_count(wrap_width)
    }

    fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        let max = self.chat_total_lines().saturating_sub(visible_height as usize);
        u16::try_from(max).unwrap_or(u16::MAX)
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
        self.follow_chat = true;
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_chat = self.chat_scroll >= self.max_chat_scroll();
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max = self.max_chat_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_chat = self.chat_scroll >= max;
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }

    /// Keep the view pinned to the newest entry after a resize
    pub fn on_layout_changed(&mut self) {
        if self.follow_chat {
            self.chat_scroll = self.max_chat_scroll();
        } else {
            self.chat_scroll = self.chat_scroll.min(self.max_chat_scroll());
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        info!(theme = self.theme.as_str(), "theme changed");
        self.persist();
    }

    pub fn grow_dashboard(&mut self) {
        self.set_dashboard_percent(self.dashboard_percent.saturating_add(RESIZE_STEP));
        self.persist();
    }

    pub fn shrink_dashboard(&mut self) {
        self.set_dashboard_percent(self.dashboard_percent.saturating_sub(RESIZE_STEP));
        self.persist();
    }

    pub fn set_dashboard_percent(&mut self, percent: u16) {
        self.dashboard_percent = clamp_dashboard_percent(percent);
    }

    /// Move the divider to terminal column `x` while dragging
    pub fn drag_divider_to(&mut self, x: u16) {
        if let Some(body) = self.body_area {
            if body.width == 0 {
                return;
            }
            let offset = x.saturating_sub(body.x) as u32;
            let percent = (offset * 100 / body.width as u32) as u16;
            self.set_dashboard_percent(percent);
        }
    }

    /// Column of the divider between the two panes, if rendered
    pub fn divider_column(&self) -> Option<u16> {
        self.dashboard_area
            .map(|area| (area.x + area.width).saturating_sub(1))
    }

    pub fn finish_drag(&mut self) {
        if self.dragging_divider {
            self.dragging_divider = false;
            self.persist();
        }
    }

    /// Write theme and pane width back to the config file
    fn persist(&mut self) {
        self.config.theme = self.theme;
        self.config.dashboard_percent = self.dashboard_percent;

        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!(path = %path.display(), error = %e, "failed to save config");
            }
        }
    }
}
