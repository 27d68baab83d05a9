// app state

use crate::Error;
use crate::core::{Message, RelayResponse, Role, StoredMessage, wants_breathing};
use crate::tui::breathing::Exercise;
use crate::tui::theme::{Theme, ThemeKind, detect_theme};
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Who is signed in. The chat refuses to start without a user.
#[derive(Debug, Clone)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    pub fn new(user: impl Into<String>) -> Self {
        let user = user.into();
        let user = user.trim();
        Self {
            user: (!user.is_empty()).then(|| user.to_string()),
        }
    }

    pub fn current_user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Ok,
    Warn,
    Error,
}

pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ChatLine {
    pub role: Role,
    pub content: String,
    pub time: String,
}

impl ChatLine {
    fn now(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            time: Local::now().format("%H:%M").to_string(),
        }
    }
}

impl From<StoredMessage> for ChatLine {
    fn from(stored: StoredMessage) -> Self {
        let time = DateTime::parse_from_rfc3339(&stored.created_at)
            .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
            .unwrap_or_default();

        Self {
            role: stored.role,
            content: stored.content,
            time,
        }
    }
}

// short-lived error toast
pub struct Notice {
    pub text: String,
    pub shown_at: Instant,
}

impl Notice {
    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= NOTICE_TTL
    }
}

pub struct App {
    pub running: bool,
    pub session: Session,
    pub backend: String,
    pub theme_kind: ThemeKind,
    pub theme: Theme,

    // conversation
    pub messages: Vec<ChatLine>,
    pub loading: bool,
    pub scroll: usize,

    // input line
    pub input: String,
    pub cursor: usize,

    // panels
    pub crisis_alert: bool,
    pub breathing: Option<Exercise>,
    pub show_logs: bool,

    pub notice: Option<Notice>,
    pub logs: Vec<LogEntry>,
}

impl App {
    pub fn new(session: Session, backend: String) -> Self {
        Self::with_theme(session, backend, detect_theme())
    }

    pub fn with_theme(session: Session, backend: String, theme_kind: ThemeKind) -> Self {
        Self {
            running: true,
            session,
            backend,
            theme_kind,
            theme: Theme::from_kind(theme_kind),
            messages: Vec::new(),
            loading: false,
            scroll: 0,
            input: String::new(),
            cursor: 0,
            crisis_alert: false,
            breathing: None,
            show_logs: false,
            notice: None,
            logs: Vec::new(),
        }
    }

    pub fn user(&self) -> &str {
        self.session.current_user().unwrap_or("")
    }

    pub fn load_history(&mut self, rows: Vec<StoredMessage>) {
        self.messages = rows.into_iter().map(ChatLine::from).collect();
        self.scroll = 0;
    }

    /// Everything on screen, oldest first, in the shape the relay expects.
    pub fn conversation(&self) -> Vec<Message> {
        self.messages
            .iter()
            .map(|m| Message::new(m.role, m.content.clone()))
            .collect()
    }

    /// Takes the input line as a new user message. Nothing happens while a
    /// reply is pending or when the line is blank.
    pub fn submit(&mut self) -> Option<String> {
        if self.loading {
            return None;
        }

        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.input.clear();
        self.cursor = 0;

        if wants_breathing(&text) && self.breathing.is_none() {
            self.breathing = Some(Exercise::start());
        }

        self.messages.push(ChatLine::now(Role::User, text.clone()));
        self.loading = true;
        self.scroll = 0;
        Some(text)
    }

    pub fn receive(&mut self, response: RelayResponse) {
        self.loading = false;
        if response.is_crisis {
            self.crisis_alert = true;
            self.log(LogLevel::Warn, "crisis support shown".to_string());
        }
        self.messages
            .push(ChatLine::now(Role::Assistant, response.message));
        self.scroll = 0;
    }

    // the conversation stays as it was, the user can resend
    pub fn fail(&mut self, error: &Error) {
        self.loading = false;
        self.log(LogLevel::Error, error.detail());
        self.notice = Some(Notice {
            text: error.to_string(),
            shown_at: Instant::now(),
        });
    }

    pub fn clear_history(&mut self) {
        self.messages.clear();
        self.scroll = 0;
    }

    pub fn log(&mut self, level: LogLevel, message: String) {
        self.logs.push(LogEntry { level, message });
    }

    // called once per frame
    pub fn tick(&mut self, now: Instant) {
        if let Some(exercise) = self.breathing.as_mut() {
            exercise.update();
        }
        if self.notice.as_ref().is_some_and(|n| n.expired(now)) {
            self.notice = None;
        }
    }

    pub fn toggle_breathing(&mut self) {
        // dropping the exercise cancels its timers
        self.breathing = match self.breathing.take() {
            Some(_) => None,
            None => Some(Exercise::start()),
        };
    }

    pub fn dismiss_alert(&mut self) {
        self.crisis_alert = false;
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
    }

    pub fn cycle_theme(&mut self) {
        self.theme_kind = self.theme_kind.next();
        self.theme = Theme::from_kind(self.theme_kind);
    }

    pub fn sign_out(&mut self) {
        self.session.sign_out();
        self.quit();
    }

    pub fn quit(&mut self) {
        self.breathing = None;
        self.running = false;
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    // input editing, cursor counts chars not bytes

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index();
        self.input.insert(idx, c);
        self.cursor += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index();
            self.input.remove(idx);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor < self.input.chars().count() {
            let idx = self.byte_index();
            self.input.remove(idx);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_cursor_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }
}
