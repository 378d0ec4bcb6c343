//! Session context tying the terminal components together.
//!
//! Built once at startup from persisted state, then mutated by each submitted
//! command. Nothing is torn down: history and the session id outlive the run.

use std::time::{Duration, Instant};

use crate::avatar::{AvatarCoordinator, AvatarSource};
use crate::config::AppConfig;
use crate::display::DisplayLine;
use crate::history::{Command, Direction, HistoryCursor, HistoryStore};
use crate::interpreter::{interpret, Effect};
use crate::scrollback::Scrollback;
use crate::session::SessionId;
use crate::toast::{ToastMessage, Toaster};

pub struct Terminal {
    session_id: SessionId,
    history: HistoryStore,
    cursor: HistoryCursor,
    scrollback: Scrollback,
    toaster: Toaster,
    avatar: AvatarCoordinator,
}

impl Terminal {
    /// Seed the scrollback with echoes of the loaded history and fetch the
    /// session's current avatar.
    pub fn new(
        config: &AppConfig,
        session_id: SessionId,
        history: HistoryStore,
        avatar: AvatarCoordinator,
    ) -> Self {
        let mut scrollback = Scrollback::new(config.visible_lines);
        scrollback.append(history.entries().iter().map(DisplayLine::echo));

        let mut toaster = Toaster::new(config.toast_duration);
        toaster.suppress_after_threshold(config.quiet_threshold);

        if !session_id.is_empty() {
            avatar.refresh(&session_id);
        }

        tracing::info!(
            "Terminal ready: session '{}', {} history entries",
            session_id,
            history.len()
        );

        Self {
            session_id,
            history,
            cursor: HistoryCursor::default(),
            scrollback,
            toaster,
            avatar,
        }
    }

    /// Handle one line of input. Blank input submits nothing.
    pub fn submit(&mut self, input: &str, now: Instant) -> Effect {
        self.cursor.reset();

        let text = input.trim();
        if text.is_empty() {
            return Effect::None;
        }

        let timestamp = chrono::Utc::now().timestamp_millis();
        let command = Command::new(text, timestamp);
        self.scrollback.append([DisplayLine::echo(&command)]);
        self.history.append(command);

        let interpretation = interpret(text, timestamp);
        self.scrollback.append(interpretation.lines);

        match &interpretation.effect {
            Effect::None => {}
            Effect::Clear => {
                self.history.clear();
                self.scrollback.clear();
            }
            Effect::GenerateAvatar { character_class } => {
                self.avatar.generate(&self.session_id, character_class);
            }
            Effect::UnknownCommand { message } => {
                tracing::info!("Unknown command: {}", text);
                self.toaster.show(message.as_str(), timestamp, now);
            }
        }

        interpretation.effect
    }

    /// Browse history. Returns the text the input line should now hold, or
    /// `None` when there is no history to browse.
    pub fn navigate(&mut self, direction: Direction) -> Option<String> {
        if self.history.is_empty() {
            return None;
        }
        let text = self
            .history
            .navigate(direction, &mut self.cursor)
            .map(|command| command.text.clone())
            .unwrap_or_default();
        Some(text)
    }

    /// Drain finished avatar work into the terminal state.
    pub fn poll(&mut self) -> usize {
        self.avatar.poll()
    }

    pub fn visible_lines(&self) -> &[DisplayLine] {
        self.scrollback.render()
    }

    pub fn toast(&self, now: Instant) -> Option<&ToastMessage> {
        self.toaster.visible(now)
    }

    pub fn toast_remaining(&self, now: Instant) -> Option<Duration> {
        self.toaster.remaining(now)
    }

    pub fn is_quiet(&self) -> bool {
        self.toaster.is_quiet()
    }

    pub fn loading(&self) -> bool {
        self.avatar.loading()
    }

    pub fn avatar_source(&self) -> AvatarSource {
        self.avatar.avatar_source()
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn avatar_mut(&mut self) -> &mut AvatarCoordinator {
        &mut self.avatar
    }
}
