//! Notification content construction.
//!
//! Maps engine events to the title/body pairs shown to the user.

use crate::engine::EngineEvent;
use crate::types::{format_hms, PomodoroPhase};

/// Maximum length for notification text.
const MAX_TEXT_LENGTH: usize = 200;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A countdown reached zero
    Expired,
    /// A pomodoro work phase finished
    WorkComplete,
    /// A short break finished
    BreakComplete,
    /// A long break finished
    LongBreakComplete,
}

/// A notification ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// What happened
    pub kind: NotificationKind,
    /// Short headline
    pub title: String,
    /// Longer explanation
    pub body: String,
}

impl Notification {
    /// Builds the notification for an engine event.
    ///
    /// Returns `None` for events that are not worth notifying about.
    #[must_use]
    pub fn from_event(event: &EngineEvent) -> Option<Self> {
        match event {
            EngineEvent::Expired { configured_seconds } => Some(
                NotificationBuilder::new(NotificationKind::Expired)
                    .title("Time's up!")
                    .body(&format!(
                        "Countdown of {} finished.",
                        format_hms(*configured_seconds)
                    ))
                    .build(),
            ),
            EngineEvent::PhaseComplete {
                completed,
                next,
                cycle_count,
            } => Some(phase_complete(*completed, *next, *cycle_count)),
            _ => None,
        }
    }
}

fn phase_complete(completed: PomodoroPhase, next: PomodoroPhase, cycle_count: u32) -> Notification {
    let (kind, title) = match completed {
        PomodoroPhase::Work => (NotificationKind::WorkComplete, "Work session complete"),
        PomodoroPhase::LongBreak => (NotificationKind::LongBreakComplete, "Long break is over"),
        PomodoroPhase::Break | PomodoroPhase::Ready => {
            (NotificationKind::BreakComplete, "Break is over")
        }
    };
    let body = match next {
        PomodoroPhase::LongBreak => format!(
            "{} pomodoros done. Take a long break.",
            cycle_count
        ),
        PomodoroPhase::Break => format!("Pomodoro #{} done. Take a short break.", cycle_count),
        PomodoroPhase::Work | PomodoroPhase::Ready => "Back to work.".to_string(),
    };

    NotificationBuilder::new(kind).title(title).body(&body).build()
}

/// Builder for constructing notification content.
#[derive(Debug, Clone)]
pub struct NotificationBuilder {
    kind: NotificationKind,
    title: String,
    body: String,
}

impl NotificationBuilder {
    /// Creates a builder with empty text.
    #[must_use]
    pub fn new(kind: NotificationKind) -> Self {
        Self {
            kind,
            title: String::new(),
            body: String::new(),
        }
    }

    /// Sets the notification title.
    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.title = sanitize_text(title);
        self
    }

    /// Sets the notification body text.
    #[must_use]
    pub fn body(mut self, body: &str) -> Self {
        self.body = sanitize_text(body);
        self
    }

    /// Builds the notification.
    #[must_use]
    pub fn build(self) -> Notification {
        Notification {
            kind: self.kind,
            title: self.title,
            body: self.body,
        }
    }
}

/// Truncates text and strips control characters.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .take(MAX_TEXT_LENGTH)
        .collect()
}
