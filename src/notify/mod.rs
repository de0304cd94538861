//! Notification delivery for timer events.
//!
//! The engine only pushes [`EngineEvent`](crate::engine::EngineEvent)s.
//! This module turns the interesting ones (countdown expiry, pomodoro
//! phase changes) into [`Notification`]s and hands them to a [`Notifier`].
//!
//! Delivery failures are logged and never stop the timer.

mod content;
mod error;

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

pub use content::{sanitize_text, Notification, NotificationBuilder, NotificationKind};
pub use error::NotifyError;

use crate::engine::EngineEvent;

/// Terminal bell character.
const BELL: &str = "\x07";

/// Something that can show a notification to the user.
pub trait Notifier {
    /// Delivers a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Returns true if notifications can currently be delivered.
    fn is_available(&self) -> bool;
}

/// Notifies about `event` if it deserves a notification.
///
/// Returns true if a notification was delivered.
pub fn dispatch_event(notifier: &dyn Notifier, event: &EngineEvent) -> bool {
    let Some(notification) = Notification::from_event(event) else {
        return false;
    };
    let result = if notifier.is_available() {
        notifier.notify(&notification)
    } else {
        Err(NotifyError::NotAvailable)
    };

    match result {
        Ok(()) => true,
        Err(e) if e.is_recoverable() => {
            warn!("Failed to deliver notification: {} ({})", e, e.suggestion());
            false
        }
        Err(e) => {
            debug!("Skipping {:?}: {}", notification.kind, e);
            false
        }
    }
}

// ============================================================================
// TerminalNotifier
// ============================================================================

/// Writes notifications as text lines, optionally ringing the bell.
#[derive(Debug)]
pub struct TerminalNotifier<W: Write> {
    out: Mutex<W>,
    bell: bool,
}

impl TerminalNotifier<io::Stderr> {
    /// Creates a notifier writing to stderr.
    #[must_use]
    pub fn stderr(bell: bool) -> Self {
        Self::new(io::stderr(), bell)
    }
}

impl<W: Write> TerminalNotifier<W> {
    /// Creates a notifier writing to `out`.
    pub fn new(out: W, bell: bool) -> Self {
        Self {
            out: Mutex::new(out),
            bell,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if self.bell {
            out.write_all(BELL.as_bytes())?;
        }
        writeln!(out, "*** {} {}", notification.title, notification.body)?;
        out.flush()?;
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }
}

// ============================================================================
// MockNotifier
// ============================================================================

/// Mock notifier for testing.
#[derive(Debug)]
pub struct MockNotifier {
    notifications: Mutex<Vec<Notification>>,
    available: AtomicBool,
    should_fail: AtomicBool,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.lock().len()
    }

    pub fn clear_recorded(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotifyError::WriteFailed("Mock failure".to_string()));
        }
        self.lock().push(notification.clone());
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Tests
// ============================================================================
