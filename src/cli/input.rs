//! User input parsing.
//!
//! Numeric fields are parsed permissively: invalid input becomes zero and
//! is never an error. Session commands are one per line on stdin.

use std::io::BufRead;
use std::thread;

use tokio::sync::mpsc;
use tracing::debug;

use crate::types::Mode;

/// Parses a numeric field, reading leading digits and ignoring the rest.
///
/// Leading whitespace and a sign are accepted. Input without leading
/// digits gives 0. Values saturate at the `i64` range.
pub fn parse_lenient(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut value: i64 = 0;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(10) else {
            break;
        };
        value = value.saturating_mul(10).saturating_add(i64::from(digit));
    }

    if negative {
        -value
    } else {
        value
    }
}

// ============================================================================
// SessionCommand
// ============================================================================

/// A command typed during a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Switch to another mode
    SwitchMode(Mode),
    /// Set the countdown duration
    Set {
        /// Hours field
        hours: i64,
        /// Minutes field
        minutes: i64,
        /// Seconds field
        seconds: i64,
    },
    /// Start or resume
    Start,
    /// Pause
    Pause,
    /// Reset the current mode
    Reset,
    /// Print the current state
    Status,
    /// List commands
    Help,
    /// End the session
    Quit,
}

impl SessionCommand {
    /// Parses one input line.
    ///
    /// Returns `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "start" | "s" => Self::Start,
            "pause" | "p" => Self::Pause,
            "reset" | "r" => Self::Reset,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            "set" => {
                let mut field = || words.next().map(parse_lenient).unwrap_or(0);
                Self::Set {
                    hours: field(),
                    minutes: field(),
                    seconds: field(),
                }
            }
            other => match other.parse::<Mode>() {
                Ok(mode) => Self::SwitchMode(mode),
                Err(_) => return Err(format!("unknown command: {}", head)),
            },
        };

        Ok(Some(command))
    }
}

/// Help text listing the session commands.
pub const SESSION_HELP: &str = "\
commands:
  clock | stopwatch | countdown | pomodoro   switch mode
  set H M S                                  set the countdown duration
  start | pause | reset                      control the timer
  status                                     show the current state
  quit                                       exit";

/// Reads stdin lines on a background thread.
///
/// The channel closes when stdin reaches end of file. The thread is
/// detached so a pending read never holds up process exit.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
        debug!("stdin closed");
    });

    rx
}

// ============================================================================
// Tests
// ============================================================================
