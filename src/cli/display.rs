//! Display utilities for the timekeeper CLI.
//!
//! This module provides formatted output for:
//! - Live timer lines
//! - JSON snapshot lines
//! - Status display
//! - Error messages

use std::io::{self, Write};

use crate::types::{format_hms, Mode, PomodoroPhase, Snapshot};

// ============================================================================
// Display
// ============================================================================

/// Formatting helpers for CLI output.
pub struct Display;

impl Display {
    /// Formats the time shown for a snapshot.
    pub fn format_time(snapshot: &Snapshot) -> String {
        let time = format_hms(snapshot.display_seconds);
        match snapshot.centiseconds {
            Some(centis) => format!("{}.{:02}", time, centis),
            None => time,
        }
    }

    /// Formats a one-line view of a snapshot.
    pub fn format_line(snapshot: &Snapshot) -> String {
        let time = Self::format_time(snapshot);
        match snapshot.mode {
            Mode::Clock => time,
            Mode::Pomodoro => {
                let phase = snapshot.pomodoro_phase.unwrap_or_default();
                let cycles = snapshot.pomodoro_cycle_count.unwrap_or(0);
                format!(
                    "{} [{} #{}]{}",
                    time,
                    Self::phase_label(phase),
                    cycles,
                    Self::paused_suffix(snapshot)
                )
            }
            Mode::Stopwatch | Mode::Countdown => {
                format!("{}{}", time, Self::paused_suffix(snapshot))
            }
        }
    }

    /// Formats the multi-line status view.
    pub fn format_status(snapshot: &Snapshot) -> String {
        let mut lines = vec![
            "timekeeper status".to_string(),
            "─────────────────".to_string(),
            format!("mode: {}", snapshot.mode),
            format!("time: {}", Self::format_time(snapshot)),
        ];
        if snapshot.mode.is_startable() {
            let state = if snapshot.is_running { "running" } else { "stopped" };
            lines.push(format!("state: {}", state));
        }
        if let Some(phase) = snapshot.pomodoro_phase {
            lines.push(format!("phase: {}", Self::phase_label(phase)));
        }
        if let Some(cycles) = snapshot.pomodoro_cycle_count {
            lines.push(format!("pomodoros: {}", cycles));
        }
        lines.join("\n")
    }

    /// Returns a human-readable phase name.
    pub fn phase_label(phase: PomodoroPhase) -> &'static str {
        match phase {
            PomodoroPhase::Ready => "ready",
            PomodoroPhase::Work => "work",
            PomodoroPhase::Break => "break",
            PomodoroPhase::LongBreak => "long break",
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }

    fn paused_suffix(snapshot: &Snapshot) -> &'static str {
        if snapshot.is_running {
            ""
        } else {
            " (stopped)"
        }
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Writes snapshots and messages to an output stream.
///
/// In text mode ticks redraw a single live line; messages end the live
/// line first. In JSON mode every snapshot is its own line.
#[derive(Debug)]
pub struct Renderer<W: Write> {
    out: W,
    json: bool,
    live: bool,
}

impl Renderer<io::Stdout> {
    /// Creates a renderer writing to stdout.
    pub fn stdout(json: bool) -> Self {
        Self::new(io::stdout(), json)
    }
}

impl<W: Write> Renderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            live: false,
        }
    }

    /// Renders a snapshot.
    pub fn snapshot(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        if self.json {
            let line = serde_json::to_string(snapshot)?;
            writeln!(self.out, "{}", line)?;
        } else {
            write!(self.out, "\r\x1b[2K{}", Display::format_line(snapshot))?;
            self.live = true;
        }
        self.out.flush()
    }

    /// Prints a message on its own line.
    ///
    /// Messages are suppressed in JSON mode to keep the output parseable.
    pub fn message(&mut self, text: &str) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        self.end_live_line()?;
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    /// Terminates the live line, if any.
    pub fn finish(&mut self) -> io::Result<()> {
        self.end_live_line()?;
        self.out.flush()
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn end_live_line(&mut self) -> io::Result<()> {
        if self.live {
            writeln!(self.out)?;
            self.live = false;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(mode: Mode, seconds: u64, running: bool) -> Snapshot {
        Snapshot {
            mode,
            is_running: running,
            display_seconds: seconds,
            centiseconds: None,
            pomodoro_phase: None,
            pomodoro_cycle_count: None,
        }
    }

    // ------------------------------------------------------------------------
    // Format Tests
    // ------------------------------------------------------------------------

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_time_plain() {
            assert_eq!(
                Display::format_time(&snapshot(Mode::Countdown, 3723, true)),
                "01:02:03"
            );
        }

        #[test]
        fn test_format_time_centiseconds() {
            let mut s = snapshot(Mode::Stopwatch, 5, true);
            s.centiseconds = Some(7);
            assert_eq!(Display::format_time(&s), "00:00:05.07");
        }

        #[test]
        fn test_format_line_clock() {
            assert_eq!(
                Display::format_line(&snapshot(Mode::Clock, 45_296, false)),
                "12:34:56"
            );
        }

        #[test]
        fn test_format_line_stopped() {
            assert_eq!(
                Display::format_line(&snapshot(Mode::Stopwatch, 61, false)),
                "00:01:01 (stopped)"
            );
        }

        #[test]
        fn test_format_line_pomodoro() {
            let mut s = snapshot(Mode::Pomodoro, 1500, true);
            s.pomodoro_phase = Some(PomodoroPhase::LongBreak);
            s.pomodoro_cycle_count = Some(4);
            assert_eq!(Display::format_line(&s), "00:25:00 [long break #4]");
        }

        #[test]
        fn test_format_status() {
            let mut s = snapshot(Mode::Pomodoro, 90, false);
            s.pomodoro_phase = Some(PomodoroPhase::Work);
            s.pomodoro_cycle_count = Some(2);

            let status = Display::format_status(&s);

            assert!(status.contains("mode: pomodoro"));
            assert!(status.contains("time: 00:01:30"));
            assert!(status.contains("state: stopped"));
            assert!(status.contains("phase: work"));
            assert!(status.contains("pomodoros: 2"));
        }

        #[test]
        fn test_format_status_clock_has_no_state() {
            let status = Display::format_status(&snapshot(Mode::Clock, 0, false));
            assert!(!status.contains("state:"));
        }
    }

    // ------------------------------------------------------------------------
    // Renderer Tests
    // ------------------------------------------------------------------------

    mod renderer_tests {
        use super::*;

        #[test]
        fn test_text_mode_live_line_then_message() {
            let mut renderer = Renderer::new(Vec::new(), false);

            renderer.snapshot(&snapshot(Mode::Countdown, 2, true)).unwrap();
            renderer.snapshot(&snapshot(Mode::Countdown, 1, true)).unwrap();
            renderer.message("Time's up!").unwrap();
            renderer.finish().unwrap();

            let out = String::from_utf8(renderer.into_inner()).unwrap();
            assert!(out.contains("\r\x1b[2K00:00:02"));
            assert!(out.ends_with("00:00:01\nTime's up!\n"));
        }

        #[test]
        fn test_json_mode_lines() {
            let mut renderer = Renderer::new(Vec::new(), true);

            renderer.snapshot(&snapshot(Mode::Stopwatch, 3, true)).unwrap();
            renderer.message("ignored").unwrap();
            renderer.finish().unwrap();

            let out = String::from_utf8(renderer.into_inner()).unwrap();
            assert_eq!(
                out,
                "{\"mode\":\"stopwatch\",\"isRunning\":true,\"displaySeconds\":3}\n"
            );
        }

        #[test]
        fn test_finish_without_live_line_writes_nothing() {
            let mut renderer = Renderer::new(Vec::new(), false);
            renderer.finish().unwrap();
            assert!(renderer.into_inner().is_empty());
        }
    }
}
