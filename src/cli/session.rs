//! Terminal session driving a time tracker engine.
//!
//! The session owns the engine and a [`TokioScheduler`], and multiplexes
//! three inputs in one loop: scheduler wakeups, typed commands and
//! Ctrl-C. Engine events are drained after every step and forwarded to
//! the notifier.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::display::{Display, Renderer};
use super::input::{spawn_stdin_reader, SessionCommand, SESSION_HELP};
use crate::engine::{EngineEvent, TimeTrackerEngine, TokioScheduler, Wakeup};
use crate::notify::{dispatch_event, Notifier, TerminalNotifier};
use crate::types::{format_hms, EngineConfig, Mode, PomodoroPhase, Snapshot};

// ============================================================================
// SessionOptions
// ============================================================================

/// What a session does before and while it runs.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Mode selected at startup
    pub initial_mode: Mode,
    /// Countdown fields applied at startup
    pub countdown: Option<(i64, i64, i64)>,
    /// Call `start()` right after setup
    pub auto_start: bool,
    /// End the session when a countdown expires
    pub exit_on_expiry: bool,
    /// End the session after this many completed work phases
    pub max_cycles: Option<u32>,
    /// Render the initial snapshot and return
    pub once: bool,
    /// Print snapshots as JSON lines
    pub json: bool,
    /// Ring the terminal bell on notifications
    pub bell: bool,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Last snapshot of the engine
    pub snapshot: Snapshot,
    /// Number of countdown expiries seen
    pub expirations: u32,
    /// Completed work phases
    pub completed_cycles: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

// ============================================================================
// Session
// ============================================================================

/// A running timer attached to a terminal.
pub struct Session<W: Write> {
    engine: TimeTrackerEngine<TokioScheduler>,
    wakeups: mpsc::UnboundedReceiver<Wakeup>,
    events: mpsc::UnboundedReceiver<EngineEvent>,
    input: mpsc::UnboundedReceiver<String>,
    input_open: bool,
    renderer: Renderer<W>,
    notifier: Arc<dyn Notifier>,
    options: SessionOptions,
    expirations: u32,
}

impl Session<io::Stdout> {
    /// Creates a session on stdout/stderr reading commands from stdin.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: EngineConfig, options: SessionOptions) -> Self {
        let renderer = Renderer::stdout(options.json);
        let notifier = Arc::new(TerminalNotifier::stderr(options.bell));
        Self::with_io(
            config,
            options,
            renderer,
            notifier,
            Some(spawn_stdin_reader()),
        )
    }
}

impl<W: Write> Session<W> {
    /// Creates a session with explicit output, notifier and input.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_io(
        config: EngineConfig,
        options: SessionOptions,
        renderer: Renderer<W>,
        notifier: Arc<dyn Notifier>,
        input: Option<mpsc::UnboundedReceiver<String>>,
    ) -> Self {
        let (wakeup_tx, wakeups) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        let engine = TimeTrackerEngine::new(config, TokioScheduler::new(wakeup_tx), event_tx);
        let input_open = input.is_some();
        let input = input.unwrap_or_else(|| mpsc::unbounded_channel().1);

        Self {
            engine,
            wakeups,
            events,
            input,
            input_open,
            renderer,
            notifier,
            options,
            expirations: 0,
        }
    }

    /// Runs the session until it is told to quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial start is rejected or output fails.
    pub async fn run(mut self) -> Result<SessionOutcome> {
        let snapshot = self.prepare()?;
        self.renderer.snapshot(&snapshot)?;

        let mut flow = self.drain_events()?;
        if self.options.once {
            flow = Flow::Quit;
        }

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        while flow == Flow::Continue {
            flow = tokio::select! {
                Some(wakeup) = self.wakeups.recv() => self.on_wakeup(wakeup)?,
                line = self.input.recv(), if self.input_open => match line {
                    Some(line) => self.on_line(&line)?,
                    None => {
                        debug!("Input closed");
                        self.input_open = false;
                        Flow::Continue
                    }
                },
                _ = &mut ctrl_c => {
                    info!("Interrupted");
                    Flow::Quit
                }
            };

            if flow == Flow::Continue {
                flow = self.drain_events()?;
            }
        }

        self.renderer.finish()?;
        Ok(self.outcome())
    }

    /// Applies the startup options to a fresh engine.
    fn prepare(&mut self) -> Result<Snapshot> {
        let mut snapshot = self.engine.switch_mode(self.options.initial_mode);

        if let Some((hours, minutes, seconds)) = self.options.countdown {
            self.engine.configure(hours, minutes, seconds);
        }
        if self.options.auto_start {
            snapshot = self.engine.start().context("cannot start timer")?;
        }

        Ok(snapshot)
    }

    fn on_wakeup(&mut self, wakeup: Wakeup) -> Result<Flow> {
        if let Some(snapshot) = self.engine.on_wakeup(wakeup) {
            self.renderer.snapshot(&snapshot)?;
        }
        Ok(Flow::Continue)
    }

    fn on_line(&mut self, line: &str) -> Result<Flow> {
        let command = match SessionCommand::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(message) => {
                self.renderer
                    .message(&format!("{} (type 'help' for commands)", message))?;
                return Ok(Flow::Continue);
            }
        };

        debug!(?command, "Session command");
        let snapshot = match command {
            SessionCommand::SwitchMode(mode) => self.engine.switch_mode(mode),
            SessionCommand::Set {
                hours,
                minutes,
                seconds,
            } => {
                if self.engine.mode() != Mode::Countdown {
                    self.renderer
                        .message("set only applies in countdown mode")?;
                    return Ok(Flow::Continue);
                }
                let total = self.engine.configure(hours, minutes, seconds);
                self.renderer
                    .message(&format!("countdown set to {}", format_hms(total)))?;
                self.engine.snapshot()
            }
            SessionCommand::Start => match self.engine.start() {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    self.renderer
                        .message(&format!("{} ({})", e, e.suggestion()))?;
                    return Ok(Flow::Continue);
                }
            },
            SessionCommand::Pause => self.engine.pause(),
            SessionCommand::Reset => self.engine.reset(),
            SessionCommand::Status => {
                let status = Display::format_status(&self.engine.snapshot());
                self.renderer.message(&status)?;
                return Ok(Flow::Continue);
            }
            SessionCommand::Help => {
                self.renderer.message(SESSION_HELP)?;
                return Ok(Flow::Continue);
            }
            SessionCommand::Quit => return Ok(Flow::Quit),
        };

        self.renderer.snapshot(&snapshot)?;
        Ok(Flow::Continue)
    }

    /// Forwards pending engine events to the notifier.
    fn drain_events(&mut self) -> Result<Flow> {
        let mut flow = Flow::Continue;

        while let Ok(event) = self.events.try_recv() {
            if matches!(
                event,
                EngineEvent::Expired { .. } | EngineEvent::PhaseComplete { .. }
            ) {
                // Notifications go to their own line.
                self.renderer.finish()?;
            }
            dispatch_event(self.notifier.as_ref(), &event);

            match event {
                EngineEvent::Expired { .. } => {
                    self.expirations += 1;
                    if self.options.exit_on_expiry {
                        flow = Flow::Quit;
                    }
                }
                EngineEvent::PhaseComplete {
                    completed,
                    cycle_count,
                    ..
                } => {
                    let done = self
                        .options
                        .max_cycles
                        .is_some_and(|max| cycle_count >= max);
                    if completed == PomodoroPhase::Work && done {
                        flow = Flow::Quit;
                    }
                }
                EngineEvent::AutoStartScheduled { delay_seconds } => {
                    self.renderer
                        .message(&format!("next phase starts in {}s", delay_seconds))?;
                }
                EngineEvent::ModeSwitched { .. }
                | EngineEvent::Started { .. }
                | EngineEvent::Paused { .. }
                | EngineEvent::Reset { .. } => {}
            }
        }

        Ok(flow)
    }

    fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            snapshot: self.engine.snapshot(),
            expirations: self.expirations,
            completed_cycles: self.engine.state().pomodoro_cycle_count,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MockNotifier, NotificationKind};
    use crate::types::PomodoroConfig;
    use std::sync::Mutex;
    use tokio::time::{timeout, Duration};

    /// Writer that keeps its bytes reachable after the session is consumed.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn session(
        options: SessionOptions,
        input: Option<mpsc::UnboundedReceiver<String>>,
    ) -> (Session<SharedBuffer>, SharedBuffer, Arc<MockNotifier>) {
        session_with_config(EngineConfig::default(), options, input)
    }

    fn session_with_config(
        config: EngineConfig,
        options: SessionOptions,
        input: Option<mpsc::UnboundedReceiver<String>>,
    ) -> (Session<SharedBuffer>, SharedBuffer, Arc<MockNotifier>) {
        let buffer = SharedBuffer::default();
        let notifier = Arc::new(MockNotifier::new());
        let renderer = Renderer::new(buffer.clone(), options.json);
        let session = Session::with_io(
            config,
            options,
            renderer,
            notifier.clone(),
            input,
        );
        (session, buffer, notifier)
    }

    #[tokio::test]
    async fn test_clock_once_renders_single_snapshot() {
        let options = SessionOptions {
            once: true,
            json: true,
            ..SessionOptions::default()
        };
        let (session, buffer, _notifier) = session(options, None);

        let outcome = session.run().await.unwrap();

        assert_eq!(outcome.snapshot.mode, Mode::Clock);
        let text = buffer.text();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"mode\":\"clock\""));
    }

    #[tokio::test]
    async fn test_zero_countdown_fails_to_start() {
        let options = SessionOptions {
            initial_mode: Mode::Countdown,
            countdown: Some((0, 0, 0)),
            auto_start: true,
            exit_on_expiry: true,
            ..SessionOptions::default()
        };
        let (session, _buffer, _notifier) = session(options, None);

        let err = session.run().await.unwrap_err();

        assert!(format!("{:#}", err).contains("invalid configuration"));
    }

    #[tokio::test]
    async fn test_countdown_expires_and_notifies() {
        let options = SessionOptions {
            initial_mode: Mode::Countdown,
            countdown: Some((0, 0, 1)),
            auto_start: true,
            exit_on_expiry: true,
            json: true,
            ..SessionOptions::default()
        };
        let (session, buffer, notifier) = session(options, None);

        let outcome = timeout(Duration::from_secs(5), session.run())
            .await
            .expect("countdown should finish")
            .unwrap();

        assert_eq!(outcome.expirations, 1);
        assert!(!outcome.snapshot.is_running);
        let text = buffer.text();
        assert!(text.contains("\"displaySeconds\":1"));
        assert!(text.contains("\"displaySeconds\":0"));
        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Expired);
    }

    #[tokio::test]
    async fn test_commands_drive_the_engine() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (session, buffer, _notifier) = session(SessionOptions::default(), Some(rx));

        for line in ["stopwatch", "bogus", "start", "pause", "status", "quit"] {
            tx.send(line.to_string()).unwrap();
        }

        let outcome = timeout(Duration::from_secs(5), session.run())
            .await
            .expect("quit should end the session")
            .unwrap();

        assert_eq!(outcome.snapshot.mode, Mode::Stopwatch);
        assert!(!outcome.snapshot.is_running);
        let text = buffer.text();
        assert!(text.contains("unknown command: bogus"));
        assert!(text.contains("mode: stopwatch"));
    }

    #[tokio::test]
    async fn test_start_error_is_reported_not_fatal() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (session, buffer, _notifier) = session(SessionOptions::default(), Some(rx));

        for line in ["countdown", "start", "set 0 0 5", "start", "reset", "quit"] {
            tx.send(line.to_string()).unwrap();
        }

        let outcome = timeout(Duration::from_secs(5), session.run())
            .await
            .expect("quit should end the session")
            .unwrap();

        assert_eq!(outcome.snapshot.display_seconds, 0);
        let text = buffer.text();
        assert!(text.contains("please set a time first"));
        assert!(text.contains("countdown set to 00:00:05"));
    }

    #[tokio::test]
    async fn test_closed_input_keeps_session_alive_until_expiry() {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(tx);
        let options = SessionOptions {
            initial_mode: Mode::Countdown,
            countdown: Some((0, 0, 1)),
            auto_start: true,
            exit_on_expiry: true,
            ..SessionOptions::default()
        };
        let (session, _buffer, _notifier) = session(options, Some(rx));

        let outcome = timeout(Duration::from_secs(5), session.run())
            .await
            .expect("countdown should finish")
            .unwrap();

        assert_eq!(outcome.expirations, 1);
    }

    #[tokio::test]
    async fn test_pomodoro_stops_after_requested_cycles() {
        let config = EngineConfig::default().with_pomodoro(PomodoroConfig {
            work_seconds: 1,
            ..PomodoroConfig::default()
        });
        let options = SessionOptions {
            initial_mode: Mode::Pomodoro,
            auto_start: true,
            max_cycles: Some(1),
            ..SessionOptions::default()
        };
        let (session, _buffer, notifier) = session_with_config(config, options, None);

        let outcome = timeout(Duration::from_secs(5), session.run())
            .await
            .expect("one work phase should finish")
            .unwrap();

        assert_eq!(outcome.completed_cycles, 1);
        assert_eq!(outcome.snapshot.pomodoro_phase, Some(PomodoroPhase::Break));
        assert_eq!(notifier.notifications()[0].kind, NotificationKind::WorkComplete);
    }
}
