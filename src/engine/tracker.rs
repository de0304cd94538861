//! Time tracking engine.
//!
//! This module provides the state machine behind every mode:
//! - Mode switching with mutual exclusion of tick sources
//! - Start/pause/reset transitions
//! - Tick accounting (stopwatch count-up, countdown expiry, pomodoro phases)
//! - Event firing for notifications
//!
//! ```text
//! Ready --start--> Running --tick(remaining>0)--> Running
//! Running --tick(remaining==0)--> Expired --(reset policy)--> Ready
//! Running --pause--> Paused --start--> Running
//! any --reset--> Ready
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::clock::{SystemClock, WallClock};
use super::error::EngineError;
use super::scheduler::{Scheduler, SourceId, TickHandle, Wakeup};
use crate::types::{EngineConfig, EngineState, Mode, PomodoroPhase, Snapshot};

/// Period of countdown, pomodoro and clock refresh ticks.
const SECOND: Duration = Duration::from_secs(1);

// ============================================================================
// EngineEvent
// ============================================================================

/// Engine events for notifications and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Mode changed; every counter was reset
    ModeSwitched {
        /// New mode
        mode: Mode,
    },
    /// A counter started or resumed
    Started {
        /// Mode that started
        mode: Mode,
    },
    /// Counting paused
    Paused {
        /// Mode that paused
        mode: Mode,
    },
    /// Counters reset
    Reset {
        /// Mode that was reset
        mode: Mode,
    },
    /// Countdown reached zero
    Expired {
        /// Duration that just ran out
        configured_seconds: u64,
    },
    /// Pomodoro phase ran out and the next phase was loaded
    PhaseComplete {
        /// Phase that finished
        completed: PomodoroPhase,
        /// Phase that is now loaded
        next: PomodoroPhase,
        /// Completed work phases so far
        cycle_count: u32,
    },
    /// The next pomodoro phase will start by itself
    AutoStartScheduled {
        /// Delay before the start
        delay_seconds: u64,
    },
}

// ============================================================================
// TimeTrackerEngine
// ============================================================================

/// The single tick source an engine may own.
#[derive(Debug)]
enum ArmedSource {
    /// Clock refresh or counting ticks
    Repeating(TickHandle),
    /// Pending pomodoro auto-start
    Deferred(TickHandle),
}

impl ArmedSource {
    fn id(&self) -> SourceId {
        match self {
            ArmedSource::Repeating(handle) | ArmedSource::Deferred(handle) => handle.id(),
        }
    }

    fn is_deferred(&self) -> bool {
        matches!(self, ArmedSource::Deferred(_))
    }
}

/// Clock/stopwatch/countdown/pomodoro state machine.
///
/// Owns its state, its configuration and at most one tick source.
pub struct TimeTrackerEngine<S: Scheduler> {
    /// Current engine state
    state: EngineState,
    /// Engine configuration
    config: EngineConfig,
    /// Where tick sources come from
    scheduler: S,
    /// Time of day for clock mode
    clock: Box<dyn WallClock>,
    /// The active tick source, if any
    source: Option<ArmedSource>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<EngineEvent>,
}

impl<S: Scheduler> TimeTrackerEngine<S> {
    /// Creates an engine in clock mode reading the system clock.
    pub fn new(
        config: EngineConfig,
        scheduler: S,
        event_tx: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        Self::with_clock(config, scheduler, SystemClock, event_tx)
    }

    /// Creates an engine in clock mode reading the given wall clock.
    pub fn with_clock(
        config: EngineConfig,
        scheduler: S,
        clock: impl WallClock + 'static,
        event_tx: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        let mut engine = Self {
            state: EngineState::new(),
            config,
            scheduler,
            clock: Box::new(clock),
            source: None,
            event_tx,
        };
        engine.arm_clock_refresh();
        engine
    }

    /// Switches to `mode`, cancelling any active tick source and zeroing
    /// every counter.
    pub fn switch_mode(&mut self, mode: Mode) -> Snapshot {
        self.disarm();
        self.state = EngineState::for_mode(mode);
        if mode == Mode::Clock {
            self.arm_clock_refresh();
        }

        debug!(%mode, "Switched mode");
        self.emit(EngineEvent::ModeSwitched { mode });
        self.snapshot()
    }

    /// Sets the countdown target. Negative inputs count as zero.
    ///
    /// Ignored outside countdown mode. Never starts the timer. Returns the
    /// configured total in seconds.
    pub fn configure(&mut self, hours: i64, minutes: i64, seconds: i64) -> u64 {
        if self.state.mode != Mode::Countdown {
            debug!(mode = %self.state.mode, "Ignoring configure outside countdown mode");
            return self.state.configured_seconds;
        }

        let clamp = |value: i64| u64::try_from(value).unwrap_or(0);
        let total = clamp(hours)
            .saturating_mul(3600)
            .saturating_add(clamp(minutes).saturating_mul(60))
            .saturating_add(clamp(seconds));

        self.state.configured_seconds = total;
        if !self.state.is_running {
            // A paused countdown restarts from the new duration.
            self.state.remaining_seconds = 0;
        }
        debug!(configured_seconds = total, "Configured countdown");
        total
    }

    /// Starts or resumes counting in the current mode.
    ///
    /// No-op in clock mode and when already running.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfiguration` in countdown mode when
    /// no positive duration is configured. State is left unchanged.
    pub fn start(&mut self) -> Result<Snapshot, EngineError> {
        if self.state.is_running {
            return Ok(self.snapshot());
        }

        match self.state.mode {
            Mode::Clock => {
                debug!("Start has no effect in clock mode");
                return Ok(self.snapshot());
            }
            Mode::Stopwatch => {
                self.begin_counting(self.config.tick_resolution.period());
            }
            Mode::Countdown => {
                if self.state.configured_seconds == 0 {
                    return Err(EngineError::zero_duration());
                }
                if self.state.remaining_seconds == 0 {
                    self.state.remaining_seconds = self.state.configured_seconds;
                }
                self.begin_counting(SECOND);
            }
            Mode::Pomodoro => {
                if self.state.pomodoro_phase == PomodoroPhase::Ready {
                    self.state.pomodoro_phase = PomodoroPhase::Work;
                    self.state.remaining_seconds =
                        self.config.pomodoro.duration_of(PomodoroPhase::Work);
                }
                self.begin_counting(SECOND);
            }
        }

        Ok(self.snapshot())
    }

    /// Stops counting and keeps the counters.
    ///
    /// Also cancels a pending pomodoro auto-start. No-op when nothing runs.
    pub fn pause(&mut self) -> Snapshot {
        let pending_start = self.source.as_ref().is_some_and(ArmedSource::is_deferred);
        if !self.state.is_running && !pending_start {
            return self.snapshot();
        }

        self.disarm();
        self.state.is_running = false;

        debug!(mode = %self.state.mode, "Paused");
        self.emit(EngineEvent::Paused {
            mode: self.state.mode,
        });
        self.snapshot()
    }

    /// Stops counting and returns the current mode to its fresh state.
    ///
    /// Idempotent. In clock mode there is nothing to reset and the clock
    /// keeps refreshing.
    pub fn reset(&mut self) -> Snapshot {
        if self.state.mode == Mode::Clock {
            return self.snapshot();
        }

        self.disarm();
        self.state.clear();

        debug!(mode = %self.state.mode, "Reset");
        self.emit(EngineEvent::Reset {
            mode: self.state.mode,
        });
        self.snapshot()
    }

    /// Applies one tick of the current mode's accounting rule.
    ///
    /// Does nothing to the counters unless the engine is running.
    pub fn tick(&mut self) -> Snapshot {
        if self.state.is_running {
            match self.state.mode {
                Mode::Clock => {}
                Mode::Stopwatch => self.state.advance_stopwatch(),
                Mode::Countdown => {
                    if self.state.count_down() {
                        self.expire();
                    }
                }
                Mode::Pomodoro => {
                    if self.state.count_down() {
                        self.complete_phase();
                    }
                }
            }
        }

        self.snapshot()
    }

    /// Handles a wakeup from the scheduler.
    ///
    /// Wakeups from any source other than the one currently armed are
    /// stale and ignored. Returns the new snapshot if the wakeup applied.
    pub fn on_wakeup(&mut self, wakeup: Wakeup) -> Option<Snapshot> {
        let from = wakeup.source_id();
        let deferred = match &self.source {
            Some(source) if source.id() == from => source.is_deferred(),
            _ => {
                debug!(source = from, "Ignoring stale wakeup");
                return None;
            }
        };

        match (wakeup, deferred) {
            (Wakeup::Tick(_), false) => Some(self.tick()),
            (Wakeup::Deferred(_), true) => {
                self.source = None;
                match self.start() {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        warn!("Deferred start failed: {}", e);
                        None
                    }
                }
            }
            _ => {
                debug!(?wakeup, "Ignoring wakeup of the wrong kind");
                None
            }
        }
    }

    /// Returns a snapshot of the current state for rendering.
    pub fn snapshot(&self) -> Snapshot {
        let time_of_day = if self.state.mode == Mode::Clock {
            self.clock.seconds_since_midnight()
        } else {
            0
        };
        Snapshot::from_state(&self.state, self.config.tick_resolution, time_of_day)
    }

    /// Returns a reference to the current engine state.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Returns the current mode.
    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Returns true if a counter is running.
    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Returns the id of the armed tick source, if any.
    pub fn active_source(&self) -> Option<SourceId> {
        self.source.as_ref().map(ArmedSource::id)
    }

    /// Returns a mutable reference to the engine state (for testing).
    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut EngineState {
        &mut self.state
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn begin_counting(&mut self, period: Duration) {
        self.disarm();
        let handle = self.scheduler.schedule_repeating(period);
        self.source = Some(ArmedSource::Repeating(handle));
        self.state.is_running = true;

        debug!(mode = %self.state.mode, remaining = self.state.remaining_seconds, "Started");
        self.emit(EngineEvent::Started {
            mode: self.state.mode,
        });
    }

    fn arm_clock_refresh(&mut self) {
        self.disarm();
        let handle = self.scheduler.schedule_repeating(SECOND);
        self.source = Some(ArmedSource::Repeating(handle));
    }

    fn disarm(&mut self) {
        // Dropping the handle cancels the source.
        self.source = None;
    }

    fn expire(&mut self) {
        self.disarm();
        self.state.is_running = false;

        let configured_seconds = self.state.configured_seconds;
        info!(configured_seconds, "Countdown expired");
        self.emit(EngineEvent::Expired { configured_seconds });

        if self.config.auto_reset_on_expiry {
            self.state.clear();
        }
    }

    fn complete_phase(&mut self) {
        self.disarm();
        self.state.is_running = false;

        let (completed, next) = self.state.advance_pomodoro(&self.config.pomodoro);
        let cycle_count = self.state.pomodoro_cycle_count;
        info!(
            completed = completed.as_str(),
            next = next.as_str(),
            cycle_count,
            "Pomodoro phase complete"
        );
        self.emit(EngineEvent::PhaseComplete {
            completed,
            next,
            cycle_count,
        });

        if self.config.pomodoro.auto_start_next {
            let delay = self.config.pomodoro.auto_start_delay();
            let handle = self.scheduler.schedule_once(delay);
            self.source = Some(ArmedSource::Deferred(handle));
            self.emit(EngineEvent::AutoStartScheduled {
                delay_seconds: delay.as_secs(),
            });
        }
    }

    fn emit(&self, event: EngineEvent) {
        if self.event_tx.send(event).is_err() {
            warn!("Engine event dropped: no receiver");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
