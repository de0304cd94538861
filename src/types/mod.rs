//! Core data types for the time tracker.
//!
//! This module defines the data structures used for:
//! - Mode and pomodoro phase enumerations
//! - Engine configuration with validation
//! - The mutable engine state and its pure counter transitions
//! - Display snapshots handed to renderers

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// Mode
// ============================================================================

/// Which accounting rule the engine applies on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Wall-clock display, no counters
    #[default]
    Clock,
    /// Counts up from zero
    Stopwatch,
    /// Counts down from a user-configured duration
    Countdown,
    /// Alternating work and break phases
    Pomodoro,
}

impl Mode {
    /// All modes, in tab order.
    pub const ALL: [Mode; 4] = [Mode::Clock, Mode::Stopwatch, Mode::Countdown, Mode::Pomodoro];

    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Clock => "clock",
            Mode::Stopwatch => "stopwatch",
            Mode::Countdown => "countdown",
            Mode::Pomodoro => "pomodoro",
        }
    }

    /// Returns true if `start()` has any meaning in this mode.
    pub fn is_startable(&self) -> bool {
        !matches!(self, Mode::Clock)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| format!("unknown mode: {}", s.trim()))
    }
}

// ============================================================================
// PomodoroPhase
// ============================================================================

/// Current phase of a pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PomodoroPhase {
    /// Nothing started yet
    #[default]
    Ready,
    /// Focused work session
    Work,
    /// Short break
    Break,
    /// Long break (every Nth completed work phase)
    LongBreak,
}

impl PomodoroPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            PomodoroPhase::Ready => "ready",
            PomodoroPhase::Work => "work",
            PomodoroPhase::Break => "break",
            PomodoroPhase::LongBreak => "long_break",
        }
    }
}

// ============================================================================
// TickResolution
// ============================================================================

/// Tick period used by the stopwatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickResolution {
    /// One tick per second
    #[default]
    Seconds,
    /// One tick per 10ms
    Centiseconds,
}

impl TickResolution {
    /// Returns the tick period.
    pub fn period(&self) -> Duration {
        match self {
            TickResolution::Seconds => Duration::from_secs(1),
            TickResolution::Centiseconds => Duration::from_millis(10),
        }
    }

    /// Returns how many ticks make up one second.
    pub fn ticks_per_second(&self) -> u64 {
        match self {
            TickResolution::Seconds => 1,
            TickResolution::Centiseconds => 100,
        }
    }
}

// ============================================================================
// EngineConfig
// ============================================================================

fn default_work_seconds() -> u32 {
    25 * 60
}

fn default_short_break_seconds() -> u32 {
    5 * 60
}

fn default_long_break_seconds() -> u32 {
    15 * 60
}

fn default_long_break_interval() -> u32 {
    4
}

fn default_auto_start_delay_seconds() -> u32 {
    3
}

fn default_auto_reset_on_expiry() -> bool {
    true
}

/// Longest accepted phase duration (one day).
pub const MAX_PHASE_SECONDS: u32 = 86_400;

/// Pomodoro phase durations and cycling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    /// Work phase duration in seconds
    #[serde(default = "default_work_seconds")]
    pub work_seconds: u32,
    /// Short break duration in seconds
    #[serde(default = "default_short_break_seconds")]
    pub short_break_seconds: u32,
    /// Long break duration in seconds
    #[serde(default = "default_long_break_seconds")]
    pub long_break_seconds: u32,
    /// Every Nth completed work phase is followed by a long break
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    /// Whether the next phase starts by itself after a phase completes
    #[serde(default)]
    pub auto_start_next: bool,
    /// Delay before the automatic start, in seconds
    #[serde(default = "default_auto_start_delay_seconds")]
    pub auto_start_delay_seconds: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_seconds: default_work_seconds(),
            short_break_seconds: default_short_break_seconds(),
            long_break_seconds: default_long_break_seconds(),
            long_break_interval: default_long_break_interval(),
            auto_start_next: false,
            auto_start_delay_seconds: default_auto_start_delay_seconds(),
        }
    }
}

impl PomodoroConfig {
    /// Sets the work duration in minutes.
    pub fn with_work_minutes(mut self, minutes: u32) -> Self {
        self.work_seconds = minutes.saturating_mul(60);
        self
    }

    /// Sets the short break duration in minutes.
    pub fn with_short_break_minutes(mut self, minutes: u32) -> Self {
        self.short_break_seconds = minutes.saturating_mul(60);
        self
    }

    /// Sets the long break duration in minutes.
    pub fn with_long_break_minutes(mut self, minutes: u32) -> Self {
        self.long_break_seconds = minutes.saturating_mul(60);
        self
    }

    /// Returns the duration loaded when entering `phase`.
    pub fn duration_of(&self, phase: PomodoroPhase) -> u64 {
        let seconds = match phase {
            PomodoroPhase::Ready => 0,
            PomodoroPhase::Work => self.work_seconds,
            PomodoroPhase::Break => self.short_break_seconds,
            PomodoroPhase::LongBreak => self.long_break_seconds,
        };
        u64::from(seconds)
    }

    /// Returns the delay before an automatic phase start.
    pub fn auto_start_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.auto_start_delay_seconds))
    }
}

/// Configuration for a time tracker engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Stopwatch tick resolution
    #[serde(default)]
    pub tick_resolution: TickResolution,
    /// Whether an expired countdown clears its configured duration
    #[serde(default = "default_auto_reset_on_expiry")]
    pub auto_reset_on_expiry: bool,
    /// Pomodoro settings
    #[serde(default)]
    pub pomodoro: PomodoroConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_resolution: TickResolution::default(),
            auto_reset_on_expiry: default_auto_reset_on_expiry(),
            pomodoro: PomodoroConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Sets the stopwatch resolution.
    pub fn with_tick_resolution(mut self, resolution: TickResolution) -> Self {
        self.tick_resolution = resolution;
        self
    }

    /// Sets the countdown expiry policy.
    pub fn with_auto_reset_on_expiry(mut self, auto_reset: bool) -> Self {
        self.auto_reset_on_expiry = auto_reset;
        self
    }

    /// Replaces the pomodoro settings.
    pub fn with_pomodoro(mut self, pomodoro: PomodoroConfig) -> Self {
        self.pomodoro = pomodoro;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        let p = &self.pomodoro;
        let durations = [
            ("work", p.work_seconds),
            ("short break", p.short_break_seconds),
            ("long break", p.long_break_seconds),
        ];
        for (name, seconds) in durations {
            if seconds < 1 || seconds > MAX_PHASE_SECONDS {
                return Err(format!(
                    "{} duration must be between 1 and {} seconds",
                    name, MAX_PHASE_SECONDS
                ));
            }
        }
        if p.long_break_interval < 1 || p.long_break_interval > 24 {
            return Err("long break interval must be between 1 and 24".to_string());
        }
        if p.auto_start_delay_seconds > 3600 {
            return Err("auto start delay must be at most 3600 seconds".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// EngineState
// ============================================================================

/// Mutable state owned by a single engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineState {
    /// Current mode
    pub mode: Mode,
    /// True only while a counting tick source is armed
    pub is_running: bool,
    /// Stopwatch ticks accumulated (unit depends on resolution)
    pub elapsed_ticks: u64,
    /// Countdown/pomodoro seconds left, never below zero
    pub remaining_seconds: u64,
    /// Countdown target set by the user
    pub configured_seconds: u64,
    /// Current pomodoro phase
    pub pomodoro_phase: PomodoroPhase,
    /// Completed work phases
    pub pomodoro_cycle_count: u32,
}

impl EngineState {
    /// Creates the state of a freshly constructed engine (Clock mode).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh state in the given mode.
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Stops counting and zeroes every counter, keeping the mode.
    pub fn clear(&mut self) {
        *self = Self::for_mode(self.mode);
    }

    /// Adds one stopwatch tick.
    pub fn advance_stopwatch(&mut self) {
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);
    }

    /// Decrements the remaining time by one second.
    ///
    /// Returns true if the counter is at zero afterwards.
    pub fn count_down(&mut self) -> bool {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.remaining_seconds == 0
    }

    /// Returns the phase that follows the current one.
    ///
    /// Assumes the current work phase, if any, has already been counted.
    pub fn next_pomodoro_phase(&self, long_break_interval: u32) -> PomodoroPhase {
        match self.pomodoro_phase {
            PomodoroPhase::Work => {
                let interval = long_break_interval.max(1);
                if self.pomodoro_cycle_count > 0 && self.pomodoro_cycle_count % interval == 0 {
                    PomodoroPhase::LongBreak
                } else {
                    PomodoroPhase::Break
                }
            }
            PomodoroPhase::Ready | PomodoroPhase::Break | PomodoroPhase::LongBreak => {
                PomodoroPhase::Work
            }
        }
    }

    /// Completes the current pomodoro phase and loads the next one.
    ///
    /// Returns the `(completed, next)` phase pair.
    pub fn advance_pomodoro(&mut self, config: &PomodoroConfig) -> (PomodoroPhase, PomodoroPhase) {
        let completed = self.pomodoro_phase;
        if completed == PomodoroPhase::Work {
            self.pomodoro_cycle_count = self.pomodoro_cycle_count.saturating_add(1);
        }
        let next = self.next_pomodoro_phase(config.long_break_interval);
        self.pomodoro_phase = next;
        self.remaining_seconds = config.duration_of(next);
        (completed, next)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Immutable read of engine state for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current mode
    pub mode: Mode,
    /// Whether a counter is running
    #[serde(rename = "isRunning")]
    pub is_running: bool,
    /// Seconds to display (time of day in clock mode)
    #[serde(rename = "displaySeconds")]
    pub display_seconds: u64,
    /// Sub-second part for high-resolution stopwatches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centiseconds: Option<u8>,
    /// Pomodoro phase (pomodoro mode only)
    #[serde(rename = "pomodoroPhase", skip_serializing_if = "Option::is_none")]
    pub pomodoro_phase: Option<PomodoroPhase>,
    /// Completed work phases (pomodoro mode only)
    #[serde(rename = "pomodoroCycleCount", skip_serializing_if = "Option::is_none")]
    pub pomodoro_cycle_count: Option<u32>,
}

impl Snapshot {
    /// Builds a snapshot from engine state.
    ///
    /// `time_of_day` is only read in clock mode.
    pub fn from_state(state: &EngineState, resolution: TickResolution, time_of_day: u64) -> Self {
        let mut centiseconds = None;
        let display_seconds = match state.mode {
            Mode::Clock => time_of_day,
            Mode::Stopwatch => {
                let per_second = resolution.ticks_per_second();
                if resolution == TickResolution::Centiseconds {
                    centiseconds = Some((state.elapsed_ticks % per_second) as u8);
                }
                state.elapsed_ticks / per_second
            }
            Mode::Countdown | Mode::Pomodoro => state.remaining_seconds,
        };
        let pomodoro = state.mode == Mode::Pomodoro;

        Self {
            mode: state.mode,
            is_running: state.is_running,
            display_seconds,
            centiseconds,
            pomodoro_phase: pomodoro.then_some(state.pomodoro_phase),
            pomodoro_cycle_count: pomodoro.then_some(state.pomodoro_cycle_count),
        }
    }
}

/// Formats seconds as `HH:MM:SS`. Hours grow past two digits as needed.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

// ============================================================================
// Tests
// ============================================================================
