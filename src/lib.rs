//! Timekeeper Library
//!
//! This library provides the core functionality for the timekeeper CLI.
//! It includes:
//! - Time tracking engine for clock, stopwatch, countdown and pomodoro modes
//! - Tick schedulers (tokio-backed and manual for tests)
//! - Notification delivery for expiries and phase changes
//! - Configuration file loading
//! - CLI command parsing, display and the terminal session

pub mod cli;
pub mod config;
pub mod engine;
pub mod notify;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_hms, EngineConfig, EngineState, Mode, PomodoroConfig, PomodoroPhase, Snapshot,
    TickResolution,
};

pub use engine::{
    EngineError, EngineEvent, FixedClock, ManualScheduler, Scheduler, SystemClock,
    TimeTrackerEngine, TokioScheduler, WallClock, Wakeup,
};

pub use notify::{MockNotifier, Notification, NotificationKind, Notifier, TerminalNotifier};

pub use config::{load_config, ConfigError};
