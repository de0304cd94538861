//! Engine module for the time tracker.
//!
//! This module contains the core timing functionality:
//! - `tracker`: The mode/start/pause/reset/tick state machine
//! - `scheduler`: Tick source abstraction with tokio and manual backends
//! - `clock`: Wall-clock sources for clock mode
//! - `error`: Engine error types

pub mod clock;
pub mod error;
pub mod scheduler;
pub mod tracker;

pub use clock::{FixedClock, SystemClock, WallClock};
pub use error::EngineError;
pub use scheduler::{
    ManualScheduler, ScheduledSource, Scheduler, SourceId, SourceKind, TickHandle,
    TokioScheduler, Wakeup,
};
pub use tracker::{EngineEvent, TimeTrackerEngine};
