//! CLI module for timekeeper.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `input`: Lenient field parsing and stdin session commands
//! - `display`: Output formatting and display logic
//! - `session`: Terminal session driving the engine

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

pub use commands::{ClockArgs, Cli, Commands, CountdownArgs, PomodoroArgs, StopwatchArgs};
pub use display::{Display, Renderer};
pub use input::{parse_lenient, SessionCommand};
pub use session::{Session, SessionOptions, SessionOutcome};
