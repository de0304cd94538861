//! Command definitions for the timekeeper CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::input::parse_lenient;

// ============================================================================
// CLI Structure
// ============================================================================

/// Clock, stopwatch, countdown and pomodoro timer for the terminal
#[derive(Parser, Debug)]
#[command(
    name = "timekeeper",
    version,
    about = "Clock, stopwatch, countdown and pomodoro timer",
    long_about = "A small terminal timer with four modes.\n\
                  While a timer runs, type start, pause, reset, status, \
                  a mode name or quit on stdin to control it.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read settings from a JSON config file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print every snapshot as a JSON line
    #[arg(long, global = true)]
    pub json: bool,

    /// Do not ring the terminal bell on notifications
    #[arg(long, global = true)]
    pub no_bell: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the current time
    Clock(ClockArgs),

    /// Run a stopwatch
    Stopwatch(StopwatchArgs),

    /// Count down from a duration
    Countdown(CountdownArgs),

    /// Run pomodoro work/break cycles
    Pomodoro(PomodoroArgs),

    /// Start in clock mode and take commands from stdin
    Interactive,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for the clock command
#[derive(Args, Debug, Clone, Default)]
pub struct ClockArgs {
    /// Print the time once and exit
    #[arg(long)]
    pub once: bool,
}

/// Arguments for the stopwatch command
#[derive(Args, Debug, Clone, Default)]
pub struct StopwatchArgs {
    /// Count in hundredths of a second
    #[arg(long)]
    pub centiseconds: bool,
}

/// Arguments for the countdown command
///
/// Fields are taken as typed; anything that does not start with a number
/// counts as zero.
#[derive(Args, Debug, Clone, Default)]
pub struct CountdownArgs {
    /// Hours
    #[arg(short = 'H', long, default_value = "", allow_hyphen_values = true)]
    pub hours: String,

    /// Minutes
    #[arg(short = 'M', long, default_value = "", allow_hyphen_values = true)]
    pub minutes: String,

    /// Seconds
    #[arg(short = 'S', long, default_value = "", allow_hyphen_values = true)]
    pub seconds: String,

    /// Keep the duration after it runs out instead of clearing it
    #[arg(long)]
    pub keep_on_expiry: bool,
}

impl CountdownArgs {
    /// Returns the parsed `(hours, minutes, seconds)` fields.
    pub fn fields(&self) -> (i64, i64, i64) {
        (
            parse_lenient(&self.hours),
            parse_lenient(&self.minutes),
            parse_lenient(&self.seconds),
        )
    }
}

/// Arguments for the pomodoro command
#[derive(Args, Debug, Clone, Default)]
pub struct PomodoroArgs {
    /// Work duration in minutes (1-1440)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=1440))]
    pub work: Option<u32>,

    /// Short break duration in minutes (1-1440)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=1440))]
    pub short_break: Option<u32>,

    /// Long break duration in minutes (1-1440)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=1440))]
    pub long_break: Option<u32>,

    /// Start the next phase automatically after a short delay
    #[arg(short, long)]
    pub auto_start: bool,

    /// Exit after this many completed work phases
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub cycles: Option<u32>,
}

// ============================================================================
// Tests
// ============================================================================
