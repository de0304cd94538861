//! timekeeper - clock, stopwatch, countdown and pomodoro timer
//!
//! Every mode runs in the foreground of the terminal:
//! - `clock` shows the local time of day
//! - `stopwatch` counts up from zero
//! - `countdown` counts down from a duration and exits when it runs out
//! - `pomodoro` alternates work and break phases

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use timekeeper::cli::{Cli, Commands, Display, Session, SessionOptions};
use timekeeper::config::load_config;
use timekeeper::{EngineConfig, Mode, TickResolution};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so JSON snapshots on stdout stay parseable.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        generate_completions(shell);
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("cannot load settings from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let mut options = SessionOptions {
        json: cli.json,
        bell: !cli.no_bell,
        ..SessionOptions::default()
    };

    match command {
        Commands::Clock(args) => {
            options.initial_mode = Mode::Clock;
            options.once = args.once;
        }
        Commands::Stopwatch(args) => {
            if args.centiseconds {
                config.tick_resolution = TickResolution::Centiseconds;
            }
            options.initial_mode = Mode::Stopwatch;
            options.auto_start = true;
        }
        Commands::Countdown(args) => {
            if args.keep_on_expiry {
                config.auto_reset_on_expiry = false;
            }
            options.initial_mode = Mode::Countdown;
            options.countdown = Some(args.fields());
            options.auto_start = true;
            options.exit_on_expiry = true;
        }
        Commands::Pomodoro(args) => {
            let mut pomodoro = config.pomodoro.clone();
            if let Some(minutes) = args.work {
                pomodoro = pomodoro.with_work_minutes(minutes);
            }
            if let Some(minutes) = args.short_break {
                pomodoro = pomodoro.with_short_break_minutes(minutes);
            }
            if let Some(minutes) = args.long_break {
                pomodoro = pomodoro.with_long_break_minutes(minutes);
            }
            if args.auto_start {
                pomodoro.auto_start_next = true;
            }
            config.pomodoro = pomodoro;
            options.initial_mode = Mode::Pomodoro;
            options.auto_start = true;
            options.max_cycles = args.cycles;
        }
        Commands::Interactive => {
            options.initial_mode = Mode::Clock;
        }
        Commands::Completions { .. } => return Ok(()),
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    tracing::debug!(?config, ?options, "Starting session");

    let outcome = Session::new(config, options).run().await?;
    tracing::info!(
        expirations = outcome.expirations,
        completed_cycles = outcome.completed_cycles,
        "Session finished"
    );

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["timekeeper"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_countdown() {
        let cli = Cli::parse_from(["timekeeper", "countdown", "-M", "5"]);
        match cli.command {
            Some(Commands::Countdown(args)) => assert_eq!(args.fields(), (0, 5, 0)),
            _ => panic!("Expected Countdown command"),
        }
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["timekeeper", "--verbose", "clock"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
