//! Behavioral tests for the time tracker engine.
//!
//! These tests drive the engine through its public API with a manual
//! scheduler and a fixed wall clock:
//! - Stopwatch counts exactly the ticks it receives
//! - Countdown expiry fires once and stops the source
//! - Zero-duration start is rejected without side effects
//! - Stale ticks after a mode switch are ignored
//! - Reset returns to the fresh state of the mode
//! - Long break after the configured number of work phases

use tokio::sync::mpsc;

use timekeeper::engine::SourceKind;
use timekeeper::{
    EngineConfig, EngineError, EngineEvent, EngineState, FixedClock, ManualScheduler, Mode,
    PomodoroConfig, PomodoroPhase, TimeTrackerEngine, Wakeup,
};

// ============================================================================
// Test Helpers
// ============================================================================

type Engine = TimeTrackerEngine<ManualScheduler>;

/// Creates an engine at 09:00:00 with the given configuration.
fn create_engine(
    config: EngineConfig,
) -> (Engine, ManualScheduler, mpsc::UnboundedReceiver<EngineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = ManualScheduler::new();
    let engine = TimeTrackerEngine::with_clock(config, scheduler.clone(), FixedClock::at(9, 0, 0), tx);
    (engine, scheduler, rx)
}

/// Fires the currently armed repeating source once.
fn fire_tick(engine: &mut Engine) {
    let id = engine.active_source().expect("a tick source should be armed");
    engine.on_wakeup(Wakeup::Tick(id));
}

/// Collects every event sent so far.
fn drain(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// A pomodoro configuration with short phases.
fn fast_pomodoro() -> EngineConfig {
    EngineConfig::default().with_pomodoro(PomodoroConfig {
        work_seconds: 2,
        short_break_seconds: 1,
        long_break_seconds: 3,
        ..PomodoroConfig::default()
    })
}

// ============================================================================
// Stopwatch
// ============================================================================

#[test]
fn test_stopwatch_counts_every_tick() {
    let (mut engine, _scheduler, _rx) = create_engine(EngineConfig::default());
    engine.switch_mode(Mode::Stopwatch);
    engine.start().unwrap();

    for expected in 1..=75u64 {
        fire_tick(&mut engine);
        assert_eq!(engine.state().elapsed_ticks, expected);
    }
    assert_eq!(engine.snapshot().display_seconds, 75);
}

#[test]
fn test_stopwatch_pause_keeps_count() {
    let (mut engine, scheduler, _rx) = create_engine(EngineConfig::default());
    engine.switch_mode(Mode::Stopwatch);
    engine.start().unwrap();
    fire_tick(&mut engine);
    fire_tick(&mut engine);

    let snapshot = engine.pause();

    assert!(!snapshot.is_running);
    assert_eq!(snapshot.display_seconds, 2);
    assert_eq!(scheduler.active_count(), 0);
}

// ============================================================================
// Countdown
// ============================================================================

#[test]
fn test_countdown_runs_to_expiry() {
    let (mut engine, scheduler, mut rx) = create_engine(EngineConfig::default());
    engine.switch_mode(Mode::Countdown);
    engine.configure(0, 0, 10);
    let started = engine.start().unwrap();
    assert_eq!(started.display_seconds, 10);
    drain(&mut rx);

    let mut seen = Vec::new();
    for _ in 0..10 {
        fire_tick(&mut engine);
        seen.push(engine.state().remaining_seconds);
    }

    assert_eq!(seen, vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
    assert!(!engine.is_running());
    assert_eq!(scheduler.active_count(), 0);
    assert_eq!(
        drain(&mut rx),
        vec![EngineEvent::Expired {
            configured_seconds: 10
        }]
    );
}

#[test]
fn test_countdown_expires_only_once() {
    let (mut engine, _scheduler, mut rx) = create_engine(EngineConfig::default());
    engine.switch_mode(Mode::Countdown);
    engine.configure(0, 0, 1);
    engine.start().unwrap();
    let id = engine.active_source().unwrap();

    engine.on_wakeup(Wakeup::Tick(id));
    assert_eq!(engine.on_wakeup(Wakeup::Tick(id)), None);

    let expirations = drain(&mut rx)
        .into_iter()
        .filter(|event| matches!(event, EngineEvent::Expired { .. }))
        .count();
    assert_eq!(expirations, 1);
}

#[test]
fn test_zero_duration_start_is_rejected() {
    let (mut engine, scheduler, mut rx) = create_engine(EngineConfig::default());
    engine.switch_mode(Mode::Countdown);
    engine.configure(0, 0, 0);
    drain(&mut rx);
    let before = engine.state().clone();
    let armed_before = scheduler.armed_total();

    let result = engine.start();

    assert_eq!(result, Err(EngineError::zero_duration()));
    assert_eq!(engine.state(), &before);
    assert_eq!(scheduler.armed_total(), armed_before);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_negative_fields_count_as_zero() {
    let (mut engine, _scheduler, _rx) = create_engine(EngineConfig::default());
    engine.switch_mode(Mode::Countdown);

    assert_eq!(engine.configure(-1, 2, -30), 120);
}

#[test]
fn test_new_duration_applies_after_pause() {
    let (mut engine, _scheduler, _rx) = create_engine(EngineConfig::default());
    engine.switch_mode(Mode::Countdown);
    engine.configure(0, 0, 10);
    engine.start().unwrap();
    fire_tick(&mut engine);
    engine.pause();

    let total = engine.configure(0, 0, 30);
    let resumed = engine.start().unwrap();

    assert_eq!(resumed.display_seconds, total);
    fire_tick(&mut engine);
    assert_eq!(engine.state().remaining_seconds, 29);
}

// ============================================================================
// Mode switching
// ============================================================================

#[test]
fn test_stale_tick_after_switch_is_ignored() {
    let (mut engine, scheduler, _rx) = create_engine(EngineConfig::default());
    engine.switch_mode(Mode::Stopwatch);
    engine.start().unwrap();
    let old = engine.active_source().unwrap();

    engine.switch_mode(Mode::Countdown);

    assert_eq!(engine.on_wakeup(Wakeup::Tick(old)), None);
    assert_eq!(engine.state(), &EngineState::for_mode(Mode::Countdown));
    assert_eq!(scheduler.active_count(), 0);
}

#[test]
fn test_at_most_one_source_across_switches() {
    let (mut engine, scheduler, _rx) = create_engine(fast_pomodoro());

    for mode in [Mode::Stopwatch, Mode::Pomodoro, Mode::Clock, Mode::Countdown] {
        engine.switch_mode(mode);
        let _ = engine.start();
        assert!(scheduler.active_count() <= 1, "mode {mode} armed twice");
    }
}

#[test]
fn test_clock_refreshes_every_second() {
    let (mut engine, scheduler, _rx) = create_engine(EngineConfig::default());
    engine.switch_mode(Mode::Stopwatch);

    let snapshot = engine.switch_mode(Mode::Clock);

    assert_eq!(snapshot.display_seconds, 9 * 3600);
    assert!(!snapshot.is_running);
    let source = scheduler.latest().unwrap();
    assert!(matches!(source.kind, SourceKind::Repeating(period) if period.as_secs() == 1));
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn test_reset_matches_fresh_state() {
    let (mut engine, scheduler, _rx) = create_engine(fast_pomodoro());

    for mode in [Mode::Stopwatch, Mode::Countdown, Mode::Pomodoro] {
        engine.switch_mode(mode);
        engine.configure(0, 0, 5);
        engine.start().unwrap();
        fire_tick(&mut engine);

        engine.reset();

        assert_eq!(engine.state(), &EngineState::for_mode(mode));
        assert_eq!(scheduler.active_count(), 0);
    }
}

#[test]
fn test_reset_is_idempotent() {
    let (mut engine, _scheduler, _rx) = create_engine(EngineConfig::default());
    engine.switch_mode(Mode::Stopwatch);
    engine.start().unwrap();

    let first = engine.reset();
    let second = engine.reset();

    assert_eq!(first, second);
}

// ============================================================================
// Pomodoro
// ============================================================================

#[test]
fn test_long_break_after_fourth_work_phase() {
    let (mut engine, _scheduler, mut rx) = create_engine(fast_pomodoro());
    engine.switch_mode(Mode::Pomodoro);

    let mut completions = Vec::new();
    while completions.len() < 4 {
        engine.start().unwrap();
        while engine.is_running() {
            fire_tick(&mut engine);
        }
        for event in drain(&mut rx) {
            if let EngineEvent::PhaseComplete {
                completed: PomodoroPhase::Work,
                next,
                cycle_count,
            } = event
            {
                completions.push((next, cycle_count));
            }
        }
    }

    assert_eq!(
        completions,
        vec![
            (PomodoroPhase::Break, 1),
            (PomodoroPhase::Break, 2),
            (PomodoroPhase::Break, 3),
            (PomodoroPhase::LongBreak, 4),
        ]
    );
    assert_eq!(engine.state().pomodoro_phase, PomodoroPhase::LongBreak);
    assert_eq!(engine.state().remaining_seconds, 3);
}

#[test]
fn test_auto_start_arms_deferred_source() {
    let config = EngineConfig::default().with_pomodoro(PomodoroConfig {
        work_seconds: 1,
        auto_start_next: true,
        auto_start_delay_seconds: 3,
        ..PomodoroConfig::default()
    });
    let (mut engine, scheduler, mut rx) = create_engine(config);
    engine.switch_mode(Mode::Pomodoro);
    engine.start().unwrap();

    fire_tick(&mut engine);

    assert!(!engine.is_running());
    let pending = scheduler.latest().unwrap();
    assert!(matches!(pending.kind, SourceKind::Once(delay) if delay.as_secs() == 3));
    assert!(drain(&mut rx).contains(&EngineEvent::AutoStartScheduled { delay_seconds: 3 }));

    let snapshot = engine.on_wakeup(Wakeup::Deferred(pending.id)).unwrap();

    assert!(snapshot.is_running);
    assert_eq!(snapshot.pomodoro_phase, Some(PomodoroPhase::Break));
}
