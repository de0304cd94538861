//! Tick source scheduling.
//!
//! The engine never sleeps or spawns anything itself. It asks a
//! [`Scheduler`] for a tick source and gets back a [`TickHandle`];
//! dropping the handle cancels the source. Real schedulers deliver
//! [`Wakeup`]s tagged with the source id so that a wakeup emitted by a
//! source that has since been cancelled can be recognised and ignored.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::debug;

/// Identifier of a single armed tick source.
pub type SourceId = u64;

// ============================================================================
// Wakeup
// ============================================================================

/// A wakeup delivered by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// One period of a repeating source elapsed
    Tick(SourceId),
    /// A one-shot deferred source fired
    Deferred(SourceId),
}

impl Wakeup {
    /// Returns the id of the source that produced this wakeup.
    pub fn source_id(&self) -> SourceId {
        match self {
            Wakeup::Tick(id) | Wakeup::Deferred(id) => *id,
        }
    }
}

// ============================================================================
// TickHandle
// ============================================================================

/// Owning handle of an armed tick source.
///
/// The source stays armed exactly as long as the handle lives.
pub struct TickHandle {
    id: SourceId,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TickHandle {
    /// Creates a handle that runs `cancel` when dropped.
    pub fn new(id: SourceId, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Returns the source id.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Cancels the source now.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickHandle").field("id", &self.id).finish()
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Source of timer wakeups for the engine.
pub trait Scheduler {
    /// Arms a source that fires every `period`, first after one period.
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle;

    /// Arms a source that fires once after `delay`.
    fn schedule_once(&mut self, delay: Duration) -> TickHandle;
}

// ============================================================================
// TokioScheduler
// ============================================================================

/// Scheduler backed by tokio timers.
///
/// Each source is a spawned task that sends [`Wakeup`]s into a channel;
/// cancelling the source aborts the task. Must be used from within a
/// tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    wakeup_tx: mpsc::UnboundedSender<Wakeup>,
    next_id: SourceId,
}

impl TokioScheduler {
    /// Creates a scheduler that delivers wakeups on `wakeup_tx`.
    pub fn new(wakeup_tx: mpsc::UnboundedSender<Wakeup>) -> Self {
        Self {
            wakeup_tx,
            next_id: 0,
        }
    }

    fn allocate_id(&mut self) -> SourceId {
        self.next_id += 1;
        self.next_id
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle {
        let id = self.allocate_id();
        let tx = self.wakeup_tx.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            // Ticks are counted, so late periods are delivered rather than dropped.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticker.tick().await;
                if tx.send(Wakeup::Tick(id)).is_err() {
                    break;
                }
            }
        });

        debug!(source = id, ?period, "Armed repeating tick source");
        TickHandle::new(id, move || {
            task.abort();
            debug!(source = id, "Cancelled tick source");
        })
    }

    fn schedule_once(&mut self, delay: Duration) -> TickHandle {
        let id = self.allocate_id();
        let tx = self.wakeup_tx.clone();

        let task = tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(Wakeup::Deferred(id));
        });

        debug!(source = id, ?delay, "Armed deferred source");
        TickHandle::new(id, move || task.abort())
    }
}

// ============================================================================
// ManualScheduler
// ============================================================================

/// Kind and timing of a source armed on a [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Repeating source with the given period
    Repeating(Duration),
    /// One-shot source with the given delay
    Once(Duration),
}

/// A source currently armed on a [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledSource {
    /// Source id
    pub id: SourceId,
    /// Kind and timing
    pub kind: SourceKind,
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: SourceId,
    armed_total: usize,
    active: Vec<ScheduledSource>,
}

/// Scheduler that never fires on its own.
///
/// It records which sources are armed so callers can drive the engine by
/// hand and inspect the active sources. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sources that are currently armed.
    #[must_use]
    pub fn active_sources(&self) -> Vec<ScheduledSource> {
        self.lock().active.clone()
    }

    /// Returns the number of currently armed sources.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.lock().active.len()
    }

    /// Returns how many sources were ever armed.
    #[must_use]
    pub fn armed_total(&self) -> usize {
        self.lock().armed_total
    }

    /// Returns the most recently armed source that is still active.
    #[must_use]
    pub fn latest(&self) -> Option<ScheduledSource> {
        self.lock().active.last().copied()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn arm(&mut self, kind: SourceKind) -> TickHandle {
        let id = {
            let mut state = self.lock();
            state.next_id += 1;
            state.armed_total += 1;
            let id = state.next_id;
            state.active.push(ScheduledSource { id, kind });
            id
        };

        let inner = Arc::clone(&self.inner);
        TickHandle::new(id, move || {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .active
                .retain(|source| source.id != id);
        })
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle {
        self.arm(SourceKind::Repeating(period))
    }

    fn schedule_once(&mut self, delay: Duration) -> TickHandle {
        self.arm(SourceKind::Once(delay))
    }
}

// ============================================================================
// Tests
// ============================================================================
