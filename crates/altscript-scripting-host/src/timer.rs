use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::engine::ScriptFunction;
use crate::handle::Pinned;

/// Unique identifier for a timer within one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u32);

/// Source of monotonic time for timer updates
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A timer with its pinned callback
#[derive(Debug)]
struct Timer {
    callback: Pinned<dyn ScriptFunction>,
    interval: Duration,
    last_run: Instant,
    once: bool,
}

impl Timer {
    /// Returns true when the timer is due, and restarts its interval
    fn update(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_run) >= self.interval {
            self.last_run = now;
            true
        } else {
            false
        }
    }
}

/// Result of polling a single timer
pub enum TimerPoll {
    /// Not due yet
    Idle,
    /// Due: run `callback`; `exhausted` is set for a fired one-shot timer
    Fire {
        callback: Rc<dyn ScriptFunction>,
        exhausted: bool,
    },
    /// Unknown id or already queued for removal
    Missing,
}

/// Manages timers for one resource
///
/// Removal is deferred: `remove_timer` queues the id and the timer stays in
/// the table until the next `flush_invalid`, so a callback may clear its own
/// timer while the tick that fired it is still iterating.
#[derive(Debug)]
pub struct TimerManager {
    timers: BTreeMap<TimerId, Timer>,
    next_id: u32,
    invalid_timers: Vec<TimerId>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
            next_id: 1,
            invalid_timers: Vec::new(),
        }
    }

    /// Schedule `callback` to run every `timeout`, or once if `once` is set
    pub fn create_timer(
        &mut self,
        timeout: Duration,
        callback: Pinned<dyn ScriptFunction>,
        once: bool,
        now: Instant,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.timers.insert(
            id,
            Timer {
                callback,
                interval: timeout,
                last_run: now,
                once,
            },
        );
        id
    }

    /// Queue a timer for removal at the start of the next tick
    pub fn remove_timer(&mut self, id: TimerId) {
        if !self.invalid_timers.contains(&id) {
            self.invalid_timers.push(id);
        }
    }

    pub fn is_pending_removal(&self, id: TimerId) -> bool {
        self.invalid_timers.contains(&id)
    }

    /// Drop every timer queued for removal, releasing their callbacks
    ///
    /// Returns the removed timers so the caller can release them outside of
    /// any borrow on the manager.
    pub fn flush_invalid(&mut self) -> Vec<Pinned<dyn ScriptFunction>> {
        self.invalid_timers
            .drain(..)
            .filter_map(|id| self.timers.remove(&id))
            .map(|timer| timer.callback)
            .collect()
    }

    /// Ids of every timer in the table, in creation order
    pub fn timer_ids(&self) -> Vec<TimerId> {
        self.timers.keys().copied().collect()
    }

    pub fn poll(&mut self, id: TimerId, now: Instant) -> TimerPoll {
        if self.is_pending_removal(id) {
            return TimerPoll::Missing;
        }
        let Some(timer) = self.timers.get_mut(&id) else {
            return TimerPoll::Missing;
        };

        if timer.update(now) {
            TimerPoll::Fire {
                callback: Rc::clone(timer.callback.handle()),
                exhausted: timer.once,
            }
        } else {
            TimerPoll::Idle
        }
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Number of timers not queued for removal
    pub fn active_count(&self) -> usize {
        self.timers
            .keys()
            .filter(|id| !self.invalid_timers.contains(id))
            .count()
    }

    /// Remove every timer, returning their callbacks
    pub fn clear(&mut self) -> Vec<Pinned<dyn ScriptFunction>> {
        self.invalid_timers.clear();
        std::mem::take(&mut self.timers)
            .into_values()
            .map(|timer| timer.callback)
            .collect()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}
