use std::{
    fmt::Debug,
    sync::{Arc, Mutex, PoisonError},
    thread,
    time::Duration,
};

/// Work scheduled on a [Timer]
pub type Task = Box<dyn FnOnce() + Send>;

/// Runs a task once a delay has elapsed
pub trait Timer: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task);
}

/// Handle to the [Timer] stores should schedule on, resolvable through the injector
#[derive(Clone)]
pub struct SharedTimer(pub Arc<dyn Timer>);
impl Debug for SharedTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedTimer")
    }
}

/// Sleeps on a dedicated thread per task
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadTimer;

impl Timer for ThreadTimer {
    fn schedule(&self, delay: Duration, task: Task) {
        // Not joined - the thread ends with the task
        let spawned = thread::Builder::new()
            .name("vmbind-timer".to_string())
            .spawn(move || {
                thread::sleep(delay);
                task();
            });

        if let Err(e) = spawned {
            tracing::error!("Could not spawn timer thread, dropping task: {e}");
        }
    }
}

struct Scheduled {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    next_seq: u64,
    pending: Vec<Scheduled>,
}

/// A virtual clock which only moves when told to
///
/// Tasks run on the thread calling [ManualTimer::advance], ordered by due time and, for
/// equal due times, by scheduling order.
#[derive(Clone, Default)]
pub struct ManualTimer {
    clock: Arc<Mutex<Clock>>,
}
impl Debug for ManualTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ManualTimer")
            .field("now", &clock.now)
            .field("pending", &clock.pending.len())
            .finish()
    }
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner).now
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.clock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .len()
    }

    /// Moves the clock forward, running every task that becomes due
    ///
    /// Tasks scheduled by running tasks also run if they fall within the window.
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;

        while let Some(task) = self.next_due(target) {
            task();
            ran += 1;
        }

        let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        clock.now = clock.now.max(target);
        tracing::trace!("Advanced manual timer to {:?}, ran {ran} tasks", clock.now);
        ran
    }

    /// Removes the earliest task due at `target` and moves the clock to its due time
    fn next_due(&self, target: Duration) -> Option<Task> {
        let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        let index = clock
            .pending
            .iter()
            .enumerate()
            .filter(|(_, scheduled)| scheduled.due <= target)
            .min_by_key(|(_, scheduled)| (scheduled.due, scheduled.seq))
            .map(|(index, _)| index)?;

        let scheduled = clock.pending.swap_remove(index);
        clock.now = clock.now.max(scheduled.due);
        Some(scheduled.task)
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = clock.next_seq;
        clock.next_seq += 1;
        let due = clock.now + delay;
        clock.pending.push(Scheduled { due, seq, task });
    }
}
