//! Deferred callbacks

use std::cell::{Cell, RefCell};
use std::time::Duration;

/// `setTimeout`-style scheduling on the host's event loop
pub trait Timers {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

struct Scheduled {
    due: Duration,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

/// Deterministic timer queue driven by explicit `advance` calls
///
/// Tasks run in due-time order (ties in scheduling order). Tasks scheduled
/// by a running task run in the same `advance` call if they fall due within
/// the advanced window.
#[derive(Default)]
pub struct ManualTimers {
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    queue: RefCell<Vec<Scheduled>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed simulated time
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Move the clock forward, running every task that falls due.
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }
        self.now.set(target);
        ran
    }

    /// Run everything queued, however far in the future
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        loop {
            let latest = self.queue.borrow().iter().map(|s| s.due).max();
            let Some(latest) = latest else {
                return ran;
            };
            ran += self.advance(latest.saturating_sub(self.now.get()));
        }
    }

    fn pop_due(&self, target: Duration) -> Option<Box<dyn FnOnce()>> {
        let mut queue = self.queue.borrow_mut();
        let index = queue
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= target)
            .min_by_key(|(_, s)| (s.due, s.seq))
            .map(|(index, _)| index)?;
        let scheduled = queue.remove(index);
        self.now.set(scheduled.due);
        Some(scheduled.task)
    }
}

impl Timers for ManualTimers {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.queue.borrow_mut().push(Scheduled {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }
}
