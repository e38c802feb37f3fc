//! Pacer: deadline bookkeeping for the render loop.
//!
//! The render loop is a restartable task: it is armed when text is
//! appended to an idle queue, advanced by one interval after every
//! emitted unit, and disarmed when the queue runs dry or is cancelled.
//! The driver turns the deadline into a timer channel.

use std::time::{Duration, Instant};

/// Next-step deadline for a fixed-cadence loop.
#[derive(Debug, Clone)]
pub struct Pacer {
    /// Time between two steps.
    interval: Duration,
    /// When the next step is due, if the loop is running.
    next: Option<Instant>,
    /// Steps taken since creation.
    steps: u64,
}

impl Pacer {
    /// Create a disarmed pacer.
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
            steps: 0,
        }
    }

    /// Deadline of the next step, if armed.
    pub const fn deadline(&self) -> Option<Instant> {
        self.next
    }

    /// Whether the loop is running.
    pub const fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    /// Number of steps taken.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Start the loop if it is not running; the first step is due at `now`.
    pub fn arm(&mut self, now: Instant) {
        if self.next.is_none() {
            self.next = Some(now);
        }
    }

    /// Record a step and schedule the following one.
    ///
    /// If the loop fell behind (a slow sink, a busy thread), the schedule
    /// restarts from `now` instead of bursting to catch up.
    pub fn advance(&mut self, now: Instant) {
        self.steps += 1;
        let mut next = self.next.unwrap_or(now) + self.interval;
        if next < now {
            next = now + self.interval;
        }
        self.next = Some(next);
    }

    /// Stop the loop.
    pub fn disarm(&mut self) {
        self.next = None;
    }
}
