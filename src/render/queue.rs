//! Render queue: paced, unit-at-a-time emission of released text.
//!
//! Released text arrives in bursts; the queue turns it into a steady
//! typing cadence. The queue itself does not sleep. The driver calls
//! [`RenderQueue::step`] once per unit delay while the queue is emitting.

use unicode_segmentation::UnicodeSegmentation;

/// Consumed prefix length at which the backlog is compacted.
const COMPACT_AT: usize = 4096;

/// Backlog of text awaiting emission, plus the emission-loop flag.
///
/// At most one emission loop exists per queue: [`append`](Self::append)
/// starts it only when it is not already running, and
/// [`step`](Self::step) ends it as soon as the backlog is exhausted.
#[derive(Debug, Default, Clone)]
pub struct RenderQueue {
    /// Appended text; bytes before `head` were already emitted.
    backlog: String,
    /// Byte offset of the next unit.
    head: usize,
    /// Whether an emission loop is active.
    emitting: bool,
}

impl RenderQueue {
    /// Create an empty, idle queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text to the backlog.
    ///
    /// Returns `true` if this call started the emission loop; the caller
    /// must then schedule the first step.
    pub fn append(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.backlog.push_str(text);

        if self.emitting {
            false
        } else {
            self.emitting = true;
            true
        }
    }

    /// Emit the next unit, if any.
    ///
    /// A unit is one extended grapheme cluster, so combining sequences and
    /// emoji are never split. The loop stops when the emitted unit was the
    /// last one.
    pub fn step(&mut self) -> Option<String> {
        if !self.emitting {
            return None;
        }

        let unit = self.backlog[self.head..]
            .graphemes(true)
            .next()
            .map(str::to_owned);

        match unit {
            Some(unit) => {
                self.head += unit.len();
                if self.head == self.backlog.len() {
                    self.backlog.clear();
                    self.head = 0;
                    self.emitting = false;
                } else if self.head >= COMPACT_AT {
                    self.backlog.drain(..self.head);
                    self.head = 0;
                }
                Some(unit)
            }
            None => {
                self.emitting = false;
                None
            }
        }
    }

    /// Whether an emission loop is active.
    pub const fn is_emitting(&self) -> bool {
        self.emitting
    }

    /// Whether the backlog is empty and no loop is running.
    pub fn is_idle(&self) -> bool {
        !self.emitting && self.head == self.backlog.len()
    }

    /// Units still waiting to be emitted.
    pub fn pending_units(&self) -> usize {
        self.backlog[self.head..].graphemes(true).count()
    }

    /// Drop the backlog and stop the loop.
    ///
    /// Returns the number of units that were never emitted.
    pub fn cancel(&mut self) -> usize {
        let dropped = self.pending_units();
        self.backlog.clear();
        self.head = 0;
        self.emitting = false;
        dropped
    }
}
