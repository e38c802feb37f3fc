//! Transcript: append-only record of everything the sink was given.
//!
//! Rendered units accumulate in a single text buffer. A read cursor marks
//! how much of it a presentation layer has already picked up, so callers can
//! poll for "what is new" without rebuilding or replacing anything.

use super::sink::OutputSink;

/// What a transcript entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Text of one assistant response.
    Response,
    /// Informational text.
    Info,
    /// Error notification.
    Error,
}

/// One entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry kind.
    pub kind: EntryKind,
    /// Entry text; grows while a response is in progress.
    pub text: String,
}

/// An [`OutputSink`] that keeps everything in memory.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    /// Entries in display order.
    entries: Vec<Entry>,
    /// Whether the last entry is a response still receiving units.
    in_progress: bool,
    /// All response units, concatenated.
    rendered: String,
    /// Bytes of `rendered` already handed out by [`Transcript::take_unread`].
    read_cursor: usize,
    /// Number of `emit_text` calls.
    units: usize,
    /// Number of `session_closed` calls.
    closed: usize,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in display order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Every rendered response unit, concatenated.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Rendered text not yet returned by a previous call, advancing the cursor.
    pub fn take_unread(&mut self) -> &str {
        let start = self.read_cursor;
        self.read_cursor = self.rendered.len();
        &self.rendered[start..]
    }

    /// Text of each response, oldest first.
    pub fn responses(&self) -> Vec<&str> {
        self.texts(EntryKind::Response)
    }

    /// Reported errors, oldest first.
    pub fn errors(&self) -> Vec<&str> {
        self.texts(EntryKind::Error)
    }

    /// Informational messages, oldest first.
    pub fn infos(&self) -> Vec<&str> {
        self.texts(EntryKind::Info)
    }

    /// Number of units emitted.
    pub const fn unit_count(&self) -> usize {
        self.units
    }

    /// Number of closed sessions.
    pub const fn closed_count(&self) -> usize {
        self.closed
    }

    /// Whether a response is currently being rendered.
    pub const fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    fn texts(&self, kind: EntryKind) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.text.as_str())
            .collect()
    }

    fn push(&mut self, kind: EntryKind, text: &str) {
        self.entries.push(Entry {
            kind,
            text: text.to_owned(),
        });
    }
}

impl OutputSink for Transcript {
    fn emit_text(&mut self, unit: &str) {
        if !self.in_progress {
            self.session_started();
        }
        if let Some(entry) = self.entries.last_mut() {
            entry.text.push_str(unit);
        }
        self.rendered.push_str(unit);
        self.units += 1;
    }

    fn emit_info(&mut self, text: &str) {
        self.push(EntryKind::Info, text);
        // Units after an interleaved info line start a fresh entry.
        self.in_progress = false;
    }

    fn report_error(&mut self, message: &str) {
        self.push(EntryKind::Error, message);
        self.in_progress = false;
    }

    fn session_started(&mut self) {
        self.push(EntryKind::Response, "");
        self.in_progress = true;
    }

    fn session_closed(&mut self) {
        self.in_progress = false;
        self.closed += 1;
    }
}
