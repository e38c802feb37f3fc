//! Render: paced emission of released text to the output surface.
//!
//! Released text is appended to a [`RenderQueue`], which the driver steps
//! once per unit delay. Each step hands one grapheme cluster to an
//! [`OutputSink`]. Two sinks ship with the crate:
//!
//! - [`Transcript`]: in-memory, append-only record with a read cursor
//! - [`TerminalSink`]: crossterm output with soft wrapping
//!
//! ```text
//!   release "Hello" ──▶ RenderQueue ──step──▶ "H" ──▶ OutputSink
//!                        (backlog)   ──step──▶ "e" ──▶ ...
//! ```

mod queue;
mod sink;
mod terminal;
mod transcript;

pub use queue::RenderQueue;
pub use sink::OutputSink;
pub use terminal::{TerminalConfig, TerminalSink};
pub use transcript::{Entry, EntryKind, Transcript};
