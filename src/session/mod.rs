//! Sessions: response lifecycles and the conversation that owns them.
//!
//! ```text
//!                 fragment / start
//!   Idle ───────────────────────────▶ Receiving ──error──▶ Errored
//!                                        │
//!                                       end
//!                                        ▼
//!                                     Draining ──backlog empty──▶ Closed
//! ```
//!
//! A [`StreamSession`] covers one response. The [`Conversation`] decodes
//! frames, opens a session when a response starts, supersedes it when a
//! newer one begins, and drops it once it is finished.

mod conversation;
mod stream;

pub use conversation::Conversation;
pub use stream::{ResponseId, StreamSession, STREAM_ERROR_PREFIX};
