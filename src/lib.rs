//! # Typecast
//!
//! Reassembles an assistant response delivered as out-of-order, indexed text
//! fragments and renders it with a steady typing effect.
//!
//! Fragments arrive over a publish/subscribe transport with at-least-once,
//! unordered delivery. Typecast buffers them until they are contiguous,
//! releases them in index order, and paces the released text onto an output
//! sink one grapheme at a time.
//!
//! ## Core Concepts
//!
//! - **Fragment store**: sparse buffer keyed by fragment index
//! - **Release threshold**: contiguous fragments needed before text is shown
//! - **Render queue**: backlog drained at a fixed cadence by a restartable loop
//! - **Single-threaded driver**: frames and render ticks handled one at a time
//!
//! ## Example
//!
//! ```rust,ignore
//! use typecast::{Conversation, Driver, StreamConfig, Transcript};
//!
//! let conversation = Conversation::new(StreamConfig::default(), Transcript::new());
//! let (driver, frames) = Driver::with_channel(conversation);
//!
//! // The transport pushes raw frames as they arrive.
//! frames.send(r#"{"type":"TEXT_CHUNK","index":0,"text":"Hi"}"#.into())?;
//! frames.send(r#"{"type":"TEXT_END"}"#.into())?;
//! drop(frames);
//!
//! let conversation = driver.run();
//! assert_eq!(conversation.sink().rendered(), "Hi");
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod config;
pub mod error;
pub mod protocol;
pub mod reassembly;
pub mod render;
pub mod session;

// Re-exports for convenience
pub use actor::{Driver, Pacer, ReplayActor, ScriptedFrame, Stop};
pub use config::StreamConfig;
pub use error::{Error, ProtocolError, Result};
pub use protocol::{Fragment, InboundEvent, OutboundMessage, SessionGrant, SessionSource};
pub use reassembly::{FragmentStore, Phase, ReassemblyController, Release};
pub use render::{OutputSink, RenderQueue, TerminalConfig, TerminalSink, Transcript};
pub use session::{Conversation, ResponseId, StreamSession};
