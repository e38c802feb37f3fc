//! Actor Model: the event loop and the threads that feed it.
//!
//! All reassembly and rendering state lives on the driver thread. Other
//! threads only hand raw frames across a crossbeam channel:
//!
//! ```text
//! ┌──────────────┐   raw frames    ┌──────────────┐   units   ┌────────────┐
//! │  Transport   │ ──────────────▶ │    Driver    │ ────────▶ │ OutputSink │
//! │ (or Replay)  │                 │ select!{     │           └────────────┘
//! └──────────────┘                 │  frame,      │
//!                                  │  render tick │
//!                                  │ }            │
//!                                  └──────────────┘
//! ```

mod driver;
mod pacer;
mod replay;

pub use driver::{Driver, Stop};
pub use pacer::Pacer;
pub use replay::{ReplayActor, ScriptedFrame};
