//! Reassembly: turning out-of-order fragments back into ordered text.
//!
//! Fragments are numbered by the sender and may arrive in any order, more
//! than once. The [`FragmentStore`] buffers them sparsely; the
//! [`ReassemblyController`] walks the store from the next expected index and
//! decides when a run is long enough to hand to the renderer.
//!
//! ```text
//!   arrivals: 2 0 4 1 3        threshold = 5
//!
//!   store:    [0][1][2][ ][4]  run from 0 = 3   -> hold
//!   store:    [0][1][2][3][4]  run from 0 = 5   -> release "t0t1t2t3t4"
//! ```

mod controller;
mod store;

pub use controller::{Phase, ReassemblyController, Release};
pub use store::FragmentStore;
