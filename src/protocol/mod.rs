//! Protocol: the typed seams between the core and its collaborators.
//!
//! - **Inbound**: raw frames from the publish/subscribe transport are decoded
//!   into [`InboundEvent`]s (fragment, start, end, error, info).
//! - **Session**: the [`SessionGrant`] handed out by session acquisition, and
//!   the [`OutboundMessage`] payload for user input.
//!
//! Transport mechanics (connect, subscribe, heartbeats, reconnection) stay on
//! the other side of these types.

mod messages;
mod session;

pub use messages::{
    Fragment, InboundEvent, KIND_END, KIND_ERROR, KIND_FRAGMENT, KIND_INFO, KIND_START,
    UNKNOWN_ERROR,
};
pub use session::{OutboundMessage, SessionGrant, SessionSource};
