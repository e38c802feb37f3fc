//! Error types shared across the crate.

use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// An inbound frame could not be decoded or validated.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session collaborator failed to hand out a session.
    #[error("failed to acquire session: {0}")]
    Acquire(String),

    /// An outbound chat message had no content after trimming.
    #[error("refusing to send an empty message")]
    EmptyMessage,

    /// Writing to the output surface failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

/// A frame that failed to parse or validate.
///
/// Malformed frames are logged and dropped; they never affect the
/// response currently being assembled.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The payload was not valid JSON for a frame.
    #[error("invalid frame payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A field required by the frame kind was absent or null.
    #[error("{kind} frame is missing `{field}`")]
    MissingField {
        /// Wire kind of the frame.
        kind: String,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The frame carried a kind this client does not understand.
    #[error("unknown frame kind `{0}`")]
    UnknownKind(String),
}
