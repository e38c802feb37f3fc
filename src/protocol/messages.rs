//! Inbound frame types and their wire decoding.

use crate::error::ProtocolError;
use serde::Deserialize;

/// Wire kind of an indexed text fragment.
pub const KIND_FRAGMENT: &str = "TEXT_CHUNK";
/// Wire kind announcing a new response.
pub const KIND_START: &str = "TEXT_START";
/// Wire kind closing the current response.
pub const KIND_END: &str = "TEXT_END";
/// Wire kind for a sender-side failure.
pub const KIND_ERROR: &str = "ERROR";
/// Wire kind for out-of-band informational text.
pub const KIND_INFO: &str = "SYSTEM_MESSAGE";

/// Message used when an error frame carries no text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// One indexed piece of a streamed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Sender-assigned position, dense from zero within a response.
    pub index: u64,
    /// Text carried by this piece.
    pub text: String,
}

impl Fragment {
    /// Create a fragment.
    pub fn new(index: u64, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// A classified inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A fragment of the current response.
    Fragment(Fragment),

    /// Explicit start of a new response.
    Start,

    /// The sender finished the current response.
    End,

    /// The sender flagged the current response as failed.
    Error {
        /// Human-readable reason.
        message: String,
    },

    /// Informational text shown as-is, outside any response.
    Info {
        /// The text to show.
        text: String,
    },
}

impl InboundEvent {
    /// Decode a raw JSON frame.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let frame: WireFrame = serde_json::from_str(raw)?;
        frame.classify()
    }

    /// Short name for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fragment(_) => "fragment",
            Self::Start => "start",
            Self::End => "end",
            Self::Error { .. } => "error",
            Self::Info { .. } => "info",
        }
    }
}

/// Frame as it appears on the wire, before validation.
#[derive(Debug, Deserialize)]
struct WireFrame {
    #[serde(rename = "type")]
    kind: String,
    index: Option<u64>,
    text: Option<String>,
    message: Option<String>,
}

impl WireFrame {
    fn classify(self) -> Result<InboundEvent, ProtocolError> {
        match self.kind.as_str() {
            KIND_FRAGMENT => {
                let index = self.index.ok_or_else(|| self.missing("index"))?;
                let text = match self.text {
                    Some(text) => text,
                    None => return Err(self.missing("text")),
                };
                Ok(InboundEvent::Fragment(Fragment { index, text }))
            }
            KIND_START => Ok(InboundEvent::Start),
            KIND_END => Ok(InboundEvent::End),
            KIND_ERROR => {
                let message = non_empty(self.text)
                    .or_else(|| non_empty(self.message))
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                Ok(InboundEvent::Error { message })
            }
            KIND_INFO => match self.text.or(self.message) {
                Some(text) => Ok(InboundEvent::Info { text }),
                None => Err(ProtocolError::MissingField {
                    kind: KIND_INFO.to_string(),
                    field: "text",
                }),
            },
            other => Err(ProtocolError::UnknownKind(other.to_string())),
        }
    }

    fn missing(&self, field: &'static str) -> ProtocolError {
        ProtocolError::MissingField {
            kind: self.kind.clone(),
            field,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
