//! Session acquisition and outbound chat messages.
//!
//! Acquiring a session and publishing over the transport are left to
//! collaborators. This module only fixes the shapes they exchange with the
//! core and the topic naming derived from a session id.

use crate::error::{Error, ProtocolError, Result};
use serde::{Deserialize, Serialize};

/// Result of acquiring a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    /// Opaque session identifier.
    pub session_id: String,
    /// Greeting to show once the session is open.
    #[serde(default)]
    pub welcome_message: Option<String>,
}

impl SessionGrant {
    /// Create a grant without a welcome message.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            welcome_message: None,
        }
    }

    /// Decode the acquisition response body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|err| Error::Protocol(ProtocolError::Json(err)))
    }

    /// Topic the transport subscribes to for this session's frames.
    pub fn subscribe_topic(&self) -> String {
        format!("/topic/ai/chat/{}", self.session_id)
    }

    /// Destination user messages are published to.
    pub fn publish_destination(&self) -> String {
        format!("/app/ai/chat/session/{}", self.session_id)
    }
}

/// Collaborator that hands out chat sessions.
pub trait SessionSource {
    /// Acquire a new session.
    fn acquire(&mut self) -> Result<SessionGrant>;
}

/// A user message ready to be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Where to publish.
    pub destination: String,
    /// JSON body.
    pub body: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

impl OutboundMessage {
    /// Build the publish payload for `text` in `grant`'s session.
    ///
    /// Surrounding whitespace is trimmed; an empty message is rejected.
    pub fn new(grant: &SessionGrant, text: &str) -> Result<Self> {
        let message = text.trim();
        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }
        let body = serde_json::to_string(&ChatRequest { message })
            .map_err(|err| Error::Protocol(ProtocolError::Json(err)))?;
        Ok(Self {
            destination: grant.publish_destination(),
            body,
        })
    }
}
