//! Conversation: raw-frame ingress for one acquired chat session.
//!
//! A conversation receives every frame published on the session topic,
//! decodes it, and routes it to the response currently being assembled.
//! Responses come and go; the conversation opens a [`StreamSession`] for
//! each and drops it once it reaches a terminal phase.
//!
//! A response that saw its end frame keeps typing while the next one
//! already receives. Released text of the newer response waits until the
//! older one has finished rendering, so responses never interleave.

use super::stream::{ResponseId, StreamSession, STREAM_ERROR_PREFIX};
use crate::config::StreamConfig;
use crate::protocol::{Fragment, InboundEvent, SessionGrant};
use crate::reassembly::Phase;
use crate::render::OutputSink;
use std::collections::VecDeque;
use std::time::Duration;

/// Routes inbound frames to per-response sessions and owns the sink.
pub struct Conversation<S: OutputSink> {
    /// Tuning shared by every response.
    config: StreamConfig,
    /// Egress for rendered text, info and errors.
    sink: S,
    /// The chat session this conversation belongs to, once acquired.
    grant: Option<SessionGrant>,
    /// Unfinished responses, oldest first. Only the newest may be
    /// receiving and only the oldest renders.
    responses: VecDeque<StreamSession>,
    /// Response that failed while receiving; its stray fragments are dropped.
    failed: Option<ResponseId>,
    /// Identifier for the next response.
    next_response: ResponseId,
    /// Frames dropped as malformed.
    malformed: u64,
}

impl<S: OutputSink> Conversation<S> {
    /// Create a conversation without an acquired session.
    pub const fn new(config: StreamConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            grant: None,
            responses: VecDeque::new(),
            failed: None,
            next_response: 0,
            malformed: 0,
        }
    }

    /// Create a conversation for an acquired session.
    ///
    /// The welcome message, if any, is shown right away.
    pub fn open(grant: SessionGrant, config: StreamConfig, sink: S) -> Self {
        let mut conversation = Self::new(config, sink);
        tracing::info!(session_id = %grant.session_id, topic = %grant.subscribe_topic(), "session acquired");
        if let Some(welcome) = &grant.welcome_message {
            conversation.sink.emit_info(welcome);
        }
        conversation.grant = Some(grant);
        conversation
    }

    /// Acquired session id, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.grant.as_ref().map(|grant| grant.session_id.as_str())
    }

    /// Configuration in use.
    pub const fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Phase of the newest response.
    ///
    /// [`Phase::Errored`] while fragments of a failed response are being
    /// discarded, [`Phase::Idle`] when nothing is in flight.
    pub fn phase(&self) -> Phase {
        match self.responses.back() {
            Some(session) => session.phase(),
            None if self.failed.is_some() => Phase::Errored,
            None => Phase::Idle,
        }
    }

    /// Whether the render loop is active.
    pub fn is_emitting(&self) -> bool {
        self.responses.front().is_some_and(StreamSession::is_emitting)
    }

    /// Whether no response is in flight.
    pub fn is_idle(&self) -> bool {
        self.responses.is_empty()
    }

    /// Number of unfinished responses, including the one rendering.
    pub fn responses_in_flight(&self) -> usize {
        self.responses.len()
    }

    /// Delay to wait before the next [`step`](Self::step).
    pub const fn unit_delay(&self) -> Duration {
        self.config.unit_delay
    }

    /// Number of frames dropped as malformed so far.
    pub const fn malformed_frames(&self) -> u64 {
        self.malformed
    }

    /// Borrow the sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutably borrow the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the conversation, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Handle one raw frame from the transport.
    ///
    /// Malformed frames are logged and dropped without touching the
    /// response in flight.
    pub fn on_message(&mut self, raw: &str) {
        match InboundEvent::parse(raw) {
            Ok(event) => {
                tracing::debug!(kind = event.kind(), "received frame");
                self.on_event(event);
            }
            Err(err) => {
                self.malformed += 1;
                tracing::warn!(%err, raw, "dropping malformed frame");
            }
        }
    }

    /// Handle one decoded event.
    pub fn on_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Fragment(fragment) => match self.failed {
                Some(failed) => {
                    tracing::debug!(response = failed, index = fragment.index, "fragment of failed response dropped");
                }
                None => self.on_fragment(fragment),
            },
            InboundEvent::Start => {
                self.failed = None;
                if let Some(session) = receiving(&mut self.responses) {
                    session.supersede(&mut self.sink);
                }
                self.open_response();
            }
            InboundEvent::End => {
                if let Some(session) = receiving(&mut self.responses) {
                    session.on_end();
                } else if let Some(failed) = self.failed.take() {
                    tracing::debug!(response = failed, "end of failed response");
                } else {
                    tracing::debug!("end without a receiving response");
                }
            }
            InboundEvent::Error { message } => self.on_stream_error(&message),
            InboundEvent::Info { text } => self.sink.emit_info(&text),
        }
        self.settle();
    }

    /// Emit one unit of the oldest unfinished response.
    ///
    /// Returns `true` if a unit was emitted.
    pub fn step(&mut self) -> bool {
        let emitted = self
            .responses
            .front_mut()
            .is_some_and(|session| session.step(&mut self.sink));
        self.settle();
        emitted
    }

    /// The transport went away: end the receiving response with what is contiguous.
    pub fn on_transport_closed(&mut self) {
        if let Some(session) = receiving(&mut self.responses) {
            tracing::info!(response = session.id(), "transport closed mid-response");
            session.on_disconnect();
        }
        self.settle();
    }

    /// Clear the failed-response mark ahead of a new user turn.
    ///
    /// Call when the user sends a message: whatever arrives next belongs to
    /// the reply, even if the failed response never sent its end frame.
    pub fn on_message_sent(&mut self) {
        if let Some(failed) = self.failed.take() {
            tracing::debug!(response = failed, "new turn clears failed response");
        }
    }

    /// Render everything still queued without pacing.
    ///
    /// Useful at shutdown when the remaining typing animation is not wanted.
    pub fn flush(&mut self) {
        while self.step() {}
    }

    fn on_fragment(&mut self, fragment: Fragment) {
        if receiving(&mut self.responses).is_none() {
            self.open_response();
        }
        if let Some(session) = self.responses.back_mut() {
            session.on_fragment(fragment);
        }
    }

    fn on_stream_error(&mut self, message: &str) {
        if let Some(session) = receiving(&mut self.responses) {
            let id = session.id();
            session.on_error(message, &mut self.sink);
            self.failed = Some(id);
        } else if let Some(session) = self.responses.back_mut() {
            // Its end frame already came, so no stray fragments are expected.
            session.on_error(message, &mut self.sink);
        } else {
            tracing::warn!(%message, "error without a response in flight");
            self.sink.report_error(&format!("{STREAM_ERROR_PREFIX}{message}"));
        }
    }

    fn open_response(&mut self) {
        let id = self.next_response;
        self.next_response += 1;
        self.responses.push_back(StreamSession::open(id, &self.config));
    }

    fn settle(&mut self) {
        self.responses.retain(|session| !session.is_finished());
        while let Some(front) = self.responses.front_mut() {
            if !front.close_if_drained(&mut self.sink) {
                break;
            }
            self.responses.pop_front();
        }
    }
}

/// The newest response, if it is still receiving fragments.
fn receiving(responses: &mut VecDeque<StreamSession>) -> Option<&mut StreamSession> {
    responses
        .back_mut()
        .filter(|session| session.phase() == Phase::Receiving)
}
