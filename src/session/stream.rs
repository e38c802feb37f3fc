//! Stream session: one response from first fragment to closed.

use crate::config::StreamConfig;
use crate::protocol::Fragment;
use crate::reassembly::{Phase, ReassemblyController, Release};
use crate::render::{OutputSink, RenderQueue};

/// Prefix for errors signalled by the sender.
pub const STREAM_ERROR_PREFIX: &str = "Chat error: ";

/// Identifier of a response within a conversation, for logging.
pub type ResponseId = u64;

/// Reassembly and rendering state of a single response.
///
/// The session exclusively owns its fragment store (inside the controller)
/// and its render queue. It is created in [`Phase::Receiving`] and is done
/// once its phase is terminal; the owner then drops it.
///
/// The sink hears about a session only once it renders or closes, so a
/// session queued behind another one stays invisible until its turn.
#[derive(Debug)]
pub struct StreamSession {
    /// Response identifier.
    id: ResponseId,
    /// Release policy and buffered fragments.
    controller: ReassemblyController,
    /// Released text awaiting emission.
    queue: RenderQueue,
    /// Whether `session_started` was sent.
    announced: bool,
}

impl StreamSession {
    /// Open a session, ready to receive fragments.
    pub fn open(id: ResponseId, config: &StreamConfig) -> Self {
        let mut controller = ReassemblyController::new(config.effective_threshold());
        controller.begin();
        tracing::info!(response = id, threshold = config.effective_threshold(), "response opened");
        Self {
            id,
            controller,
            queue: RenderQueue::new(),
            announced: false,
        }
    }

    /// Response identifier.
    pub const fn id(&self) -> ResponseId {
        self.id
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// Whether the session reached a terminal phase.
    pub const fn is_finished(&self) -> bool {
        self.controller.phase().is_terminal()
    }

    /// Whether the render loop is active.
    pub const fn is_emitting(&self) -> bool {
        self.queue.is_emitting()
    }

    /// Units waiting in the render backlog.
    pub fn pending_units(&self) -> usize {
        self.queue.pending_units()
    }

    /// Fragments held back by the controller.
    pub fn buffered_fragments(&self) -> usize {
        self.controller.buffered()
    }

    /// Buffer a fragment, releasing text to the render queue if the policy allows.
    pub fn on_fragment(&mut self, fragment: Fragment) {
        if let Some(release) = self.controller.on_fragment(fragment) {
            self.enqueue(&release);
        }
    }

    /// Force out everything buffered and start draining.
    pub fn on_end(&mut self) {
        if let Some(release) = self.controller.on_end() {
            self.enqueue(&release);
        }
        tracing::debug!(response = self.id, pending = self.queue.pending_units(), "end of stream");
    }

    /// Release the contiguous run after the transport went away and start draining.
    pub fn on_disconnect(&mut self) {
        let (release, dropped) = self.controller.on_disconnect();
        if let Some(release) = release {
            self.enqueue(&release);
        }
        if dropped > 0 {
            tracing::warn!(response = self.id, dropped, "dropped fragments stranded by disconnect");
        }
    }

    /// Discard buffered and backlogged text and report the error.
    pub fn on_error<S: OutputSink + ?Sized>(&mut self, message: &str, sink: &mut S) {
        let dropped_fragments = self.controller.on_error();
        let dropped_units = self.queue.cancel();
        tracing::warn!(
            response = self.id,
            dropped_fragments,
            dropped_units,
            %message,
            "response failed"
        );
        sink.report_error(&format!("{STREAM_ERROR_PREFIX}{message}"));
        if self.announced {
            sink.session_closed();
        }
    }

    /// Emit one unit from the render queue.
    ///
    /// Returns `true` if a unit was emitted. The session closes itself on
    /// the last unit of a draining response.
    pub fn step<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        let Some(unit) = self.queue.step() else {
            return false;
        };
        self.announce(sink);
        sink.emit_text(&unit);
        self.close_if_drained(sink);
        true
    }

    /// Abandon the session because a newer response superseded it.
    pub fn supersede<S: OutputSink + ?Sized>(&mut self, sink: &mut S) {
        let dropped_units = self.queue.cancel();
        let dropped_fragments = self.controller.abandon();
        tracing::info!(response = self.id, dropped_units, dropped_fragments, "response superseded");
        if self.announced {
            sink.session_closed();
        }
    }

    /// Close the session if it is draining and nothing is left to render.
    ///
    /// Returns `true` if the session closed.
    pub fn close_if_drained<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        if self.controller.phase() != Phase::Draining || !self.queue.is_idle() {
            return false;
        }
        self.controller.finish();
        self.announce(sink);
        tracing::info!(response = self.id, "response closed");
        sink.session_closed();
        true
    }

    fn announce<S: OutputSink + ?Sized>(&mut self, sink: &mut S) {
        if !self.announced {
            self.announced = true;
            sink.session_started();
        }
    }

    fn enqueue(&mut self, release: &Release) {
        tracing::debug!(
            response = self.id,
            first_index = release.first_index,
            fragments = release.fragments,
            "queued release for rendering"
        );
        self.queue.append(&release.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Transcript;

    fn open(threshold: usize) -> StreamSession {
        StreamSession::open(1, &StreamConfig::default().with_release_threshold(threshold))
    }

    fn run(session: &mut StreamSession, sink: &mut Transcript) {
        while session.step(sink) {}
    }

    #[test]
    fn test_release_then_render() {
        let mut sink = Transcript::new();
        let mut session = open(2);
        session.on_fragment(Fragment::new(1, "lo"));
        assert!(!session.is_emitting());
        session.on_fragment(Fragment::new(0, "hel"));
        assert!(session.is_emitting());
        assert_eq!(session.pending_units(), 5);

        run(&mut session, &mut sink);
        assert_eq!(sink.rendered(), "hello");
        assert_eq!(session.phase(), Phase::Receiving);
    }

    #[test]
    fn test_end_drains_then_closes() {
        let mut sink = Transcript::new();
        let mut session = open(5);
        session.on_fragment(Fragment::new(0, "ok"));
        session.on_end();
        assert_eq!(session.phase(), Phase::Draining);
        assert!(!session.close_if_drained(&mut sink));
        assert_eq!(sink.closed_count(), 0);

        run(&mut session, &mut sink);
        assert_eq!(session.phase(), Phase::Closed);
        assert_eq!(sink.closed_count(), 1);
        assert_eq!(sink.rendered(), "ok");
    }

    #[test]
    fn test_end_with_nothing_closes_on_request() {
        let mut sink = Transcript::new();
        let mut session = open(5);
        session.on_end();
        assert!(!session.is_finished());
        assert!(session.close_if_drained(&mut sink));
        assert!(session.is_finished());
        assert_eq!(sink.responses(), vec![""]);
        assert_eq!(sink.closed_count(), 1);
    }

    #[test]
    fn test_unannounced_session_is_silent() {
        let mut sink = Transcript::new();
        let mut session = open(5);
        session.on_fragment(Fragment::new(0, "x"));
        session.supersede(&mut sink);
        assert!(sink.entries().is_empty());
        assert_eq!(sink.closed_count(), 0);
    }

    #[test]
    fn test_error_mid_render_stops_output() {
        let mut sink = Transcript::new();
        let mut session = open(1);
        session.on_fragment(Fragment::new(0, "abc"));
        assert!(session.step(&mut sink));
        session.on_error("boom", &mut sink);

        assert!(!session.step(&mut sink));
        assert_eq!(sink.rendered(), "a");
        assert_eq!(sink.errors(), vec!["Chat error: boom"]);
        assert_eq!(sink.closed_count(), 1);
        assert_eq!(session.phase(), Phase::Errored);
    }

    #[test]
    fn test_disconnect_keeps_contiguous_text() {
        let mut sink = Transcript::new();
        let mut session = open(5);
        session.on_fragment(Fragment::new(0, "a"));
        session.on_fragment(Fragment::new(2, "c"));
        session.on_disconnect();
        run(&mut session, &mut sink);
        assert_eq!(sink.rendered(), "a");
        assert!(session.is_finished());
    }

    #[test]
    fn test_supersede_clears_backlog() {
        let mut sink = Transcript::new();
        let mut session = open(1);
        session.on_fragment(Fragment::new(0, "abc"));
        assert!(session.step(&mut sink));
        session.supersede(&mut sink);
        assert!(!session.is_emitting());
        assert!(session.is_finished());
        assert_eq!(sink.closed_count(), 1);
    }
}
