//! Driver: the single-threaded event loop behind a conversation.
//!
//! Two event sources feed one loop: raw frames from the transport and the
//! render timer. Everything that touches reassembly or rendering state runs
//! here, one event at a time, so no locking is needed.

use super::pacer::Pacer;
use crate::render::OutputSink;
use crate::session::Conversation;
use crossbeam_channel::{at, never, select, unbounded, Receiver, Sender};
use std::time::Instant;

/// Why [`Driver::run_until`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// The transport closed and the last response finished rendering.
    Finished,
    /// The deadline passed first.
    Deadline,
}

/// Event loop pairing a frame channel with a [`Conversation`].
pub struct Driver<S: OutputSink> {
    /// Conversation receiving frames and render steps.
    conversation: Conversation<S>,
    /// Raw frames from the transport; `never()` once it disconnected.
    frames: Receiver<String>,
    /// Whether the transport is still connected.
    connected: bool,
    /// Render loop schedule.
    pacer: Pacer,
}

impl<S: OutputSink> Driver<S> {
    /// Create a driver reading frames from `frames`.
    pub fn new(conversation: Conversation<S>, frames: Receiver<String>) -> Self {
        let pacer = Pacer::new(conversation.unit_delay());
        Self {
            conversation,
            frames,
            connected: true,
            pacer,
        }
    }

    /// Create a driver and the sender a transport should push frames into.
    pub fn with_channel(conversation: Conversation<S>) -> (Self, Sender<String>) {
        let (tx, rx) = unbounded();
        (Self::new(conversation, rx), tx)
    }

    /// Borrow the conversation.
    pub const fn conversation(&self) -> &Conversation<S> {
        &self.conversation
    }

    /// Mutably borrow the conversation.
    pub fn conversation_mut(&mut self) -> &mut Conversation<S> {
        &mut self.conversation
    }

    /// Consume the driver, returning the conversation.
    pub fn into_conversation(self) -> Conversation<S> {
        self.conversation
    }

    /// Whether the transport is gone and nothing is left to render.
    pub fn is_finished(&self) -> bool {
        !self.connected && !self.conversation.is_emitting()
    }

    /// Run until the transport disconnects and rendering completes.
    pub fn run(mut self) -> Conversation<S> {
        while !self.is_finished() {
            self.turn(None);
        }
        tracing::debug!(steps = self.pacer.steps(), "driver finished");
        self.conversation
    }

    /// Run until finished or until `deadline`, whichever comes first.
    pub fn run_until(&mut self, deadline: Instant) -> Stop {
        while !self.is_finished() {
            if !self.turn(Some(deadline)) {
                return Stop::Deadline;
            }
        }
        Stop::Finished
    }

    /// Wait for and process one event.
    ///
    /// Returns `false` if `deadline` expired before any event arrived.
    fn turn(&mut self, deadline: Option<Instant>) -> bool {
        let frames = self.frames.clone();
        let timer = self.pacer.deadline().map_or_else(never, at);
        let limit = deadline.map_or_else(never, at);

        select! {
            recv(frames) -> frame => match frame {
                Ok(raw) => self.conversation.on_message(&raw),
                Err(_) => {
                    tracing::info!("transport disconnected");
                    self.connected = false;
                    self.frames = never();
                    self.conversation.on_transport_closed();
                }
            },
            recv(timer) -> _ => {
                self.conversation.step();
                self.pacer.advance(Instant::now());
            },
            recv(limit) -> _ => return false,
        }

        self.reschedule();
        true
    }

    fn reschedule(&mut self) {
        if self.conversation.is_emitting() {
            self.pacer.arm(Instant::now());
        } else {
            self.pacer.disarm();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamConfig;
    use crate::render::Transcript;
    use std::time::Duration;

    fn driver(threshold: usize) -> (Driver<Transcript>, Sender<String>) {
        let config = StreamConfig::default()
            .with_release_threshold(threshold)
            .with_unit_delay(Duration::from_millis(1));
        Driver::with_channel(Conversation::new(config, Transcript::new()))
    }

    #[test]
    fn test_run_renders_and_finishes() {
        let (driver, tx) = driver(2);
        for frame in [
            r#"{"type":"TEXT_CHUNK","index":1,"text":"lo "}"#,
            r#"{"type":"TEXT_CHUNK","index":0,"text":"hel"}"#,
            r#"{"type":"TEXT_CHUNK","index":2,"text":"world"}"#,
            r#"{"type":"TEXT_END"}"#,
        ] {
            tx.send(frame.to_string()).unwrap();
        }
        drop(tx);

        let conversation = driver.run();
        assert!(conversation.is_idle());
        assert_eq!(conversation.sink().responses(), vec!["hello world"]);
        assert_eq!(conversation.sink().closed_count(), 1);
    }

    #[test]
    fn test_disconnect_mid_response_drains() {
        let (driver, tx) = driver(5);
        tx.send(r#"{"type":"TEXT_CHUNK","index":0,"text":"cut"}"#.to_string()).unwrap();
        drop(tx);

        let conversation = driver.run();
        assert_eq!(conversation.sink().rendered(), "cut");
    }

    #[test]
    fn test_run_until_deadline() {
        let (mut driver, tx) = driver(5);
        let stop = driver.run_until(Instant::now() + Duration::from_millis(20));
        assert_eq!(stop, Stop::Deadline);
        assert!(!driver.is_finished());

        drop(tx);
        let stop = driver.run_until(Instant::now() + Duration::from_secs(5));
        assert_eq!(stop, Stop::Finished);
    }

    #[test]
    fn test_step_paced_by_unit_delay() {
        let config = StreamConfig::default()
            .with_release_threshold(1)
            .with_unit_delay(Duration::from_millis(5));
        let (driver, tx) = Driver::with_channel(Conversation::new(config, Transcript::new()));
        tx.send(r#"{"type":"TEXT_CHUNK","index":0,"text":"abcde"}"#.to_string()).unwrap();
        tx.send(r#"{"type":"TEXT_END"}"#.to_string()).unwrap();
        drop(tx);

        let started = Instant::now();
        let conversation = driver.run();
        // First unit is immediate, the other four wait one delay each.
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(conversation.sink().rendered(), "abcde");
    }
}
