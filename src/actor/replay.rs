//! Replay Actor: Dedicated thread that plays a scripted frame sequence.
//!
//! Stands in for the publish/subscribe transport in demos and tests: each
//! frame is delivered after its own delay, and dropping the sender at the
//! end of the script looks exactly like the transport disconnecting.

use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One scripted delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedFrame {
    /// Wait before delivering this frame.
    pub delay: Duration,
    /// Raw frame payload.
    pub payload: String,
}

impl ScriptedFrame {
    /// Create a scripted frame.
    pub fn new(delay: Duration, payload: impl Into<String>) -> Self {
        Self {
            delay,
            payload: payload.into(),
        }
    }
}

/// Replay actor that feeds frames into a driver's channel.
pub struct ReplayActor {
    /// Handle to the replay thread.
    handle: Option<JoinHandle<usize>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl ReplayActor {
    /// Spawn the replay thread.
    ///
    /// # Arguments
    ///
    /// * `script` - Frames to deliver, in delivery order.
    /// * `sender` - Channel the driver reads frames from. It is dropped when
    ///   the script ends, which the driver sees as a disconnect.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the replay thread.
    pub fn spawn(script: Vec<ScriptedFrame>, sender: Sender<String>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("typecast-replay".to_string())
            .spawn(move || Self::run_loop(script, &sender, &shutdown_clone))
            .expect("Failed to spawn replay thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the replay thread to stop after the current frame.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the replay thread; returns the number of frames delivered.
    pub fn join(mut self) -> usize {
        self.handle.take().map_or(0, |handle| handle.join().unwrap_or(0))
    }

    /// Main replay loop.
    fn run_loop(script: Vec<ScriptedFrame>, sender: &Sender<String>, shutdown: &AtomicBool) -> usize {
        let mut delivered = 0;
        for frame in script {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            if !frame.delay.is_zero() {
                thread::sleep(frame.delay);
            }
            if sender.send(frame.payload).is_err() {
                // Driver is gone
                break;
            }
            delivered += 1;
        }
        tracing::debug!(delivered, "replay finished");
        delivered
    }
}

impl Drop for ReplayActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
