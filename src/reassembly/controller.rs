//! Reassembly controller: decides when buffered fragments become visible.
//!
//! The controller owns the [`FragmentStore`] of one response and the cursor
//! of the next index it is waiting for. Each fragment arrival is checked
//! against the release threshold; the end of the stream forces whatever is
//! left out in index order.

use super::store::FragmentStore;
use crate::protocol::Fragment;

/// Lifecycle phase of one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No response in flight.
    #[default]
    Idle,
    /// Fragments are arriving.
    Receiving,
    /// End of stream seen; the render backlog is being flushed.
    Draining,
    /// Response fully rendered.
    Closed,
    /// Sender flagged the response as failed.
    Errored,
}

impl Phase {
    /// Whether the phase is terminal.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }
}

/// Text handed from the store to the renderer in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Index of the first fragment released.
    pub first_index: u64,
    /// Number of fragments released.
    pub fragments: usize,
    /// Indices that were skipped because they never arrived.
    pub missing: u64,
    /// Concatenated fragment text, in index order.
    pub text: String,
}

/// Release policy plus cursor state for one response.
#[derive(Debug, Clone)]
pub struct ReassemblyController {
    /// Fragments waiting for their predecessors.
    store: FragmentStore,
    /// Next index the display is waiting for.
    next_expected: u64,
    /// Contiguous fragments required for an early release.
    threshold: usize,
    /// Current phase.
    phase: Phase,
}

impl ReassemblyController {
    /// Create an idle controller with the given release threshold.
    ///
    /// A threshold of zero behaves like one.
    pub fn new(threshold: usize) -> Self {
        Self {
            store: FragmentStore::new(),
            next_expected: 0,
            threshold: threshold.max(1),
            phase: Phase::Idle,
        }
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Next index the display is waiting for.
    pub const fn next_expected(&self) -> u64 {
        self.next_expected
    }

    /// Number of fragments held back.
    pub fn buffered(&self) -> usize {
        self.store.len()
    }

    /// Start receiving a fresh response.
    pub fn begin(&mut self) {
        self.reset();
        self.phase = Phase::Receiving;
    }

    /// Accept a fragment and release the contiguous run if it is long enough.
    pub fn on_fragment(&mut self, fragment: Fragment) -> Option<Release> {
        if self.phase != Phase::Receiving {
            tracing::debug!(index = fragment.index, phase = ?self.phase, "fragment outside receiving phase ignored");
            return None;
        }

        if fragment.index < self.next_expected {
            tracing::debug!(
                index = fragment.index,
                next_expected = self.next_expected,
                "duplicate of released fragment ignored"
            );
            return None;
        }

        if self.store.put(fragment.index, fragment.text) {
            tracing::debug!(index = fragment.index, "fragment overwritten by redelivery");
        } else {
            tracing::debug!(index = fragment.index, "stored fragment");
        }

        let run = self.store.contiguous_run(self.next_expected);
        tracing::debug!(
            from = self.next_expected,
            count = run,
            buffered = ?self.store.buffered_indices(),
            "contiguous fragments available"
        );

        if run >= self.threshold {
            self.release_contiguous()
        } else {
            None
        }
    }

    /// Handle end of stream: release everything still buffered.
    ///
    /// The contiguous run goes first; fragments stranded behind a gap that
    /// never closed follow in ascending index order. The controller moves
    /// to [`Phase::Draining`].
    pub fn on_end(&mut self) -> Option<Release> {
        if self.phase != Phase::Receiving {
            tracing::debug!(phase = ?self.phase, "end outside receiving phase ignored");
            return None;
        }
        self.phase = Phase::Draining;

        let mut release = self.release_contiguous();
        let stranded = self.store.drain_all_ordered();
        if stranded.is_empty() {
            return release;
        }

        let mut tail = release.take().unwrap_or_else(|| Release {
            first_index: self.next_expected,
            fragments: 0,
            missing: 0,
            text: String::new(),
        });
        for (index, text) in stranded {
            tail.missing += index - self.next_expected;
            tail.fragments += 1;
            tail.text.push_str(&text);
            self.next_expected = index.saturating_add(1);
        }
        tracing::warn!(
            missing = tail.missing,
            next_expected = self.next_expected,
            "stream ended with gaps; releasing stranded fragments"
        );
        Some(tail)
    }

    /// Handle loss of the transport mid-response.
    ///
    /// Only the contiguous run is released; fragments stranded behind a gap
    /// are dropped. Returns the release and the number of fragments dropped.
    pub fn on_disconnect(&mut self) -> (Option<Release>, usize) {
        if self.phase != Phase::Receiving {
            return (None, 0);
        }
        self.phase = Phase::Draining;
        let release = self.release_contiguous();
        let dropped = self.store.len();
        self.store.clear();
        (release, dropped)
    }

    /// Handle a sender-side error: discard everything buffered.
    ///
    /// Returns the number of fragments dropped.
    pub fn on_error(&mut self) -> usize {
        let dropped = self.store.len();
        self.reset();
        self.phase = Phase::Errored;
        dropped
    }

    /// Close without releasing anything further, e.g. when superseded.
    ///
    /// Returns the number of fragments dropped.
    pub fn abandon(&mut self) -> usize {
        let dropped = self.store.len();
        self.reset();
        self.phase = Phase::Closed;
        dropped
    }

    /// Mark a drained response as closed and reset its state.
    pub fn finish(&mut self) {
        if self.phase == Phase::Draining {
            self.reset();
            self.phase = Phase::Closed;
        }
    }

    fn release_contiguous(&mut self) -> Option<Release> {
        let first_index = self.next_expected;
        let (text, fragments) = self.store.drain_contiguous(&mut self.next_expected);
        if fragments == 0 {
            return None;
        }
        tracing::debug!(first_index, fragments, "released fragments");
        Some(Release {
            first_index,
            fragments,
            missing: 0,
            text,
        })
    }

    fn reset(&mut self) {
        self.store.clear();
        self.next_expected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receiving(threshold: usize) -> ReassemblyController {
        let mut controller = ReassemblyController::new(threshold);
        controller.begin();
        controller
    }

    fn frag(index: u64) -> Fragment {
        Fragment::new(index, format!("t{index} "))
    }

    #[test]
    fn test_out_of_order_releases_on_threshold() {
        let mut controller = receiving(5);
        for index in [2, 0, 4, 1] {
            assert!(controller.on_fragment(frag(index)).is_none());
        }

        let release = controller.on_fragment(frag(3)).unwrap();
        assert_eq!(release.text, "t0 t1 t2 t3 t4 ");
        assert_eq!(release.fragments, 5);
        assert_eq!(controller.next_expected(), 5);

        assert!(controller.on_end().is_none());
        assert_eq!(controller.phase(), Phase::Draining);
    }

    #[test]
    fn test_gap_blocks_release() {
        let mut controller = receiving(5);
        for index in [0, 1, 2, 4, 5, 6, 7, 8] {
            assert!(controller.on_fragment(frag(index)).is_none());
        }
        assert_eq!(controller.next_expected(), 0);
        assert_eq!(controller.buffered(), 8);

        let release = controller.on_fragment(frag(3)).unwrap();
        assert_eq!(release.fragments, 9);
        assert_eq!(controller.next_expected(), 9);
    }

    #[test]
    fn test_end_releases_stranded_in_order() {
        let mut controller = receiving(5);
        for index in [0, 1, 2, 4, 5, 6, 7, 8] {
            controller.on_fragment(frag(index));
        }

        let release = controller.on_end().unwrap();
        assert_eq!(release.text, "t0 t1 t2 t4 t5 t6 t7 t8 ");
        assert_eq!(release.first_index, 0);
        assert_eq!(release.fragments, 8);
        assert_eq!(release.missing, 1);
    }

    #[test]
    fn test_end_with_only_stranded() {
        let mut controller = receiving(5);
        controller.on_fragment(frag(3));
        let release = controller.on_end().unwrap();
        assert_eq!(release.first_index, 0);
        assert_eq!(release.missing, 3);
        assert_eq!(release.text, "t3 ");
    }

    #[test]
    fn test_end_with_last_possible_index() {
        let mut controller = receiving(5);
        controller.on_fragment(frag(u64::MAX));
        let release = controller.on_end().unwrap();
        assert_eq!(release.text, format!("t{} ", u64::MAX));
        assert_eq!(release.missing, u64::MAX);
        assert_eq!(controller.next_expected(), u64::MAX);
    }

    #[test]
    fn test_duplicate_before_release_last_write_wins() {
        let mut controller = receiving(2);
        controller.on_fragment(Fragment::new(0, "old"));
        controller.on_fragment(Fragment::new(0, "new"));
        let release = controller.on_fragment(Fragment::new(1, "!")).unwrap();
        assert_eq!(release.text, "new!");
    }

    #[test]
    fn test_duplicate_after_release_ignored() {
        let mut controller = receiving(1);
        assert!(controller.on_fragment(frag(0)).is_some());
        assert!(controller.on_fragment(frag(0)).is_none());
        assert_eq!(controller.buffered(), 0);
        assert_eq!(controller.next_expected(), 1);
    }

    #[test]
    fn test_disconnect_drops_stranded() {
        let mut controller = receiving(5);
        for index in [0, 1, 3] {
            controller.on_fragment(frag(index));
        }
        let (release, dropped) = controller.on_disconnect();
        assert_eq!(release.unwrap().text, "t0 t1 ");
        assert_eq!(dropped, 1);
        assert_eq!(controller.phase(), Phase::Draining);
        assert_eq!(controller.buffered(), 0);
    }

    #[test]
    fn test_error_discards_buffer() {
        let mut controller = receiving(5);
        for index in 0..4 {
            assert!(controller.on_fragment(frag(index)).is_none());
        }
        assert_eq!(controller.on_error(), 4);
        assert_eq!(controller.phase(), Phase::Errored);
        assert_eq!(controller.buffered(), 0);
        assert!(controller.on_end().is_none());
    }

    #[test]
    fn test_finish_resets() {
        let mut controller = receiving(5);
        controller.on_fragment(frag(0));
        controller.on_end();
        controller.finish();
        assert_eq!(controller.phase(), Phase::Closed);
        assert_eq!(controller.next_expected(), 0);
        assert!(controller.phase().is_terminal());
    }

    #[test]
    fn test_abandon_closes() {
        let mut controller = receiving(5);
        controller.on_fragment(frag(2));
        assert_eq!(controller.abandon(), 1);
        assert_eq!(controller.phase(), Phase::Closed);
        assert!(controller.on_fragment(frag(0)).is_none());
    }

    #[test]
    fn test_idle_ignores_fragments() {
        let mut controller = ReassemblyController::new(1);
        assert!(controller.on_fragment(frag(0)).is_none());
        assert_eq!(controller.buffered(), 0);
    }
}
