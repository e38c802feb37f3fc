//! Fragment store: sparse, index-keyed holding area for out-of-order text.
//!
//! Fragments sit here until they become contiguous with the cursor of the
//! response being assembled. The store never talks to the renderer.

use std::collections::HashMap;

/// Received fragments keyed by their sequence index.
///
/// Storage is unordered; ordering is recovered by walking indices from a
/// cursor. Duplicate indices overwrite silently, which is how at-least-once
/// delivery is tolerated.
#[derive(Debug, Default, Clone)]
pub struct FragmentStore {
    /// Buffered fragment text by index.
    fragments: HashMap<u64, String>,
}

impl FragmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the text at `index`.
    ///
    /// Returns `true` if an earlier value was replaced.
    pub fn put(&mut self, index: u64, text: impl Into<String>) -> bool {
        self.fragments.insert(index, text.into()).is_some()
    }

    /// Whether `index` is currently buffered.
    pub fn contains(&self, index: u64) -> bool {
        self.fragments.contains_key(&index)
    }

    /// Count consecutive buffered indices starting at `from`.
    ///
    /// The run ends at `u64::MAX` at the latest; it never wraps to zero.
    pub fn contiguous_run(&self, from: u64) -> usize {
        let mut count = 0;
        let mut index = Some(from);
        while let Some(current) = index.filter(|i| self.fragments.contains_key(i)) {
            count += 1;
            index = current.checked_add(1);
        }
        count
    }

    /// Remove the contiguous run starting at `*cursor` and return its text.
    ///
    /// The fragments are concatenated in index order and `*cursor` is
    /// advanced past the last one consumed. Fragments outside the run stay
    /// where they are. Returns the number of fragments consumed alongside
    /// the text. A run reaching `u64::MAX` stops there with the cursor
    /// left on the last index.
    pub fn drain_contiguous(&mut self, cursor: &mut u64) -> (String, usize) {
        let mut text = String::new();
        let mut consumed = 0;
        while let Some(fragment) = self.fragments.remove(&*cursor) {
            text.push_str(&fragment);
            consumed += 1;
            match cursor.checked_add(1) {
                Some(next) => *cursor = next,
                None => break,
            }
        }
        (text, consumed)
    }

    /// Remove everything left, in ascending index order.
    ///
    /// Used when a stream ends with gaps that will never close.
    pub fn drain_all_ordered(&mut self) -> Vec<(u64, String)> {
        let mut rest: Vec<_> = self.fragments.drain().collect();
        rest.sort_unstable_by_key(|(index, _)| *index);
        rest
    }

    /// Buffered indices in ascending order.
    pub fn buffered_indices(&self) -> Vec<u64> {
        let mut indices: Vec<_> = self.fragments.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Number of buffered fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Drop every buffered fragment.
    pub fn clear(&mut self) {
        self.fragments.clear();
    }
}
