//! Ordered expression store
//!
//! The store's order is the single source of truth for display order and
//! persisted order. Uniqueness is not enforced.

/// Ordered, mutable list of expression strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionStore {
    entries: Vec<String>,
}

impl ExpressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Insert at `index`, clamped to the end of the list.
    pub fn insert_at(&mut self, index: usize, text: impl Into<String>) -> usize {
        let index = index.min(self.entries.len());
        self.entries.insert(index, text.into());
        index
    }

    /// Replace the text of an existing entry.
    pub fn replace_at(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                *entry = text.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Remove all listed rows atomically; out-of-range indices are ignored.
    ///
    /// Returns the follow-up selection: the entry immediately following the
    /// removed block, or the new last entry if the block reached the end, or
    /// `None` if the store emptied.
    pub fn remove_indices(&mut self, indices: &[usize]) -> Option<usize> {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.entries.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        let first_removed = *sorted.first()?;
        for &index in sorted.iter().rev() {
            self.entries.remove(index);
        }

        if self.entries.is_empty() {
            None
        } else if first_removed >= self.entries.len() {
            // The removed block reached the end; select the new last entry.
            Some(self.entries.len() - 1)
        } else {
            // Select the entry that followed the removed block.
            Some(first_removed)
        }
    }

    /// Move the entry at `from` so it lands at drop position `to`.
    ///
    /// `to` is interpreted as an insertion point in the pre-move list, the
    /// way a drop indicator reports it; moving a row downwards accounts for
    /// its own removal. Returns false for out-of-range or no-op moves.
    pub fn move_range(&mut self, from: usize, mut to: usize) -> bool {
        if from >= self.entries.len() || to > self.entries.len() {
            return false;
        }
        if from < to {
            to -= 1;
        }
        if from == to {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    pub fn replace_all(&mut self, entries: Vec<String>) {
        self.entries = entries;
    }

    pub fn to_persistable(&self) -> Vec<String> {
        self.entries.clone()
    }

    pub fn from_persistable(entries: Vec<String>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(entries: &[&str]) -> ExpressionStore {
        ExpressionStore::from_persistable(entries.iter().map(|s| s.to_string()).collect())
    }

    fn contents(store: &ExpressionStore) -> Vec<&str> {
        store.iter().collect()
    }

    #[test]
    fn test_insert_clamps_index() {
        let mut s = store(&["a", "b"]);
        assert_eq!(s.insert_at(99, "c"), 2);
        assert_eq!(contents(&s), vec!["a", "b", "c"]);

        assert_eq!(s.insert_at(0, "d"), 0);
        assert_eq!(contents(&s), vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn test_remove_indices_preserves_order() {
        let mut s = store(&["a", "b", "c", "d", "e"]);
        let follow = s.remove_indices(&[3, 1]);
        assert_eq!(contents(&s), vec!["a", "c", "e"]);
        // Entry following the first removed row.
        assert_eq!(follow, Some(1));
    }

    #[test]
    fn test_remove_block_at_end_selects_new_last() {
        let mut s = store(&["a", "b", "c"]);
        let follow = s.remove_indices(&[1, 2]);
        assert_eq!(contents(&s), vec!["a"]);
        assert_eq!(follow, Some(0));
    }

    #[test]
    fn test_remove_everything() {
        let mut s = store(&["a", "b"]);
        assert_eq!(s.remove_indices(&[0, 1]), None);
        assert!(s.is_empty());
    }

    #[test]
    fn test_remove_ignores_out_of_range() {
        let mut s = store(&["a", "b"]);
        let follow = s.remove_indices(&[0, 7]);
        assert_eq!(contents(&s), vec!["b"]);
        assert_eq!(follow, Some(0));
    }

    #[test]
    fn test_move_down_accounts_for_removal() {
        let mut s = store(&["a", "b", "c"]);
        // Drop "a" below "b": insertion point 2 in the pre-move list.
        assert!(s.move_range(0, 2));
        assert_eq!(contents(&s), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_move_up() {
        let mut s = store(&["a", "b", "c"]);
        assert!(s.move_range(2, 0));
        assert_eq!(contents(&s), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_move_onto_itself_is_noop() {
        let mut s = store(&["a", "b"]);
        assert!(!s.move_range(0, 1));
        assert_eq!(contents(&s), vec!["a", "b"]);
    }

    #[test]
    fn test_persistable_round_trip() {
        let s = store(&["a", "a"]);
        let restored = ExpressionStore::from_persistable(s.to_persistable());
        assert_eq!(s, restored);
    }
}
