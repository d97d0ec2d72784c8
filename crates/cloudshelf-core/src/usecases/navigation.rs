//! Back-navigation history for the file browser

use serde::Serialize;

use crate::domain::CloudPath;

/// Stack of previously visited paths
///
/// The bottom entry is always the root, so the stack is never empty.
/// `push` and `pop` are the only mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationHistory {
    stack: Vec<CloudPath>,
}

impl NavigationHistory {
    /// A fresh history containing only the root
    pub fn new() -> Self {
        Self {
            stack: vec![CloudPath::root()],
        }
    }

    /// Records `path` as the place to return to
    pub(crate) fn push(&mut self, path: CloudPath) {
        self.stack.push(path);
    }

    /// Removes and returns the most recent entry
    ///
    /// Returns `None` when only the root entry is left; the root is never
    /// popped.
    pub(crate) fn pop(&mut self) -> Option<CloudPath> {
        if self.stack.len() <= 1 {
            return None;
        }
        self.stack.pop()
    }

    /// Number of entries, including the root
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }

    /// Entries from the root to the most recent
    pub fn entries(&self) -> &[CloudPath] {
        &self.stack
    }
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_history_holds_only_root() {
        let history = NavigationHistory::new();
        assert_eq!(history.depth(), 1);
        assert!(!history.can_go_back());
        assert_eq!(history.entries(), &[CloudPath::root()]);
    }

    #[test]
    fn test_pop_never_removes_root() {
        let mut history = NavigationHistory::new();
        assert!(history.pop().is_none());
        assert_eq!(history.depth(), 1);
    }

    #[test]
    fn test_push_pop_is_lifo() {
        let mut history = NavigationHistory::new();
        history.push(CloudPath::root());
        history.push(CloudPath::new("/Documents").unwrap());

        assert_eq!(history.depth(), 3);
        assert!(history.can_go_back());
        assert_eq!(history.pop(), Some(CloudPath::new("/Documents").unwrap()));
        assert_eq!(history.pop(), Some(CloudPath::root()));
        assert!(history.pop().is_none());
    }
}
