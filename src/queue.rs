//! Pending source paths.

use std::path::PathBuf;

/// LIFO list of paths waiting to be dispatched.
///
/// Pushing appends and popping takes the most recent entry, so the children of
/// an expanded directory are handled before anything queued earlier.
#[derive(Debug, Default)]
pub struct WorkQueue {
    pending: Vec<PathBuf>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<P: Into<PathBuf>>(&mut self, path: P) {
        self.pending.push(path.into());
    }

    pub fn pop(&mut self) -> Option<PathBuf> {
        self.pending.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_reverse_push_order() {
        let mut queue = WorkQueue::new();
        queue.push("a");
        queue.push("b");
        queue.push("c");
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(PathBuf::from("c")));
        assert_eq!(queue.pop(), Some(PathBuf::from("b")));
        queue.push("d");
        assert_eq!(queue.pop(), Some(PathBuf::from("d")));
        assert_eq!(queue.pop(), Some(PathBuf::from("a")));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }
}
