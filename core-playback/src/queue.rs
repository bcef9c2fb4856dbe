//! FIFO of pending media references.

use crate::media::MediaReference;
use std::collections::VecDeque;

/// Ordered holding area for items waiting to be played.
///
/// The item currently playing is never in the queue; it is removed by
/// [`dequeue_next`](MediaQueue::dequeue_next) before playback starts.
#[derive(Debug, Clone, Default)]
pub struct MediaQueue {
    items: VecDeque<MediaReference>,
}

impl MediaQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the back.
    pub fn enqueue(&mut self, reference: MediaReference) {
        self.items.push_back(reference);
    }

    /// Remove and return the front item.
    pub fn dequeue_next(&mut self) -> Option<MediaReference> {
        self.items.pop_front()
    }

    /// Remove everything; returns how many items were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    pub fn peek(&self) -> Option<&MediaReference> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaReference> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(name: &str) -> MediaReference {
        MediaReference::local(name).unwrap()
    }

    #[test]
    fn fifo_order() {
        let mut queue = MediaQueue::new();
        queue.enqueue(local("a.mp4"));
        queue.enqueue(local("b.mp4"));
        queue.enqueue(local("c.mp4"));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek().map(|r| r.title()), Some("a.mp4"));
        assert_eq!(queue.dequeue_next().unwrap().title(), "a.mp4");
        assert_eq!(queue.dequeue_next().unwrap().title(), "b.mp4");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn dequeue_empty_is_none() {
        let mut queue = MediaQueue::new();
        assert!(queue.dequeue_next().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_reports_removed() {
        let mut queue = MediaQueue::new();
        queue.enqueue(local("a.mp4"));
        queue.enqueue(local("b.mp4"));

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.clear(), 0);
    }

    #[test]
    fn iter_preserves_order() {
        let mut queue = MediaQueue::new();
        queue.enqueue(local("x.mp4"));
        queue.enqueue(local("y.mp4"));

        let titles: Vec<_> = queue.iter().map(|r| r.title().to_string()).collect();
        assert_eq!(titles, vec!["x.mp4", "y.mp4"]);
    }
}
