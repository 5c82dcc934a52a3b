//! Delta Queue: hands reply snapshots from the network thread to the tick loop.
//!
//! The producer never blocks (unbounded channel). The consumer drains the
//! whole backlog each tick and keeps only the newest snapshot; the reveal
//! is paced by a local clock, not by network events.

use super::messages::ReplySnapshot;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Single-consumer side of the snapshot channel.
#[derive(Debug)]
pub struct DeltaQueue {
    /// Kept so new producers can be handed out for each turn.
    tx: Sender<ReplySnapshot>,
    rx: Receiver<ReplySnapshot>,
}

/// Cloneable producer handle given to the network thread.
#[derive(Debug, Clone)]
pub struct DeltaProducer {
    tx: Sender<ReplySnapshot>,
}

impl DeltaProducer {
    /// Enqueue a cumulative snapshot. Returns `false` if the queue is gone.
    pub fn push(&self, full_text: &str) -> bool {
        self.tx.send(ReplySnapshot::new(full_text)).is_ok()
    }
}

impl DeltaQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Create a producer handle.
    pub fn producer(&self) -> DeltaProducer {
        DeltaProducer { tx: self.tx.clone() }
    }

    /// Dequeue everything and return the last snapshot, if any arrived.
    pub fn drain_latest(&self) -> Option<ReplySnapshot> {
        self.rx.try_iter().last()
    }

    /// Discard every queued snapshot. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        self.rx.try_iter().count()
    }

    /// Number of snapshots waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no snapshot is waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for DeltaQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_keeps_only_latest() {
        let queue = DeltaQueue::new();
        let producer = queue.producer();
        producer.push("H");
        producer.push("Hi");
        producer.push("Hi!");

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain_latest(), Some(ReplySnapshot::new("Hi!")));
        assert!(queue.is_empty());
        assert_eq!(queue.drain_latest(), None);
    }

    #[test]
    fn test_clear_discards_stale_snapshots() {
        let queue = DeltaQueue::new();
        let producer = queue.producer();
        producer.push("old");
        producer.push("older");
        assert_eq!(queue.clear(), 2);
        assert_eq!(queue.drain_latest(), None);
    }

    #[test]
    fn test_cross_thread_order_preserved() {
        let queue = DeltaQueue::new();
        let producer = queue.producer();

        let handle = thread::spawn(move || {
            let mut text = String::new();
            for i in 0..500 {
                text.push(char::from(b'a' + (i % 26) as u8));
                assert!(producer.push(&text));
            }
        });
        handle.join().unwrap();

        let lengths: Vec<usize> = queue.rx.try_iter().map(|s| s.full_text.len()).collect();
        assert_eq!(lengths.len(), 500);
        assert!(lengths.windows(2).all(|w| w[0] < w[1]));
    }
}
