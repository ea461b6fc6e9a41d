use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An item waiting in an [EventQueue] together with its due tick and insertion sequence.
#[derive(Debug)]
struct Scheduled<T> {
    due: u64,
    sequence: u64,
    item: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.sequence == other.sequence
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed, BinaryHeap is a max-heap.
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue keyed by due tick.
///
/// Items due on the same tick come out in the order they were pushed.
///
/// # Example
/// ```
/// # use logik::data_structures::EventQueue;
/// let mut q = EventQueue::new();
///
/// q.push(5, "late");
/// q.push(1, "first");
/// q.push(1, "second");
///
/// assert_eq!(q.pop_due(0), None);
/// assert_eq!(q.pop_due(3), Some("first"));
/// assert_eq!(q.pop_due(3), Some("second"));
/// assert_eq!(q.pop_due(3), None);
/// assert_eq!(q.next_due(), Some(5));
/// ```
#[derive(Debug)]
pub struct EventQueue<T> {
    heap: BinaryHeap<Scheduled<T>>,
    sequence: u64,
}

impl<T> EventQueue<T> {
    /// Returns an empty [EventQueue].
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            sequence: 0,
        }
    }

    /// Queues `item` to become due at tick `due`.
    pub fn push(&mut self, due: u64, item: T) {
        self.heap.push(Scheduled {
            due,
            sequence: self.sequence,
            item,
        });
        self.sequence += 1;
    }

    /// Pops the earliest item if it is due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<T> {
        if self.heap.peek()?.due > now {
            return None;
        }
        self.heap.pop().map(|scheduled| scheduled.item)
    }

    /// Returns the tick of the earliest queued item.
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|scheduled| scheduled.due)
    }

    /// Returns the number of queued items.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drops every queued item and restarts the insertion sequence.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.sequence = 0;
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_by_due_then_fifo() {
        let mut q = EventQueue::new();
        q.push(3, 'c');
        q.push(1, 'a');
        q.push(3, 'd');
        q.push(1, 'b');
        q.push(2, 'x');

        let mut out = Vec::new();
        while let Some(item) = q.pop_due(u64::MAX) {
            out.push(item);
        }
        assert_eq!(out, vec!['a', 'b', 'x', 'c', 'd']);
    }

    #[test]
    fn test_pop_due_respects_now() {
        let mut q = EventQueue::new();
        q.push(10, 1);

        assert_eq!(q.pop_due(9), None);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop_due(10), Some(1));
        assert!(q.is_empty());
        assert_eq!(q.pop_due(100), None);
    }

    #[test]
    fn test_clear() {
        let mut q = EventQueue::new();
        for i in 0..10 {
            q.push(i, i);
        }
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.next_due(), None);
    }
}
