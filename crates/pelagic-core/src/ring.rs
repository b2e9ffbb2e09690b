//! Fixed-capacity history ring indexed by age.

use std::collections::VecDeque;

/// A bounded history where `get(0)` is the most recent entry.
///
/// `get(i)` means "the value pushed `i` pushes ago". Once the capacity is
/// reached each push evicts the oldest entry. Position and food histories
/// for the attraction model, and the daily energy history, rely on this
/// indexing convention.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty ring holding at most `capacity` entries.
    ///
    /// A zero capacity is bumped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new most-recent value, evicting the oldest if full.
    pub fn push(&mut self, value: T) {
        if self.items.len() == self.capacity {
            self.items.pop_back();
        }
        self.items.push_front(value);
    }

    /// The value pushed `age` pushes ago, if still retained.
    pub fn get(&self, age: usize) -> Option<&T> {
        self.items.get(age)
    }

    /// Mutable access to the value pushed `age` pushes ago.
    pub fn get_mut(&mut self, age: usize) -> Option<&mut T> {
        self.items.get_mut(age)
    }

    /// The most recent value.
    pub fn latest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Number of retained values.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the ring holds `capacity` values.
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Maximum number of retained values.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate from most recent (age 0) to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    /// Drop all values.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Create a ring pre-filled to capacity with `value`.
    pub fn filled(capacity: usize, value: T) -> Self {
        let mut ring = Self::new(capacity);
        for _ in 0..ring.capacity {
            ring.push(value.clone());
        }
        ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_zero_is_most_recent() {
        let mut r = RingBuffer::new(3);
        r.push(1);
        r.push(2);
        assert_eq!(r.get(0), Some(&2));
        assert_eq!(r.get(1), Some(&1));
        assert_eq!(r.get(2), None);
    }

    #[test]
    fn oldest_entry_is_evicted_at_capacity() {
        let mut r = RingBuffer::new(3);
        for v in 1..=5 {
            r.push(v);
        }
        assert_eq!(r.len(), 3);
        assert!(r.is_full());
        assert_eq!(r.iter().copied().collect::<Vec<_>>(), vec![5, 4, 3]);
    }

    #[test]
    fn filled_ring_reports_full() {
        let r = RingBuffer::filled(10, 0.0f64);
        assert!(r.is_full());
        assert_eq!(r.get(9), Some(&0.0));
    }

    #[test]
    fn zero_capacity_is_bumped() {
        let mut r = RingBuffer::new(0);
        r.push('a');
        r.push('b');
        assert_eq!(r.capacity(), 1);
        assert_eq!(r.latest(), Some(&'b'));
    }
}
