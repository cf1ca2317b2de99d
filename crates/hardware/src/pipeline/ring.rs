//! Fixed-capacity circular history.
//!
//! The ring has two phases. While filling it grows on every append; once it
//! reaches capacity each append overwrites the oldest element. In both phases
//! [`RingBuffer::snapshot`] presents elements oldest first, independent of
//! where the write cursor sits.

/// Circular buffer holding the last `capacity` appended values.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    capacity: usize,
    /// Next slot to overwrite once full; also the oldest element.
    head: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty ring.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Appends `value`, evicting the oldest element when full.
    pub fn append(&mut self, value: T) {
        if self.slots.len() < self.capacity {
            self.slots.push(value);
        } else {
            self.slots[self.head] = value;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Maximum number of held elements.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current fill level.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` before the first append.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` once appends overwrite.
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Iterates held elements oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer)
    }

    /// Most recently appended element.
    pub fn newest(&self) -> Option<&T> {
        if self.slots.is_empty() {
            return None;
        }
        let idx = if self.head == 0 {
            self.slots.len() - 1
        } else {
            self.head - 1
        };
        self.slots.get(idx)
    }

    /// Drops every element and returns to the filling phase.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Returns the held elements, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
