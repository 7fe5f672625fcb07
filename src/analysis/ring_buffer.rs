/// Fixed-capacity circular buffer with overwrite-on-full semantics
///
/// Slots are only materialised as they are written, so an unwritten slot can
/// never be mistaken for a real value (a reading of exactly 0.0 V is valid
/// data). The `ready` flag flips once the buffer has been filled at least once
/// and stays set until `reset`.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    capacity: usize,
    /// Index the next write lands on
    cursor: usize,
    ready: bool,
}

impl<T: Clone> RingBuffer<T> {
    /// Create an empty buffer. A zero capacity is clamped to one slot; the
    /// configuration layer rejects it before it gets here.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
            ready: false,
        }
    }

    /// Write a value, evicting the oldest entry once full
    pub fn write(&mut self, value: T) {
        if self.slots.len() < self.capacity {
            self.slots.push(value);
        } else {
            self.slots[self.cursor] = value;
        }

        self.cursor = (self.cursor + 1) % self.capacity;
        if self.slots.len() == self.capacity {
            self.ready = true;
        }
    }

    /// True once `capacity` values have been written since creation or reset
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// True when every slot currently holds a value
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Physical index of the entry `age` writes ago (0 = newest).
    ///
    /// Only valid for `age < len()`.
    fn index_of(&self, age: usize) -> usize {
        let len = self.slots.len();
        if len < self.capacity {
            // Not yet wrapped: entries sit in write order at the front
            len - 1 - age
        } else {
            (self.cursor + self.capacity - 1 - age) % self.capacity
        }
    }

    /// Most recently written value
    pub fn latest(&self) -> Option<&T> {
        if self.slots.is_empty() {
            None
        } else {
            Some(&self.slots[self.index_of(0)])
        }
    }

    /// The last `k` entries ending at the cursor, oldest first.
    ///
    /// Returns `None` when fewer than `k` entries exist.
    pub fn last(&self, k: usize) -> Option<Vec<T>> {
        if k > self.slots.len() {
            return None;
        }

        Some(
            (0..k)
                .rev()
                .map(|age| self.slots[self.index_of(age)].clone())
                .collect(),
        )
    }

    /// All valid entries in chronological order
    pub fn snapshot(&self) -> Vec<T> {
        self.last(self.slots.len()).unwrap_or_default()
    }

    /// Keep only the most recent `keep` entries. The cursor moves to just
    /// after them and the ready flag is left as it was.
    pub fn retain_recent(&mut self, keep: usize) {
        if keep >= self.slots.len() {
            return;
        }

        let recent = self.last(keep).unwrap_or_default();
        self.slots = recent;
        self.cursor = self.slots.len() % self.capacity;
    }

    pub fn reset(&mut self) {
        self.slots.clear();
        self.cursor = 0;
        self.ready = false;
    }
}
