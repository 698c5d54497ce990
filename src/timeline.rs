//! Fixed-capacity double-ended buffer backing every trajectory.
//!
//! The integrator appends future samples at the tail while the flight
//! controller consumes elapsed samples from the head, so storage is a ring
//! that never reallocates after construction.

use crate::types::TimelineSample;

/// Errors raised by [`RingBuffer`] operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    #[error("ring buffer is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("ring buffer is empty")]
    EmptyBuffer,

    #[error("index {index} out of range for ring buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A ring buffer of at most `capacity` items, addressed from the head.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    len: usize,
}

/// The sample buffer used by trajectories.
pub type Timeline = RingBuffer<TimelineSample>;

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let slots = std::iter::repeat_with(|| None).take(capacity).collect();
        Self {
            slots,
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Free slots left before an append or prepend would fail.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// Physical slot of the logical position `offset` from the head.
    #[inline]
    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % self.capacity()
    }

    fn ensure_room(&self) -> Result<(), TimelineError> {
        if self.is_full() {
            Err(TimelineError::CapacityExceeded {
                capacity: self.capacity(),
            })
        } else {
            Ok(())
        }
    }

    /// Insert after the current tail.
    pub fn append(&mut self, item: T) -> Result<(), TimelineError> {
        self.ensure_room()?;
        let index = self.slot(self.len);
        self.slots[index] = Some(item);
        self.len += 1;
        Ok(())
    }

    /// Insert before the current head.
    pub fn prepend(&mut self, item: T) -> Result<(), TimelineError> {
        self.ensure_room()?;
        let capacity = self.capacity();
        self.head = (self.head + capacity - 1) % capacity;
        self.slots[self.head] = Some(item);
        self.len += 1;
        Ok(())
    }

    pub fn pop_head(&mut self) -> Result<T, TimelineError> {
        if self.is_empty() {
            return Err(TimelineError::EmptyBuffer);
        }
        let item = self.slots[self.head].take();
        self.head = self.slot(1);
        self.len -= 1;
        if self.is_empty() {
            self.head = 0;
        }
        item.ok_or(TimelineError::EmptyBuffer)
    }

    pub fn pop_tail(&mut self) -> Result<T, TimelineError> {
        if self.is_empty() {
            return Err(TimelineError::EmptyBuffer);
        }
        let index = self.slot(self.len - 1);
        let item = self.slots[index].take();
        self.len -= 1;
        if self.is_empty() {
            self.head = 0;
        }
        item.ok_or(TimelineError::EmptyBuffer)
    }

    pub fn head(&self) -> Result<&T, TimelineError> {
        self.get(0).map_err(|_| TimelineError::EmptyBuffer)
    }

    pub fn tail(&self) -> Result<&T, TimelineError> {
        match self.len {
            0 => Err(TimelineError::EmptyBuffer),
            len => self.get(len - 1),
        }
    }

    /// Item `index` positions after the head.
    pub fn get(&self, index: usize) -> Result<&T, TimelineError> {
        if index >= self.len {
            return Err(TimelineError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        self.slots[self.slot(index)]
            .as_ref()
            .ok_or(TimelineError::IndexOutOfRange {
                index,
                len: self.len,
            })
    }

    /// Drop every item, keeping the allocation.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Iterate from head to tail.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.slots[self.slot(i)].as_ref())
    }
}
