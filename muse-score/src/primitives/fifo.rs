//! Fixed-capacity first-in-first-out buffer.

use log::trace;

use crate::error::{MuseError, MuseResult};

/// What [`Fifo::add`] does, when buffer is full.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// New item is refused.
    #[default]
    Reject,
    /// Oldest item is forgotten to make room.
    EvictOldest,
}

/// Circular buffer of fixed capacity.
///
/// Never resized. Full and empty states are resolved by
/// [`OverflowPolicy`] and by returning `None`, never by waiting.
///
/// # Example
/// ```
/// # use muse_score::primitives::{Fifo, OverflowPolicy};
/// let mut fifo = Fifo::new(2, OverflowPolicy::EvictOldest);
/// assert!(fifo.add(1));
/// assert!(fifo.add(2));
/// assert!(fifo.add(3));
/// assert_eq!(fifo.get(), Some(2));
/// assert_eq!(fifo.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Fifo<T> {
    buffer: Vec<Option<T>>,
    add_ptr: usize,
    get_ptr: usize,
    empty: bool,
    policy: OverflowPolicy,
}
impl<T> Fifo<T> {
    /// Capacity below 1 is raised to 1.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: (0..capacity).map(|_| None).collect(),
            add_ptr: 0,
            get_ptr: 0,
            empty: true,
            policy,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }
    pub fn is_empty(&self) -> bool {
        self.empty
    }
    pub fn is_full(&self) -> bool {
        !self.empty && self.add_ptr == self.get_ptr
    }

    /// Amount of buffered items.
    pub fn count(&self) -> usize {
        match self.is_full() {
            true => self.capacity(),
            false => {
                (self.add_ptr + self.capacity() - self.get_ptr)
                    % self.capacity()
            }
        }
    }

    fn advance(&self, ptr: usize) -> usize {
        (ptr + 1) % self.capacity()
    }

    /// Push item to the back.
    ///
    /// Returns `false` if buffer is full and policy is
    /// [`OverflowPolicy::Reject`].
    pub fn add(&mut self, item: T) -> bool {
        if self.is_full() {
            match self.policy {
                OverflowPolicy::Reject => return false,
                OverflowPolicy::EvictOldest => {
                    trace!("fifo is full, forgetting the oldest item");
                    self.buffer[self.get_ptr] = None;
                    self.get_ptr = self.advance(self.get_ptr);
                }
            }
        }
        self.buffer[self.add_ptr] = Some(item);
        self.add_ptr = self.advance(self.add_ptr);
        self.empty = false;
        true
    }

    /// Pop item from the front.
    pub fn get(&mut self) -> Option<T> {
        if self.empty {
            return None;
        }
        let item = self.buffer[self.get_ptr].take();
        self.get_ptr = self.advance(self.get_ptr);
        if self.get_ptr == self.add_ptr {
            self.empty = true;
        }
        item
    }

    fn slot(&self, offset: usize) -> MuseResult<usize> {
        let count = self.count();
        if offset >= count {
            return Err(MuseError::OutOfRange {
                index: offset,
                count,
            });
        }
        Ok((self.get_ptr + offset) % self.capacity())
    }

    /// Item at `offset` from the front, without removing it.
    pub fn peek(&self, offset: usize) -> MuseResult<&T> {
        let slot = self.slot(offset)?;
        self.buffer[slot].as_ref().ok_or(MuseError::OutOfRange {
            index: offset,
            count: self.count(),
        })
    }

    /// Mutable item at `offset` from the front.
    pub fn peek_mut(&mut self, offset: usize) -> MuseResult<&mut T> {
        let slot = self.slot(offset)?;
        let count = self.count();
        self.buffer[slot].as_mut().ok_or(MuseError::OutOfRange {
            index: offset,
            count,
        })
    }

    /// Items in FIFO order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.count()).filter_map(move |offset| self.peek(offset).ok())
    }

    /// Take all items in FIFO order, leaving buffer empty.
    pub fn drain(&mut self) -> Vec<T> {
        let mut items = Vec::with_capacity(self.count());
        while let Some(item) = self.get() {
            items.push(item);
        }
        items
    }
}
