//! Measure accumulates rhythm units up to the length of one bar.
//!
//! Unit, that does not fit into the rest of the measure, is split:
//! the fitting part is kept, and the remainder is returned to the
//! caller, which should drain the measure and feed the remainder
//! into the next one.
//!
//! See [`MeasureBuffer::add_unit`] for examples.

use log::{debug, warn};

use crate::error::{MuseError, MuseResult};

use super::{Fifo, Length, OverflowPolicy, RhythmUnit};

/// Result of [`MeasureBuffer::add_unit`].
#[derive(Debug, PartialEq, Clone)]
pub enum SplitOutcome {
    /// Unit is buffered, measure still has room.
    Fits,
    /// Measure is complete. The part, that did not fit, if any.
    Fills { remainder: Option<RhythmUnit> },
    /// Measure was already full, nothing is buffered.
    Rejected,
}

/// Units of the current measure and their total length.
///
/// Lives for the whole composition and is drained after every
/// completed measure.
#[derive(Debug)]
pub struct MeasureBuffer {
    target: Length,
    precision: Length,
    fifo: Fifo<RhythmUnit>,
    total: Length,
}
impl MeasureBuffer {
    /// Buffer for measures of `target` length, holding units not
    /// shorter than `precision`.
    pub fn new(target: Length, precision: Length) -> MuseResult<Self> {
        if target.is_zero() || precision.is_zero() {
            return Err(MuseError::InvalidLength(format!(
                "measure of {} with precision {}",
                target, precision
            )));
        }
        let capacity = (target.units() / precision.units()) as usize + 1;
        Ok(Self {
            target,
            precision,
            fifo: Fifo::new(capacity, OverflowPolicy::Reject),
            total: Length::ZERO,
        })
    }

    pub fn target(&self) -> Length {
        self.target
    }
    pub fn precision(&self) -> Length {
        self.precision
    }
    pub fn capacity(&self) -> usize {
        self.fifo.capacity()
    }
    /// Length of all buffered units.
    pub fn total(&self) -> Length {
        self.total
    }
    pub fn remaining(&self) -> Length {
        self.target.saturating_sub(self.total)
    }
    pub fn len(&self) -> usize {
        self.fifo.count()
    }
    pub fn is_empty(&self) -> bool {
        self.fifo.is_empty()
    }
    pub fn is_full(&self) -> bool {
        self.total >= self.target
    }
    pub fn peek(&self, offset: usize) -> MuseResult<&RhythmUnit> {
        self.fifo.peek(offset)
    }
    pub fn iter(&self) -> impl Iterator<Item = &RhythmUnit> {
        self.fifo.iter()
    }

    /// Add unit to the measure.
    ///
    /// The unit is copied, never changed. If it is longer than the
    /// room left, the fitting part is buffered and the rest is
    /// returned in [`SplitOutcome::Fills`].
    ///
    /// # Example
    /// ```
    /// # use muse_score::primitives::{Length, MeasureBuffer, RhythmUnit, SplitOutcome};
    /// let mut measure = MeasureBuffer::new(Length::WHOLE, Length::from(1.0 / 16.0)).unwrap();
    /// let half_dot = RhythmUnit::rest(Length::from(0.75));
    /// assert_eq!(measure.add_unit(&half_dot).unwrap(), SplitOutcome::Fits);
    /// match measure.add_unit(&half_dot).unwrap() {
    ///     SplitOutcome::Fills { remainder: Some(rest) } => {
    ///         assert_eq!(rest.length, Length::from(0.5))
    ///     }
    ///     outcome => panic!("unexpected: {:?}", outcome),
    /// }
    /// assert_eq!(measure.add_unit(&half_dot).unwrap(), SplitOutcome::Rejected);
    /// assert_eq!(measure.drain().len(), 2);
    /// assert_eq!(measure.total(), Length::ZERO);
    /// ```
    pub fn add_unit(&mut self, unit: &RhythmUnit) -> MuseResult<SplitOutcome> {
        if self.is_full() {
            return Ok(SplitOutcome::Rejected);
        }
        let length = unit.effective_length();
        if length.is_zero() {
            warn!("skipping zero-length unit: {:?}", unit);
            return Ok(SplitOutcome::Fits);
        }
        let remaining = self.remaining();
        if length < remaining {
            self.push(unit.clone())?;
            return Ok(SplitOutcome::Fits);
        }
        if length == remaining {
            self.push(unit.clone())?;
            return Ok(SplitOutcome::Fills { remainder: None });
        }
        let (fitted, remainder) = unit.split_at(remaining)?;
        debug!(
            "unit of {} is split at the barline, {} is carried",
            length,
            remainder.effective_length()
        );
        self.push(fitted)?;
        Ok(SplitOutcome::Fills {
            remainder: Some(remainder),
        })
    }

    fn push(&mut self, unit: RhythmUnit) -> MuseResult<()> {
        let length = unit.effective_length();
        if !self.fifo.add(unit) {
            return Err(MuseError::Capacity {
                capacity: self.fifo.capacity(),
            });
        }
        self.total += length;
        Ok(())
    }

    /// Take units of the measure in insertion order and start a new
    /// measure.
    pub fn drain(&mut self) -> Vec<RhythmUnit> {
        self.total = Length::ZERO;
        self.fifo.drain()
    }
}
