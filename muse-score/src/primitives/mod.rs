//! Elements, from which score is composed.
//!
//! At first, the note source produces RhythmUnits.
//! Then they are packed into MeasureBuffer, split at barlines.
//! Then drained measures are decomposed into basis durations
//! and rendered to *.ly source.

pub mod circular;
pub mod event;
pub mod fifo;
pub mod fraction_tools;
pub mod key;
pub mod length;
pub mod measure;
pub mod pitch;
pub mod time_signature;

pub use circular::Circular;
pub use event::{Chord, EventType, RhythmUnit};
pub use fifo::{Fifo, OverflowPolicy};
pub use fraction_tools::{decompose_length, is_basis_reciprocal, BasisFragment};
pub use key::{Clef, Key, Scale};
pub use length::Length;
pub use measure::{MeasureBuffer, SplitOutcome};
pub use pitch::{Accidental, NoteName, Pitch};
pub use time_signature::TimeSignature;

/// 64th notes in the whole note.
pub const UNITS_PER_WHOLE: u32 = 64;
/// Basis durations from the whole note down to the 64th.
pub const BASIS_SLOTS: usize = 7;
