//! Text picture of a measure, for trace logs.

use crate::primitives::{Length, RhythmUnit};

/// Ruler of 64th-note cells, with every unit written at its beat.
///
/// # Example
/// ```
/// # use muse_score::{diagnostics::pretty_measure, primitives::{Length, RhythmUnit}};
/// let mut note = RhythmUnit::note("C4".parse().unwrap(), Length::from(0.0625));
/// note.set_beat(Length::ZERO);
/// let mut rest = RhythmUnit::rest(Length::from(0.0625));
/// rest.set_beat(Length::from(0.0625));
/// assert_eq!(
///     pretty_measure(&[note, rest], Length::from(0.125)),
///     "|C4--r---|"
/// );
/// ```
pub fn pretty_measure(measure: &[RhythmUnit], measure_length: Length) -> String {
    let width = measure_length.units() as usize;
    let mut cells = vec!['-'; width + 2];
    cells[0] = '|';
    cells[width + 1] = '|';
    for unit in measure {
        let start = unit.beat.unwrap_or_default().units() as usize + 1;
        // names are cut at the barline
        for (cell, ch) in cells[..=width]
            .iter_mut()
            .skip(start)
            .zip(unit.to_string().chars())
        {
            *cell = ch;
        }
    }
    cells.into_iter().collect()
}
