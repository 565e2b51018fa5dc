//! Tools for splitting lengths into notatable (basis) durations.

use super::{Length, BASIS_SLOTS, UNITS_PER_WHOLE};

/// One notatable piece of a length: a basis duration, possibly dotted.
///
/// `tie_before` is set on every fragment, that continues the previous
/// one of the same decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasisFragment {
    /// 0 is a whole note, 6 is a 64th note.
    pub power: u8,
    pub dotted: bool,
    pub tie_before: bool,
}
impl BasisFragment {
    fn new(power: u8, tie_before: bool) -> Self {
        Self {
            power,
            dotted: false,
            tie_before,
        }
    }

    pub fn length(&self) -> Length {
        let length = Length::basis(self.power);
        match self.dotted {
            true => length.dotted(),
            false => length,
        }
    }

    /// Duration as LilyPond writes it: `4`, `8.`, `1`.
    pub fn lilypond_duration(&self) -> String {
        let dot = match self.dotted {
            true => ".",
            false => "",
        };
        format!("{}{}", 1u32 << self.power, dot)
    }
}

/// Is `reciprocal` a basis duration (1, 2, 4 … 64)?
pub fn is_basis_reciprocal(reciprocal: u32) -> bool {
    reciprocal.is_power_of_two() && reciprocal <= UNITS_PER_WHOLE
}

/// Split length into tied and dotted basis durations.
///
/// `align` is the beat position, the fragment starts on. If the
/// shortest subdivision of the beat is present in the length, it is
/// written first, so the rest of the note starts on a coarser beat.
///
/// Dots are made only from two adjacent slots, there are no double
/// dots. Lengths of more than one whole note become a chain of tied
/// whole notes. Zero length gives no fragments.
///
/// # Example
///
/// ```
/// # use muse_score::primitives::{decompose_length, Length};
/// let durations = |frags: Vec<_>| {
///     frags
///         .iter()
///         .map(|f: &muse_score::primitives::BasisFragment| f.lilypond_duration())
///         .collect::<Vec<_>>()
/// };
/// assert_eq!(durations(decompose_length(Length::from(7.0 / 8.0), None)), vec!["2.", "8"]);
/// assert_eq!(
///     durations(decompose_length(Length::from(0.625), Some(Length::from(0.125)))),
///     vec!["8", "2"]
/// );
/// ```
pub fn decompose_length(
    length: Length,
    align: Option<Length>,
) -> Vec<BasisFragment> {
    let mut wholes = length.whole_notes();
    let mut rest = length.units() % UNITS_PER_WHOLE;
    let mut fragments: Vec<BasisFragment> = Vec::new();

    if let Some(align) = align.filter(|a| !a.is_zero()) {
        let lsb = align.units().trailing_zeros();
        let power = (BASIS_SLOTS as u32 - 1).saturating_sub(lsb) as u8;
        if power == 0 {
            if wholes > 0 {
                fragments.push(BasisFragment::new(0, false));
                wholes -= 1;
            }
        } else {
            let bit = UNITS_PER_WHOLE >> power;
            if rest & bit != 0 {
                fragments.push(BasisFragment::new(power, false));
                rest &= !bit;
            }
        }
    }

    let mut can_dot = false;
    for _ in 0..wholes {
        let tie = !fragments.is_empty();
        fragments.push(BasisFragment::new(0, tie));
        can_dot = true;
    }
    for power in 1..BASIS_SLOTS as u8 {
        if rest & (UNITS_PER_WHOLE >> power) == 0 {
            can_dot = false;
            continue;
        }
        match (can_dot, fragments.last_mut()) {
            (true, Some(last)) => {
                last.dotted = true;
                can_dot = false;
            }
            _ => {
                let tie = !fragments.is_empty();
                fragments.push(BasisFragment::new(power, tie));
                can_dot = true;
            }
        }
    }
    fragments
}
