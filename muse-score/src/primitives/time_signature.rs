use std::{fmt, str::FromStr};

use crate::{
    error::{MuseError, MuseResult},
    lilypond_render::RendersToLilypond,
};

use super::{is_basis_reciprocal, Length, UNITS_PER_WHOLE};

/// Beats in the longest measure.
pub const MAX_NUMERATOR: u32 = 128;

/// Meter of the score.
///
/// # Example
/// ```
/// # use muse_score::primitives::{Length, TimeSignature};
/// let ts: TimeSignature = "6/8".parse().unwrap();
/// assert_eq!(ts.measure_length(), Length::from(0.75));
/// assert_eq!("3\\4".parse::<TimeSignature>().unwrap().to_string(), "3/4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSignature {
    numerator: u32,
    denominator: u32,
}
impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}
impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> MuseResult<Self> {
        if !(1..=MAX_NUMERATOR).contains(&numerator)
            || !is_basis_reciprocal(denominator)
        {
            return Err(MuseError::InvalidTimeSignature(format!(
                "{}/{}",
                numerator, denominator
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
    pub fn numerator(&self) -> u32 {
        self.numerator
    }
    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Length of one measure in whole notes.
    pub fn measure_length(&self) -> Length {
        Length::from_units(self.numerator * UNITS_PER_WHOLE / self.denominator)
    }
}
impl FromStr for TimeSignature {
    type Err = MuseError;

    fn from_str(s: &str) -> MuseResult<Self> {
        let err = || MuseError::InvalidTimeSignature(s.to_string());
        let (num, denom) = s
            .trim()
            .split_once(|c: char| c == '/' || c == '\\')
            .ok_or_else(err)?;
        let num = num.trim().parse().map_err(|_| err())?;
        let denom = denom.trim().parse().map_err(|_| err())?;
        Self::new(num, denom).map_err(|_| err())
    }
}
impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
impl RendersToLilypond for TimeSignature {
    fn render_lilypond(&self) -> String {
        let (num, denom) = (self.numerator, self.denominator);
        format!(r"\time {num}/{denom}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_time_signature() {
        let ts: TimeSignature = "4/4".parse().unwrap();
        assert_eq!(ts, TimeSignature::default());
        assert_eq!(ts.measure_length(), Length::WHOLE);
        assert_eq!(
            " 7 / 16 ".parse::<TimeSignature>().unwrap().measure_length(),
            Length::from(7.0 / 16.0)
        );
        assert_eq!(
            "128/1".parse::<TimeSignature>().unwrap().measure_length(),
            Length::from(128.0)
        );
        for s in ["4", "4/3", "0/4", "a/4", "4/128", "4/0", "129/4", "99999999/4"] {
            assert!(s.parse::<TimeSignature>().is_err(), "{}", s);
        }
    }

    #[test]
    fn render_time_signature() {
        let ts: TimeSignature = "3/8".parse().unwrap();
        assert_eq!(ts.render_lilypond(), r"\time 3/8");
    }
}
