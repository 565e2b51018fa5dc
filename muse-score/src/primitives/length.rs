use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Sub},
};

use fraction::{Fraction, Integer};
use log::debug;

use crate::error::{MuseError, MuseResult};

use super::{BASIS_SLOTS, UNITS_PER_WHOLE};

/// Musical length (or beat position) in whole notes.
///
/// Stored as a count of 64th notes, so measure arithmetic is exact.
/// Anything finer than a 64th is truncated toward zero on conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Length {
    units: u32,
}
impl Length {
    pub const ZERO: Self = Self { units: 0 };
    pub const WHOLE: Self = Self {
        units: UNITS_PER_WHOLE,
    };

    pub fn from_units(units: u32) -> Self {
        Self { units }
    }

    /// Basis duration `2^-power`: 0 is a whole note, 6 is a 64th.
    ///
    /// # Example
    /// ```
    /// # use muse_score::primitives::Length;
    /// assert_eq!(Length::basis(3), Length::from(0.125));
    /// ```
    pub fn basis(power: u8) -> Self {
        let power = power.min(BASIS_SLOTS as u8 - 1);
        Self {
            units: UNITS_PER_WHOLE >> power,
        }
    }

    /// Length of `1/reciprocal` whole note (4 → quarter note).
    pub fn from_reciprocal(reciprocal: u32) -> MuseResult<Self> {
        if reciprocal == 0 {
            return Err(MuseError::InvalidLength(
                "reciprocal length can not be zero".to_string(),
            ));
        }
        if UNITS_PER_WHOLE % reciprocal != 0 {
            debug!(
                "1/{} is finer than a 64th note, truncating",
                reciprocal
            );
        }
        Ok(Self {
            units: UNITS_PER_WHOLE / reciprocal,
        })
    }

    /// Amount of 64th notes.
    pub fn units(&self) -> u32 {
        self.units
    }
    pub fn is_zero(&self) -> bool {
        self.units == 0
    }
    pub fn fraction(&self) -> Fraction {
        Fraction::new(self.units as u64, UNITS_PER_WHOLE as u64)
    }
    pub fn as_f64(&self) -> f64 {
        self.units as f64 / UNITS_PER_WHOLE as f64
    }

    /// Longest length, both `self` and `other` are multiples of.
    ///
    /// # Example
    /// ```
    /// # use muse_score::primitives::Length;
    /// let seven_32 = Length::from(7.0 / 32.0);
    /// assert_eq!(seven_32.gcd(Length::from(0.125)), Length::from(1.0 / 32.0));
    /// ```
    pub fn gcd(self, other: Self) -> Self {
        Self {
            units: self.units.gcd(&other.units),
        }
    }

    /// Full whole notes inside the length.
    pub fn whole_notes(&self) -> u32 {
        self.units / UNITS_PER_WHOLE
    }

    /// 7-bit basis mask: bit 6 is the whole note, bit 0 the 64th.
    ///
    /// Only meaningful for lengths shorter than two whole notes.
    pub fn mask(&self) -> u8 {
        (self.units & 0x7f) as u8
    }

    /// Presence of every basis duration, starting from the whole note.
    ///
    /// # Example
    /// ```
    /// # use muse_score::primitives::Length;
    /// let eleven_16 = Length::from(11.0 / 16.0);
    /// assert_eq!(eleven_16.slots(), [false, true, false, true, true, false, false]);
    /// ```
    pub fn slots(&self) -> [bool; BASIS_SLOTS] {
        let mask = self.mask();
        let mut slots = [false; BASIS_SLOTS];
        for (power, slot) in slots.iter_mut().enumerate() {
            *slot = mask & (1 << (BASIS_SLOTS - 1 - power)) != 0;
        }
        slots
    }

    /// `Some(power)` if length is exactly one basis duration.
    pub fn basis_power(&self) -> Option<u8> {
        if !self.units.is_power_of_two() || self.units > UNITS_PER_WHOLE {
            return None;
        }
        Some((BASIS_SLOTS as u32 - 1 - self.units.trailing_zeros()) as u8)
    }

    /// Length of the same value with a dot applied.
    pub fn dotted(&self) -> Self {
        if self.units % 2 != 0 {
            debug!("dotted 64th can not be expressed, truncating");
        }
        Self {
            units: self.units * 3 / 2,
        }
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        Some(Self {
            units: self.units.checked_sub(rhs.units)?,
        })
    }
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self {
            units: self.units.saturating_sub(rhs.units),
        }
    }

    /// LilyPond duration string, if length is a basis duration,
    /// possibly dotted.
    pub fn lilypond_duration(&self) -> Option<String> {
        if let Some(power) = self.basis_power() {
            return Some(format!("{}", 1u32 << power));
        }
        if self.units % 3 == 0 {
            let undotted = Self::from_units(self.units / 3 * 2);
            if let Some(power) = undotted.basis_power() {
                return Some(format!("{}.", 1u32 << power));
            }
        }
        None
    }
}
impl TryFrom<Fraction> for Length {
    type Error = MuseError;

    fn try_from(value: Fraction) -> Result<Self, Self::Error> {
        if value.is_sign_negative() {
            return Err(MuseError::InvalidLength(format!(
                "length can not be negative: {}",
                value
            )));
        }
        let (num, denom) = (
            *value.numer().ok_or(MuseError::InvalidLength(format!(
                "No numerator in {}",
                value
            )))?,
            *value.denom().ok_or(MuseError::InvalidLength(format!(
                "No denominator in {}",
                value
            )))?,
        );
        let scaled = num.checked_mul(UNITS_PER_WHOLE as u64).ok_or(
            MuseError::InvalidLength(format!("length is too big: {}", value)),
        )?;
        if scaled % denom != 0 {
            debug!("{} is finer than a 64th note, truncating", value);
        }
        let units = u32::try_from(scaled / denom).map_err(|_| {
            MuseError::InvalidLength(format!("length is too big: {}", value))
        })?;
        Ok(Self { units })
    }
}
impl From<f64> for Length {
    /// Truncates to 64th notes, negative values become zero.
    fn from(value: f64) -> Self {
        let scaled = value * UNITS_PER_WHOLE as f64;
        if scaled.fract() != 0.0 {
            debug!("{} is finer than a 64th note, truncating", value);
        }
        Self {
            units: scaled as u32,
        }
    }
}
impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fraction())
    }
}
impl Add for Length {
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            units: self.units + rhs.units,
        }
    }
    type Output = Self;
}
impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Self) {
        self.units += rhs.units
    }
}
impl Sub for Length {
    fn sub(self, rhs: Self) -> Self::Output {
        match self.checked_sub(rhs) {
            Some(length) => length,
            None => panic!(
                "length can not be negative. left: {}, right: {}",
                self, rhs
            ),
        }
    }
    type Output = Self;
}
impl Mul<u32> for Length {
    fn mul(self, rhs: u32) -> Self::Output {
        Self {
            units: self.units * rhs,
        }
    }
    type Output = Self;
}
impl Sum for Length {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, length| acc + length)
    }
}
