//! A smallest piece of music, that is held by a measure.
use std::fmt;

use itertools::Itertools;

use crate::{
    error::{MuseError, MuseResult},
    lilypond_render::{LilySyntax, RendersToLilypond},
};

use super::{decompose_length, Length, Pitch};

/// What sounds during a [`RhythmUnit`].
#[derive(Debug, Default, PartialEq, Clone)]
pub enum EventType {
    #[default]
    Rest,
    Note(Pitch),
    Chord(Chord),
}
impl EventType {
    pub fn is_rest(&self) -> bool {
        matches!(self, Self::Rest)
    }

    /// Same event with every pitch passed through `f`.
    pub fn map_pitches(&self, f: impl Fn(&Pitch) -> Pitch) -> Self {
        match self {
            Self::Rest => Self::Rest,
            Self::Note(pitch) => Self::Note(f(pitch)),
            Self::Chord(chord) => Self::Chord(Chord {
                pitches: chord.pitches.iter().map(f).collect(),
            }),
        }
    }
}
impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => write!(f, "r"),
            Self::Note(pitch) => write!(f, "{}", pitch),
            Self::Chord(chord) => {
                write!(f, "<{}>", chord.pitches.iter().join(" "))
            }
        }
    }
}
impl RendersToLilypond for EventType {
    fn render_lilypond(&self) -> String {
        match self {
            Self::Rest => LilySyntax::REST.to_string(),
            Self::Note(pitch) => pitch.render_lilypond(),
            Self::Chord(chord) => chord.render_lilypond(),
        }
    }
}

/// Pitches, that sound simultaneously. Never empty.
#[derive(Debug, PartialEq, Clone)]
pub struct Chord {
    pitches: Vec<Pitch>,
}
impl Chord {
    pub fn new(root: Pitch) -> Self {
        Self {
            pitches: vec![root],
        }
    }
    pub fn from_pitches(pitches: Vec<Pitch>) -> MuseResult<Self> {
        if pitches.is_empty() {
            return Err(MuseError::InvalidChord(
                "chord needs at least one pitch".to_string(),
            ));
        }
        Ok(Self { pitches })
    }
    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }
    pub fn push(mut self, event: EventType) -> MuseResult<Self> {
        match event {
            EventType::Rest => Err(MuseError::InvalidChord(
                "Cannot push rest to chord".to_string(),
            )),
            EventType::Note(pitch) => {
                self.pitches.push(pitch);
                Ok(self)
            }
            EventType::Chord(mut chord) => {
                self.pitches.append(&mut chord.pitches);
                Ok(self)
            }
        }
    }
}
impl RendersToLilypond for Chord {
    fn render_lilypond(&self) -> String {
        format!(
            "<{}>",
            self.pitches.iter().map(|p| p.render_lilypond()).join(" ")
        )
    }
}

/// Event with its duration and place in the score.
///
/// `beat` is the offset from the start of the measure in whole notes,
/// it is unknown until unit is placed into a measure.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct RhythmUnit {
    pub event: EventType,
    pub length: Length,
    pub dotted: bool,
    /// Tied to the next unit.
    pub tied: bool,
    pub beat: Option<Length>,
    pub measure_index: Option<u32>,
}
impl RhythmUnit {
    pub fn new(event: EventType, length: Length) -> Self {
        Self {
            event,
            length,
            ..Default::default()
        }
    }
    pub fn rest(length: Length) -> Self {
        Self::new(EventType::Rest, length)
    }
    pub fn note(pitch: Pitch, length: Length) -> Self {
        Self::new(EventType::Note(pitch), length)
    }

    /// Length with the dot applied.
    pub fn effective_length(&self) -> Length {
        match self.dotted {
            true => self.length.dotted(),
            false => self.length,
        }
    }

    pub fn set_event(&mut self, event: EventType) -> &mut Self {
        self.event = event;
        self
    }
    pub fn set_length(&mut self, length: Length) -> &mut Self {
        self.length = length;
        self
    }
    pub fn set_dotted(&mut self, dotted: bool) -> &mut Self {
        self.dotted = dotted;
        self
    }
    pub fn set_tied(&mut self, tied: bool) -> &mut Self {
        self.tied = tied;
        self
    }
    pub fn set_beat(&mut self, beat: impl Into<Option<Length>>) -> &mut Self {
        self.beat = beat.into();
        self
    }
    pub fn set_measure_index(
        &mut self,
        index: impl Into<Option<u32>>,
    ) -> &mut Self {
        self.measure_index = index.into();
        self
    }

    /// Split into the part of `head` length and the remainder.
    ///
    /// Unit itself is not changed. Both parts lose the dot. The
    /// remainder has neither beat, measure index nor tie.
    ///
    /// # Example
    /// ```
    /// # use muse_score::primitives::{Length, RhythmUnit};
    /// let mut unit = RhythmUnit::rest(Length::from(0.25));
    /// unit.set_dotted(true).set_beat(Length::from(0.75));
    /// let (head, rest) = unit.split_at(Length::from(0.25)).unwrap();
    /// assert_eq!(head.effective_length(), Length::from(0.25));
    /// assert_eq!(head.beat, Some(Length::from(0.75)));
    /// assert_eq!(rest.effective_length(), Length::from(0.125));
    /// assert_eq!(rest.beat, None);
    /// assert!(unit.dotted);
    /// ```
    pub fn split_at(&self, head: Length) -> MuseResult<(Self, Self)> {
        let total = self.effective_length();
        if head.is_zero() || head >= total {
            return Err(MuseError::InvalidLength(format!(
                "can not split unit of length {} at {}",
                total, head
            )));
        }
        let mut fitted = self.clone();
        fitted.set_length(head).set_dotted(false);
        let remainder = Self::new(self.event.clone(), total - head);
        Ok((fitted, remainder))
    }

    /// Notatable units, the unit is written with.
    ///
    /// Every fragment but the last is tied to the next one, the last
    /// keeps the tie of the unit. Beat is used as alignment.
    pub fn decompose(&self) -> Vec<Self> {
        let fragments =
            decompose_length(self.effective_length(), self.beat);
        let last = fragments.len().saturating_sub(1);
        let mut beat = self.beat;
        fragments
            .iter()
            .enumerate()
            .map(|(idx, fragment)| {
                let mut unit = self.clone();
                unit.set_length(Length::basis(fragment.power))
                    .set_dotted(fragment.dotted)
                    .set_tied(idx != last || self.tied)
                    .set_beat(beat);
                beat = beat.map(|b| b + fragment.length());
                unit
            })
            .collect()
    }
}
impl fmt::Display for RhythmUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event)
    }
}
impl RendersToLilypond for RhythmUnit {
    /// Units of basis length are written as one token, others as the
    /// chain of their fragments. Rests are never tied.
    fn render_lilypond(&self) -> String {
        match self.effective_length().lilypond_duration() {
            Some(duration) => {
                let tie = match self.tied && !self.event.is_rest() {
                    true => LilySyntax::TIE,
                    false => "",
                };
                format!("{}{}{}", self.event.render_lilypond(), duration, tie)
            }
            None => self
                .decompose()
                .iter()
                .map(|unit| unit.render_lilypond())
                .join(" "),
        }
    }
}
