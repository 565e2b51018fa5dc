use std::{fmt, str::FromStr};

pub use musical_note::{midi_to_note, Accidental, NoteName, Octave};

use musical_note::{Note, NotesMap, ResolvedNote};
use once_cell::sync::Lazy;

use crate::{
    error::{MuseError, MuseResult},
    lilypond_render::RendersToLilypond,
};

/// Octave, taken when note string has no octave digit.
pub const DEFAULT_OCTAVE: i8 = 4;
/// Octave, which LilyPond writes without octave marks (`c` is C3).
const LILY_MIDDLE_OCTAVE: i8 = 3;
const MIDI_MAX: i32 = 127;

/// musical-note fills its table on first use without locking,
/// so it is touched once from here before any other call.
pub(crate) fn notes_map() -> &'static NotesMap {
    static NOTES: Lazy<&'static NotesMap> = Lazy::new(NotesMap::get);
    *NOTES
}

/// Semitones, the accidental adds to the note name.
pub fn semitones(accidental: Accidental) -> i32 {
    match accidental {
        Accidental::DoubleFlat => -2,
        Accidental::Flat => -1,
        Accidental::White => 0,
        Accidental::Sharp => 1,
        Accidental::DoubleSharp => 2,
    }
}

pub(crate) fn accidental_from_char(ch: char) -> Option<Accidental> {
    match ch {
        'b' => Some(Accidental::Flat),
        '#' => Some(Accidental::Sharp),
        _ => None,
    }
}

pub(crate) fn accidental_symbol(accidental: Accidental) -> &'static str {
    match accidental {
        Accidental::DoubleFlat => "bb",
        Accidental::Flat => "b",
        Accidental::White => "",
        Accidental::Sharp => "#",
        Accidental::DoubleSharp => "##",
    }
}

/// LilyPond note name: `cis`, `bes`, but `as` and `es` for flat A and E.
pub(crate) fn render_note_name(name: NoteName, accidental: Accidental) -> String {
    match accidental {
        Accidental::White => name.to_string(),
        acc => format!("{}{}", name.to_string(), acc.to_string_by_note(name)),
    }
}

/// Spelled pitch: note name, accidental and octave.
///
/// Octave follows scientific notation, so middle C is `C4` (MIDI 60).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch {
    note: ResolvedNote,
}
impl Pitch {
    /// `None` if the pitch is outside of MIDI range.
    ///
    /// # Example
    /// ```
    /// # use muse_score::primitives::{Accidental, NoteName, Pitch};
    /// let bis = Pitch::new(NoteName::B, Accidental::Sharp, 3).unwrap();
    /// assert_eq!(bis.midi(), 60);
    /// assert!(Pitch::new(NoteName::A, Accidental::White, 9).is_none());
    /// ```
    pub fn new(name: NoteName, accidental: Accidental, octave: i8) -> Option<Self> {
        let natural = notes_map().get_by_note(name, Accidental::White) as i32;
        let midi = 12 * (octave as i32 + 1) + natural + semitones(accidental);
        match midi {
            0..=MIDI_MAX => Some(Self::from_midi(midi as u8, Some(accidental))),
            _ => None,
        }
    }

    /// Spell MIDI note number.
    ///
    /// `accidental` is taken if the note can be spelled with it.
    /// Otherwise white keys are natural and black keys are sharp.
    ///
    /// # Example
    /// ```
    /// # use muse_score::primitives::{Accidental, Pitch};
    /// assert_eq!(Pitch::from_midi(61, None).to_string(), "C#4");
    /// assert_eq!(Pitch::from_midi(61, Some(Accidental::Flat)).to_string(), "Db4");
    /// assert_eq!(Pitch::from_midi(60, Some(Accidental::Flat)).to_string(), "C4");
    /// ```
    pub fn from_midi(midi: u8, accidental: Option<Accidental>) -> Self {
        let spellings = notes_map().get_by_midi(&midi);
        let accidental = accidental
            .filter(|acc| spellings.contains_key(acc))
            .unwrap_or(match spellings.contains_key(&Accidental::White) {
                true => Accidental::White,
                false => Accidental::Sharp,
            });
        Self {
            note: midi_to_note(midi, musical_note::Key::default(), Some(accidental)),
        }
    }

    /// Spell MIDI note in the key signature. White keys stay natural,
    /// black keys take `black_keys` accidental.
    pub fn resolve(midi: u8, black_keys: Accidental, key: musical_note::Key) -> Self {
        let spellings = notes_map().get_by_midi(&midi);
        let accidental = match spellings.contains_key(&Accidental::White) {
            true => Accidental::White,
            false if spellings.contains_key(&black_keys) => black_keys,
            false => Accidental::Sharp,
        };
        Self {
            note: Note::from_midi(midi, Some(accidental)).resolve(key),
        }
    }

    pub fn name(&self) -> NoteName {
        self.note.note
    }
    pub fn accidental(&self) -> Accidental {
        self.note.accidental
    }
    /// Octave of the written note: `B#3` and `C4` are both MIDI 60.
    pub fn octave(&self) -> i8 {
        let natural = self.midi() as i32 - semitones(self.accidental());
        (natural.div_euclid(12) - 1) as i8
    }

    pub fn midi(&self) -> u8 {
        self.note.midi
    }

    /// 0 for any C, 11 for any B.
    pub fn pitch_class(&self) -> u8 {
        Octave::split_midi(self.note.midi).0
    }
}
impl FromStr for Pitch {
    type Err = MuseError;

    /// Parses strings like `C`, `c4`, `C#4`, `Eb3`, `bb2`.
    fn from_str(s: &str) -> MuseResult<Self> {
        let err = || MuseError::InvalidPitch(s.to_string());
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.is_empty() || chars.len() > 3 || !chars[0].is_ascii_alphabetic() {
            return Err(err());
        }
        let name = NoteName::from_str(&chars[0].to_string()).ok_or_else(err)?;
        let (accidental, octave_char) = match chars.get(1) {
            None => (Accidental::White, None),
            Some(ch) if ch.is_ascii_digit() => {
                if chars.len() > 2 {
                    return Err(err());
                }
                (Accidental::White, Some(*ch))
            }
            Some(ch) => (
                accidental_from_char(*ch).ok_or_else(err)?,
                chars.get(2).copied(),
            ),
        };
        let octave = match octave_char {
            None => DEFAULT_OCTAVE,
            Some(ch) => ch.to_digit(10).ok_or_else(err)? as i8,
        };
        Self::new(name, accidental, octave).ok_or_else(err)
    }
}
impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.name().to_string().to_uppercase(),
            accidental_symbol(self.accidental()),
            self.octave()
        )
    }
}
impl RendersToLilypond for Pitch {
    fn render_lilypond(&self) -> String {
        let marks = match self.octave() - LILY_MIDDLE_OCTAVE {
            x if x > 0 => "'".repeat(x as usize),
            x if x < 0 => ",".repeat(x.unsigned_abs() as usize),
            _ => String::new(),
        };
        format!(
            "{}{}",
            render_note_name(self.name(), self.accidental()),
            marks
        )
    }
}
