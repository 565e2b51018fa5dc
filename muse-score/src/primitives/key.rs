//! Keys, scales and clefs.

use std::{fmt, str::FromStr};

use crate::{
    error::{MuseError, MuseResult},
    lilypond_render::RendersToLilypond,
};

use super::{
    pitch::{accidental_from_char, accidental_symbol, notes_map, render_note_name},
    Accidental, Circular, NoteName, Pitch,
};

const FIFTH: i32 = 7;
const FOURTH: i32 = 5;
const TONIC_OCTAVE_MIDI: i32 = 60;

/// Tonic spelling for every pitch class, as it stands on the circle
/// of fifths.
const TONICS: [(NoteName, Accidental); 12] = [
    (NoteName::C, Accidental::White),
    (NoteName::D, Accidental::Flat),
    (NoteName::D, Accidental::White),
    (NoteName::E, Accidental::Flat),
    (NoteName::E, Accidental::White),
    (NoteName::F, Accidental::White),
    (NoteName::F, Accidental::Sharp),
    (NoteName::G, Accidental::White),
    (NoteName::A, Accidental::Flat),
    (NoteName::A, Accidental::White),
    (NoteName::B, Accidental::Flat),
    (NoteName::B, Accidental::White),
];
/// Minor tonics, relative to the [`TONICS`] majors.
const MINOR_TONICS: [(NoteName, Accidental); 12] = [
    (NoteName::C, Accidental::White),
    (NoteName::C, Accidental::Sharp),
    (NoteName::D, Accidental::White),
    (NoteName::E, Accidental::Flat),
    (NoteName::E, Accidental::White),
    (NoteName::F, Accidental::White),
    (NoteName::F, Accidental::Sharp),
    (NoteName::G, Accidental::White),
    (NoteName::G, Accidental::Sharp),
    (NoteName::A, Accidental::White),
    (NoteName::B, Accidental::Flat),
    (NoteName::B, Accidental::White),
];
const ORDER_OF_FLATS: [NoteName; 7] = [
    NoteName::B,
    NoteName::E,
    NoteName::A,
    NoteName::D,
    NoteName::G,
    NoteName::C,
    NoteName::F,
];
const SHARPS_MAJOR: [bool; 7] = [true, true, true, true, true, true, false];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scale {
    Major,
    Minor,
    /// Diminished, whole step first.
    DiminishedWH,
    /// Diminished, half step first.
    DiminishedHW,
    Chromatic,
    WholeTone,
}
impl Scale {
    /// Semitones from the tonic.
    pub fn steps(&self) -> &'static [i32] {
        match self {
            Self::Major => &[0, 2, 4, 5, 7, 9, 11],
            Self::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Self::DiminishedWH => &[0, 2, 3, 5, 6, 8, 9, 11],
            Self::DiminishedHW => &[0, 1, 3, 4, 6, 7, 9, 10],
            Self::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            Self::WholeTone => &[0, 2, 4, 6, 8, 10],
        }
    }

    pub fn from_quality(quality: &str) -> Option<Self> {
        match quality {
            "" | "M" | "Maj" | "MAJ" | "maj" => Some(Self::Major),
            "m" | "min" | "Min" | "MIN" => Some(Self::Minor),
            "D" | "d" | "Dwh" | "DWH" | "dwh" => Some(Self::DiminishedWH),
            "Dhw" | "DHW" | "dhw" => Some(Self::DiminishedHW),
            "*" | "C" | "c" => Some(Self::Chromatic),
            "W" | "w" => Some(Self::WholeTone),
            _ => None,
        }
    }

    fn quality(&self) -> &'static str {
        match self {
            Self::Major => "M",
            Self::Minor => "m",
            Self::DiminishedWH => "Dwh",
            Self::DiminishedHW => "Dhw",
            Self::Chromatic => "*",
            Self::WholeTone => "W",
        }
    }

    /// Position on the order of flats is shifted by this amount.
    fn flats_offset(&self) -> usize {
        match self {
            Self::Minor | Self::DiminishedWH | Self::DiminishedHW => 3,
            Self::Major | Self::Chromatic | Self::WholeTone => 0,
        }
    }

    /// Signature scale. Symmetric scales are written without one,
    /// as in C major.
    fn signature(&self) -> musical_note::Scale {
        match self {
            Self::Minor => musical_note::Scale::Minor,
            _ => musical_note::Scale::Major,
        }
    }

    fn tonics(&self) -> &'static [(NoteName, Accidental); 12] {
        match self {
            Self::Minor => &MINOR_TONICS,
            _ => &TONICS,
        }
    }
}

/// Tonic and scale.
///
/// Parsed from strings like `CM`, `Am`, `F#min`, `Bb`, `Ddwh`, `E*`.
///
/// # Example
/// ```
/// # use muse_score::primitives::{Key, Scale};
/// let key: Key = "Ebm".parse().unwrap();
/// assert_eq!(key.scale(), Scale::Minor);
/// assert_eq!(key.degree(2).to_string(), "Gb4");
/// assert_eq!(key.next_fifth().to_string(), "Bbm");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    tonic: (NoteName, Accidental),
    scale: Scale,
}
impl Default for Key {
    fn default() -> Self {
        Self::new(NoteName::C, Accidental::White, Scale::Major)
    }
}
impl Key {
    pub fn new(name: NoteName, accidental: Accidental, scale: Scale) -> Self {
        Self {
            tonic: (name, accidental),
            scale,
        }
    }
    pub fn tonic(&self) -> (NoteName, Accidental) {
        self.tonic
    }
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// The key as musical-note sees it, for spelling.
    pub fn signature(&self) -> musical_note::Key {
        let (name, accidental) = self.tonic;
        musical_note::Key::new(name, accidental, self.scale.signature())
    }

    /// MIDI note of the tonic in the 4th octave.
    fn tonic_midi(&self) -> i32 {
        let (name, accidental) = self.tonic;
        TONIC_OCTAVE_MIDI + notes_map().get_by_note(name, accidental) as i32
    }

    fn steps(&self) -> Circular<i32> {
        Circular::new(self.scale.steps().to_vec())
    }

    /// Scale degree from the tonic in the 4th octave.
    ///
    /// Degrees past the scale length move up by octaves, negative
    /// degrees move down.
    pub fn degree(&self, index: i64) -> Pitch {
        let steps = self.steps();
        let offset = steps
            .wrap(index)
            .and_then(|(idx, wraps)| {
                Some(steps.get(idx as i64)? + 12 * wraps as i32)
            })
            .unwrap_or(0);
        self.spell(self.tonic_midi() + offset)
    }

    pub fn contains(&self, pitch: &Pitch) -> bool {
        self.contains_midi(pitch.midi() as i32)
    }
    pub fn contains_midi(&self, midi: i32) -> bool {
        let relative = (midi - self.tonic_midi()).rem_euclid(12);
        self.steps().index_of(&relative).is_some()
    }

    /// Nearest MIDI note of the scale. Ties are resolved downward.
    pub fn snap(&self, midi: i32) -> i32 {
        (0..12)
            .flat_map(|distance| [midi - distance, midi + distance])
            .find(|candidate| self.contains_midi(*candidate))
            .unwrap_or(midi)
    }

    /// Amount of scale tones between `low` and `high` inclusively.
    pub fn count_in_range(&self, low: i32, high: i32) -> usize {
        (low..=high).filter(|m| self.contains_midi(*m)).count()
    }

    /// Should black keys be spelled with sharps in this key?
    pub fn prefers_sharps(&self) -> bool {
        let (name, accidental) = self.tonic;
        match accidental {
            Accidental::Flat | Accidental::DoubleFlat => return false,
            Accidental::Sharp | Accidental::DoubleSharp => return true,
            Accidental::White => (),
        }
        let position = ORDER_OF_FLATS
            .iter()
            .position(|flat| *flat == name)
            .unwrap_or(0);
        SHARPS_MAJOR
            .get(position + self.scale.flats_offset())
            .copied()
            .unwrap_or(false)
    }

    /// MIDI note spelled in this key. Notes outside MIDI range are
    /// clamped.
    pub fn spell(&self, midi: i32) -> Pitch {
        let black_keys = match self.prefers_sharps() {
            true => Accidental::Sharp,
            false => Accidental::Flat,
        };
        Pitch::resolve(midi.clamp(0, 127) as u8, black_keys, self.signature())
    }

    /// Same pitch, spelled by key accidental preference.
    pub fn best_enharmonic(&self, pitch: &Pitch) -> Pitch {
        self.spell(pitch.midi() as i32)
    }

    /// Key of the same scale with tonic moved by `semitones`.
    pub fn at_interval(&self, semitones: i32) -> Self {
        let pc = (self.tonic_midi() + semitones).rem_euclid(12);
        let (name, accidental) = self.scale.tonics()[pc as usize];
        Self::new(name, accidental, self.scale)
    }
    pub fn next_fifth(&self) -> Self {
        self.at_interval(FIFTH)
    }
    pub fn next_fourth(&self) -> Self {
        self.at_interval(FOURTH)
    }
}
impl FromStr for Key {
    type Err = MuseError;

    fn from_str(s: &str) -> MuseResult<Self> {
        let err = || MuseError::InvalidKey(s.to_string());
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars
            .next()
            .filter(char::is_ascii_alphabetic)
            .ok_or_else(err)?;
        let mut quality = chars.as_str();
        let accidental = match chars.next().and_then(accidental_from_char) {
            Some(Accidental::Sharp) => "is",
            Some(_) => "es",
            None => "",
        };
        if !accidental.is_empty() {
            quality = chars.as_str();
        }
        let scale = Scale::from_quality(quality).ok_or_else(err)?;
        let tonic = format!("{}{}", letter, accidental);
        let signature =
            musical_note::Key::from_str(&tonic, scale.signature()).ok_or_else(err)?;
        Ok(Self {
            tonic: signature.tonic,
            scale,
        })
    }
}
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, accidental) = self.tonic;
        write!(
            f,
            "{}{}{}",
            name.to_string().to_uppercase(),
            accidental_symbol(accidental),
            self.scale.quality()
        )
    }
}
impl RendersToLilypond for Key {
    /// LilyPond knows only major and minor signatures, other scales
    /// are written without key signature.
    fn render_lilypond(&self) -> String {
        let mode = match self.scale {
            Scale::Major => "major",
            Scale::Minor => "minor",
            _ => return r"\key c \major".to_string(),
        };
        let (name, accidental) = self.tonic;
        format!(r"\key {} \{}", render_note_name(name, accidental), mode)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clef {
    #[default]
    Treble,
    Bass,
    Alto,
    Tenor,
    Percussion,
}
impl FromStr for Clef {
    type Err = MuseError;

    fn from_str(s: &str) -> MuseResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "treble" | "g" | "violin" => Ok(Self::Treble),
            "bass" | "f" => Ok(Self::Bass),
            "alto" | "c" => Ok(Self::Alto),
            "tenor" => Ok(Self::Tenor),
            "percussion" | "perc" => Ok(Self::Percussion),
            _ => Err(MuseError::InvalidClef(s.to_string())),
        }
    }
}
impl RendersToLilypond for Clef {
    fn render_lilypond(&self) -> String {
        let name = match self {
            Self::Treble => "treble",
            Self::Bass => "bass",
            Self::Alto => "alto",
            Self::Tenor => "tenor",
            Self::Percussion => "percussion",
        };
        format!(r"\clef {}", name)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn key(s: &str) -> Key {
        s.parse().unwrap()
    }

    #[test]
    fn parse_key() {
        assert_eq!(key("C"), Key::default());
        assert_eq!(key("CM"), Key::default());
        assert_eq!(key("cmaj"), Key::default());
        assert_eq!(key("Am").scale(), Scale::Minor);
        assert_eq!(key("F#MIN").to_string(), "F#m");
        assert_eq!(key("Bb").to_string(), "BbM");
        assert_eq!(key("Dd").scale(), Scale::DiminishedWH);
        assert_eq!(key("EDHW").scale(), Scale::DiminishedHW);
        assert_eq!(key("Cc").scale(), Scale::Chromatic);
        assert_eq!(key("G*").scale(), Scale::Chromatic);
        assert_eq!(key("Abw").scale(), Scale::WholeTone);
        for s in ["", "H", "Cx", "C minor", "#C"] {
            assert!(s.parse::<Key>().is_err(), "{} should not parse", s);
        }
    }

    #[test]
    fn degrees() {
        let c = Key::default();
        let names = (0..8).map(|i| c.degree(i).to_string());
        for (name, expected) in
            names.zip_eq(["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5"])
        {
            assert_eq!(name, expected);
        }
        assert_eq!(c.degree(-1).to_string(), "B3");
        assert_eq!(key("Bbm").degree(2).to_string(), "Db5");
        assert_eq!(key("DM").degree(2).to_string(), "F#4");
    }

    #[test]
    fn sharps_and_flats() {
        for (k, sharps) in [
            ("CM", true),
            ("GM", true),
            ("FM", false),
            ("BbM", false),
            ("F#M", true),
            ("Am", true),
            ("Em", true),
            ("Dm", false),
            ("Gm", false),
        ] {
            assert_eq!(key(k).prefers_sharps(), sharps, "{}", k);
        }
        let eb: Pitch = "D#4".parse().unwrap();
        assert_eq!(key("Cm").best_enharmonic(&eb).to_string(), "Eb4");
        assert_eq!(key("EM").best_enharmonic(&eb).to_string(), "D#4");
    }

    #[test]
    fn scale_membership() {
        let c = Key::default();
        assert!(c.contains(&"E5".parse().unwrap()));
        assert!(!c.contains(&"Eb5".parse().unwrap()));
        assert_eq!(c.snap(61), 60);
        assert_eq!(c.snap(66), 65);
        assert_eq!(c.snap(64), 64);
        // one octave of C major plus the upper C
        assert_eq!(c.count_in_range(60, 72), 8);
        assert_eq!(key("Cc").count_in_range(60, 71), 12);
        assert_eq!(key("CW").count_in_range(60, 71), 6);
    }

    #[test]
    fn circle_of_fifths() {
        let mut k = Key::default();
        let mut visited = vec![];
        for _ in 0..12 {
            visited.push(k.to_string());
            k = k.next_fifth();
        }
        assert_eq!(
            visited,
            vec![
                "CM", "GM", "DM", "AM", "EM", "BM", "F#M", "DbM", "AbM", "EbM",
                "BbM", "FM"
            ]
        );
        assert_eq!(k, Key::default());
        assert_eq!(Key::default().next_fourth().to_string(), "FM");
        assert_eq!(key("Am").at_interval(-2).to_string(), "Gm");
    }

    #[test]
    fn minor_circle_of_fifths() {
        let visited = (0..12)
            .scan(key("Am"), |k, _| {
                let name = k.to_string();
                *k = k.next_fifth();
                Some(name)
            })
            .collect::<Vec<_>>();
        visited
            .iter()
            .zip_eq([
                "Am", "Em", "Bm", "F#m", "C#m", "G#m", "Ebm", "Bbm", "Fm", "Cm",
                "Gm", "Dm",
            ])
            .map(|(a, b)| assert_eq!(a, b))
            .count();
        assert_eq!(key("F#m").next_fifth().to_string(), "C#m");
        assert_eq!(key("Bm").next_fourth().to_string(), "Em");
    }

    #[test]
    fn signature() {
        let sig = key("Ebm").signature();
        assert_eq!(sig.tonic, (NoteName::E, Accidental::Flat));
        assert_eq!(sig.scale, musical_note::Scale::Minor);
        assert_eq!(key("Dwh").signature().scale, musical_note::Scale::Major);
        assert_eq!(key("Bbm").tonic(), (NoteName::B, Accidental::Flat));
        for midi in 0..128 {
            for k in ["CM", "Am", "F#M", "Dbm", "Cc"] {
                assert_eq!(key(k).spell(midi).midi() as i32, midi);
            }
        }
    }

    #[test]
    fn render_key_and_clef() {
        assert_eq!(Key::default().render_lilypond(), r"\key c \major");
        assert_eq!(key("Ebm").render_lilypond(), r"\key es \minor");
        assert_eq!(key("F#").render_lilypond(), r"\key fis \major");
        assert_eq!(key("DDwh").render_lilypond(), r"\key c \major");
        assert_eq!(Clef::default().render_lilypond(), r"\clef treble");
        assert_eq!("F".parse::<Clef>().unwrap(), Clef::Bass);
        assert_eq!("Violin".parse::<Clef>().unwrap(), Clef::Treble);
        assert!("soprano".parse::<Clef>().is_err());
    }
}
