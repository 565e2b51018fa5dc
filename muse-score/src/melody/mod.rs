//! Note sources: algorithms, that produce the melody unit by unit.
//!
//! Every algorithm is registered by name, see [`create`].

use std::{collections::HashMap, f64::consts::PI};

use log::debug;
use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    config::Configuration,
    error::{MuseError, MuseResult},
    primitives::{Key, Length, Pitch, RhythmUnit},
};

pub mod meander;
pub mod random;

pub use meander::MaGaussMeander;
pub use random::MaRandom;

/// Unbounded generator of rhythm units.
///
/// Composer calls [`NoteSource::next_unit`] exactly once per step.
pub trait NoteSource {
    fn next_unit(&mut self) -> RhythmUnit;
    fn name(&self) -> &'static str;
}

/// What every algorithm is allowed to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct MelodySettings {
    /// Lowest MIDI note.
    pub low: i32,
    /// Highest MIDI note.
    pub high: i32,
    pub shortest: Length,
    pub longest: Length,
    /// Probability of a pitched unit, rest otherwise.
    pub density: f64,
    /// 1.0 never leaves the home key.
    pub diatonicity: f64,
    pub key: Key,
}
impl Default for MelodySettings {
    fn default() -> Self {
        Self::from(&Configuration::default())
    }
}
impl From<&Configuration> for MelodySettings {
    fn from(config: &Configuration) -> Self {
        Self {
            low: config.note_lowest.midi() as i32,
            high: config.note_highest.midi() as i32,
            shortest: config.shortest(),
            longest: config.longest(),
            density: config.density,
            diatonicity: config.diatonicity,
            key: config.key,
        }
    }
}

/// Random state and key drift, shared by the algorithms.
#[derive(Debug, Clone)]
pub struct MelodyContext {
    settings: MelodySettings,
    rng: ChaCha8Rng,
    active_key: Key,
}
impl MelodyContext {
    pub fn new(settings: MelodySettings, seed: u64) -> Self {
        let active_key = settings.key;
        Self {
            settings,
            rng: ChaCha8Rng::seed_from_u64(seed),
            active_key,
        }
    }
    pub fn settings(&self) -> &MelodySettings {
        &self.settings
    }
    pub fn active_key(&self) -> Key {
        self.active_key
    }
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Multiple of the shortest note, not longer than the longest.
    pub fn duration(&mut self) -> Length {
        let shortest = self.settings.shortest;
        let ratio = (self.settings.longest.units()
            / shortest.units().max(1))
        .max(1);
        shortest * self.rng.gen_range(1..=ratio)
    }

    /// Should the next unit be a rest?
    pub fn rest_roll(&mut self) -> bool {
        !self.rng.gen_bool(self.settings.density.clamp(0.0, 1.0))
    }

    /// Maybe move the active key one step around the circle of fifths.
    fn drift(&mut self) {
        let propensity = (1.0 - self.settings.diatonicity).clamp(0.0, 1.0);
        if !self.rng.gen_bool(propensity) {
            return;
        }
        self.active_key = match self.rng.gen_bool(0.5) {
            true => self.active_key.next_fifth(),
            false => self.active_key.next_fourth(),
        };
        debug!("melody moved to {}", self.active_key);
    }

    /// Pitch of the active key, nearest to `midi` and inside the range.
    pub fn pitch(&mut self, midi: i32) -> Pitch {
        self.drift();
        let (low, high) = (self.settings.low, self.settings.high);
        let key = self.active_key;
        let midi = midi.clamp(low, high);
        let snapped = (0..12)
            .flat_map(|distance| [midi - distance, midi + distance])
            .filter(|m| (low..=high).contains(m))
            .find(|m| key.contains_midi(*m))
            .unwrap_or(midi);
        key.spell(snapped)
    }

    /// Normal distribution sample (Box–Muller), bounded to -1..=1.
    pub fn bounded_gauss(&mut self, mu: f64, sigma: f64) -> f64 {
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        (mu + sigma * z).clamp(-1.0, 1.0)
    }
}

type Factory = fn(MelodySettings, u64) -> Box<dyn NoteSource>;

fn random(settings: MelodySettings, seed: u64) -> Box<dyn NoteSource> {
    Box::new(MaRandom::new(settings, seed))
}
fn meander(settings: MelodySettings, seed: u64) -> Box<dyn NoteSource> {
    Box::new(MaGaussMeander::new(settings, seed))
}

static REGISTRY: Lazy<HashMap<&'static str, Factory>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, Factory> = HashMap::new();
    map.insert("random", random);
    map.insert("marandom", random);
    map.insert("gaussmeander", meander);
    map.insert("magaussmeander", meander);
    map.insert("meander", meander);
    map
});

/// Is there an algorithm with this name (case-insensitive)?
pub fn is_registered(name: &str) -> bool {
    REGISTRY.contains_key(name.to_lowercase().as_str())
}

/// All registered names, sorted.
pub fn algorithm_names() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Build note source by name (case-insensitive).
///
/// # Example
/// ```
/// # use muse_score::melody::{create, MelodySettings};
/// let source = create("MAGaussMeander", MelodySettings::default(), 1).unwrap();
/// assert_eq!(source.name(), "MAGaussMeander");
/// assert!(create("bach", MelodySettings::default(), 1).is_err());
/// ```
pub fn create(
    name: &str,
    settings: MelodySettings,
    seed: u64,
) -> MuseResult<Box<dyn NoteSource>> {
    let factory = REGISTRY
        .get(name.to_lowercase().as_str())
        .ok_or_else(|| MuseError::UnknownAlgorithm(name.to_string()))?;
    Ok(factory(settings, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::EventType;

    fn settings() -> MelodySettings {
        MelodySettings::default()
    }

    #[test]
    fn registry() {
        assert_eq!(
            algorithm_names(),
            vec![
                "gaussmeander",
                "magaussmeander",
                "marandom",
                "meander",
                "random"
            ]
        );
        assert!(is_registered("MARandom"));
        assert!(!is_registered("MAMozart"));
        assert_eq!(create("Random", settings(), 0).unwrap().name(), "MARandom");
        assert!(matches!(
            create("MAMozart", settings(), 0),
            Err(MuseError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn durations_are_multiples_of_shortest() {
        let mut ctx = MelodyContext::new(settings(), 7);
        for _ in 0..200 {
            let length = ctx.duration();
            assert!(length >= Length::from(1.0 / 16.0));
            assert!(length <= Length::WHOLE);
            assert_eq!(length.units() % 4, 0);
        }
    }

    #[test]
    fn equal_shortest_and_longest() {
        let mut s = settings();
        s.longest = Length::from(0.25);
        s.shortest = Length::from(0.25);
        let mut ctx = MelodyContext::new(s, 7);
        for _ in 0..20 {
            assert_eq!(ctx.duration(), Length::from(0.25));
        }
    }

    #[test]
    fn density_zero_gives_rests() {
        let mut s = settings();
        s.density = 0.0;
        let mut source = create("marandom", s, 3).unwrap();
        for _ in 0..50 {
            assert_eq!(source.next_unit().event, EventType::Rest);
        }
    }

    #[test]
    fn pitches_stay_in_key_and_range() {
        let mut ctx = MelodyContext::new(settings(), 11);
        let key = Key::default();
        for midi in 30..100 {
            let pitch = ctx.pitch(midi);
            assert!(key.contains(&pitch), "{}", pitch);
            assert!((45..=84).contains(&(pitch.midi() as i32)), "{}", pitch);
        }
    }

    #[test]
    fn key_drift() {
        let mut s = settings();
        s.diatonicity = 0.0;
        let mut ctx = MelodyContext::new(s, 5);
        ctx.pitch(60);
        assert_ne!(ctx.active_key(), Key::default());
    }

    #[test]
    fn gauss_is_bounded() {
        let mut ctx = MelodyContext::new(settings(), 1);
        for _ in 0..1000 {
            let n = ctx.bounded_gauss(0.0, 3.0);
            assert!((-1.0..=1.0).contains(&n));
        }
    }
}
