use rand::Rng;

use crate::primitives::RhythmUnit;

use super::{MelodyContext, MelodySettings, NoteSource};

/// Uniformly random pitches inside the range.
#[derive(Debug, Clone)]
pub struct MaRandom {
    ctx: MelodyContext,
}
impl MaRandom {
    pub fn new(settings: MelodySettings, seed: u64) -> Self {
        Self {
            ctx: MelodyContext::new(settings, seed),
        }
    }
}
impl NoteSource for MaRandom {
    fn next_unit(&mut self) -> RhythmUnit {
        let length = self.ctx.duration();
        if self.ctx.rest_roll() {
            return RhythmUnit::rest(length);
        }
        let (low, high) = (self.ctx.settings().low, self.ctx.settings().high);
        let midi = self.ctx.rng().gen_range(low..=high.max(low));
        RhythmUnit::note(self.ctx.pitch(midi), length)
    }
    fn name(&self) -> &'static str {
        "MARandom"
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn take(seed: u64, count: usize) -> Vec<RhythmUnit> {
        let mut source = MaRandom::new(MelodySettings::default(), seed);
        (0..count).map(|_| source.next_unit()).collect()
    }

    #[test]
    fn seeded_sequence_repeats() {
        for (a, b) in take(42, 64).iter().zip_eq(take(42, 64).iter()) {
            assert_eq!(a, b);
        }
        assert_ne!(take(42, 64), take(43, 64));
    }

    #[test]
    fn default_density_gives_notes() {
        assert!(take(1, 32).iter().all(|unit| !unit.event.is_rest()));
    }
}
