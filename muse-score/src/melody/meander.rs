use crate::primitives::RhythmUnit;

use super::{MelodyContext, MelodySettings, NoteSource};

const MU: f64 = 0.0;
const SIGMA: f64 = 0.1;

/// Random walk: every pitch moves from the previous one by a normally
/// distributed step, scaled by the range width.
///
/// The first pitch is the centre of the range. Rests do not move the
/// walk.
#[derive(Debug, Clone)]
pub struct MaGaussMeander {
    ctx: MelodyContext,
    last: Option<i32>,
}
impl MaGaussMeander {
    pub fn new(settings: MelodySettings, seed: u64) -> Self {
        Self {
            ctx: MelodyContext::new(settings, seed),
            last: None,
        }
    }
}
impl NoteSource for MaGaussMeander {
    fn next_unit(&mut self) -> RhythmUnit {
        let length = self.ctx.duration();
        if self.ctx.rest_roll() {
            return RhythmUnit::rest(length);
        }
        let (low, high) = (self.ctx.settings().low, self.ctx.settings().high);
        let last = self.last.unwrap_or((low + high) / 2);
        let step = self.ctx.bounded_gauss(MU, SIGMA) * (high - low) as f64;
        let pitch = self.ctx.pitch(last + step as i32);
        self.last = Some(pitch.midi() as i32);
        RhythmUnit::note(pitch, length)
    }
    fn name(&self) -> &'static str {
        "MAGaussMeander"
    }
}
