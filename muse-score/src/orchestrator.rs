//! Turns a drained measure into one line of LilyPond notes.

use itertools::Itertools;

use crate::{
    lilypond_render::RendersToLilypond,
    primitives::{Key, RhythmUnit},
};

/// Formats drained measures.
///
/// The home key, if any, is used to respell accidentals.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Orchestrator {
    home_key: Option<Key>,
}
impl Orchestrator {
    pub fn new(home_key: impl Into<Option<Key>>) -> Self {
        Self {
            home_key: home_key.into(),
        }
    }
    pub fn home_key(&self) -> Option<Key> {
        self.home_key
    }

    /// Measure as space-separated LilyPond notes.
    ///
    /// If `tie_into_next` is true, the last fragment is tied to the
    /// first note of the next measure.
    ///
    /// # Example
    /// ```
    /// # use muse_score::{orchestrator::Orchestrator, primitives::{Length, RhythmUnit}};
    /// let c4 = "C4".parse().unwrap();
    /// let mut note = RhythmUnit::note(c4, Length::from(0.5));
    /// note.set_beat(Length::ZERO);
    /// let mut rest = RhythmUnit::rest(Length::from(0.25));
    /// rest.set_beat(Length::from(0.5));
    /// let mut last = rest.clone();
    /// last.set_beat(Length::from(0.75));
    /// let measure = vec![note, rest, last];
    /// assert_eq!(Orchestrator::default().format_measure(measure, false), "c'2 r2");
    /// ```
    pub fn format_measure(
        &self,
        measure: Vec<RhythmUnit>,
        tie_into_next: bool,
    ) -> String {
        let measure = Self::combine_rests(measure);
        let measure = self.optimize_enharmonics(measure);
        let mut fragments = Self::flatten(Self::expand(&measure));
        if tie_into_next {
            if let Some(last) = fragments.last_mut() {
                last.set_tied(true);
            }
        }
        Self::stringify(&fragments)
    }

    /// Merge every run of adjacent rests into one rest.
    ///
    /// The merged rest starts where the first one started, and lasts
    /// for the sum of their effective lengths.
    pub fn combine_rests(mut measure: Vec<RhythmUnit>) -> Vec<RhythmUnit> {
        let mut idx = 0;
        while idx + 1 < measure.len() {
            if !(measure[idx].event.is_rest() && measure[idx + 1].event.is_rest())
            {
                idx += 1;
                continue;
            }
            let next = measure.remove(idx + 1);
            let merged = &mut measure[idx];
            let length = merged.effective_length() + next.effective_length();
            merged.set_length(length).set_dotted(false);
            idx = idx.saturating_sub(1);
        }
        measure
    }

    /// Spell every pitch with the accidentals of the home key.
    pub fn optimize_enharmonics(
        &self,
        measure: Vec<RhythmUnit>,
    ) -> Vec<RhythmUnit> {
        let key = match self.home_key {
            None => return measure,
            Some(key) => key,
        };
        measure
            .into_iter()
            .map(|mut unit| {
                let event = unit.event.map_pitches(|p| key.best_enharmonic(p));
                unit.set_event(event);
                unit
            })
            .collect()
    }

    /// Notatable fragments of every unit, aligned by its beat.
    pub fn expand(measure: &[RhythmUnit]) -> Vec<Vec<RhythmUnit>> {
        measure.iter().map(RhythmUnit::decompose).collect()
    }

    pub fn flatten(expanded: Vec<Vec<RhythmUnit>>) -> Vec<RhythmUnit> {
        expanded.into_iter().flatten().collect()
    }

    pub fn stringify(fragments: &[RhythmUnit]) -> String {
        fragments.iter().map(|unit| unit.render_lilypond()).join(" ")
    }
}
