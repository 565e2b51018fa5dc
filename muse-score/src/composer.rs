//! Drives the composition: pulls units from the note source, packs
//! them into measures and collects the formatted measures into a
//! LilyPond document.
//!
//! ```
//! # use muse_score::{composer::Composer, config::Configuration};
//! let config = Configuration::from_yaml_str("numMeasures: 2\nseed: 5").unwrap();
//! let mut composer = Composer::new(&config).unwrap();
//! let document = composer.render_document().unwrap();
//! assert!(document.starts_with("\\version"));
//! assert_eq!(composer.measure_count(), 2);
//! ```

use std::{fs, io::Write, path::Path};

use derivative::Derivative;
use log::{debug, info, log_enabled, trace, Level};

use crate::{
    config::Configuration,
    diagnostics::pretty_measure,
    error::{MuseError, MuseResult},
    lilypond_render::{LilySyntax, RenderSettings, RendersToLilypond},
    melody::{self, MelodySettings, NoteSource},
    orchestrator::Orchestrator,
    primitives::{Length, MeasureBuffer, SplitOutcome},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Composing,
    Finished,
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Composer {
    #[derivative(Debug = "ignore")]
    source: Box<dyn NoteSource>,
    buffer: MeasureBuffer,
    orchestrator: Orchestrator,
    settings: RenderSettings,
    num_measures: u32,
    measures_per_line: u32,
    measure_count: u32,
    /// Position of the next unit in the current measure.
    beat: Length,
    state: ComposerState,
    measures: Vec<String>,
}
impl Composer {
    /// Composer with the configured algorithm.
    ///
    /// Without a configured seed, the seed is taken from entropy and
    /// logged, so the piece can be reproduced.
    pub fn new(config: &Configuration) -> MuseResult<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!("composing with {} and seed {}", config.algorithm, seed);
        let source = melody::create(
            &config.algorithm,
            MelodySettings::from(config),
            seed,
        )?;
        Self::with_source(config, source)
    }

    pub fn with_source(
        config: &Configuration,
        source: Box<dyn NoteSource>,
    ) -> MuseResult<Self> {
        // remainders of odd meters are finer than the shortest note
        let precision = config.measure_length().gcd(config.shortest());
        let buffer = MeasureBuffer::new(config.measure_length(), precision)?;
        let state = match config.num_measures {
            0 => ComposerState::Finished,
            _ => ComposerState::Composing,
        };
        Ok(Self {
            source,
            buffer,
            orchestrator: Orchestrator::new(config.key),
            settings: config.render_settings(),
            num_measures: config.num_measures,
            measures_per_line: config.measures_per_line.max(1),
            measure_count: 0,
            beat: Length::ZERO,
            state,
            measures: Vec::new(),
        })
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }
    /// Amount of completed measures.
    pub fn measure_count(&self) -> u32 {
        self.measure_count
    }
    /// Formatted measures, completed so far.
    pub fn measures(&self) -> &[String] {
        &self.measures
    }

    /// Take one unit from the note source.
    ///
    /// Returns measures, completed by the unit, joined by space, or
    /// `None` if the unit did not complete any measure.
    pub fn compose(&mut self) -> MuseResult<Option<String>> {
        if self.state == ComposerState::Finished {
            return Ok(None);
        }
        let completed = self.step()?;
        if completed.is_empty() {
            return Ok(None);
        }
        Ok(Some(completed.join(" ")))
    }

    fn step(&mut self) -> MuseResult<Vec<String>> {
        let mut unit = self.source.next_unit();
        unit.set_beat(self.beat)
            .set_measure_index(self.measure_count);
        self.beat += unit.effective_length();
        let mut completed = Vec::new();
        let mut pending = Some(unit);
        while let Some(unit) = pending.take() {
            let remainder = match self.buffer.add_unit(&unit)? {
                SplitOutcome::Fits => continue,
                SplitOutcome::Rejected => return Err(MuseError::Rejected),
                SplitOutcome::Fills { remainder } => remainder,
            };
            self.measure_count += 1;
            self.beat = Length::ZERO;
            let finished = self.measure_count >= self.num_measures;
            let carried = remainder.is_some() && !finished;
            completed.push(self.finish_measure(carried));
            if finished {
                self.state = ComposerState::Finished;
                if let Some(remainder) = remainder {
                    debug!(
                        "composition is complete, {} of the last note is discarded",
                        remainder.effective_length()
                    );
                }
                break;
            }
            pending = remainder.map(|mut remainder| {
                remainder
                    .set_beat(Length::ZERO)
                    .set_measure_index(self.measure_count);
                self.beat = remainder.effective_length();
                remainder
            });
        }
        Ok(completed)
    }

    fn finish_measure(&mut self, tie_into_next: bool) -> String {
        let measure = self.buffer.drain();
        if log_enabled!(Level::Trace) {
            trace!(
                "measure {}: {}",
                self.measure_count,
                pretty_measure(&measure, self.buffer.target())
            );
        }
        let formatted = self.orchestrator.format_measure(measure, tie_into_next);
        self.measures.push(formatted.clone());
        formatted
    }

    /// Compose till the end and build the whole LilyPond document.
    ///
    /// Measures, composed before, are included.
    pub fn render_document(&mut self) -> MuseResult<String> {
        while self.state == ComposerState::Composing {
            self.step()?;
        }
        let mut document = LilySyntax::header();
        document.push('\n');
        document.push_str(&self.settings.render_lilypond());
        document.push('\n');
        let per_line = self.measures_per_line as usize;
        for (line_idx, line) in self.measures.chunks(per_line).enumerate() {
            document.push_str(LilySyntax::INDENT);
            document.push_str(&line.join(" "));
            if line.len() == per_line {
                let number = (line_idx + 1) * per_line;
                document.push_str(&LilySyntax::measure_comment(number as u32));
            }
            document.push('\n');
        }
        document.push_str(&LilySyntax::footer());
        document.push('\n');
        Ok(document)
    }

    pub fn write_all(&mut self, mut writer: impl Write) -> MuseResult<()> {
        let document = self.render_document()?;
        writer.write_all(document.as_bytes())?;
        Ok(())
    }

    /// Write the document to file.
    ///
    /// The file is created only after the whole document is composed.
    pub fn write_to_path(&mut self, path: impl AsRef<Path>) -> MuseResult<()> {
        let path = path.as_ref();
        let document = self.render_document()?;
        fs::write(path, document).map_err(|source| MuseError::OutputFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!("written {} measures to {:?}", self.measure_count, path);
        Ok(())
    }
}
