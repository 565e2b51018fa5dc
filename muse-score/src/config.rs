//! Composition settings, read from a YAML key/value file.
//!
//! Every key is optional, missing keys take defaults. Unknown keys are
//! ignored, malformed values are errors. Keys are case-insensitive.
//!
//! ```yaml
//! key: Am
//! timeSignature: 6/8
//! numMeasures: 16
//! algorithm: MAGaussMeander
//! ```

use std::{fs, path::Path, str::FromStr};

use log::info;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::{
    error::{MuseError, MuseResult},
    lilypond_render::RenderSettings,
    melody,
    primitives::{
        is_basis_reciprocal, Clef, Key, Length, Pitch, TimeSignature,
    },
};

/// Recognized keys, as spelled in the file by default.
const KEYS: [&str; 13] = [
    "key",
    "timeSignature",
    "numMeasures",
    "shortestNote",
    "longestNote",
    "density",
    "diatonicity",
    "algorithm",
    "clef",
    "noteLowest",
    "noteHighest",
    "seed",
    "measuresPerLine",
];

/// `Key` and `TIMESIGNATURE` are read as `key` and `timeSignature`.
fn canonical_keys(mapping: Mapping) -> Mapping {
    mapping
        .into_iter()
        .map(|(key, value)| {
            let known = key
                .as_str()
                .and_then(|name| KEYS.iter().find(|k| k.eq_ignore_ascii_case(name)))
                .copied();
            match known {
                Some(name) => (Value::from(name), value),
                None => (key, value),
            }
        })
        .collect()
}

/// File contents as written, before parsing and validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawConfiguration {
    key: Option<String>,
    time_signature: Option<String>,
    num_measures: Option<u32>,
    shortest_note: Option<u32>,
    longest_note: Option<u32>,
    density: Option<f64>,
    diatonicity: Option<f64>,
    algorithm: Option<String>,
    clef: Option<String>,
    note_lowest: Option<String>,
    note_highest: Option<String>,
    seed: Option<u64>,
    measures_per_line: Option<u32>,
}

/// Counts keys, taken from the file and from defaults.
#[derive(Debug, Default)]
struct Counter {
    provided: usize,
    defaulted: usize,
}
impl Counter {
    fn take<T>(&mut self, value: Option<T>, default: T) -> T {
        match value {
            Some(value) => {
                self.provided += 1;
                value
            }
            None => {
                self.defaulted += 1;
                default
            }
        }
    }
    fn parse<T>(&mut self, value: Option<String>, default: &str) -> MuseResult<T>
    where
        T: FromStr<Err = MuseError>,
    {
        self.take(value, default.to_string()).parse()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Home key.
    pub key: Key,
    pub time_signature: TimeSignature,
    /// Composition stops after this amount of measures.
    pub num_measures: u32,
    /// Reciprocal of the shortest note.
    pub shortest_note: u32,
    /// Reciprocal of the longest note.
    pub longest_note: u32,
    pub density: f64,
    pub diatonicity: f64,
    pub algorithm: String,
    pub clef: Clef,
    pub note_lowest: Pitch,
    pub note_highest: Pitch,
    /// Random seed, taken from entropy if missing.
    pub seed: Option<u64>,
    /// Measures between `% Measure N` comments.
    pub measures_per_line: u32,
    provided: usize,
    defaulted: usize,
}
impl Default for Configuration {
    fn default() -> Self {
        match Self::from_raw(RawConfiguration::default()) {
            Ok(config) => config,
            Err(err) => unreachable!("default configuration is valid: {err}"),
        }
    }
}
impl Configuration {
    /// Parse YAML text. Empty text gives all defaults.
    ///
    /// # Example
    /// ```
    /// # use muse_score::config::Configuration;
    /// let config = Configuration::from_yaml_str("numMeasures: 2\nfoo: bar").unwrap();
    /// assert_eq!(config.num_measures, 2);
    /// assert_eq!(config.algorithm, "MARandom");
    /// assert_eq!(config.counts(), (1, 12));
    /// ```
    pub fn from_yaml_str(content: &str) -> MuseResult<Self> {
        let value: Value = serde_yaml::from_str(content)?;
        let raw = match value {
            Value::Null => RawConfiguration::default(),
            Value::Mapping(mapping) => {
                serde_yaml::from_value(Value::Mapping(canonical_keys(mapping)))?
            }
            value => serde_yaml::from_value(value)?,
        };
        let config = Self::from_raw(raw)?;
        info!(
            "configuration: {} keys read, {} keys defaulted",
            config.provided, config.defaulted
        );
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> MuseResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| {
            MuseError::ConfigFile {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!("reading configuration from {:?}", path);
        Self::from_yaml_str(&content)
    }

    fn from_raw(raw: RawConfiguration) -> MuseResult<Self> {
        let mut counter = Counter::default();
        let config = Self {
            key: counter.parse(raw.key, "CM")?,
            time_signature: counter.parse(raw.time_signature, "4/4")?,
            num_measures: counter.take(raw.num_measures, 8),
            shortest_note: counter.take(raw.shortest_note, 16),
            longest_note: counter.take(raw.longest_note, 1),
            density: counter.take(raw.density, 1.0),
            diatonicity: counter.take(raw.diatonicity, 1.0),
            algorithm: counter.take(raw.algorithm, "MARandom".to_string()),
            clef: counter.parse(raw.clef, "treble")?,
            note_lowest: counter.parse(raw.note_lowest, "A2")?,
            note_highest: counter.parse(raw.note_highest, "C6")?,
            seed: counter.take(raw.seed.map(Some), None),
            measures_per_line: counter.take(raw.measures_per_line, 4),
            provided: counter.provided,
            defaulted: counter.defaulted,
        };
        debug_assert_eq!(config.provided + config.defaulted, KEYS.len());
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> MuseResult<()> {
        let invalid = |key: &'static str, value: String, reason: &str| {
            Err(MuseError::InvalidSetting {
                key,
                value,
                reason: reason.to_string(),
            })
        };
        for (key, value) in [
            ("shortestNote", self.shortest_note),
            ("longestNote", self.longest_note),
        ] {
            if !is_basis_reciprocal(value) {
                return invalid(
                    key,
                    value.to_string(),
                    "should be a power of two from 1 to 64",
                );
            }
        }
        if self.longest_note > self.shortest_note {
            return invalid(
                "longestNote",
                self.longest_note.to_string(),
                "longest note is shorter than the shortest one",
            );
        }
        for (key, value) in
            [("density", self.density), ("diatonicity", self.diatonicity)]
        {
            if !(0.0..=1.0).contains(&value) {
                return invalid(key, value.to_string(), "should be within 0..1");
            }
        }
        if self.note_lowest.midi() > self.note_highest.midi() {
            return invalid(
                "noteLowest",
                self.note_lowest.to_string(),
                "lowest note is above the highest one",
            );
        }
        if self.measures_per_line == 0 {
            return invalid("measuresPerLine", "0".to_string(), "should be positive");
        }
        if !melody::is_registered(&self.algorithm) {
            return Err(MuseError::UnknownAlgorithm(self.algorithm.clone()));
        }
        Ok(())
    }

    /// Amount of keys `(read from the file, taken from defaults)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.provided, self.defaulted)
    }

    pub fn measure_length(&self) -> Length {
        self.time_signature.measure_length()
    }
    pub fn shortest(&self) -> Length {
        Length::from_units(Length::WHOLE.units() / self.shortest_note.max(1))
    }
    pub fn longest(&self) -> Length {
        Length::from_units(Length::WHOLE.units() / self.longest_note.max(1))
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings::new(self.key, self.clef, self.time_signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Scale;

    #[test]
    fn defaults() {
        let config = Configuration::default();
        assert_eq!(config.key, Key::default());
        assert_eq!(config.time_signature, TimeSignature::default());
        assert_eq!(config.num_measures, 8);
        assert_eq!(config.shortest(), Length::from(1.0 / 16.0));
        assert_eq!(config.longest(), Length::WHOLE);
        assert_eq!(config.clef, Clef::Treble);
        assert_eq!(config.note_lowest.midi(), 45);
        assert_eq!(config.note_highest.midi(), 84);
        assert_eq!(config.seed, None);
        assert_eq!(config.measures_per_line, 4);
        assert_eq!(config.counts(), (0, 13));
    }

    #[test]
    fn empty_file_is_defaults() {
        for content in ["", "\n\n", "# only a comment\n"] {
            let config = Configuration::from_yaml_str(content).unwrap();
            assert_eq!(config, Configuration::default());
        }
    }

    #[test]
    fn full_file() {
        let config = Configuration::from_yaml_str(
            r"
key: F#m
timeSignature: 3/4
numMeasures: 12
shortestNote: 8
longestNote: 2
density: 0.5
diatonicity: 0.9
algorithm: meander
clef: bass
noteLowest: E2
noteHighest: E4
seed: 17
measuresPerLine: 3
",
        )
        .unwrap();
        assert_eq!(config.key.scale(), Scale::Minor);
        assert_eq!(config.measure_length(), Length::from(0.75));
        assert_eq!(config.shortest(), Length::from(0.125));
        assert_eq!(config.longest(), Length::from(0.5));
        assert_eq!(config.clef, Clef::Bass);
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.counts(), (13, 0));
    }

    #[test]
    fn keys_ignore_case() {
        let config = Configuration::from_yaml_str(
            "Key: Am\nDiatonicity: 0.5\nTIMESIGNATURE: 3/4\nnummeasures: 2\nFoo: 1",
        )
        .unwrap();
        assert_eq!(config.key, "Am".parse().unwrap());
        assert_eq!(config.diatonicity, 0.5);
        assert_eq!(config.measure_length(), Length::from(0.75));
        assert_eq!(config.num_measures, 2);
        assert_eq!(config.counts(), (4, 9));
        assert!(Configuration::from_yaml_str("Clef: soprano").is_err());
    }

    #[test]
    fn malformed_values() {
        for content in [
            "key: Hm",
            "timeSignature: 4/5",
            "timeSignature: 99999999/4",
            "numMeasures: many",
            "shortestNote: 12",
            "shortestNote: 4\nlongestNote: 8",
            "density: 1.5",
            "diatonicity: -0.1",
            "clef: soprano",
            "noteLowest: C7",
            "noteHighest: X1",
            "measuresPerLine: 0",
            "algorithm: MAMozart",
            "- not\n- a mapping",
        ] {
            assert!(
                Configuration::from_yaml_str(content).is_err(),
                "{} should not load",
                content
            );
        }
    }

    #[test]
    fn missing_file() {
        let err = Configuration::from_path("surely/missing/config.yaml")
            .unwrap_err();
        assert!(matches!(err, MuseError::ConfigFile { .. }));
    }
}
