use std::path::PathBuf;

use thiserror;

#[derive(Debug, thiserror::Error)]
pub enum MuseError {
    #[error("Can not parse pitch: `{0}`")]
    InvalidPitch(String),
    #[error("Can not parse key: `{0}`")]
    InvalidKey(String),
    #[error("Can not parse clef: `{0}`")]
    InvalidClef(String),
    #[error("Can not parse time signature: `{0}`")]
    InvalidTimeSignature(String),
    #[error("Invalid chord: {0}")]
    InvalidChord(String),
    #[error("Invalid length: {0}")]
    InvalidLength(String),
    #[error("Invalid value for `{key}`: `{value}` ({reason})")]
    InvalidSetting {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("No melody algorithm named `{0}`")]
    UnknownAlgorithm(String),
    #[error(
        "Measure buffer rejected a unit: all {capacity} slots are taken"
    )]
    Capacity { capacity: usize },
    #[error("Buffer index {index} out of range: {count} items buffered")]
    OutOfRange { index: usize, count: usize },
    #[error("Measure is full, it should be drained before adding units")]
    Rejected,
    #[error("Can not read configuration: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("Can not open configuration file {path:?}: {source}")]
    ConfigFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Can not write output file {path:?}: {source}")]
    OutputFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("LilyPond failed: {0}")]
    Lilypond(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
pub type MuseResult<T> = Result<T, MuseError>;
