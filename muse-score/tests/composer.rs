use std::{fs, io::Write};

use itertools::Itertools;
use muse_score::{
    melody::NoteSource,
    primitives::{Length, Pitch, RhythmUnit},
    Composer, ComposerState, Configuration, MuseError,
};

fn config(yaml: &str) -> Configuration {
    Configuration::from_yaml_str(yaml).expect("Can not parse configuration")
}

/// Endless 64th notes.
struct Grains;
impl NoteSource for Grains {
    fn next_unit(&mut self) -> RhythmUnit {
        RhythmUnit::note(Pitch::from_midi(60, None), Length::from_units(1))
    }
    fn name(&self) -> &'static str {
        "Grains"
    }
}

/// Endless eighth notes.
struct Eighths;
impl NoteSource for Eighths {
    fn next_unit(&mut self) -> RhythmUnit {
        RhythmUnit::note(Pitch::from_midi(62, None), Length::from(0.125))
    }
    fn name(&self) -> &'static str {
        "Eighths"
    }
}

#[test]
fn test_seeded_composition_repeats() {
    let _ = env_logger::builder().is_test(true).try_init();
    for algorithm in ["MARandom", "MAGaussMeander"] {
        let yaml = format!(
            "algorithm: {}\nseed: 2023\nnumMeasures: 12\ndensity: 0.7\ndiatonicity: 0.8",
            algorithm
        );
        let first = Composer::new(&config(&yaml)).unwrap().render_document().unwrap();
        let second = Composer::new(&config(&yaml)).unwrap().render_document().unwrap();
        first
            .lines()
            .zip_eq(second.lines())
            .map(|(a, b)| assert_eq!(a, b))
            .count();
    }
}

#[test]
fn test_document_frame() {
    let mut composer = Composer::new(&config(
        "numMeasures: 10\nmeasuresPerLine: 3\nclef: bass\nnoteLowest: C2\nnoteHighest: C4\nseed: 8",
    ))
    .unwrap();
    assert_eq!(composer.source_name(), "MARandom");
    let document = composer.render_document().unwrap();
    assert_eq!(composer.state(), ComposerState::Finished);
    assert_eq!(composer.measure_count(), 10);
    assert!(document.starts_with("\\version \"2.18.2\"\n{\n    \\clef bass\n"));
    assert!(document.ends_with("    \\bar \"|.\"\n}\n"));
    let comments = document
        .lines()
        .filter_map(|line| line.split_once("% Measure ").map(|(_, n)| n.to_string()))
        .collect::<Vec<_>>();
    assert_eq!(comments, vec!["3", "6", "9"]);
    assert_eq!(document.matches('{').count(), document.matches('}').count());
}

#[test]
fn test_measures_fill_time_signature() {
    let mut composer = Composer::new(&config(
        "timeSignature: 5/8\nshortestNote: 8\nlongestNote: 1\nnumMeasures: 6\nseed: 3",
    ))
    .unwrap();
    let mut completed = 0;
    while composer.state() == ComposerState::Composing {
        if let Some(measures) = composer.compose().unwrap() {
            assert!(!measures.is_empty());
            completed = composer.measure_count();
        }
    }
    assert_eq!(completed, 6);
    assert_eq!(composer.measures().len(), 6);
}

#[test]
fn test_odd_meters() {
    for yaml in [
        "timeSignature: 7/32\nshortestNote: 8\nlongestNote: 8\nnumMeasures: 4\nseed: 1",
        "timeSignature: 7/64\nlongestNote: 16\nnumMeasures: 4\nseed: 1",
        "timeSignature: 5/16\nshortestNote: 4\nnumMeasures: 4\nseed: 5",
    ] {
        let mut composer = Composer::new(&config(yaml)).unwrap();
        let document = composer.render_document().unwrap();
        assert_eq!(composer.measure_count(), 4, "{}", yaml);
        assert!(document.contains("% Measure 4"), "{}", yaml);
    }

    // eighths against 7/32 leave remainders of 1/32, 1/16 and 3/32
    let config = config("timeSignature: 7/32\nnumMeasures: 8");
    let mut composer = Composer::with_source(&config, Box::new(Eighths)).unwrap();
    composer.render_document().unwrap();
    assert_eq!(composer.measure_count(), 8);
    assert!(composer.measures().iter().all(|m| !m.is_empty()));
}

#[test]
fn test_write_to_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("piece.ly");
    let mut composer = Composer::new(&config("numMeasures: 3\nseed: 1")).unwrap();
    composer.write_to_path(&path).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, composer.render_document().unwrap());

    let mut buffer = Vec::new();
    composer.write_all(&mut buffer).unwrap();
    assert_eq!(String::from_utf8(buffer).unwrap(), written);
}

#[test]
fn test_no_file_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ly");
    let config = config("shortestNote: 1\nlongestNote: 1");
    let mut composer = Composer::with_source(&config, Box::new(Grains)).unwrap();
    let err = composer.write_to_path(&path).unwrap_err();
    assert!(matches!(err, MuseError::Capacity { capacity: 2 }));
    assert!(!path.exists());
}

#[test]
fn test_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("piece.ly");
    let mut composer = Composer::new(&config("numMeasures: 1\nseed: 1")).unwrap();
    assert!(matches!(
        composer.write_to_path(&path),
        Err(MuseError::OutputFile { .. })
    ));
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "key: Eb\nnumMeasures: 2\nunknownKey: 1").unwrap();
    let config = Configuration::from_path(file.path()).unwrap();
    assert_eq!(config.counts(), (2, 11));
    let document = Composer::new(&config).unwrap().render_document().unwrap();
    assert!(document.contains("\\key es \\major"));
}
