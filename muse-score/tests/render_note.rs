use muse_score::{
    lilypond_render::RenderSettings,
    primitives::{
        Accidental, Chord, Clef, EventType, Key, Length, Pitch, RhythmUnit, TimeSignature,
    },
    RendersToLilypond,
};

fn pitch(name: &str) -> Pitch {
    name.parse().expect("Can not parse pitch")
}

#[test]
fn test_pitches() {
    assert_eq!(Pitch::from_midi(60, None).render_lilypond(), "c'");
    assert_eq!(Pitch::from_midi(60 - 36, None).render_lilypond(), "c,,");
    assert_eq!(Pitch::from_midi(61, None).render_lilypond(), "cis'");
    assert_eq!(Pitch::from_midi(61, Some(Accidental::Flat)).render_lilypond(), "des'");
    assert_eq!(Pitch::from_midi(51, Some(Accidental::Flat)).render_lilypond(), "es");
    assert_eq!(Pitch::from_midi(56, Some(Accidental::Flat)).render_lilypond(), "as");
    assert_eq!(pitch("Bb2").render_lilypond(), "bes,");
    assert_eq!(pitch("F#5").render_lilypond(), "fis''");
}

#[test]
fn test_units() {
    let mut note = RhythmUnit::note(pitch("G4"), Length::from(0.375));
    assert_eq!(note.render_lilypond(), "g'4.");
    note.set_tied(true);
    assert_eq!(note.render_lilypond(), "g'4.~");
    note.set_length(Length::from(0.25)).set_dotted(true);
    assert_eq!(note.render_lilypond(), "g'4.~");

    let rest = RhythmUnit::rest(Length::from(1.0 / 64.0));
    assert_eq!(rest.render_lilypond(), "r64");
}

#[test]
fn test_chord() {
    let chord = Chord::from_pitches(vec![pitch("C4"), pitch("Eb4"), pitch("G4")])
        .expect("Can not build chord");
    let unit = RhythmUnit::new(EventType::Chord(chord), Length::from(0.5));
    assert_eq!(unit.render_lilypond(), "<c' es' g'>2");
}

#[test]
fn test_settings() {
    let settings = RenderSettings::new(
        "Bbm".parse::<Key>().unwrap(),
        Clef::Bass,
        TimeSignature::new(6, 8).unwrap(),
    );
    assert_eq!(
        settings.render_lilypond(),
        "    \\clef bass\n    \\key bes \\minor\n    \\time 6/8\n"
    );
    let wholetone = RenderSettings::new(
        "Dw".parse::<Key>().unwrap(),
        Clef::Treble,
        TimeSignature::default(),
    );
    assert!(wholetone.render_lilypond().contains("\\key c \\major"));
}
