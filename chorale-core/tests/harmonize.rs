#[cfg(test)]
mod tests {
    use chorale_core::harmony::ProblemKind;
    use chorale_core::parser::{melody_to_timeline, parse_lilypond, DurationCode, MelodyNote};
    use chorale_core::types::Part;
    use chorale_core::{ChordChoice, EngineConfig, Harmonizer, Scale};
    use std::collections::BTreeMap;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_cadence_in_c_major() {
        init_logger();
        let scale: Scale = "C major".parse().unwrap();
        let melody = parse_lilypond("e'4 d' c'2", &scale).unwrap();

        let chords = [(0, "Cmaj"), (12, "Gdom7"), (24, "Cmaj")];
        let choices: BTreeMap<u32, ChordChoice> = chords
            .iter()
            .map(|(division, name)| {
                let chord = name.parse().unwrap();
                let doubling = if *name == "Gdom7" { [0, 1, 2, 3] } else { [0, 0, 1, 2] };
                (*division, ChordChoice::new(chord, 0, doubling, *division).unwrap())
            })
            .collect();

        let harmonizer = Harmonizer::new(EngineConfig::default());
        let result = harmonizer.harmonize(&melody, &scale, &choices);
        assert!(result.skipped.is_empty(), "skipped {:?}", result.skipped);
        assert_eq!(result.timeline.len(), 3);
        for (division, voicing) in &result.voicings {
            assert!(voicing.melody_fixed);
            let bass = result.timeline.note_at(*division, Part::Bass).unwrap();
            let chord = bass.chord.as_ref().unwrap();
            assert_eq!(bass.note.pitch(), chord.root());
        }
    }

    #[test]
    fn test_suggestions_follow_the_melody() {
        init_logger();
        let scale: Scale = "G major".parse().unwrap();
        let params = EngineConfig::default().params;
        let melody: Vec<MelodyNote> = ['G', 'F', 'G']
            .iter()
            .map(|letter| MelodyNote {
                sharp: if *letter == 'F' { 1 } else { 0 },
                ..MelodyNote::new(*letter, DurationCode::Quarter)
            })
            .collect();
        let timeline = melody_to_timeline(&melody, &scale, &params).unwrap();

        let tonic = ChordChoice::new("Gmaj".parse().unwrap(), 0, [0, 0, 1, 2], 0).unwrap();
        let closing = tonic.at(24);
        let harmonizer = Harmonizer::default();
        let ranked = harmonizer
            .chord_choices(&timeline, 12, &scale, Some(&tonic), Some(&closing))
            .unwrap();

        let best = &ranked[0];
        // F# in the melody: the winner must contain it and lead back home
        assert!(best.choice.chord.contains_semitone(6), "{}", best.choice);
        assert!(best.own.values(ProblemKind::Melody).is_empty());
        assert!(best.next.is_some());
        assert!(ranked.last().unwrap().total >= best.total);
    }
}
