#[cfg(test)]
mod tests {
    use chorale_core::harmony::{
        all_chords, all_chords_for_scale, chord_substitutions, progression_choices,
        ProgressionResolver,
    };
    use chorale_core::types::{Chord, Pitch, Scale, ScaleTemplate};

    fn chord(name: &str) -> Chord {
        name.parse().unwrap()
    }

    fn scale(name: &str) -> Scale {
        name.parse().unwrap()
    }

    fn successor_names(c: &str, s: &str) -> Vec<String> {
        progression_choices(&chord(c), &scale(s))
            .unwrap()
            .iter()
            .map(|p| p.chord.to_string())
            .collect()
    }

    #[test]
    fn test_diatonic_triads_of_c_major() {
        let triads = scale("C major").diatonic_triads().unwrap();
        assert_eq!(triads[0].to_string(), "Cmaj");
        assert_eq!(triads[3].to_string(), "Fmaj");
        assert_eq!(triads[4].to_string(), "Gmaj");
    }

    #[test]
    fn test_substitution_fixtures() {
        let subs = |c: &str, s: &str| -> Vec<String> {
            chord_substitutions(&chord(c), &scale(s))
                .unwrap()
                .iter()
                .map(|c| c.to_string())
                .collect()
        };
        assert_eq!(subs("Cmaj", "C major"), vec!["Cmin"]);
        assert_eq!(subs("Cdom7", "C major"), vec!["F#dom7"]);
    }

    #[test]
    fn test_tonic_may_go_anywhere() {
        let names = successor_names("Cmaj", "C major");
        for expected in [
            "Dmin", "Emin", "Fmaj", "Gmaj", "Amin", "Bdim", "Cmin", "Cmaj7", "Gdom7", "C#dom7",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_dominant_does_not_go_back_to_subdominant() {
        let names = successor_names("Gmaj", "C major");
        for forbidden in ["Dmin", "Emin", "Fmaj"] {
            assert!(!names.iter().any(|n| n == forbidden), "unexpected {}", forbidden);
        }
        assert!(names.iter().any(|n| n == "Cmaj"));
    }

    #[test]
    fn test_chromatic_chord_borrows_successors() {
        // Ebmaj reads as V of Ab and inherits its successors there
        let resolver = ProgressionResolver::new();
        let results = resolver.choices(&chord("Ebmaj"), &scale("C major")).unwrap();
        assert!(results.iter().any(|p| p.reason == "self"));
        assert!(results
            .iter()
            .any(|p| p.chord.to_string() == "Abmaj" && p.reason.ends_with("in scale Ab major")));
    }

    #[test]
    fn test_repeated_queries_agree() {
        let fresh = ProgressionResolver::new();
        let first = fresh.choices(&chord("Amin"), &scale("C major")).unwrap();
        let other = ProgressionResolver::new();
        let second = other.choices(&chord("Amin"), &scale("C major")).unwrap();
        assert_eq!(*first, *second);

        // Warming the cache with an unrelated query changes nothing
        let warmed = ProgressionResolver::new();
        warmed.choices(&chord("Edom7"), &scale("C major")).unwrap();
        warmed.choices(&chord("Emaj"), &scale("A major")).unwrap();
        let third = warmed.choices(&chord("Amin"), &scale("C major")).unwrap();
        assert_eq!(*first, *third);
    }

    #[test]
    fn test_every_chord_resolves_in_every_scale() {
        let resolver = ProgressionResolver::new();
        let mut queries = 0;
        for semitone in 0..12 {
            for template in ScaleTemplate::ALL {
                let key = Scale::new(Pitch::from_semitone(semitone), template).unwrap();
                let chords = all_chords()
                    .unwrap()
                    .into_iter()
                    .chain(all_chords_for_scale(&key).unwrap());
                for c in chords {
                    if let Err(e) = chord_substitutions(&c, &key) {
                        panic!("substitutions of {} in {}: {}", c, key, e);
                    }
                    match resolver.choices(&c, &key) {
                        Ok(found) => assert!(
                            found.iter().any(|p| p.reason == "self" && p.chord == c),
                            "{} in {} has no self entry",
                            c,
                            key
                        ),
                        Err(e) => panic!("progressions of {} in {}: {}", c, key, e),
                    }
                    queries += 1;
                }
            }
        }
        assert_eq!(queries, 12 * 3 * 2 * 132);
    }
}
