#![cfg(feature = "serde")]

use chorale_core::harmony::{ProblemDirection, ProblemKind};
use chorale_core::{Chord, ChordChoice, EngineConfig, Scale};

#[test]
fn test_chord_choice_round_trip() {
    let json = r#"{"chord":{"root":"F#","chord_type":"dim7"},"inversion":1,"doubling":[0,1,2,3],"division":24}"#;
    let choice: ChordChoice = serde_json::from_str(json).unwrap();
    assert_eq!(choice.chord.to_string(), "F#dim7");
    assert_eq!(choice.division, 24);

    let back = serde_json::to_string(&choice).unwrap();
    let again: ChordChoice = serde_json::from_str(&back).unwrap();
    assert_eq!(again, choice);
}

#[test]
fn test_invalid_identifiers_are_rejected() {
    assert!(serde_json::from_str::<Chord>(r#"{"root":"C","chord_type":"maj9"}"#).is_err());
    assert!(serde_json::from_str::<Chord>(r#"{"root":"H","chord_type":"maj"}"#).is_err());
    assert!(serde_json::from_str::<Scale>(r#"{"root":"C","template":"lydian"}"#).is_err());

}

#[test]
fn test_chord_choice_indices_are_checked() {
    // Doubling index outside a triad
    let json = r#"{"chord":{"root":"C","chord_type":"maj"},"inversion":0,"doubling":[0,1,2,3],"division":0}"#;
    assert!(serde_json::from_str::<ChordChoice>(json).is_err());

    // Third inversion of a triad
    let json = r#"{"chord":{"root":"C","chord_type":"maj"},"inversion":3,"doubling":[0,0,1,2],"division":0}"#;
    assert!(serde_json::from_str::<ChordChoice>(json).is_err());

    let json = r#"{"chord":{"root":"C","chord_type":"maj"},"inversion":0,"doubling":[0,5,1,2],"division":0}"#;
    let err = serde_json::from_str::<ChordChoice>(json).unwrap_err();
    assert!(err.to_string().contains('5'));

    // The same indices are fine on a seventh chord
    let json = r#"{"chord":{"root":"C","chord_type":"dom7"},"inversion":3,"doubling":[0,1,2,3],"division":0}"#;
    let choice: ChordChoice = serde_json::from_str(json).unwrap();
    assert_eq!(choice.inversion_name(), "third inversion");
}

#[test]
fn test_weights_from_json() {
    let json = r#"{"weights":{"self":{"melody":2.0},"prev":{"voiceDistance":0.5}}}"#;
    let config: EngineConfig = serde_json::from_str(json).unwrap();
    assert_eq!(
        config.weights.weight(ProblemDirection::Own, ProblemKind::Melody),
        2.0
    );
    assert_eq!(
        config.weights.weight(ProblemDirection::Prev, ProblemKind::VoiceDistance),
        0.5
    );
    assert_eq!(
        config.weights.weight(ProblemDirection::Next, ProblemKind::Melody),
        1.0
    );
    assert_eq!(config.params.tempo, 70);
}
