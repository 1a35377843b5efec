// chorale-core/src/harmony/mod.rs

pub mod generator;
pub mod problems;
pub mod progression;
pub mod voicing;

pub use generator::{all_chords, all_chords_for_scale, inversions_and_doublings, ChordSampler};
pub use problems::{
    ChordProblem, ProblemDirection, ProblemKind, ProblemScorer, ProblemValue, VoicedChord,
};
pub use progression::{
    best_match, chord_substitutions, diatonic_progression_choices, progression_choices,
    shared_resolver, Progression, ProgressionResolver,
};
pub use voicing::{voice_chord, VoiceAssigner, Voicing};
