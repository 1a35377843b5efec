//! Voice-leading and harmony rule checks
//!
//! A [`ChordProblem`] collects rule violations for one voiced chord
//! ("self" problems) or for the move between two voiced chords ("prev" and
//! "next" edges). Values are non-negative penalties; [`ChordProblem::total_score`]
//! folds them into one number using [`ProblemWeights`], lower being better.

use crate::config::ProblemWeights;
use crate::error::Result;
use crate::harmony::progression::{best_match, ProgressionResolver};
use crate::harmony::voicing::Voicing;
use crate::types::{ChordChoice, ChordType, Interval, Note, Part, Scale};
#[cfg(feature = "colored")]
use colored::*;
use std::collections::BTreeMap;
use std::fmt;

pub const BAD_INTERVAL_PENALTY: f64 = 10.0;
pub const DISSONANCE_PENALTY: f64 = 10.0;
pub const MELODY_PENALTY: f64 = 100.0;
pub const OVERLAP_PENALTY: f64 = 20.0;
pub const UNDOUBLED_FIFTH_PENALTY: f64 = 10.0;
pub const DOUBLED_LEADING_TONE_PENALTY: f64 = 20.0;
pub const DOUBLED_MAJOR_SEVENTH_PENALTY: f64 = 15.0;
pub const DOUBLED_MINOR_SEVENTH_PENALTY: f64 = 10.0;
pub const DOUBLED_SEVENTH_PENALTY: f64 = 5.0;
pub const NO_PRIMARY_DOUBLING_PENALTY: f64 = 3.0;
pub const UNRESOLVED_PENALTY: f64 = 10.0;
pub const ILLEGAL_PROGRESSION_PENALTY: f64 = 50.0;

/// Inner-voice leaps wider than this are weighted three times.
const INNER_LEAP_LIMIT: f64 = 2.0;
const INNER_LEAP_FACTOR: f64 = 3.0;

/// Rule categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum ProblemKind {
    VoiceDistance,
    BadInterval,
    Dissonance,
    Melody,
    Overlapping,
    Doubling,
    Resolution,
    ChordProgression,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; 8] = [
        ProblemKind::VoiceDistance,
        ProblemKind::BadInterval,
        ProblemKind::Dissonance,
        ProblemKind::Melody,
        ProblemKind::Overlapping,
        ProblemKind::Doubling,
        ProblemKind::Resolution,
        ProblemKind::ChordProgression,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ProblemKind::VoiceDistance => "voiceDistance",
            ProblemKind::BadInterval => "badInterval",
            ProblemKind::Dissonance => "dissonance",
            ProblemKind::Melody => "melody",
            ProblemKind::Overlapping => "overlapping",
            ProblemKind::Doubling => "doubling",
            ProblemKind::Resolution => "resolution",
            ProblemKind::ChordProgression => "chordProgression",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Which relation a problem set describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ProblemDirection {
    /// The chord on its own
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    Own,
    /// Moving in from the previous chord
    Prev,
    /// Moving on to the next chord
    Next,
}

/// One rule hit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemValue {
    pub value: f64,
    pub comment: String,
    pub slug: Option<String>,
}

/// Rule hits grouped by category.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChordProblem {
    problems: BTreeMap<ProblemKind, Vec<ProblemValue>>,
}

impl ChordProblem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ProblemKind, value: f64, comment: impl Into<String>) {
        self.push(kind, value, comment.into(), None);
    }

    pub fn add_with_slug(
        &mut self,
        kind: ProblemKind,
        value: f64,
        comment: impl Into<String>,
        slug: impl Into<String>,
    ) {
        self.push(kind, value, comment.into(), Some(slug.into()));
    }

    fn push(&mut self, kind: ProblemKind, value: f64, comment: String, slug: Option<String>) {
        self.problems.entry(kind).or_default().push(ProblemValue {
            value,
            comment,
            slug,
        });
    }

    pub fn values(&self, kind: ProblemKind) -> &[ProblemValue] {
        self.problems.get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.problems.values().all(|v| v.is_empty())
    }

    /// Unweighted sum of one category.
    pub fn raw_score(&self, kind: ProblemKind) -> f64 {
        self.values(kind).iter().map(|p| p.value).sum()
    }

    /// Weighted total. Alto and tenor leaps beyond a whole step count three
    /// times over before weighting.
    pub fn total_score(&self, weights: &ProblemWeights, direction: ProblemDirection) -> f64 {
        self.problems
            .iter()
            .map(|(kind, values)| {
                let raw: f64 = values
                    .iter()
                    .map(|p| match (kind, p.slug.as_deref()) {
                        (ProblemKind::VoiceDistance, Some("part1Distance" | "part2Distance"))
                            if p.value > INNER_LEAP_LIMIT =>
                        {
                            p.value * INNER_LEAP_FACTOR
                        }
                        _ => p.value,
                    })
                    .sum();
                raw * weights.weight(direction, *kind)
            })
            .sum()
    }

    /// All hits in category order.
    pub fn iter(&self) -> impl Iterator<Item = (ProblemKind, &ProblemValue)> {
        self.problems
            .iter()
            .flat_map(|(kind, values)| values.iter().map(move |v| (*kind, v)))
    }
}

#[cfg(feature = "colored")]
impl fmt::Display for ChordProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{}", "no problems".green());
        }
        let lines: Vec<String> = self
            .iter()
            .map(|(kind, p)| {
                format!(
                    "{} {} {}",
                    kind.slug().yellow(),
                    format!("{:>5.1}", p.value).red(),
                    p.comment
                )
            })
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(not(feature = "colored"))]
impl fmt::Display for ChordProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no problems");
        }
        let lines: Vec<String> = self
            .iter()
            .map(|(kind, p)| format!("{} {:>5.1} {}", kind.slug(), p.value, p.comment))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// A chord choice together with the notes it was voiced to.
#[derive(Debug, Clone, Copy)]
pub struct VoicedChord<'a> {
    pub choice: &'a ChordChoice,
    pub scale: &'a Scale,
    pub voicing: &'a Voicing,
}

impl<'a> VoicedChord<'a> {
    pub fn new(choice: &'a ChordChoice, scale: &'a Scale, voicing: &'a Voicing) -> Self {
        VoicedChord {
            choice,
            scale,
            voicing,
        }
    }

    fn note(&self, part: Part) -> Note {
        self.voicing.note(part)
    }

    /// Voices sounding the given pitch class.
    fn voices_on(&self, semitone: u8) -> impl Iterator<Item = Note> + '_ {
        self.voicing
            .notes
            .iter()
            .copied()
            .filter(move |n| n.semitone() == semitone)
    }
}

/// Applies the rule catalog. Progression checks go through `resolver`.
pub struct ProblemScorer<'a> {
    resolver: &'a ProgressionResolver,
}

impl<'a> ProblemScorer<'a> {
    pub fn new(resolver: &'a ProgressionResolver) -> Self {
        ProblemScorer { resolver }
    }

    /// Problems of a voiced chord on its own.
    pub fn chord_problem(&self, chord: &VoicedChord) -> ChordProblem {
        let mut problem = ChordProblem::new();
        check_dissonance(chord, &mut problem);
        check_melody(chord, &mut problem);
        check_overlapping(chord, &mut problem);
        check_doubling(chord, &mut problem);
        problem
    }

    /// Problems of moving from `prev` to `next`.
    pub fn problems_between(&self, prev: &VoicedChord, next: &VoicedChord) -> Result<ChordProblem> {
        let mut problem = ChordProblem::new();
        check_voice_distance(prev, next, &mut problem);
        check_bad_intervals(prev, next, &mut problem);
        check_resolution(prev, next, &mut problem);
        self.check_progression(prev, next, &mut problem)?;
        Ok(problem)
    }

    fn check_progression(
        &self,
        prev: &VoicedChord,
        next: &VoicedChord,
        problem: &mut ChordProblem,
    ) -> Result<()> {
        let from = &prev.choice.chord;
        let to = &next.choice.chord;
        let choices = self.resolver.choices(from, prev.scale)?;
        match best_match(&choices, to) {
            Some(found) => problem.add(
                ProblemKind::ChordProgression,
                found.score as f64,
                found.reason.clone(),
            ),
            None => problem.add(
                ProblemKind::ChordProgression,
                ILLEGAL_PROGRESSION_PENALTY,
                format!("{} cannot follow {} in {}", to, from, prev.scale),
            ),
        }
        Ok(())
    }
}

fn check_dissonance(chord: &VoicedChord, problem: &mut ChordProblem) {
    let span = chord
        .note(Part::Bass)
        .semitones_to(&chord.note(Part::Soprano))
        .rem_euclid(12);
    if span == 1 || span == 6 {
        problem.add(
            ProblemKind::Dissonance,
            DISSONANCE_PENALTY,
            format!("outer voices are {} semitones apart", span),
        );
    }
}

fn check_melody(chord: &VoicedChord, problem: &mut ChordProblem) {
    if !chord.voicing.melody_fixed {
        return;
    }
    let melody = chord.note(Part::Soprano);
    if !chord.choice.chord.contains_semitone(melody.semitone()) {
        problem.add(
            ProblemKind::Melody,
            MELODY_PENALTY,
            format!("melody {} is not in {}", melody, chord.choice.chord),
        );
    }
}

fn check_overlapping(chord: &VoicedChord, problem: &mut ChordProblem) {
    for pair in Part::ALL.windows(2) {
        let (upper, lower) = (pair[0], pair[1]);
        if chord.note(upper).global_semitone() < chord.note(lower).global_semitone() {
            problem.add(
                ProblemKind::Overlapping,
                OVERLAP_PENALTY,
                format!("{} is below {}", upper, lower),
            );
        }
    }
}

fn check_doubling(chord: &VoicedChord, problem: &mut ChordProblem) {
    let choice = chord.choice;
    let harmony = &choice.chord;

    if harmony.len() == 3 && choice.inversion == 2 {
        let fifths = chord.voices_on(harmony.tones()[2].semitone()).count();
        if fifths < 2 {
            problem.add(
                ProblemKind::Doubling,
                UNDOUBLED_FIFTH_PENALTY,
                "second inversion without a doubled fifth",
            );
        }
    }

    let leading_tone = chord.scale.leading_tone().semitone();
    if chord.voices_on(leading_tone).count() > 1 {
        problem.add(
            ProblemKind::Doubling,
            DOUBLED_LEADING_TONE_PENALTY,
            "doubled leading tone",
        );
    }

    if harmony.chord_type().is_seventh() {
        let sevenths = chord.voices_on(harmony.tones()[3].semitone()).count();
        if sevenths > 1 {
            let (value, label) = match harmony.chord_type() {
                ChordType::Maj7 => (DOUBLED_MAJOR_SEVENTH_PENALTY, "major"),
                ChordType::Min7 => (DOUBLED_MINOR_SEVENTH_PENALTY, "minor"),
                _ => (DOUBLED_SEVENTH_PENALTY, "chord"),
            };
            problem.add(
                ProblemKind::Doubling,
                value,
                format!("doubled {} seventh", label),
            );
        }
    }

    // Primary degrees: I, IV, V
    let primary: Vec<u8> = [0, 3, 4]
        .iter()
        .map(|d| chord.scale.pitches()[*d].semitone())
        .collect();
    let doubled: Vec<u8> = chord
        .voicing
        .notes
        .iter()
        .map(|n| n.semitone())
        .filter(|s| chord.voices_on(*s).count() > 1)
        .collect();
    if !doubled.is_empty() && !doubled.iter().any(|s| primary.contains(s)) {
        problem.add(
            ProblemKind::Doubling,
            NO_PRIMARY_DOUBLING_PENALTY,
            "no primary degree doubled",
        );
    }
}

fn check_voice_distance(prev: &VoicedChord, next: &VoicedChord, problem: &mut ChordProblem) {
    for part in Part::ALL {
        if part == Part::Soprano && next.voicing.melody_fixed {
            continue;
        }
        let distance = prev.note(part).semitones_to(&next.note(part)).abs();
        if distance > 0 {
            problem.add_with_slug(
                ProblemKind::VoiceDistance,
                distance as f64,
                format!("{} moves {} semitones", part, distance),
                format!("part{}Distance", part.index()),
            );
        }
    }
}

fn check_bad_intervals(prev: &VoicedChord, next: &VoicedChord, problem: &mut ChordProblem) {
    for part in [Part::Alto, Part::Tenor, Part::Bass] {
        let (from, to) = (prev.note(part), next.note(part));
        if part == Part::Bass && from.global_semitone() == to.global_semitone() {
            continue;
        }
        let interval = Interval::between(from.pitch(), to.pitch());
        if interval.quality().is_altered() {
            problem.add(
                ProblemKind::BadInterval,
                BAD_INTERVAL_PENALTY,
                format!("{} moves by {} ({} to {})", part, interval, from, to),
            );
        }
    }
}

fn check_resolution(prev: &VoicedChord, next: &VoicedChord, problem: &mut ChordProblem) {
    let harmony = &prev.choice.chord;
    let targets: Vec<i32> = next
        .voicing
        .notes
        .iter()
        .map(|n| n.global_semitone())
        .collect();

    if harmony.chord_type() == ChordType::Dom7 {
        let seventh = harmony.tones()[3].semitone();
        for voice in prev.voices_on(seventh) {
            let from = voice.global_semitone();
            if !targets.iter().any(|t| (0..=2).contains(&(from - t))) {
                problem.add(
                    ProblemKind::Resolution,
                    UNRESOLVED_PENALTY,
                    format!("seventh {} of {} does not resolve down", voice, harmony),
                );
            }
        }
    }

    let root_degree = prev.scale.degree_of(harmony.root());
    let dominant = harmony.chord_type() == ChordType::Dom7 || matches!(root_degree, Some(4 | 6));
    if dominant {
        let leading_tone = prev.scale.leading_tone().semitone();
        for voice in prev.voices_on(leading_tone) {
            let from = voice.global_semitone();
            if !targets.iter().any(|t| (0..=2).contains(&(t - from))) {
                problem.add(
                    ProblemKind::Resolution,
                    UNRESOLVED_PENALTY,
                    format!("leading tone {} does not resolve up", voice),
                );
            }
        }
    }
}
