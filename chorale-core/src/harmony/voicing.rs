//! Voice assignment: turning a chord choice into four concrete notes
//!
//! The bass takes the inversion's tone. The remaining doubling indices are
//! distributed over alto and tenor (and soprano, when no melody note is
//! fixed) by trying every ordering and keeping the one with the smoothest
//! motion that fits the registers.

use crate::config::{EngineParams, Register};
use crate::types::{ChordChoice, Interval, Note, Part, RichNote, Scale, Timeline};
use log::{debug, trace};

/// Octave corrections allowed per note before an ordering is abandoned.
pub const MAX_OCTAVE_STEPS: u32 = 100;

const ABOVE_REGISTER_PENALTY: i32 = 100;
const ABOVE_MELODY_PENALTY: i32 = 1000;
const ALTERED_MOTION_PENALTY: i32 = 100;
/// Motion up to this many semitones is free.
const FREE_MOTION: i32 = 2;

/// The four notes written for one division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voicing {
    pub division: u32,
    /// Soprano, alto, tenor, bass. The soprano is the melody note when one
    /// was fixed.
    pub notes: [Note; 4],
    pub melody_fixed: bool,
}

impl Voicing {
    pub fn note(&self, part: Part) -> Note {
        self.notes[part.index()]
    }
}

/// Raise `note` by octaves until it is at least `floor` (global semitones).
fn raise_to(note: Note, floor: i32) -> Option<Note> {
    let mut note = note;
    let mut steps = 0;
    while note.global_semitone() < floor {
        steps += 1;
        if steps > MAX_OCTAVE_STEPS {
            return None;
        }
        note = note.shifted(1);
    }
    Some(note)
}

/// Penalty for moving a voice from `prev` to `next`.
fn motion_penalty(prev: Option<&Note>, next: &Note) -> i32 {
    let Some(prev) = prev else {
        return 0;
    };
    let mut penalty = (prev.semitones_to(next).abs() - FREE_MOTION).max(0);
    if Interval::between(prev.pitch(), next.pitch())
        .quality()
        .is_altered()
    {
        penalty += ALTERED_MOTION_PENALTY;
    }
    penalty
}

/// Chord-tone indices still to be placed above the bass, trimmed to the
/// number of free slots. `None` when too few remain.
fn free_indices(
    choice: &ChordChoice,
    melody: Option<&Note>,
) -> Option<Vec<usize>> {
    let mut free = choice.doubling.to_vec();
    if let Some(pos) = free.iter().position(|i| *i == choice.inversion) {
        free.remove(pos);
    }
    if let Some(melody) = melody {
        if let Some(index) = choice.chord.index_of_semitone(melody.semitone()) {
            if let Some(pos) = free.iter().position(|i| *i == index) {
                free.remove(pos);
            }
        }
    }

    let slots = if melody.is_some() { 2 } else { 3 };
    while free.len() > slots {
        // Drop the fifth first
        match free.iter().position(|i| *i == 2) {
            Some(pos) => {
                free.remove(pos);
            }
            None => {
                free.pop();
            }
        }
    }
    (free.len() == slots).then_some(free)
}

/// Orderings of the free indices over (alto, tenor[, soprano]).
fn orderings(free: &[usize]) -> Vec<Vec<usize>> {
    match free {
        [a, b] => vec![vec![*a, *b], vec![*b, *a]],
        [a, b, c] => vec![
            vec![*a, *b, *c],
            vec![*a, *c, *b],
            vec![*b, *a, *c],
            vec![*b, *c, *a],
            vec![*c, *a, *b],
            vec![*c, *b, *a],
        ],
        _ => Vec::new(),
    }
}

struct Placement {
    alto: Note,
    tenor: Note,
    soprano: Option<Note>,
    score: i32,
}

/// Places chord choices into a timeline using the registers of `params`.
pub struct VoiceAssigner<'a> {
    params: &'a EngineParams,
}

impl<'a> VoiceAssigner<'a> {
    pub fn new(params: &'a EngineParams) -> Self {
        VoiceAssigner { params }
    }

    fn register(&self, part: Part) -> Register {
        self.params.register(part)
    }

    /// Voice `choice` at its division and write the notes into `timeline`,
    /// replacing anything voiced there before. A fixed melody note is kept.
    ///
    /// Notes at the previous division are shortened to end here first.
    /// Returns `None`, leaving the notes at this division as they were, when
    /// the choice cannot be voiced.
    pub fn assign(
        &self,
        choice: &ChordChoice,
        timeline: &mut Timeline,
        scale: &Scale,
    ) -> Option<Voicing> {
        let division = choice.division;
        if let Err(err) = choice.validate() {
            debug!("skipping voicing at {}: {}", division, err);
            return None;
        }
        timeline.cap_previous(division);

        let previous = timeline
            .previous_division(division)
            .map(|d| timeline.notes_at(d).to_vec())
            .unwrap_or_default();
        let prev_note = |part: Part| previous.iter().find(|n| n.part == part).map(|n| n.note);
        let prev_alto = prev_note(Part::Alto);
        let prev_tenor = prev_note(Part::Tenor);

        let chord = &choice.chord;
        let notes = chord.notes();
        let bass = raise_to(notes[choice.inversion], self.register(Part::Bass).low)?;
        let melody = timeline.melody_at(division).map(|n| n.note);

        let Some(free) = free_indices(choice, melody.as_ref()) else {
            debug!("skipping voicing of {} at {}: not enough tones", choice, division);
            return None;
        };

        let mut best: Option<Placement> = None;
        for ordering in orderings(&free) {
            let Some(placement) = self.place(&ordering, &notes, bass, melody, prev_alto, prev_tenor)
            else {
                continue;
            };
            trace!("{} ordering {:?} scores {}", choice, ordering, placement.score);
            if best.as_ref().map_or(true, |b| placement.score > b.score) {
                best = Some(placement);
            }
        }
        let Some(best) = best else {
            debug!("skipping voicing of {} at {}: no ordering fits", choice, division);
            return None;
        };

        let soprano = match (melody, best.soprano) {
            (Some(m), _) => m,
            (None, Some(s)) => s,
            (None, None) => return None,
        };
        let mut write = |part: Part, note: Note| {
            timeline.insert(division, RichNote::voiced(note, part, chord.clone(), *scale));
        };
        if melody.is_none() {
            write(Part::Soprano, soprano);
        }
        write(Part::Alto, best.alto);
        write(Part::Tenor, best.tenor);
        write(Part::Bass, bass);

        Some(Voicing {
            division,
            notes: [soprano, best.alto, best.tenor, bass],
            melody_fixed: melody.is_some(),
        })
    }

    /// Octave-correct one ordering from the bass upwards and score it.
    fn place(
        &self,
        ordering: &[usize],
        notes: &[Note],
        bass: Note,
        melody: Option<Note>,
        prev_alto: Option<Note>,
        prev_tenor: Option<Note>,
    ) -> Option<Placement> {
        let mut score = 0;

        let tenor_register = self.register(Part::Tenor);
        let tenor = raise_to(
            notes[ordering[1]],
            bass.global_semitone().max(tenor_register.low),
        )?;
        if !tenor_register.contains(tenor.global_semitone()) {
            score -= ABOVE_REGISTER_PENALTY;
        }
        score -= motion_penalty(prev_tenor.as_ref(), &tenor);

        let alto_register = self.register(Part::Alto);
        let alto = raise_to(
            notes[ordering[0]],
            tenor.global_semitone().max(alto_register.low),
        )?;
        if !alto_register.contains(alto.global_semitone()) {
            score -= ABOVE_REGISTER_PENALTY;
        }
        if let Some(melody) = melody {
            if alto.global_semitone() > melody.global_semitone() {
                score -= ABOVE_MELODY_PENALTY;
            }
        }
        score -= motion_penalty(prev_alto.as_ref(), &alto);

        let soprano = match (melody, ordering.get(2)) {
            (None, Some(index)) => {
                let soprano_register = self.register(Part::Soprano);
                let soprano = raise_to(
                    notes[*index],
                    alto.global_semitone().max(soprano_register.low),
                )?;
                if !soprano_register.contains(soprano.global_semitone()) {
                    score -= ABOVE_REGISTER_PENALTY;
                }
                Some(soprano)
            }
            _ => None,
        };

        Some(Placement {
            alto,
            tenor,
            soprano,
            score,
        })
    }
}

/// Voice `choice` with a one-off assigner. See [`VoiceAssigner::assign`].
pub fn voice_chord(
    choice: &ChordChoice,
    timeline: &mut Timeline,
    scale: &Scale,
    params: &EngineParams,
) -> Option<Voicing> {
    VoiceAssigner::new(params).assign(choice, timeline, scale)
}
