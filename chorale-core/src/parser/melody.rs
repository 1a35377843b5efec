//! Structured melody input
//!
//! A melody arrives as a list of letter names with a duration code, an
//! accidental and an optional contour hint. Octaves are never given; they
//! are chosen to keep the line close to the previous note and inside the
//! soprano register.

use crate::config::EngineParams;
use crate::error::{HarmonyError, Result};
use crate::types::{Note, Part, Pitch, RichNote, Scale, Timeline, BEAT_LENGTH};
use crate::types::note::DEFAULT_OCTAVE;

/// Leaps wider than this are folded back by an octave.
const MAX_LEAP: i32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DurationCode {
    #[cfg_attr(feature = "serde", serde(rename = "w"))]
    Whole,
    #[cfg_attr(feature = "serde", serde(rename = "h"))]
    Half,
    #[cfg_attr(feature = "serde", serde(rename = "q"))]
    Quarter,
    #[cfg_attr(feature = "serde", serde(rename = "e"))]
    Eighth,
    #[cfg_attr(feature = "serde", serde(rename = "s"))]
    Sixteenth,
}

impl DurationCode {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'w' => Some(DurationCode::Whole),
            'h' => Some(DurationCode::Half),
            'q' => Some(DurationCode::Quarter),
            'e' => Some(DurationCode::Eighth),
            's' => Some(DurationCode::Sixteenth),
            _ => None,
        }
    }

    /// Length in divisions.
    pub fn ticks(self) -> u32 {
        match self {
            DurationCode::Whole => BEAT_LENGTH * 4,
            DurationCode::Half => BEAT_LENGTH * 2,
            DurationCode::Quarter => BEAT_LENGTH,
            DurationCode::Eighth => BEAT_LENGTH / 2,
            DurationCode::Sixteenth => BEAT_LENGTH / 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MelodyNote {
    /// Letter name, A-G
    pub note: char,
    pub duration: DurationCode,
    pub dotted: bool,
    /// -1 flat, 0 natural, 1 sharp
    pub sharp: i8,
    /// 1 forces the note above the previous one, -1 below, 0 leaves it free
    pub direction: i8,
}

impl MelodyNote {
    pub fn new(note: char, duration: DurationCode) -> Self {
        MelodyNote {
            note,
            duration,
            dotted: false,
            sharp: 0,
            direction: 0,
        }
    }

    /// Length in divisions; a dot adds half (a dotted sixteenth rounds down).
    pub fn ticks(&self) -> u32 {
        let base = self.duration.ticks();
        if self.dotted {
            base * 3 / 2
        } else {
            base
        }
    }

    pub fn pitch(&self) -> Result<Pitch> {
        if !matches!(self.sharp, -1..=1) || !matches!(self.direction, -1..=1) {
            return Err(HarmonyError::InvalidMelody(format!("{:?}", self)));
        }
        let accidental = match self.sharp {
            1 => "#",
            -1 => "b",
            _ => "",
        };
        format!("{}{}", self.note, accidental)
            .parse()
            .map_err(|_| HarmonyError::InvalidMelody(format!("unknown note name {}", self.note)))
    }

    /// Choose an octave relative to the previous note (global semitone).
    fn place(&self, previous: i32, low: i32, high: i32) -> Result<Note> {
        let note = Note::new(self.pitch()?, DEFAULT_OCTAVE);
        let mut height = note.global_semitone();
        let base = height;

        if height - previous > MAX_LEAP {
            height -= 12;
        } else if height - previous < -MAX_LEAP {
            height += 12;
        }
        match self.direction {
            1 => {
                while height <= previous {
                    height += 12;
                }
            }
            -1 => {
                while height >= previous {
                    height -= 12;
                }
            }
            _ => {}
        }
        while height < low {
            height += 12;
        }
        while height > high {
            height -= 12;
        }

        let octaves = (height - base) / 12;
        Ok(note.shifted(octaves as i8))
    }
}

/// Lay a melody out in the soprano part, one note after another from
/// division 0.
pub fn melody_to_timeline(
    melody: &[MelodyNote],
    scale: &Scale,
    params: &EngineParams,
) -> Result<Timeline> {
    let register = params.register(Part::Soprano);
    let mut previous = params.starting_semitone(Part::Soprano);
    let mut division = 0;
    let mut timeline = Timeline::new();

    for melody_note in melody {
        let note = melody_note.place(previous, register.low, register.high)?;
        let duration = melody_note.ticks();
        previous = note.global_semitone();
        timeline.insert(division, RichNote::melody(note, duration, *scale));
        division += duration;
    }
    Ok(timeline)
}
