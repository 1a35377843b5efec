//! Pitch algebra over a degree + accidental spelling
//!
//! A [`Pitch`] is spelled relative to C: a scale degree letter (C..B as 0..6)
//! plus a signed count of sharps. Keeping the spelling (rather than just a
//! pitch class 0-11) is what lets the engine tell a diatonic Eb from a
//! chromatic D#, name intervals correctly and build Roman numerals.

use crate::error::{HarmonyError, Result};
use crate::types::scale::Scale;
use std::fmt;
use std::str::FromStr;

/// Semitone offset of each natural degree from C.
pub const DEGREE_SEMITONES: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Letter names of the natural degrees.
pub const DEGREE_NAMES: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];

/// Largest number of sharps (or flats) a pitch may carry.
pub const MAX_ALTERATION: i8 = 3;

/// Canonical spelling per semitone, sharps preferred.
const PITCHES_BY_SEMITONE: [Pitch; 12] = [
    Pitch { degree: 0, sharp: 0 },  // C
    Pitch { degree: 0, sharp: 1 },  // C#
    Pitch { degree: 1, sharp: 0 },  // D
    Pitch { degree: 1, sharp: 1 },  // D#
    Pitch { degree: 2, sharp: 0 },  // E
    Pitch { degree: 3, sharp: 0 },  // F
    Pitch { degree: 3, sharp: 1 },  // F#
    Pitch { degree: 4, sharp: 0 },  // G
    Pitch { degree: 4, sharp: 1 },  // G#
    Pitch { degree: 5, sharp: 0 },  // A
    Pitch { degree: 5, sharp: 1 },  // A#
    Pitch { degree: 6, sharp: 0 },  // B
];

/// The twelve spellings a scale root may take. Any other root is normalized
/// to the entry with the same semitone.
pub const SCALE_ROOTS: [Pitch; 12] = [
    Pitch { degree: 0, sharp: 0 },  // C
    Pitch { degree: 1, sharp: -1 }, // Db
    Pitch { degree: 1, sharp: 0 },  // D
    Pitch { degree: 2, sharp: -1 }, // Eb
    Pitch { degree: 2, sharp: 0 },  // E
    Pitch { degree: 3, sharp: 0 },  // F
    Pitch { degree: 4, sharp: -1 }, // Gb
    Pitch { degree: 4, sharp: 0 },  // G
    Pitch { degree: 5, sharp: -1 }, // Ab
    Pitch { degree: 5, sharp: 0 },  // A
    Pitch { degree: 6, sharp: -1 }, // Bb
    Pitch { degree: 6, sharp: 0 },  // B
];

/// Shortest signed distance from semitone `from` to semitone `to` on the
/// 12-cycle, in (-6, 6]. The tritone is always reported as +6.
pub fn semitone_distance(from: u8, to: u8) -> i8 {
    let diff = (to as i16 - from as i16).rem_euclid(12) as i8;
    if diff > 6 { diff - 12 } else { diff }
}

/// Which way an interval is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

/// An absolute pitch spelled relative to C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Pitch {
    degree: u8,
    sharp: i8,
}

impl Pitch {
    /// Create a pitch, rejecting degrees outside 0..7 and more than three
    /// sharps or flats.
    pub fn new(degree: u8, sharp: i8) -> Result<Self> {
        if degree > 6 || sharp.abs() > MAX_ALTERATION {
            return Err(HarmonyError::InvalidPitch {
                degree: degree as i32,
                sharp: sharp as i32,
            });
        }
        Ok(Pitch { degree, sharp })
    }

    /// The unaltered pitch on a degree (0 = C .. 6 = B).
    pub const fn natural(degree: u8) -> Self {
        Pitch {
            degree: degree % 7,
            sharp: 0,
        }
    }

    /// Canonical spelling of a semitone (sharps preferred).
    pub fn from_semitone(semitone: u8) -> Self {
        PITCHES_BY_SEMITONE[(semitone % 12) as usize]
    }

    pub fn degree(&self) -> u8 {
        self.degree
    }

    pub fn sharp(&self) -> i8 {
        self.sharp
    }

    /// Pitch class 0-11.
    pub fn semitone(&self) -> u8 {
        (DEGREE_SEMITONES[self.degree as usize] as i16 + self.sharp as i16).rem_euclid(12) as u8
    }

    /// Apply `interval` upwards or downwards.
    ///
    /// The target degree is the degree sum modulo 7; the accidental is then
    /// chosen so the target's semitone matches this pitch's semitone moved by
    /// the interval's semitone size.
    pub fn transpose(self, interval: Interval, direction: Direction) -> Result<Self> {
        let (degree, target) = match direction {
            Direction::Up => (
                (self.degree + interval.degree) % 7,
                (self.semitone() + interval.semitone()) % 12,
            ),
            Direction::Down => (
                (self.degree + 7 - interval.degree) % 7,
                (self.semitone() + 12 - interval.semitone()) % 12,
            ),
        };
        let sharp = semitone_distance(DEGREE_SEMITONES[degree as usize], target);
        Pitch::new(degree, sharp)
    }

    pub fn up(self, interval: Interval) -> Result<Self> {
        self.transpose(interval, Direction::Up)
    }

    pub fn down(self, interval: Interval) -> Result<Self> {
        self.transpose(interval, Direction::Down)
    }

    /// Whether two pitches sound the same regardless of spelling.
    pub fn is_enharmonic(&self, other: &Pitch) -> bool {
        self.semitone() == other.semitone()
    }

    /// Respell a pitch: a same-semitone pitch of `scale` wins when there is
    /// one, otherwise the canonical spelling for the semitone.
    pub fn enharmonic(self, scale: Option<&Scale>) -> Pitch {
        if let Some(scale) = scale {
            if let Some(in_scale) = scale.pitches().iter().find(|p| p.is_enharmonic(&self)) {
                return *in_scale;
            }
        }
        Pitch::from_semitone(self.semitone())
    }

    /// The scale root with the same semitone as this pitch.
    pub fn as_scale_root(self) -> Pitch {
        SCALE_ROOTS[self.semitone() as usize]
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", DEGREE_NAMES[self.degree as usize])?;
        let accidental = if self.sharp > 0 { "#" } else { "b" };
        for _ in 0..self.sharp.unsigned_abs() {
            f.write_str(accidental)?;
        }
        Ok(())
    }
}

impl FromStr for Pitch {
    type Err = HarmonyError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars
            .next()
            .ok_or_else(|| HarmonyError::InvalidPitchName(s.to_string()))?;
        let degree = DEGREE_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(&letter.to_string()))
            .ok_or_else(|| HarmonyError::InvalidPitchName(s.to_string()))?;

        let rest = chars.as_str();
        let sharp = if rest.is_empty() {
            0
        } else if rest.chars().all(|c| c == '#') {
            rest.len() as i32
        } else if rest.chars().all(|c| c == 'b') {
            -(rest.len() as i32)
        } else {
            return Err(HarmonyError::InvalidPitchName(s.to_string()));
        };
        if sharp.abs() > MAX_ALTERATION as i32 {
            return Err(HarmonyError::InvalidPitch {
                degree: degree as i32,
                sharp,
            });
        }
        Pitch::new(degree as u8, sharp as i8)
    }
}

/// Interval quality of an [`Interval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalQuality {
    Perfect,
    Major,
    Minor,
    Augmented,
    Diminished,
}

impl IntervalQuality {
    pub fn name(&self) -> &'static str {
        match self {
            IntervalQuality::Perfect => "perfect",
            IntervalQuality::Major => "major",
            IntervalQuality::Minor => "minor",
            IntervalQuality::Augmented => "augmented",
            IntervalQuality::Diminished => "diminished",
        }
    }

    /// Augmented and diminished intervals are awkward to sing.
    pub fn is_altered(&self) -> bool {
        matches!(self, IntervalQuality::Augmented | IntervalQuality::Diminished)
    }
}

const INTERVAL_ORDINALS: [&str; 7] = [
    "unison", "second", "third", "fourth", "fifth", "sixth", "seventh",
];

/// A relative pitch: a degree distance (0..6) plus the sharps needed on top
/// of the major/perfect interval of that size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    degree: u8,
    sharp: i8,
}

impl Interval {
    pub const UNISON: Interval = Interval::new(0, 0);
    pub const MAJOR_SECOND: Interval = Interval::new(1, 0);
    pub const MAJOR_THIRD: Interval = Interval::new(2, 0);
    pub const MINOR_THIRD: Interval = Interval::new(2, -1);
    pub const PERFECT_FOURTH: Interval = Interval::new(3, 0);
    pub const AUGMENTED_FOURTH: Interval = Interval::new(3, 1);
    pub const PERFECT_FIFTH: Interval = Interval::new(4, 0);

    pub const fn new(degree: u8, sharp: i8) -> Self {
        Interval {
            degree: degree % 7,
            sharp,
        }
    }

    /// Interval from `from` up to `to`.
    pub fn between(from: Pitch, to: Pitch) -> Self {
        let degree = (to.degree + 7 - from.degree) % 7;
        let semitones = (to.semitone() + 12 - from.semitone()) % 12;
        let sharp = semitone_distance(DEGREE_SEMITONES[degree as usize], semitones);
        Interval { degree, sharp }
    }

    pub fn degree(&self) -> u8 {
        self.degree
    }

    pub fn sharp(&self) -> i8 {
        self.sharp
    }

    /// Size in semitones, 0-11.
    pub fn semitone(&self) -> u8 {
        (DEGREE_SEMITONES[self.degree as usize] as i16 + self.sharp as i16).rem_euclid(12) as u8
    }

    /// Unisons, fourths and fifths are perfect-class; the rest are
    /// major/minor-class.
    pub fn quality(&self) -> IntervalQuality {
        if matches!(self.degree, 0 | 3 | 4) {
            match self.sharp {
                0 => IntervalQuality::Perfect,
                s if s > 0 => IntervalQuality::Augmented,
                _ => IntervalQuality::Diminished,
            }
        } else {
            match self.sharp {
                0 => IntervalQuality::Major,
                -1 => IntervalQuality::Minor,
                s if s > 0 => IntervalQuality::Augmented,
                _ => IntervalQuality::Diminished,
            }
        }
    }

    /// Human readable name, e.g. "minor second".
    pub fn name(&self) -> String {
        format!(
            "{} {}",
            self.quality().name(),
            INTERVAL_ORDINALS[self.degree as usize]
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Pitches cross serialization boundaries by name.
#[cfg(feature = "serde")]
impl TryFrom<String> for Pitch {
    type Error = HarmonyError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

#[cfg(feature = "serde")]
impl From<Pitch> for String {
    fn from(value: Pitch) -> Self {
        value.to_string()
    }
}
