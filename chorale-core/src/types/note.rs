use crate::error::{HarmonyError, Result};
use crate::types::pitch::Pitch;
use std::fmt;
use std::str::FromStr;

/// Octave used when a note name carries none.
pub const DEFAULT_OCTAVE: i8 = 4;

/// A spelled pitch placed in a concrete octave (scientific notation, C4 = middle C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Note {
    pitch: Pitch,
    octave: i8,
}

impl Note {
    pub fn new(pitch: Pitch, octave: i8) -> Self {
        Note { pitch, octave }
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Pitch class 0-11
    pub fn semitone(&self) -> u8 {
        self.pitch.semitone()
    }

    /// Absolute height: semitone + 12 * octave
    pub fn global_semitone(&self) -> i32 {
        self.semitone() as i32 + 12 * self.octave as i32
    }

    /// Same pitch, different octave
    pub fn with_octave(self, octave: i8) -> Self {
        Note { octave, ..self }
    }

    /// Move the note by whole octaves
    pub fn shifted(self, octaves: i8) -> Self {
        Note {
            octave: self.octave.saturating_add(octaves),
            ..self
        }
    }

    /// Signed distance in semitones from `self` to `other`
    pub fn semitones_to(&self, other: &Note) -> i32 {
        other.global_semitone() - self.global_semitone()
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch, self.octave)
    }
}

impl FromStr for Note {
    type Err = HarmonyError;

    /// Parse "C#4", "Bb3" or a bare pitch name ("F#" defaults to octave 4).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .unwrap_or(s.len());
        let (pitch_part, octave_part) = s.split_at(split);

        let pitch: Pitch = pitch_part
            .parse()
            .map_err(|_| HarmonyError::InvalidNoteName(s.to_string()))?;
        let octave = if octave_part.is_empty() {
            DEFAULT_OCTAVE
        } else {
            octave_part
                .parse::<i8>()
                .map_err(|_| HarmonyError::InvalidNoteName(s.to_string()))?
        };
        Ok(Note::new(pitch, octave))
    }
}

#[cfg(feature = "serde")]
impl TryFrom<String> for Note {
    type Error = HarmonyError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

#[cfg(feature = "serde")]
impl From<Note> for String {
    fn from(value: Note) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_parsing() {
        let note: Note = "C#4".parse().unwrap();
        assert_eq!(note.pitch(), "C#".parse().unwrap());
        assert_eq!(note.octave(), 4);

        let note: Note = "Bb".parse().unwrap();
        assert_eq!(note.octave(), DEFAULT_OCTAVE);

        let note: Note = "E3".parse().unwrap();
        assert_eq!(note.to_string(), "E3");

        let note: Note = "C-1".parse().unwrap();
        assert_eq!(note.octave(), -1);

        assert!("X4".parse::<Note>().is_err());
        assert!("C4x".parse::<Note>().is_err());
    }

    #[test]
    fn test_global_semitone() {
        let c5: Note = "C5".parse().unwrap();
        let a4: Note = "A4".parse().unwrap();
        assert_eq!(c5.global_semitone(), 60);
        assert_eq!(a4.global_semitone(), 57);
        assert_eq!(a4.semitones_to(&c5), 3);

        // B#3 sounds like C4 but keeps octave 3 in its spelling
        let b_sharp: Note = "B#3".parse().unwrap();
        assert_eq!(b_sharp.global_semitone(), 36);
    }

    #[test]
    fn test_octave_shifts() {
        let e3: Note = "E3".parse().unwrap();
        assert_eq!(e3.shifted(1).to_string(), "E4");
        assert_eq!(e3.shifted(-2).to_string(), "E1");
        assert_eq!(e3.with_octave(6).global_semitone(), 76);
    }
}
