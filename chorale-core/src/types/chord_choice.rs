use crate::error::{HarmonyError, Result};
use crate::types::chord::Chord;
use std::fmt;

/// A chord placed at a division with a chosen bass tone and doubling.
///
/// `inversion` indexes the chord tone that goes to the bass; `doubling`
/// holds one chord-tone index per voice (duplicates allowed).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ChordChoiceRepr", into = "ChordChoiceRepr")
)]
pub struct ChordChoice {
    pub chord: Chord,
    pub inversion: usize,
    pub doubling: [usize; 4],
    pub division: u32,
}

impl ChordChoice {
    /// Create a choice, checking that every index names a chord tone.
    pub fn new(chord: Chord, inversion: usize, doubling: [usize; 4], division: u32) -> Result<Self> {
        let choice = ChordChoice {
            chord,
            inversion,
            doubling,
            division,
        };
        choice.validate()?;
        Ok(choice)
    }

    pub fn validate(&self) -> Result<()> {
        let len = self.chord.len();
        for index in std::iter::once(self.inversion).chain(self.doubling) {
            if index >= len {
                return Err(HarmonyError::InvalidChordIndex { index, len });
            }
        }
        Ok(())
    }

    /// The same choice moved to another division.
    pub fn at(&self, division: u32) -> Self {
        ChordChoice {
            division,
            ..self.clone()
        }
    }

    /// Name of the inversion, e.g. "root position" or "second inversion".
    pub fn inversion_name(&self) -> &'static str {
        match self.inversion {
            0 => "root position",
            1 => "first inversion",
            2 => "second inversion",
            _ => "third inversion",
        }
    }
}

impl fmt::Display for ChordChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doubling: Vec<String> = self.doubling.iter().map(|d| d.to_string()).collect();
        write!(
            f,
            "{} inv {} [{}] @{}",
            self.chord,
            self.inversion,
            doubling.join(","),
            self.division
        )
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ChordChoiceRepr {
    chord: Chord,
    inversion: usize,
    doubling: [usize; 4],
    division: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<ChordChoiceRepr> for ChordChoice {
    type Error = HarmonyError;

    fn try_from(repr: ChordChoiceRepr) -> Result<Self> {
        ChordChoice::new(repr.chord, repr.inversion, repr.doubling, repr.division)
    }
}

#[cfg(feature = "serde")]
impl From<ChordChoice> for ChordChoiceRepr {
    fn from(choice: ChordChoice) -> Self {
        ChordChoiceRepr {
            chord: choice.chord,
            inversion: choice.inversion,
            doubling: choice.doubling,
            division: choice.division,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_validation() {
        let chord: Chord = "Cmaj".parse().unwrap();
        assert!(ChordChoice::new(chord.clone(), 2, [0, 0, 1, 2], 0).is_ok());
        assert_eq!(
            ChordChoice::new(chord.clone(), 3, [0, 0, 1, 2], 0),
            Err(HarmonyError::InvalidChordIndex { index: 3, len: 3 })
        );
        assert!(ChordChoice::new(chord, 0, [0, 1, 2, 3], 0).is_err());
    }

    #[test]
    fn test_choice_display() {
        let chord: Chord = "Gdom7".parse().unwrap();
        let choice = ChordChoice::new(chord, 1, [0, 1, 2, 3], 24).unwrap();
        assert_eq!(choice.to_string(), "Gdom7 inv 1 [0,1,2,3] @24");
        assert_eq!(choice.inversion_name(), "first inversion");
        assert_eq!(choice.at(36).division, 36);
    }
}
