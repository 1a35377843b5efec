use crate::error::{HarmonyError, Result};
use crate::types::note::Note;
use crate::types::pitch::{Interval, Pitch};
use crate::types::scale::Scale;
use std::fmt;
use std::str::FromStr;

/// Octave at which [`Chord::notes`] are placed before voicing.
pub const CHORD_NOTE_OCTAVE: i8 = 1;

/// The registered chord qualities, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChordType {
    Maj,
    Min,
    Dim,
    Dim7,
    DimHalf7,
    Aug,
    Maj7,
    Min7,
    Dom7,
    Sus2,
    Sus4,
}

const MAJ: [Interval; 3] = [Interval::new(0, 0), Interval::new(2, 0), Interval::new(4, 0)];
const MIN: [Interval; 3] = [Interval::new(0, 0), Interval::new(2, -1), Interval::new(4, 0)];
const DIM: [Interval; 3] = [Interval::new(0, 0), Interval::new(2, -1), Interval::new(4, -1)];
const DIM7: [Interval; 4] = [
    Interval::new(0, 0),
    Interval::new(2, -1),
    Interval::new(4, -1),
    Interval::new(6, -2),
];
const DIM_HALF7: [Interval; 4] = [
    Interval::new(0, 0),
    Interval::new(2, -1),
    Interval::new(4, -1),
    Interval::new(6, -1),
];
const AUG: [Interval; 3] = [Interval::new(0, 0), Interval::new(2, 0), Interval::new(4, 1)];
const MAJ7: [Interval; 4] = [
    Interval::new(0, 0),
    Interval::new(2, 0),
    Interval::new(4, 0),
    Interval::new(6, 0),
];
const MIN7: [Interval; 4] = [
    Interval::new(0, 0),
    Interval::new(2, -1),
    Interval::new(4, 0),
    Interval::new(6, -1),
];
const DOM7: [Interval; 4] = [
    Interval::new(0, 0),
    Interval::new(2, 0),
    Interval::new(4, 0),
    Interval::new(6, -1),
];
const SUS2: [Interval; 3] = [Interval::new(0, 0), Interval::new(1, 0), Interval::new(4, 0)];
const SUS4: [Interval; 3] = [Interval::new(0, 0), Interval::new(3, 0), Interval::new(4, 0)];

impl ChordType {
    pub const ALL: [ChordType; 11] = [
        ChordType::Maj,
        ChordType::Min,
        ChordType::Dim,
        ChordType::Dim7,
        ChordType::DimHalf7,
        ChordType::Aug,
        ChordType::Maj7,
        ChordType::Min7,
        ChordType::Dom7,
        ChordType::Sus2,
        ChordType::Sus4,
    ];

    /// Identifier used in chord names ("maj", "dimhalf7", ...).
    pub fn slug(&self) -> &'static str {
        match self {
            ChordType::Maj => "maj",
            ChordType::Min => "min",
            ChordType::Dim => "dim",
            ChordType::Dim7 => "dim7",
            ChordType::DimHalf7 => "dimhalf7",
            ChordType::Aug => "aug",
            ChordType::Maj7 => "maj7",
            ChordType::Min7 => "min7",
            ChordType::Dom7 => "dom7",
            ChordType::Sus2 => "sus2",
            ChordType::Sus4 => "sus4",
        }
    }

    /// Intervals above the root, root first.
    pub fn template(&self) -> &'static [Interval] {
        match self {
            ChordType::Maj => &MAJ,
            ChordType::Min => &MIN,
            ChordType::Dim => &DIM,
            ChordType::Dim7 => &DIM7,
            ChordType::DimHalf7 => &DIM_HALF7,
            ChordType::Aug => &AUG,
            ChordType::Maj7 => &MAJ7,
            ChordType::Min7 => &MIN7,
            ChordType::Dom7 => &DOM7,
            ChordType::Sus2 => &SUS2,
            ChordType::Sus4 => &SUS4,
        }
    }

    pub fn is_seventh(&self) -> bool {
        self.template().len() == 4
    }

    /// Qualities whose third is minor (written lower case as numerals).
    pub fn has_minor_third(&self) -> bool {
        matches!(
            self,
            ChordType::Min
                | ChordType::Min7
                | ChordType::Dim
                | ChordType::Dim7
                | ChordType::DimHalf7
        )
    }
}

impl fmt::Display for ChordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ChordType {
    type Err = HarmonyError;

    fn from_str(s: &str) -> Result<Self> {
        ChordType::ALL
            .iter()
            .copied()
            .find(|t| t.slug() == s)
            .ok_or_else(|| HarmonyError::UnknownChordType(s.to_string()))
    }
}

/// A chord: a root pitch and a registered chord type, with its tones spelled
/// by stacking the type's interval template on the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ChordRepr", into = "ChordRepr")
)]
pub struct Chord {
    root: Pitch,
    chord_type: ChordType,
    tones: Vec<Pitch>,
}

impl Chord {
    /// Build a chord; fails if any tone would need more than three accidentals.
    pub fn new(root: Pitch, chord_type: ChordType) -> Result<Self> {
        let tones = chord_type
            .template()
            .iter()
            .map(|interval| root.up(*interval))
            .collect::<Result<Vec<_>>>()?;
        Ok(Chord {
            root,
            chord_type,
            tones,
        })
    }

    pub fn root(&self) -> Pitch {
        self.root
    }

    pub fn chord_type(&self) -> ChordType {
        self.chord_type
    }

    /// Spelled chord tones, root first.
    pub fn tones(&self) -> &[Pitch] {
        &self.tones
    }

    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    /// Chord tone at `index`.
    pub fn tone(&self, index: usize) -> Result<Pitch> {
        self.tones
            .get(index)
            .copied()
            .ok_or(HarmonyError::InvalidChordIndex {
                index,
                len: self.tones.len(),
            })
    }

    /// Chord tones as notes in the low octave the voice assigner starts from.
    pub fn notes(&self) -> Vec<Note> {
        self.tones
            .iter()
            .map(|p| Note::new(*p, CHORD_NOTE_OCTAVE))
            .collect()
    }

    /// Index of the first chord tone sounding the given pitch class.
    pub fn index_of_semitone(&self, semitone: u8) -> Option<usize> {
        self.tones.iter().position(|p| p.semitone() == semitone)
    }

    pub fn contains_semitone(&self, semitone: u8) -> bool {
        self.index_of_semitone(semitone).is_some()
    }

    /// True when every tone is spelled exactly as some pitch of `scale`.
    pub fn is_diatonic_in(&self, scale: &Scale) -> bool {
        self.tones.iter().all(|t| scale.contains(*t))
    }

    /// Same chord type and the same sounding root.
    pub fn is_enharmonic(&self, other: &Chord) -> bool {
        self.chord_type == other.chord_type && self.root.is_enharmonic(&other.root)
    }

    /// Canonical name, e.g. "C#dim7".
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.chord_type)
    }
}

impl FromStr for Chord {
    type Err = HarmonyError;

    /// Parse "Ebmaj", "F#dom7", "Bdimhalf7".
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        // Letter, then a run of a single accidental kind
        let mut split = s.chars().next().map(char::len_utf8).unwrap_or(0);
        let rest = &s[split..];
        let accidental = rest.chars().next().filter(|c| *c == '#' || *c == 'b');
        if let Some(acc) = accidental {
            split += rest.chars().take_while(|c| *c == acc).count();
        }
        let (root, chord_type) = s.split_at(split);
        let root: Pitch = root.parse()?;
        let chord_type: ChordType = chord_type.parse()?;
        Chord::new(root, chord_type)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ChordRepr {
    root: String,
    chord_type: String,
}

#[cfg(feature = "serde")]
impl TryFrom<ChordRepr> for Chord {
    type Error = HarmonyError;

    fn try_from(repr: ChordRepr) -> Result<Self> {
        Chord::new(repr.root.parse()?, repr.chord_type.parse()?)
    }
}

#[cfg(feature = "serde")]
impl From<Chord> for ChordRepr {
    fn from(chord: Chord) -> Self {
        ChordRepr {
            root: chord.root.to_string(),
            chord_type: chord.chord_type.slug().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(name: &str) -> Chord {
        name.parse().unwrap()
    }

    fn tone_names(chord: &Chord) -> Vec<String> {
        chord.tones().iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_chord_tones() {
        assert_eq!(tone_names(&chord("Cmaj")), vec!["C", "E", "G"]);
        assert_eq!(tone_names(&chord("Dmin")), vec!["D", "F", "A"]);
        assert_eq!(tone_names(&chord("Bdim")), vec!["B", "D", "F"]);
        assert_eq!(tone_names(&chord("Bdim7")), vec!["B", "D", "F", "Ab"]);
        assert_eq!(tone_names(&chord("Bdimhalf7")), vec!["B", "D", "F", "A"]);
        assert_eq!(tone_names(&chord("Caug")), vec!["C", "E", "G#"]);
        assert_eq!(tone_names(&chord("Cmaj7")), vec!["C", "E", "G", "B"]);
        assert_eq!(tone_names(&chord("Dmin7")), vec!["D", "F", "A", "C"]);
        assert_eq!(tone_names(&chord("Gdom7")), vec!["G", "B", "D", "F"]);
        assert_eq!(tone_names(&chord("Csus2")), vec!["C", "D", "G"]);
        assert_eq!(tone_names(&chord("Csus4")), vec!["C", "F", "G"]);
        assert_eq!(tone_names(&chord("Ebmaj")), vec!["Eb", "G", "Bb"]);
        assert_eq!(tone_names(&chord("F#dom7")), vec!["F#", "A#", "C#", "E"]);
    }

    #[test]
    fn test_chord_names() {
        assert_eq!(chord("Bbmaj").to_string(), "Bbmaj");
        assert_eq!(chord("Bbmaj").root(), "Bb".parse().unwrap());
        assert_eq!(chord("Bdimhalf7").chord_type(), ChordType::DimHalf7);
        assert_eq!(chord("Bbbmin").root().sharp(), -2);
        assert_eq!(
            "Cfoo".parse::<Chord>(),
            Err(HarmonyError::UnknownChordType("foo".to_string()))
        );
        assert!("Hmaj".parse::<Chord>().is_err());
        assert!("".parse::<Chord>().is_err());
    }

    #[test]
    fn test_chord_type_registry() {
        for chord_type in ChordType::ALL {
            assert_eq!(chord_type.slug().parse::<ChordType>().unwrap(), chord_type);
        }
        assert!(ChordType::Dom7.is_seventh());
        assert!(!ChordType::Aug.is_seventh());
        assert!(ChordType::DimHalf7.has_minor_third());
        assert!(!ChordType::Dom7.has_minor_third());
    }

    #[test]
    fn test_chord_notes_and_indices() {
        let g7 = chord("Gdom7");
        let notes = g7.notes();
        assert_eq!(notes.len(), 4);
        assert!(notes.iter().all(|n| n.octave() == CHORD_NOTE_OCTAVE));
        assert_eq!(g7.index_of_semitone(5), Some(3));
        assert_eq!(g7.index_of_semitone(0), None);
        assert_eq!(
            g7.tone(4),
            Err(HarmonyError::InvalidChordIndex { index: 4, len: 4 })
        );
    }

    #[test]
    fn test_enharmonic_chords() {
        assert!(chord("Gbdom7").is_enharmonic(&chord("F#dom7")));
        assert!(!chord("Gbmaj").is_enharmonic(&chord("F#dom7")));
        assert_ne!(chord("Gbdom7"), chord("F#dom7"));
    }
}
