//! Scales and the diatonic chords they imply

use crate::error::{HarmonyError, Result};
use crate::types::chord::{Chord, ChordType};
use crate::types::pitch::{semitone_distance, Interval, Pitch};
use std::fmt;
use std::str::FromStr;

/// The registered scale templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScaleTemplate {
    Major,
    Minor,
    HarmonicMinor,
}

const MAJOR: [Interval; 7] = [
    Interval::new(0, 0),
    Interval::new(1, 0),
    Interval::new(2, 0),
    Interval::new(3, 0),
    Interval::new(4, 0),
    Interval::new(5, 0),
    Interval::new(6, 0),
];

const MINOR: [Interval; 7] = [
    Interval::new(0, 0),
    Interval::new(1, 0),
    Interval::new(2, -1),
    Interval::new(3, 0),
    Interval::new(4, 0),
    Interval::new(5, -1),
    Interval::new(6, -1),
];

const HARMONIC_MINOR: [Interval; 7] = [
    Interval::new(0, 0),
    Interval::new(1, 0),
    Interval::new(2, -1),
    Interval::new(3, 0),
    Interval::new(4, 0),
    Interval::new(5, -1),
    Interval::new(6, 0),
];

impl ScaleTemplate {
    pub const ALL: [ScaleTemplate; 3] = [
        ScaleTemplate::Major,
        ScaleTemplate::Minor,
        ScaleTemplate::HarmonicMinor,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ScaleTemplate::Major => "major",
            ScaleTemplate::Minor => "minor",
            ScaleTemplate::HarmonicMinor => "harmonicMinor",
        }
    }

    /// Interval of each degree above the root.
    pub fn intervals(&self) -> &'static [Interval; 7] {
        match self {
            ScaleTemplate::Major => &MAJOR,
            ScaleTemplate::Minor => &MINOR,
            ScaleTemplate::HarmonicMinor => &HARMONIC_MINOR,
        }
    }

    /// Triad quality on each degree.
    pub fn triad_qualities(&self) -> [ChordType; 7] {
        use ChordType::*;
        match self {
            ScaleTemplate::Major => [Maj, Min, Min, Maj, Maj, Min, Dim],
            ScaleTemplate::Minor => [Min, Dim, Maj, Min, Min, Maj, Maj],
            ScaleTemplate::HarmonicMinor => [Min, Dim, Maj, Min, Maj, Maj, Dim],
        }
    }

    /// Templates chords may be borrowed from (modal mixture).
    pub fn parallel(&self) -> &'static [ScaleTemplate] {
        match self {
            ScaleTemplate::Major => &[ScaleTemplate::HarmonicMinor],
            ScaleTemplate::Minor | ScaleTemplate::HarmonicMinor => &[ScaleTemplate::Major],
        }
    }
}

impl fmt::Display for ScaleTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ScaleTemplate {
    type Err = HarmonyError;

    fn from_str(s: &str) -> Result<Self> {
        ScaleTemplate::ALL
            .iter()
            .copied()
            .find(|t| t.slug() == s)
            .ok_or_else(|| HarmonyError::UnknownScaleTemplate(s.to_string()))
    }
}

/// A key: root plus template, with its seven pitches spelled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ScaleRepr", into = "ScaleRepr")
)]
pub struct Scale {
    root: Pitch,
    template: ScaleTemplate,
    pitches: [Pitch; 7],
}

impl Scale {
    /// Build a scale. The root is respelled to the registered root with the
    /// same semitone (C# becomes Db, A# becomes Bb).
    pub fn new(root: Pitch, template: ScaleTemplate) -> Result<Self> {
        let root = root.as_scale_root();
        let mut pitches = [root; 7];
        for (slot, interval) in pitches.iter_mut().zip(template.intervals()) {
            *slot = root.up(*interval)?;
        }
        Ok(Scale {
            root,
            template,
            pitches,
        })
    }

    pub fn root(&self) -> Pitch {
        self.root
    }

    pub fn template(&self) -> ScaleTemplate {
        self.template
    }

    pub fn pitches(&self) -> &[Pitch; 7] {
        &self.pitches
    }

    /// Degree (0-based) of a pitch spelled exactly as a scale pitch.
    pub fn degree_of(&self, pitch: Pitch) -> Option<usize> {
        self.pitches.iter().position(|p| *p == pitch)
    }

    pub fn contains(&self, pitch: Pitch) -> bool {
        self.degree_of(pitch).is_some()
    }

    /// Scale degree 7 raised, if needed, to sit a semitone below the root.
    pub fn leading_tone(&self) -> Pitch {
        let seventh = self.pitches[6];
        let gap = semitone_distance(seventh.semitone(), self.root.semitone());
        if gap > 1 {
            Pitch::new(seventh.degree(), seventh.sharp() + gap - 1).unwrap_or(seventh)
        } else {
            seventh
        }
    }

    /// Triad on each degree, quality taken from the template's table.
    pub fn diatonic_triads(&self) -> Result<Vec<Chord>> {
        self.pitches
            .iter()
            .zip(self.template.triad_qualities())
            .map(|(root, quality)| Chord::new(*root, quality))
            .collect()
    }

    /// Per degree: the triad, then whichever of dom7, maj7 and dimhalf7 on
    /// that degree stays inside the scale.
    pub fn diatonic_chords_by_degree(&self) -> Result<Vec<Vec<Chord>>> {
        let triads = self.diatonic_triads()?;
        let sevenths = [ChordType::Dom7, ChordType::Maj7, ChordType::DimHalf7];
        Ok(triads
            .into_iter()
            .zip(self.pitches.iter())
            .map(|(triad, root)| {
                let mut chords = vec![triad];
                chords.extend(
                    sevenths
                        .iter()
                        .filter_map(|t| Chord::new(*root, *t).ok())
                        .filter(|c| c.is_diatonic_in(self)),
                );
                chords
            })
            .collect())
    }

    /// Canonical name, e.g. "D harmonicMinor".
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.template)
    }
}

impl FromStr for Scale {
    type Err = HarmonyError;

    /// Parse "C major", "F# minor", "A harmonicMinor". A bare root means major.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let root: Pitch = parts
            .next()
            .ok_or_else(|| HarmonyError::InvalidPitchName(s.to_string()))?
            .parse()?;
        let template = match parts.next() {
            Some(slug) => slug.parse()?,
            None => ScaleTemplate::Major,
        };
        Scale::new(root, template)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ScaleRepr {
    root: String,
    template: String,
}

#[cfg(feature = "serde")]
impl TryFrom<ScaleRepr> for Scale {
    type Error = HarmonyError;

    fn try_from(repr: ScaleRepr) -> Result<Self> {
        Scale::new(repr.root.parse()?, repr.template.parse()?)
    }
}

#[cfg(feature = "serde")]
impl From<Scale> for ScaleRepr {
    fn from(scale: Scale) -> Self {
        ScaleRepr {
            root: scale.root.to_string(),
            template: scale.template.slug().to_string(),
        }
    }
}
