//! Engine parameters and rule weights

use crate::harmony::problems::{ProblemDirection, ProblemKind};
use crate::types::{Note, Part, Pitch};
use std::collections::HashMap;

/// Semitones a part may go below its starting note.
pub const REGISTER_BELOW: i32 = 12;
/// Semitones a part may go above its starting note.
pub const REGISTER_ABOVE: i32 = 7;

/// Settings for one voice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartParams {
    /// Starting note; the part's register is derived from it.
    pub note: Note,
}

/// Inclusive register limits in global semitones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    pub low: i32,
    pub high: i32,
}

impl Register {
    pub fn contains(&self, global_semitone: i32) -> bool {
        (self.low..=self.high).contains(&global_semitone)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineParams {
    pub beats_per_bar: u32,
    pub tempo: u32,
    /// Soprano, alto, tenor, bass
    pub parts: [PartParams; 4],
}

impl Default for EngineParams {
    fn default() -> Self {
        let part = |degree: u8, octave: i8| PartParams {
            note: Note::new(Pitch::natural(degree), octave),
        };
        EngineParams {
            beats_per_bar: 4,
            tempo: 70,
            // C5, A4, C4, E3
            parts: [part(0, 5), part(5, 4), part(0, 4), part(2, 3)],
        }
    }
}

impl EngineParams {
    pub fn part(&self, part: Part) -> &PartParams {
        &self.parts[part.index()]
    }

    /// Starting note of a part as a global semitone.
    pub fn starting_semitone(&self, part: Part) -> i32 {
        self.part(part).note.global_semitone()
    }

    /// Register: an octave below to a fifth above the starting note.
    pub fn register(&self, part: Part) -> Register {
        let start = self.starting_semitone(part);
        Register {
            low: start - REGISTER_BELOW,
            high: start + REGISTER_ABOVE,
        }
    }
}

/// Per-direction multipliers for each problem kind. Missing entries count
/// as 1.0.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProblemWeights {
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    pub own: HashMap<ProblemKind, f64>,
    pub prev: HashMap<ProblemKind, f64>,
    pub next: HashMap<ProblemKind, f64>,
}

impl ProblemWeights {
    pub fn weight(&self, direction: ProblemDirection, kind: ProblemKind) -> f64 {
        self.table(direction).get(&kind).copied().unwrap_or(1.0)
    }

    pub fn set(&mut self, direction: ProblemDirection, kind: ProblemKind, weight: f64) {
        let table = match direction {
            ProblemDirection::Own => &mut self.own,
            ProblemDirection::Prev => &mut self.prev,
            ProblemDirection::Next => &mut self.next,
        };
        table.insert(kind, weight);
    }

    fn table(&self, direction: ProblemDirection) -> &HashMap<ProblemKind, f64> {
        match direction {
            ProblemDirection::Own => &self.own,
            ProblemDirection::Prev => &self.prev,
            ProblemDirection::Next => &self.next,
        }
    }
}

/// Everything the orchestration layer needs, loadable as one document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub params: EngineParams,
    pub weights: ProblemWeights,
}
