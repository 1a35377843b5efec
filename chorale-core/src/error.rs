//! Error type shared by every fallible operation in the core.

use thiserror::Error;

/// Errors raised while building or combining harmonic values.
///
/// All of these are fatal for the computation that hit them: they signal a
/// caller passing an unregistered identifier or an arithmetic path that left
/// the representable pitch space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarmonyError {
    #[error("invalid pitch: degree {degree}, sharp {sharp} (sharp must be within -3..=3)")]
    InvalidPitch { degree: i32, sharp: i32 },

    #[error("unknown chord type: {0}")]
    UnknownChordType(String),

    #[error("unknown scale template: {0}")]
    UnknownScaleTemplate(String),

    #[error("invalid pitch name: {0}")]
    InvalidPitchName(String),

    #[error("invalid note name: {0}")]
    InvalidNoteName(String),

    #[error("chord tone index {index} out of range for a {len}-note chord")]
    InvalidChordIndex { index: usize, len: usize },

    #[error("invalid melody: {0}")]
    InvalidMelody(String),
}

pub type Result<T> = std::result::Result<T, HarmonyError>;
