//! # Chorale Core
//!
//! Rule-driven four-part (SATB) harmony: which chords may follow which,
//! how a chord is spread over soprano, alto, tenor and bass, and how good a
//! chord choice is against a weighted catalog of voice-leading rules.
//!
//! ## Features
//!
//! - **serde**: Serialize/deserialize the boundary types (chords, scales,
//!   chord choices, timelines, configuration)
//! - **colored**: Colored terminal rendering of problem reports
//!
//! ## Example
//!
//! ```ignore
//! use chorale_core::types::{Chord, Scale};
//! use chorale_core::harmony::progression_choices;
//!
//! let scale: Scale = "C major".parse()?;
//! let chord: Chord = "Gdom7".parse()?;
//! for p in progression_choices(&chord, &scale)?.iter() {
//!     println!("{} ({}): {}", p.chord, p.score, p.reason);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod harmony;
pub mod parser;
pub mod types;

// Re-export commonly used types
pub use config::{EngineConfig, EngineParams, ProblemWeights};
pub use engine::{Harmonization, Harmonizer, ScoredChoice};
pub use error::{HarmonyError, Result};
pub use types::{Chord, ChordChoice, ChordType, Note, Pitch, Scale, ScaleTemplate, Timeline};
