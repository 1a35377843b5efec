// chorale-core/src/parser/mod.rs

pub mod lilypond;
pub mod melody;

pub use lilypond::parse_lilypond;
pub use melody::{melody_to_timeline, DurationCode, MelodyNote};
