// chorale-core/src/types/mod.rs

pub mod chord;
pub mod chord_choice;
pub mod note;
pub mod pitch;
pub mod roman_numeral;
pub mod scale;
pub mod timeline;

pub use chord::{Chord, ChordType};
pub use chord_choice::ChordChoice;
pub use note::Note;
pub use pitch::{semitone_distance, Direction, Interval, IntervalQuality, Pitch};
pub use roman_numeral::{RomanNumeral, SecondaryNumeral};
pub use scale::{Scale, ScaleTemplate};
pub use timeline::{NoteSource, Part, RichNote, Timeline, BEAT_LENGTH};
