// chorale-core/src/types/roman_numeral.rs
use crate::error::Result;
use crate::types::chord::{Chord, ChordType};
use crate::types::pitch::{Interval, Pitch};
use crate::types::scale::{Scale, ScaleTemplate};
use std::fmt;

const NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// A chord's function label relative to a key, e.g. `bII7`, `vii°`, `iiø7`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RomanNumeral {
    /// Scale degree of the root, 0-based
    pub degree: u8,
    /// -1 when the root is flattened against the scale, +1 when sharpened
    pub accidental: i8,
    pub chord_type: ChordType,
}

impl RomanNumeral {
    /// Label `chord` in `scale`. Roots outside the scale get a `#`/`b` prefix
    /// relative to the scale pitch on the same letter.
    pub fn analyze(chord: &Chord, scale: &Scale) -> Self {
        let degree = Interval::between(scale.root(), chord.root()).degree();
        let accidental = if scale.contains(chord.root()) {
            0
        } else {
            let scale_pitch = scale.pitches()[degree as usize];
            (chord.root().sharp() - scale_pitch.sharp()).signum()
        };
        RomanNumeral {
            degree,
            accidental,
            chord_type: chord.chord_type(),
        }
    }

    fn quality_suffix(&self) -> &'static str {
        match self.chord_type {
            ChordType::Dim | ChordType::Dim7 => "°",
            ChordType::DimHalf7 => "ø",
            ChordType::Aug => "+",
            ChordType::Sus2 => "sus2",
            ChordType::Sus4 => "sus4",
            _ => "",
        }
    }
}

impl fmt::Display for RomanNumeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.accidental {
            a if a > 0 => f.write_str("#")?,
            a if a < 0 => f.write_str("b")?,
            _ => {}
        }
        let numeral = NUMERALS[self.degree as usize];
        if self.chord_type.has_minor_third() {
            f.write_str(&numeral.to_lowercase())?;
        } else {
            f.write_str(numeral)?;
        }
        f.write_str(self.quality_suffix())?;
        if self.chord_type.is_seventh() {
            f.write_str("7")?;
        }
        Ok(())
    }
}

/// Secondary function label such as `V/V` or `vii°/ii`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryNumeral {
    /// The chord's function in the tonicized key
    pub function: RomanNumeral,
    /// The key the chord points at, as a triad of the analysed scale
    pub target: RomanNumeral,
    pub key: Scale,
}

impl SecondaryNumeral {
    /// Find the first key (major, minor, harmonic minor, in that order) in
    /// which `chord` works as a V, ii or vii and whose tonic triad belongs to
    /// `scale`. Returns `None` when no such reading exists.
    pub fn analyze(chord: &Chord, scale: &Scale) -> Result<Option<Self>> {
        for template in ScaleTemplate::ALL {
            for root in Self::candidate_key_roots(chord, template)? {
                let key = Scale::new(root, template)?;
                if key.root() == scale.root() || !chord.is_diatonic_in(&key) {
                    continue;
                }
                let tonic = &key.diatonic_triads()?[0];
                if !tonic.is_diatonic_in(scale) {
                    continue;
                }
                return Ok(Some(SecondaryNumeral {
                    function: RomanNumeral::analyze(chord, &key),
                    target: RomanNumeral::analyze(tonic, scale),
                    key,
                }));
            }
        }
        Ok(None)
    }

    /// Keys in which the chord could sit on degree 5 (dominants), 2 (ii) or
    /// 7 (vii), depending on its quality.
    fn candidate_key_roots(chord: &Chord, template: ScaleTemplate) -> Result<Vec<Pitch>> {
        let intervals = template.intervals();
        let mut degrees = Vec::new();
        match chord.chord_type() {
            ChordType::Dom7 | ChordType::Maj => degrees.push(4),
            ChordType::Min | ChordType::Min7 => degrees.push(1),
            ChordType::Dim | ChordType::Dim7 => degrees.extend([1, 6]),
            _ => {}
        }
        degrees
            .into_iter()
            .map(|d| chord.root().down(intervals[d]))
            .collect()
    }
}

impl fmt::Display for SecondaryNumeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.function, self.target)
    }
}
