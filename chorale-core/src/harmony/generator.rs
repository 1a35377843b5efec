//! Candidate chords and their inversion/doubling layouts

use crate::error::Result;
use crate::types::{Chord, ChordChoice, ChordType, Pitch, Scale};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Draws a [`ChordSampler`] makes before giving up.
pub const MAX_SAMPLE_ATTEMPTS: u32 = 10_000;

const TRIAD_DOUBLINGS: [[usize; 4]; 5] = [
    [0, 0, 1, 2],
    [0, 1, 1, 2],
    [0, 1, 2, 2],
    [0, 0, 1, 1],
    [0, 0, 0, 1],
];

const SEVENTH_DOUBLINGS: [[usize; 4]; 3] = [[0, 1, 2, 3], [0, 0, 1, 3], [0, 1, 1, 3]];

/// Every chord type on every chromatic root, roots ascending from C and
/// spelled with sharps.
pub fn all_chords() -> Result<Vec<Chord>> {
    let mut chords = Vec::with_capacity(12 * ChordType::ALL.len());
    for semitone in 0..12 {
        let root = Pitch::from_semitone(semitone);
        for chord_type in ChordType::ALL {
            chords.push(Chord::new(root, chord_type)?);
        }
    }
    Ok(chords)
}

/// Like [`all_chords`] but with roots respelled to suit `scale`.
pub fn all_chords_for_scale(scale: &Scale) -> Result<Vec<Chord>> {
    all_chords()?
        .into_iter()
        .map(|c| Chord::new(c.root().enharmonic(Some(scale)), c.chord_type()))
        .collect()
}

/// The curated inversion and doubling layouts for `chord`: five doublings
/// per triad inversion, three per seventh-chord inversion.
pub fn inversions_and_doublings(chord: &Chord, division: u32) -> Vec<ChordChoice> {
    let doublings: &[[usize; 4]] = match chord.len() {
        3 => &TRIAD_DOUBLINGS,
        4 => &SEVENTH_DOUBLINGS,
        _ => &[],
    };
    (0..chord.len())
        .flat_map(|inversion| {
            doublings.iter().map(move |doubling| ChordChoice {
                chord: chord.clone(),
                inversion,
                doubling: *doubling,
                division,
            })
        })
        .collect()
}

/// Random chords without replacement.
///
/// The pool is refilled with whatever has not been handed out yet; once
/// every chord has been drawn the sampler returns `None` until
/// [`reset`](ChordSampler::reset).
pub struct ChordSampler {
    rng: StdRng,
    pool: Vec<Chord>,
    used: HashSet<String>,
}

impl ChordSampler {
    pub fn new(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(rng: StdRng) -> Self {
        ChordSampler {
            rng,
            pool: Vec::new(),
            used: HashSet::new(),
        }
    }

    /// Number of chords handed out since the last reset.
    pub fn used(&self) -> usize {
        self.used.len()
    }

    pub fn reset(&mut self) {
        self.pool.clear();
        self.used.clear();
    }

    fn refill(&mut self) -> Result<()> {
        let used = &self.used;
        self.pool = all_chords()?
            .into_iter()
            .filter(|c| !used.contains(&c.name()))
            .collect();
        debug!("chord pool refilled with {} chords", self.pool.len());
        Ok(())
    }

    pub fn next_chord(&mut self) -> Result<Option<Chord>> {
        for _ in 0..MAX_SAMPLE_ATTEMPTS {
            if self.pool.is_empty() {
                self.refill()?;
                if self.pool.is_empty() {
                    break;
                }
            }
            let chord = self.pool.swap_remove(self.rng.random_range(0..self.pool.len()));
            if self.used.insert(chord.name()) {
                return Ok(Some(chord));
            }
        }
        warn!("chord sampler exhausted after {} draws", self.used.len());
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_chords_order() {
        let chords = all_chords().unwrap();
        assert_eq!(chords.len(), 12 * ChordType::ALL.len());
        assert_eq!(chords[0].to_string(), "Cmaj");
        assert_eq!(chords[1].to_string(), "Cmin");
        assert_eq!(chords[ChordType::ALL.len()].root().to_string(), "C#");
        assert_eq!(chords.last().unwrap().root().to_string(), "B");
    }

    #[test]
    fn test_chords_for_scale_are_respelled() {
        let scale: Scale = "F major".parse().unwrap();
        let chords = all_chords_for_scale(&scale).unwrap();
        assert!(chords.iter().any(|c| c.to_string() == "Bbmaj"));
        assert!(!chords.iter().any(|c| c.to_string() == "A#maj"));
    }

    #[test]
    fn test_inversion_and_doubling_counts() {
        let triad: Chord = "Cmaj".parse().unwrap();
        let seventh: Chord = "Gdom7".parse().unwrap();
        let triad_choices = inversions_and_doublings(&triad, 12);
        assert_eq!(triad_choices.len(), 15);
        assert_eq!(inversions_and_doublings(&seventh, 0).len(), 12);
        assert!(triad_choices.iter().all(|c| c.division == 12));
        assert!(triad_choices.iter().all(|c| c.validate().is_ok()));
        assert_eq!(triad_choices[5].inversion, 1);
        assert_eq!(triad_choices[5].doubling, [0, 0, 1, 2]);
    }

    #[test]
    fn test_sampler_without_replacement() {
        let mut sampler = ChordSampler::new(7);
        let total = all_chords().unwrap().len();
        let mut seen = HashSet::new();
        for _ in 0..total {
            let chord = sampler.next_chord().unwrap().expect("pool not exhausted");
            assert!(seen.insert(chord.name()));
        }
        assert_eq!(sampler.used(), total);
        assert!(sampler.next_chord().unwrap().is_none());

        sampler.reset();
        assert!(sampler.next_chord().unwrap().is_some());
    }

    #[test]
    fn test_sampler_is_deterministic_per_seed() {
        let draw = |seed| {
            let mut sampler = ChordSampler::new(seed);
            (0..5)
                .map(|_| sampler.next_chord().unwrap().unwrap().name())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }
}
