//! Which chords may follow a given chord in a given scale
//!
//! Diatonic chords follow a fixed functional table. Chromatic chords are
//! explained either as substitutions of diatonic ones (modal mixture,
//! tritone substitution) or as diatonic chords of a neighbouring key
//! (secondary V, ii and vii), and inherit the successors of what they stand
//! for. Results for a top-level query are cached for the life of the
//! resolver.

use crate::error::Result;
use crate::types::{Chord, ChordType, Interval, RomanNumeral, Scale, ScaleTemplate};
use log::{debug, trace};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, RwLock};

/// Score of a chord that is diatonic in the scale it was reached in.
pub const DIATONIC_SCORE: u32 = 0;
/// Score of staying on the same chord.
pub const SELF_SCORE: u32 = 1;
/// Added for every substitution step.
pub const SUBSTITUTION_COST: u32 = 2;
/// Added for every detour through a secondary key.
pub const SECONDARY_KEY_COST: u32 = 1;
/// Score of a secondary dominant, ii or vii added for a result chord.
pub const SECONDARY_FUNCTION_SCORE: u32 = 2;

/// A legal successor with an explanation. Lower scores are more natural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Progression {
    pub chord: Chord,
    pub reason: String,
    pub score: u32,
}

impl Progression {
    fn new(chord: Chord, reason: impl Into<String>, score: u32) -> Self {
        Progression {
            chord,
            reason: reason.into(),
            score,
        }
    }
}

/// Chords that may stand in for `chord` in `scale`: the chords on the same
/// degree of the parallel mode when `chord` is diatonic, plus the tritone
/// substitute of a dominant seventh. Never contains `chord` itself.
pub fn chord_substitutions(chord: &Chord, scale: &Scale) -> Result<Vec<Chord>> {
    let mut substitutions = Vec::new();

    if chord.is_diatonic_in(scale) {
        if let Some(degree) = scale.degree_of(chord.root()) {
            for template in scale.template().parallel() {
                let parallel = Scale::new(scale.root(), *template)?;
                let by_degree = parallel.diatonic_chords_by_degree()?;
                substitutions.extend(by_degree[degree].iter().cloned());
            }
        }
    }

    if chord.chord_type() == ChordType::Dom7 {
        let tritone = chord
            .root()
            .up(Interval::AUGMENTED_FOURTH)?
            .enharmonic(Some(scale));
        substitutions.push(Chord::new(tritone, ChordType::Dom7)?);
    }

    substitutions.retain(|c| c != chord);
    Ok(substitutions)
}

/// Diatonic successors of a diatonic chord. Empty for chromatic chords.
pub fn diatonic_progression_choices(chord: &Chord, scale: &Scale) -> Result<Vec<Chord>> {
    if !chord.is_diatonic_in(scale) {
        return Ok(Vec::new());
    }
    let Some(degree) = scale.degree_of(chord.root()) else {
        return Ok(Vec::new());
    };

    let by_degree = scale.diatonic_chords_by_degree()?;
    let gather = |degrees: &[usize]| -> Vec<Chord> {
        degrees
            .iter()
            .flat_map(|d| by_degree[*d].iter().cloned())
            .collect()
    };

    const TONIC: &[usize] = &[0, 5];
    const SUBDOMINANT: &[usize] = &[1, 3];
    const DOMINANT: &[usize] = &[4, 6];

    let successors = match degree {
        // Anything may follow the tonic
        0 => gather(&[0, 1, 2, 3, 4, 5, 6]),
        1 => gather(DOMINANT),
        2 => gather(&[5, 3]),
        3 => [gather(&[0, 1]), gather(DOMINANT)].concat(),
        4 => [gather(TONIC), gather(DOMINANT)].concat(),
        5 => [gather(&[2]), gather(SUBDOMINANT)].concat(),
        _ => gather(TONIC),
    };
    Ok(successors)
}

/// Legal successors of `chord` in `scale`, using the process-wide resolver.
pub fn progression_choices(chord: &Chord, scale: &Scale) -> Result<Arc<Vec<Progression>>> {
    shared_resolver().choices(chord, scale)
}

static SHARED: OnceLock<ProgressionResolver> = OnceLock::new();

/// The resolver shared by the whole process.
pub fn shared_resolver() -> &'static ProgressionResolver {
    SHARED.get_or_init(ProgressionResolver::new)
}

/// Pick the entry for `target` with the lowest score, breaking ties by the
/// shortest reason and then by position. Chords match enharmonically.
pub fn best_match<'a>(entries: &'a [Progression], target: &Chord) -> Option<&'a Progression> {
    entries
        .iter()
        .filter(|p| p.chord.is_enharmonic(target))
        .min_by_key(|p| (p.score, p.reason.len()))
}

type CacheKey = (String, String);

/// Memoizing progression resolver.
///
/// The cache only ever grows; entries are computed outside the lock and the
/// first writer for a key wins, so concurrent duplicate work is harmless.
#[derive(Debug, Default)]
pub struct ProgressionResolver {
    cache: RwLock<HashMap<CacheKey, Arc<Vec<Progression>>>>,
}

impl ProgressionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached queries
    pub fn cached(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Legal successors of `chord` in `scale`, deduplicated by
    /// (chord, reason) and in discovery order.
    pub fn choices(&self, chord: &Chord, scale: &Scale) -> Result<Arc<Vec<Progression>>> {
        let key = (chord.name(), scale.name());
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(&key) {
                trace!("progression cache hit for {} in {}", key.0, key.1);
                return Ok(Arc::clone(hit));
            }
        }

        debug!("resolving progressions for {} in {}", key.0, key.1);
        let mut visited = HashSet::new();
        let computed = Arc::new(self.resolve(chord, scale, scale, &mut visited)?);

        match self.cache.write() {
            Ok(mut cache) => Ok(Arc::clone(cache.entry(key).or_insert(computed))),
            Err(_) => Ok(computed),
        }
    }

    /// One step of the walk. `visited` holds every (chord, scale) pair
    /// entered during the current top-level query; a repeat yields nothing.
    fn resolve(
        &self,
        chord: &Chord,
        scale: &Scale,
        home: &Scale,
        visited: &mut HashSet<CacheKey>,
    ) -> Result<Vec<Progression>> {
        let key = (chord.name(), scale.name());
        if !visited.insert(key) {
            trace!("already visited {} in {}", chord, scale);
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        if chord.is_diatonic_in(scale) {
            let reason = format!("diatonic in {}", scale);
            found.extend(
                diatonic_progression_choices(chord, scale)?
                    .into_iter()
                    .map(|c| Progression::new(c, reason.clone(), DIATONIC_SCORE)),
            );
        } else {
            for substitution in chord_substitutions(chord, scale)? {
                found.extend(
                    self.resolve(&substitution, scale, home, visited)?
                        .into_iter()
                        .map(|p| Progression {
                            score: p.score + SUBSTITUTION_COST,
                            ..p
                        }),
                );
            }
            for key_scale in secondary_keys(chord)? {
                if !chord.is_diatonic_in(&key_scale) {
                    continue;
                }
                found.extend(
                    self.resolve(chord, &key_scale, home, visited)?
                        .into_iter()
                        .map(|p| Progression {
                            reason: format!("{} in scale {}", p.reason, key_scale),
                            score: p.score + SECONDARY_KEY_COST,
                            chord: p.chord,
                        }),
                );
            }
        }
        found.push(Progression::new(chord.clone(), "self", SELF_SCORE));
        let base = dedup(found);

        let mut results = base.clone();
        for progression in &base {
            for substitution in chord_substitutions(&progression.chord, scale)? {
                let reason = format!(
                    "{} is a substitution of {} in scale {}",
                    substitution, progression.chord, scale
                );
                results.push(Progression::new(
                    substitution,
                    reason,
                    progression.score + SUBSTITUTION_COST,
                ));
            }
        }

        if scale == home {
            for progression in &base {
                results.extend(secondary_functions_of(&progression.chord, scale)?);
            }
        }

        Ok(dedup(results))
    }
}

/// Keys in which `chord` could be a V (major chords), a ii (minor and
/// diminished) or a vii (diminished), over every scale template.
fn secondary_keys(chord: &Chord) -> Result<Vec<Scale>> {
    let degrees: &[usize] = match chord.chord_type() {
        ChordType::Dom7 | ChordType::Maj => &[4],
        ChordType::Min | ChordType::Min7 => &[1],
        ChordType::Dim | ChordType::Dim7 => &[1, 6],
        _ => &[],
    };
    let mut keys = Vec::new();
    for degree in degrees {
        for template in ScaleTemplate::ALL {
            let root = chord.root().down(template.intervals()[*degree])?;
            keys.push(Scale::new(root, template)?);
        }
    }
    Ok(keys)
}

/// Chromatic V, ii and vii chords of the key tonicizing `target`.
fn secondary_functions_of(target: &Chord, scale: &Scale) -> Result<Vec<Progression>> {
    let mut found = Vec::new();
    if !matches!(target.chord_type(), ChordType::Maj | ChordType::Min) {
        return Ok(found);
    }
    let target_numeral = RomanNumeral::analyze(target, scale);
    for template in [ScaleTemplate::Major, ScaleTemplate::HarmonicMinor] {
        let key = Scale::new(target.root(), template)?;
        if key.root() == scale.root() || !target.is_diatonic_in(&key) {
            continue;
        }
        let by_degree = key.diatonic_chords_by_degree()?;
        for degree in [4, 1, 6] {
            for candidate in &by_degree[degree] {
                if candidate.is_diatonic_in(scale) {
                    continue;
                }
                let reason = format!(
                    "{} is {} of {}",
                    candidate,
                    RomanNumeral::analyze(candidate, &key),
                    target_numeral
                );
                found.push(Progression::new(
                    candidate.clone(),
                    reason,
                    SECONDARY_FUNCTION_SCORE,
                ));
            }
        }
    }
    Ok(found)
}

/// Keep the first occurrence of each (chord, reason) pair.
fn dedup(progressions: Vec<Progression>) -> Vec<Progression> {
    let mut seen = HashSet::new();
    progressions
        .into_iter()
        .filter(|p| seen.insert((p.chord.name(), p.reason.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(name: &str) -> Chord {
        name.parse().unwrap()
    }

    fn scale(name: &str) -> Scale {
        name.parse().unwrap()
    }

    fn names(chords: &[Chord]) -> Vec<String> {
        chords.iter().map(|c| c.to_string()).collect()
    }

    fn subs(c: &str, s: &str) -> Vec<String> {
        names(&chord_substitutions(&chord(c), &scale(s)).unwrap())
    }

    #[test]
    fn test_modal_mixture_substitutions() {
        assert_eq!(subs("Cmaj", "C major"), vec!["Cmin"]);
        assert_eq!(subs("Dmin", "C major"), vec!["Ddim", "Ddimhalf7"]);
        assert_eq!(subs("Emin", "C major"), vec!["Ebmaj"]);
        assert_eq!(subs("Cmin", "C harmonicMinor"), vec!["Cmaj", "Cmaj7"]);
    }

    #[test]
    fn test_tritone_substitutions() {
        assert_eq!(subs("Cdom7", "C major"), vec!["F#dom7"]);
        assert_eq!(subs("F#dom7", "C major"), vec!["Cdom7"]);
        assert_eq!(subs("Edom7", "E major"), vec!["A#dom7"]);
        // Diatonic dominant: parallel-mode chords first, then the tritone sub
        assert_eq!(subs("Gdom7", "C major"), vec!["Gmaj", "C#dom7"]);
    }

    #[test]
    fn test_chromatic_chord_without_substitutions() {
        assert!(subs("Cmin", "C major").is_empty());
    }

    #[test]
    fn test_diatonic_table() {
        let c_major = scale("C major");
        let from = |c: &str| names(&diatonic_progression_choices(&chord(c), &c_major).unwrap());
        assert_eq!(from("Dmin"), vec!["Gmaj", "Gdom7", "Bdim", "Bdimhalf7"]);
        assert_eq!(from("Emin"), vec!["Amin", "Fmaj", "Fmaj7"]);
        assert_eq!(from("Bdim"), vec!["Cmaj", "Cmaj7", "Amin"]);
        assert_eq!(from("Cmaj").len(), 11);
        assert!(from("Cmin").is_empty());
    }

    #[test]
    fn test_resolver_caches_top_level_queries() {
        let resolver = ProgressionResolver::new();
        let first = resolver.choices(&chord("Cdom7"), &scale("C major")).unwrap();
        assert_eq!(resolver.cached(), 1);
        let second = resolver.choices(&chord("Cdom7"), &scale("C major")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.cached(), 1);
    }

    #[test]
    fn test_results_are_deduplicated() {
        let resolver = ProgressionResolver::new();
        let results = resolver.choices(&chord("Gmaj"), &scale("C major")).unwrap();
        let mut seen = HashSet::new();
        for p in results.iter() {
            assert!(seen.insert((p.chord.name(), p.reason.clone())));
        }
    }

    #[test]
    fn test_self_entry() {
        let resolver = ProgressionResolver::new();
        let results = resolver.choices(&chord("Ebmaj"), &scale("C major")).unwrap();
        let own = results
            .iter()
            .find(|p| p.reason == "self")
            .expect("self entry");
        assert_eq!(own.chord.to_string(), "Ebmaj");
        assert_eq!(own.score, SELF_SCORE);
    }

    #[test]
    fn test_secondary_function_reasons() {
        let resolver = ProgressionResolver::new();
        let results = resolver.choices(&chord("Gmaj"), &scale("C major")).unwrap();
        let d7 = results
            .iter()
            .find(|p| p.chord.to_string() == "Ddom7")
            .expect("secondary dominant of V");
        assert_eq!(d7.reason, "Ddom7 is V7 of V");
        assert_eq!(d7.score, SECONDARY_FUNCTION_SCORE);
    }

    #[test]
    fn test_best_match_prefers_low_score_then_short_reason() {
        let c = chord("Cmaj");
        let entries = vec![
            Progression::new(c.clone(), "a much longer reason", 2),
            Progression::new(c.clone(), "longer reason", 0),
            Progression::new(c.clone(), "short", 0),
            Progression::new(chord("Dmin"), "x", 0),
        ];
        assert_eq!(best_match(&entries, &c).unwrap().reason, "short");
        assert!(best_match(&entries, &chord("Emin")).is_none());
        // Enharmonic spelling still matches
        let entries = vec![Progression::new(chord("Gbdom7"), "tritone", 4)];
        assert!(best_match(&entries, &chord("F#dom7")).is_some());
    }
}
