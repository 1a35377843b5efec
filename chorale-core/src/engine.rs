//! Orchestration: voicing whole progressions and ranking chord candidates

use crate::config::EngineConfig;
use crate::error::Result;
use crate::harmony::generator::{all_chords_for_scale, inversions_and_doublings};
use crate::harmony::problems::{ChordProblem, ProblemDirection, ProblemScorer, VoicedChord};
use crate::harmony::progression::ProgressionResolver;
use crate::harmony::voicing::{VoiceAssigner, Voicing};
use crate::types::{ChordChoice, Scale, Timeline};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Result of [`Harmonizer::harmonize`].
#[derive(Debug, Clone, Default)]
pub struct Harmonization {
    pub timeline: Timeline,
    pub voicings: BTreeMap<u32, Voicing>,
    /// Divisions whose choice could not be voiced
    pub skipped: Vec<u32>,
}

/// A candidate for one division with its voicing and problems.
#[derive(Debug, Clone)]
pub struct ScoredChoice {
    pub choice: ChordChoice,
    pub voicing: Voicing,
    pub own: ChordProblem,
    pub prev: Option<ChordProblem>,
    pub next: Option<ChordProblem>,
    pub total: f64,
}

/// Ties the voice assigner, the scorer and a progression cache to one
/// configuration.
#[derive(Debug, Default)]
pub struct Harmonizer {
    config: EngineConfig,
    resolver: ProgressionResolver,
}

impl Harmonizer {
    pub fn new(config: EngineConfig) -> Self {
        Harmonizer {
            config,
            resolver: ProgressionResolver::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ProgressionResolver {
        &self.resolver
    }

    fn assigner(&self) -> VoiceAssigner<'_> {
        VoiceAssigner::new(&self.config.params)
    }

    /// Voice `choices` in division order on top of `melody`, then stretch
    /// every note to the next one in its part.
    pub fn harmonize(
        &self,
        melody: &Timeline,
        scale: &Scale,
        choices: &BTreeMap<u32, ChordChoice>,
    ) -> Harmonization {
        let assigner = self.assigner();
        let mut result = Harmonization {
            timeline: melody.clone(),
            ..Default::default()
        };

        for (division, choice) in choices {
            let choice = choice.at(*division);
            match assigner.assign(&choice, &mut result.timeline, scale) {
                Some(voicing) => {
                    result.voicings.insert(*division, voicing);
                }
                None => {
                    warn!("could not voice {} at division {}", choice, division);
                    result.skipped.push(*division);
                }
            }
        }
        result.timeline.close_up();
        info!(
            "harmonized {} of {} chords",
            result.voicings.len(),
            choices.len()
        );
        result
    }

    /// Every generated chord, inversion and doubling for `division`, voiced
    /// between `prev` and `next` and sorted by total score (lowest first,
    /// enumeration order on ties). Candidates that cannot be voiced are left
    /// out.
    pub fn chord_choices(
        &self,
        timeline: &Timeline,
        division: u32,
        scale: &Scale,
        prev: Option<&ChordChoice>,
        next: Option<&ChordChoice>,
    ) -> Result<Vec<ScoredChoice>> {
        let assigner = self.assigner();
        let scorer = ProblemScorer::new(&self.resolver);
        let weights = &self.config.weights;

        let mut base = timeline.clone();
        let prev_voiced = prev.and_then(|p| {
            assigner
                .assign(p, &mut base, scale)
                .map(|voicing| (p, voicing))
        });

        let mut scored = Vec::new();
        for chord in all_chords_for_scale(scale)? {
            for choice in inversions_and_doublings(&chord, division) {
                let mut scratch = base.clone();
                let Some(voicing) = assigner.assign(&choice, &mut scratch, scale) else {
                    continue;
                };
                let current = VoicedChord::new(&choice, scale, &voicing);
                let own = scorer.chord_problem(&current);
                let mut total = own.total_score(weights, ProblemDirection::Own);

                let prev_problem = match &prev_voiced {
                    Some((p, v)) => {
                        let problem =
                            scorer.problems_between(&VoicedChord::new(p, scale, v), &current)?;
                        total += problem.total_score(weights, ProblemDirection::Prev);
                        Some(problem)
                    }
                    None => None,
                };

                let next_problem = match next {
                    Some(n) => match assigner.assign(n, &mut scratch, scale) {
                        Some(v) => {
                            let problem =
                                scorer.problems_between(&current, &VoicedChord::new(n, scale, &v))?;
                            total += problem.total_score(weights, ProblemDirection::Next);
                            Some(problem)
                        }
                        None => None,
                    },
                    None => None,
                };

                scored.push(ScoredChoice {
                    choice: choice.clone(),
                    voicing,
                    own,
                    prev: prev_problem,
                    next: next_problem,
                    total,
                });
            }
        }

        scored.sort_by(|a, b| a.total.total_cmp(&b.total));
        debug!(
            "{} candidates at division {}, best {:?}",
            scored.len(),
            division,
            scored.first().map(|s| s.total)
        );
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_lilypond;
    use crate::types::{Chord, Part};

    fn choice(chord: &str, inversion: usize, doubling: [usize; 4], division: u32) -> ChordChoice {
        let chord: Chord = chord.parse().unwrap();
        ChordChoice::new(chord, inversion, doubling, division).unwrap()
    }

    #[test]
    fn test_harmonize_melody() {
        let scale: Scale = "C major".parse().unwrap();
        let melody = parse_lilypond("c' b c'2", &scale).unwrap();
        let mut choices = BTreeMap::new();
        choices.insert(0, choice("Cmaj", 0, [0, 0, 1, 2], 0));
        choices.insert(12, choice("Gmaj", 0, [0, 0, 1, 2], 0));
        choices.insert(24, choice("Cmaj", 0, [0, 0, 1, 2], 0));

        let harmonizer = Harmonizer::default();
        let result = harmonizer.harmonize(&melody, &scale, &choices);
        assert!(result.skipped.is_empty());
        assert_eq!(result.voicings.len(), 3);
        assert_eq!(result.voicings[&12].division, 12);

        for division in [0, 12, 24] {
            assert_eq!(result.timeline.notes_at(division).len(), 4);
            let soprano = result.timeline.note_at(division, Part::Soprano).unwrap();
            assert!(soprano.is_melody());
        }
        // Closed up: each bass note lasts until the next one
        assert_eq!(result.timeline.note_at(0, Part::Bass).unwrap().duration, 12);
        assert_eq!(result.timeline.note_at(12, Part::Bass).unwrap().duration, 12);
        assert_eq!(result.timeline.note_at(24, Part::Soprano).unwrap().duration, 24);
    }

    #[test]
    fn test_chord_choices_ranked() {
        let scale: Scale = "C major".parse().unwrap();
        let melody = parse_lilypond("c' b", &scale).unwrap();
        let prev = choice("Cmaj", 0, [0, 0, 1, 2], 0);

        let harmonizer = Harmonizer::default();
        let ranked = harmonizer
            .chord_choices(&melody, 12, &scale, Some(&prev), None)
            .unwrap();
        assert!(!ranked.is_empty());
        assert!(ranked.windows(2).all(|w| w[0].total <= w[1].total));
        assert!(ranked.iter().all(|s| s.choice.division == 12));
        assert!(ranked.iter().all(|s| s.prev.is_some() && s.next.is_none()));

        // The melody B must be a chord tone of the winner
        let best = &ranked[0];
        assert!(best.choice.chord.contains_semitone(11), "{}", best.choice);
        assert!(best.voicing.melody_fixed);
    }
}
