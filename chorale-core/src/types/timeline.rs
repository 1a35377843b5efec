//! Division-indexed note storage shared by the melody adapters, the voice
//! assigner and the orchestration layer.

use crate::types::chord::Chord;
use crate::types::note::Note;
use crate::types::scale::Scale;
use std::collections::BTreeMap;
use std::fmt;

/// Divisions per quarter note.
pub const BEAT_LENGTH: u32 = 12;

/// The four voices, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Part {
    Soprano = 0,
    Alto = 1,
    Tenor = 2,
    Bass = 3,
}

impl Part {
    pub const ALL: [Part; 4] = [Part::Soprano, Part::Alto, Part::Tenor, Part::Bass];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Part> {
        Part::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Part::Soprano => "soprano",
            Part::Alto => "alto",
            Part::Tenor => "tenor",
            Part::Bass => "bass",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a timeline note came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteSource {
    /// Fixed input melody; never overwritten by voicing
    Melody,
    /// Placed by the voice assigner
    Voiced,
}

/// A note in the timeline with its harmonic context.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RichNote {
    pub note: Note,
    /// Length in divisions
    pub duration: u32,
    pub part: Part,
    pub chord: Option<Chord>,
    pub scale: Scale,
    pub tension: f32,
    pub source: NoteSource,
}

impl RichNote {
    pub fn melody(note: Note, duration: u32, scale: Scale) -> Self {
        RichNote {
            note,
            duration,
            part: Part::Soprano,
            chord: None,
            scale,
            tension: 0.0,
            source: NoteSource::Melody,
        }
    }

    pub fn voiced(note: Note, part: Part, chord: Chord, scale: Scale) -> Self {
        RichNote {
            note,
            duration: BEAT_LENGTH,
            part,
            chord: Some(chord),
            scale,
            tension: 0.0,
            source: NoteSource::Voiced,
        }
    }

    pub fn is_melody(&self) -> bool {
        self.source == NoteSource::Melody
    }
}

/// Sparse map from division to the notes starting there, at most one per part.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeline {
    divisions: BTreeMap<u32, Vec<RichNote>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    /// Number of populated divisions
    pub fn len(&self) -> usize {
        self.divisions.len()
    }

    /// Place a note, replacing whatever the same part had at that division.
    pub fn insert(&mut self, division: u32, note: RichNote) {
        let notes = self.divisions.entry(division).or_default();
        notes.retain(|n| n.part != note.part);
        notes.push(note);
        notes.sort_by_key(|n| n.part);
    }

    pub fn remove(&mut self, division: u32, part: Part) -> Option<RichNote> {
        let notes = self.divisions.get_mut(&division)?;
        let index = notes.iter().position(|n| n.part == part)?;
        let removed = notes.remove(index);
        if notes.is_empty() {
            self.divisions.remove(&division);
        }
        Some(removed)
    }

    pub fn notes_at(&self, division: u32) -> &[RichNote] {
        self.divisions
            .get(&division)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn note_at(&self, division: u32, part: Part) -> Option<&RichNote> {
        self.notes_at(division).iter().find(|n| n.part == part)
    }

    /// The fixed melody note at a division, if any.
    pub fn melody_at(&self, division: u32) -> Option<&RichNote> {
        self.note_at(division, Part::Soprano).filter(|n| n.is_melody())
    }

    /// Nearest populated division strictly before `division`.
    pub fn previous_division(&self, division: u32) -> Option<u32> {
        self.divisions.range(..division).next_back().map(|(d, _)| *d)
    }

    /// Nearest populated division strictly after `division`.
    pub fn next_division(&self, division: u32) -> Option<u32> {
        self.divisions
            .range(division.saturating_add(1)..)
            .next()
            .map(|(d, _)| *d)
    }

    pub fn last_division(&self) -> Option<u32> {
        self.divisions.keys().next_back().copied()
    }

    /// Shorten notes at the nearest earlier division so they end by `division`.
    pub fn cap_previous(&mut self, division: u32) {
        if let Some(prev) = self.previous_division(division) {
            let max_duration = division - prev;
            if let Some(notes) = self.divisions.get_mut(&prev) {
                for note in notes.iter_mut() {
                    note.duration = note.duration.min(max_duration);
                }
            }
        }
    }

    /// Iterate divisions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[RichNote])> {
        self.divisions.iter().map(|(d, notes)| (*d, notes.as_slice()))
    }

    /// Re-key every note.
    pub fn set_scale(&mut self, scale: Scale) {
        for note in self.divisions.values_mut().flatten() {
            note.scale = scale;
        }
    }

    /// Back-fill durations: every note lasts until its part's next note.
    /// The last note of each part keeps its duration.
    pub fn close_up(&mut self) {
        let mut last_seen: [Option<u32>; 4] = [None; 4];
        let divisions: Vec<u32> = self.divisions.keys().copied().collect();
        for division in divisions {
            let parts: Vec<Part> = self.notes_at(division).iter().map(|n| n.part).collect();
            for part in parts {
                if let Some(prev) = last_seen[part.index()] {
                    if let Some(note) = self
                        .divisions
                        .get_mut(&prev)
                        .and_then(|notes| notes.iter_mut().find(|n| n.part == part))
                    {
                        note.duration = division - prev;
                    }
                }
                last_seen[part.index()] = Some(division);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_major() -> Scale {
        "C major".parse().unwrap()
    }

    fn melody_note(name: &str, duration: u32) -> RichNote {
        RichNote::melody(name.parse().unwrap(), duration, c_major())
    }

    #[test]
    fn test_insert_replaces_part() {
        let mut timeline = Timeline::new();
        timeline.insert(0, melody_note("C5", 12));
        timeline.insert(0, melody_note("D5", 12));
        assert_eq!(timeline.notes_at(0).len(), 1);
        assert_eq!(timeline.notes_at(0)[0].note.to_string(), "D5");
    }

    #[test]
    fn test_notes_sorted_by_part() {
        let mut timeline = Timeline::new();
        let chord: Chord = "Cmaj".parse().unwrap();
        timeline.insert(0, RichNote::voiced("C3".parse().unwrap(), Part::Bass, chord.clone(), c_major()));
        timeline.insert(0, RichNote::voiced("E4".parse().unwrap(), Part::Alto, chord, c_major()));
        timeline.insert(0, melody_note("G5", 12));
        let parts: Vec<Part> = timeline.notes_at(0).iter().map(|n| n.part).collect();
        assert_eq!(parts, vec![Part::Soprano, Part::Alto, Part::Bass]);
        assert!(timeline.melody_at(0).is_some());
        assert!(timeline.note_at(0, Part::Tenor).is_none());
    }

    #[test]
    fn test_neighbour_divisions() {
        let mut timeline = Timeline::new();
        timeline.insert(0, melody_note("C5", 12));
        timeline.insert(24, melody_note("D5", 12));
        assert_eq!(timeline.previous_division(24), Some(0));
        assert_eq!(timeline.previous_division(12), Some(0));
        assert_eq!(timeline.previous_division(0), None);
        assert_eq!(timeline.next_division(0), Some(24));
        assert_eq!(timeline.next_division(24), None);
        assert_eq!(timeline.last_division(), Some(24));
    }

    #[test]
    fn test_cap_previous() {
        let mut timeline = Timeline::new();
        timeline.insert(0, melody_note("C5", 48));
        timeline.cap_previous(12);
        assert_eq!(timeline.notes_at(0)[0].duration, 12);
        // Never lengthens
        timeline.cap_previous(36);
        assert_eq!(timeline.notes_at(0)[0].duration, 12);
    }

    #[test]
    fn test_close_up() {
        let mut timeline = Timeline::new();
        let chord: Chord = "Cmaj".parse().unwrap();
        timeline.insert(0, melody_note("C5", 3));
        timeline.insert(0, RichNote::voiced("C3".parse().unwrap(), Part::Bass, chord.clone(), c_major()));
        timeline.insert(12, melody_note("D5", 3));
        timeline.insert(36, melody_note("E5", 6));
        timeline.insert(36, RichNote::voiced("C3".parse().unwrap(), Part::Bass, chord, c_major()));
        timeline.close_up();

        assert_eq!(timeline.note_at(0, Part::Soprano).unwrap().duration, 12);
        assert_eq!(timeline.note_at(12, Part::Soprano).unwrap().duration, 24);
        assert_eq!(timeline.note_at(36, Part::Soprano).unwrap().duration, 6);
        // Bass skipped division 12
        assert_eq!(timeline.note_at(0, Part::Bass).unwrap().duration, 36);
        assert_eq!(timeline.note_at(36, Part::Bass).unwrap().duration, BEAT_LENGTH);
    }

    #[test]
    fn test_set_scale() {
        let mut timeline = Timeline::new();
        timeline.insert(0, melody_note("C5", 12));
        timeline.insert(12, melody_note("D5", 12));
        let g_major: Scale = "G major".parse().unwrap();
        timeline.set_scale(g_major);
        assert!(timeline
            .iter()
            .flat_map(|(_, notes)| notes)
            .all(|n| n.scale == g_major));
    }

    #[test]
    fn test_remove() {
        let mut timeline = Timeline::new();
        timeline.insert(0, melody_note("C5", 12));
        assert!(timeline.remove(0, Part::Soprano).is_some());
        assert!(timeline.is_empty());
        assert!(timeline.remove(0, Part::Soprano).is_none());
    }
}
