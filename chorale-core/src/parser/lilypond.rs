//! LilyPond-style melody text
//!
//! Supported subset, one token per whitespace-separated word:
//!
//! - `c d e f g a b` with `is`/`isis` for sharps and `es`/`eses` for flats
//!   (`es`, `as` and `ases` are accepted as well)
//! - `'` and `,` raise and lower the octave from 4
//! - a duration number (`4` quarter, `8` eighth, ...) that sticks until the
//!   next one, optionally followed by dots
//! - `r` for a rest, `|` to hold for the current duration

use crate::error::{HarmonyError, Result};
use crate::types::note::DEFAULT_OCTAVE;
use crate::types::{Note, Pitch, RichNote, Scale, Timeline, BEAT_LENGTH};
use log::trace;

/// Divisions in a whole note.
const WHOLE: u32 = BEAT_LENGTH * 4;

/// Octaves a written note may land in (the MIDI range).
const OCTAVES: std::ops::RangeInclusive<i64> = -1..=9;

fn invalid(token: &str, why: &str) -> HarmonyError {
    HarmonyError::InvalidMelody(format!("{}: {}", token, why))
}

/// Sharps encoded by the letters after the note name.
fn alteration(letter: char, suffix: &str) -> Option<i8> {
    match suffix {
        "" => Some(0),
        "is" => Some(1),
        "isis" => Some(2),
        "es" => Some(-1),
        "eses" => Some(-2),
        "s" if matches!(letter, 'a' | 'e') => Some(-1),
        "ses" if matches!(letter, 'a' | 'e') => Some(-2),
        _ => None,
    }
}

struct Token<'a> {
    name: &'a str,
    octave_marks: &'a str,
    duration: &'a str,
    dots: usize,
}

fn split_token(token: &str) -> Result<Token<'_>> {
    let take = |s: &str, pred: fn(char) -> bool| s.find(|c: char| !pred(c)).unwrap_or(s.len());

    let name_end = take(token, |c| c.is_ascii_alphabetic());
    let (name, rest) = token.split_at(name_end);
    let marks_end = take(rest, |c| c == '\'' || c == ',');
    let (octave_marks, rest) = rest.split_at(marks_end);
    let digits_end = take(rest, |c| c.is_ascii_digit());
    let (duration, rest) = rest.split_at(digits_end);
    let dots_end = take(rest, |c| c == '.');
    let (dots, rest) = rest.split_at(dots_end);

    if name.is_empty() || !rest.is_empty() {
        return Err(invalid(token, "not a note"));
    }
    Ok(Token {
        name,
        octave_marks,
        duration,
        dots: dots.len(),
    })
}

/// Apply dots: each adds half of the previous addition.
fn dotted(base: u32, dots: usize, token: &str) -> Result<u32> {
    let mut total = base;
    let mut add = base;
    for _ in 0..dots {
        if add % 2 != 0 {
            return Err(invalid(token, "too many dots for this duration"));
        }
        add /= 2;
        total += add;
    }
    Ok(total)
}

/// Parse a melody into soprano notes, starting at division 0.
pub fn parse_lilypond(text: &str, scale: &Scale) -> Result<Timeline> {
    let mut timeline = Timeline::new();
    let mut division = 0;
    let mut current = BEAT_LENGTH;

    for word in text.split_whitespace() {
        if word == "|" {
            division += current;
            continue;
        }
        let token = split_token(word)?;

        if !token.duration.is_empty() {
            let n: u32 = token
                .duration
                .parse()
                .map_err(|_| invalid(word, "bad duration"))?;
            if n == 0 || WHOLE % n != 0 {
                return Err(invalid(word, "unsupported duration"));
            }
            current = WHOLE / n;
        }
        let length = dotted(current, token.dots, word)?;

        let lowered = token.name.to_ascii_lowercase();
        let mut chars = lowered.chars();
        let letter = chars.next().ok_or_else(|| invalid(word, "empty name"))?;
        let suffix = chars.as_str();

        if letter == 'r' && suffix.is_empty() {
            division += length;
            continue;
        }

        let degree: Pitch = letter
            .to_string()
            .parse()
            .map_err(|_| invalid(word, "unknown note name"))?;
        let sharp = alteration(letter, suffix).ok_or_else(|| invalid(word, "unknown accidental"))?;
        let pitch = Pitch::new(degree.degree(), sharp)?;

        let up = token.octave_marks.matches('\'').count() as i64;
        let down = token.octave_marks.matches(',').count() as i64;
        let octave = i64::from(DEFAULT_OCTAVE) + up - down;
        if !OCTAVES.contains(&octave) {
            return Err(invalid(word, "octave out of range"));
        }
        let note = Note::new(pitch, octave as i8);

        trace!("{} -> {} at {} for {}", word, note, division, length);
        timeline.insert(division, RichNote::melody(note, length, *scale));
        division += length;
    }
    Ok(timeline)
}
