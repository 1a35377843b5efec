//! Harmony commands: key, chords, progressions and the voiced timeline

use crate::commands::{CommandContext, CommandResult};
use anyhow::{anyhow, bail, Context, Result};
use chorale_core::harmony::{
    chord_substitutions, voice_chord, ProblemDirection, ProblemScorer, VoicedChord,
};
use chorale_core::parser::parse_lilypond;
use chorale_core::types::{Part, RomanNumeral, SecondaryNumeral};
use chorale_core::{Chord, ChordChoice, Scale};
use colored::*;

/// Number of suggestions shown when none is requested.
const DEFAULT_SUGGESTIONS: usize = 5;

fn respond(result: Result<String>) -> CommandResult {
    match result {
        Ok(message) => CommandResult::Message(message),
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

fn parse_chord(args: &str) -> Result<Chord> {
    if args.is_empty() {
        bail!("expected a chord name, e.g. Gdom7");
    }
    args.parse::<Chord>()
        .with_context(|| format!("cannot read chord '{}'", args))
}

fn parse_doubling(text: &str) -> Result<[usize; 4]> {
    let indices = text
        .split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("cannot read doubling '{}'", text))?;
    indices
        .try_into()
        .map_err(|_| anyhow!("doubling needs exactly four indices, e.g. 0,0,1,2"))
}

/// Root doubled for triads, every tone once for sevenths.
fn default_doubling(chord: &Chord) -> [usize; 4] {
    if chord.len() == 4 {
        [0, 1, 2, 3]
    } else {
        [0, 0, 1, 2]
    }
}

/// Handle `key <root> [template]`
pub fn cmd_key(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!("Current key: {}", ctx.scale));
    }
    respond(key(args, ctx))
}

fn key(args: &str, ctx: &mut CommandContext) -> Result<String> {
    let scale: Scale = args.parse()?;
    ctx.scale = scale;
    ctx.melody.set_scale(scale);
    let dropped = ctx.choices.len();
    ctx.clear_chords();

    let pitches: Vec<String> = scale.pitches().iter().map(|p| p.to_string()).collect();
    let mut out = format!(
        "{} {} ({})",
        "Key set to".bright_green(),
        scale,
        pitches.join(" ")
    );
    if !ctx.melody.is_empty() {
        out.push_str(&format!("\nMelody kept ({} notes)", ctx.melody.len()));
    }
    if dropped > 0 {
        out.push_str(&format!("\nCleared {} chords voiced in the old key", dropped));
    }
    Ok(out)
}

/// Handle `chord <name>`
pub fn cmd_chord(args: &str, ctx: &mut CommandContext) -> CommandResult {
    respond(chord(args, ctx))
}

fn chord(args: &str, ctx: &CommandContext) -> Result<String> {
    let chord = parse_chord(args)?;
    let tones: Vec<String> = chord.tones().iter().map(|p| p.to_string()).collect();
    let numeral = RomanNumeral::analyze(&chord, &ctx.scale);
    let mut out = format!(
        "{}: {}  {} in {}",
        chord.to_string().cyan(),
        tones.join(" "),
        numeral.to_string().bright_yellow(),
        ctx.scale
    );
    if !chord.is_diatonic_in(&ctx.scale) {
        if let Some(secondary) = SecondaryNumeral::analyze(&chord, &ctx.scale)? {
            out.push_str(&format!(" ({})", secondary.to_string().bright_yellow()));
        }
    }
    Ok(out)
}

/// Handle `subs <chord>`
pub fn cmd_subs(args: &str, ctx: &mut CommandContext) -> CommandResult {
    respond(subs(args, ctx))
}

fn subs(args: &str, ctx: &CommandContext) -> Result<String> {
    let chord = parse_chord(args)?;
    let subs = chord_substitutions(&chord, &ctx.scale)?;
    if subs.is_empty() {
        return Ok(format!("No substitutions for {} in {}", chord, ctx.scale));
    }
    let names: Vec<String> = subs.iter().map(|c| c.to_string()).collect();
    Ok(format!("{} -> {}", chord, names.join(", ").cyan()))
}

/// Handle `next <chord>`
pub fn cmd_next(args: &str, ctx: &mut CommandContext) -> CommandResult {
    respond(next(args, ctx))
}

fn next(args: &str, ctx: &CommandContext) -> Result<String> {
    let chord = parse_chord(args)?;
    let choices = ctx.harmonizer.resolver().choices(&chord, &ctx.scale)?;
    let mut entries: Vec<_> = choices.iter().collect();
    entries.sort_by_key(|p| p.score);
    let lines: Vec<String> = entries
        .iter()
        .map(|p| {
            format!(
                "  {:>2}  {:<10} {}",
                p.score,
                p.chord.to_string().cyan(),
                p.reason.dimmed()
            )
        })
        .collect();
    Ok(format!(
        "{} successors of {} in {}:\n{}",
        entries.len(),
        chord,
        ctx.scale,
        lines.join("\n")
    ))
}

/// Handle `voice <division> <chord> [inversion] [d0,d1,d2,d3]`
pub fn cmd_voice(args: &str, ctx: &mut CommandContext) -> CommandResult {
    respond(voice(args, ctx))
}

fn voice(args: &str, ctx: &mut CommandContext) -> Result<String> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let (division, chord, inversion, doubling) = match parts.as_slice() {
        [division, chord] => (division, chord, None, None),
        [division, chord, inversion] => (division, chord, Some(inversion), None),
        [division, chord, inversion, doubling] => {
            (division, chord, Some(inversion), Some(doubling))
        }
        _ => bail!("usage: voice <division> <chord> [inversion] [d0,d1,d2,d3]"),
    };
    let division: u32 = division.parse().context("division must be a number")?;
    let inversion: usize = match inversion {
        Some(text) => text.parse().context("inversion must be a number")?,
        None => 0,
    };
    let chord = parse_chord(chord)?;
    let doubling = match doubling {
        Some(text) => parse_doubling(text)?,
        None => default_doubling(&chord),
    };
    let choice = ChordChoice::new(chord, inversion, doubling, division)?;

    let params = &ctx.harmonizer.config().params;
    let voicing = voice_chord(&choice, &mut ctx.timeline, &ctx.scale, params)
        .ok_or_else(|| anyhow!("{} cannot be voiced here", choice))?;

    let scorer = ProblemScorer::new(ctx.harmonizer.resolver());
    let weights = &ctx.harmonizer.config().weights;
    let current = VoicedChord::new(&choice, &ctx.scale, &voicing);
    let own = scorer.chord_problem(&current);
    let mut report = format!(
        "{}  S {}  A {}  T {}  B {}\n{}",
        choice.to_string().cyan(),
        voicing.notes[0],
        voicing.notes[1],
        voicing.notes[2],
        voicing.notes[3],
        own
    );
    let mut total = own.total_score(weights, ProblemDirection::Own);

    let previous = ctx
        .choice_before(division)
        .and_then(|c| ctx.voicings.get(&c.division).map(|v| (c, v)));
    if let Some((prev_choice, prev_voicing)) = previous {
        let prev = VoicedChord::new(prev_choice, &ctx.scale, prev_voicing);
        let edge = scorer.problems_between(&prev, &current)?;
        total += edge.total_score(weights, ProblemDirection::Prev);
        report.push_str(&format!("\nfrom {}:\n{}", prev_choice.chord, edge));
    }
    report.push_str(&format!("\n{} {:.1}", "total".bold(), total));

    ctx.voicings.insert(division, voicing);
    ctx.choices.insert(division, choice);
    Ok(report)
}

/// Handle `melody <lilypond text>`
pub fn cmd_melody(args: &str, ctx: &mut CommandContext) -> CommandResult {
    respond(melody(args, ctx))
}

fn melody(args: &str, ctx: &mut CommandContext) -> Result<String> {
    let melody = parse_lilypond(args, &ctx.scale)?;
    let count = melody.len();
    ctx.melody = melody;
    ctx.clear_chords();
    Ok(format!("Loaded {} melody notes", count))
}

/// Handle `suggest <division> [n]`
pub fn cmd_suggest(args: &str, ctx: &mut CommandContext) -> CommandResult {
    respond(suggest(args, ctx))
}

fn suggest(args: &str, ctx: &CommandContext) -> Result<String> {
    let mut words = args.split_whitespace();
    let division: u32 = words
        .next()
        .ok_or_else(|| anyhow!("usage: suggest <division> [n]"))?
        .parse()
        .context("division must be a number")?;
    let count = match words.next() {
        Some(n) => n.parse().context("count must be a number")?,
        None => DEFAULT_SUGGESTIONS,
    };

    let ranked = ctx.harmonizer.chord_choices(
        &ctx.melody,
        division,
        &ctx.scale,
        ctx.choice_before(division),
        ctx.choice_after(division),
    )?;
    let lines: Vec<String> = ranked
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, s)| {
            format!(
                "  {}. {:<28} {:>7.1}",
                i + 1,
                s.choice.to_string().cyan(),
                s.total
            )
        })
        .collect();
    Ok(format!(
        "Best of {} candidates at {}:\n{}",
        ranked.len(),
        division,
        lines.join("\n")
    ))
}

/// Handle `harmonize`
pub fn cmd_harmonize(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let result = ctx.harmonizer.harmonize(&ctx.melody, &ctx.scale, &ctx.choices);
    let skipped = result.skipped.len();
    ctx.timeline = result.timeline;
    ctx.voicings = result.voicings;
    if skipped > 0 {
        CommandResult::Message(format!(
            "Voiced {} chords, {} skipped",
            ctx.voicings.len(),
            skipped.to_string().red()
        ))
    } else {
        CommandResult::Message(format!("Voiced {} chords", ctx.voicings.len()))
    }
}

/// Handle `show`
pub fn cmd_show(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if ctx.timeline.is_empty() {
        return CommandResult::Message("Timeline is empty".to_string());
    }
    let mut lines = vec![format!(
        "{:>6}  {:<6}{:<6}{:<6}{:<6}{}",
        "div", "S", "A", "T", "B", "chord"
    )
    .bold()
    .to_string()];
    for (division, notes) in ctx.timeline.iter() {
        let cell = |part: Part| {
            notes
                .iter()
                .find(|n| n.part == part)
                .map(|n| n.note.to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        let chord = ctx
            .choices
            .get(&division)
            .map(|c| c.chord.to_string())
            .unwrap_or_default();
        lines.push(format!(
            "{:>6}  {:<6}{:<6}{:<6}{:<6}{}",
            division,
            cell(Part::Soprano),
            cell(Part::Alto),
            cell(Part::Tenor),
            cell(Part::Bass),
            chord.cyan()
        ));
    }
    CommandResult::Message(lines.join("\n"))
}

/// Handle `clear`
pub fn cmd_clear(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.clear_chords();
    CommandResult::Message("Cleared all chords".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorale_core::Harmonizer;

    fn ctx() -> CommandContext {
        CommandContext::new("C major".parse().unwrap(), Harmonizer::default())
    }

    fn message(result: CommandResult) -> String {
        match result {
            CommandResult::Message(m) => m,
            other => panic!("expected a message, got {:?}", other),
        }
    }

    #[test]
    fn test_key_command() {
        let mut ctx = ctx();
        message(cmd_key("A minor", &mut ctx));
        assert_eq!(ctx.scale.to_string(), "A minor");
        assert!(matches!(
            cmd_key("A lydian", &mut ctx),
            CommandResult::Error(_)
        ));
        assert_eq!(ctx.scale.to_string(), "A minor");
    }

    #[test]
    fn test_key_change_clears_chords() {
        let mut ctx = ctx();
        message(cmd_melody("c'4 b c'", &mut ctx));
        message(cmd_voice("0 Cmaj", &mut ctx));
        let out = message(cmd_key("G major", &mut ctx));
        assert!(out.contains("Melody kept (3 notes)"));
        assert!(out.contains("Cleared 1 chords"));
        assert!(ctx.choices.is_empty());
        assert!(ctx.voicings.is_empty());
        assert_eq!(ctx.timeline, ctx.melody);
        let melody = ctx.timeline.melody_at(0).unwrap();
        assert_eq!(melody.scale, ctx.scale);
    }

    #[test]
    fn test_parse_doubling() {
        assert_eq!(parse_doubling("0,0,1,2").unwrap(), [0, 0, 1, 2]);
        assert!(parse_doubling("0,1,2").is_err());
        assert!(parse_doubling("0,x,1,2").is_err());
    }

    #[test]
    fn test_voice_and_show() {
        let mut ctx = ctx();
        message(cmd_melody("c'4 b c'", &mut ctx));
        message(cmd_voice("0 Cmaj 0 0,0,1,2", &mut ctx));
        let report = message(cmd_voice("12 Gmaj 0 0,0,1,2", &mut ctx));
        assert!(report.contains("from Cmaj"));
        assert_eq!(ctx.choices.len(), 2);
        assert_eq!(ctx.timeline.notes_at(12).len(), 4);

        let table = message(cmd_show("", &mut ctx));
        assert_eq!(table.lines().count(), 4);

        assert!(matches!(
            cmd_voice("12 Gmaj 3", &mut ctx),
            CommandResult::Error(_)
        ));
        assert!(matches!(cmd_voice("12", &mut ctx), CommandResult::Error(_)));
        message(cmd_clear("", &mut ctx));
        assert!(ctx.choices.is_empty());
        assert_eq!(ctx.timeline, ctx.melody);
    }

    #[test]
    fn test_voice_defaults() {
        let mut ctx = ctx();
        message(cmd_voice("0 Gdom7", &mut ctx));
        message(cmd_voice("12 Cmaj 1", &mut ctx));
        assert_eq!(ctx.choices[&0].doubling, [0, 1, 2, 3]);
        assert_eq!(ctx.choices[&12].inversion, 1);
        assert_eq!(ctx.choices[&12].doubling, [0, 0, 1, 2]);
    }

    #[test]
    fn test_suggest_after_melody() {
        let mut ctx = ctx();
        message(cmd_melody("c'4 b", &mut ctx));
        message(cmd_voice("0 Cmaj 0 0,0,1,2", &mut ctx));
        let out = message(cmd_suggest("12 3", &mut ctx));
        assert_eq!(out.lines().count(), 4);
    }
}
