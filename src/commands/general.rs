//! General REPL commands (help, quit)

use crate::commands::{CommandContext, CommandResult};
use colored::*;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Print help information
fn print_help() {
    println!("{}", "Chorale Help".bold());
    println!("{}", "============".bold());
    println!();
    println!("{}", "Key and chords:".green());
    println!(
        "  {}     - Set the key (major, minor, harmonicMinor)",
        "key D harmonicMinor".cyan()
    );
    println!("  {}            - Tones and Roman numeral", "chord Gdom7".cyan());
    println!("  {}             - Substitutions in the key", "subs Cmaj".cyan());
    println!(
        "  {}             - Legal successors with reasons",
        "next Gmaj".cyan()
    );
    println!();
    println!("{}", "Timeline:".green());
    println!(
        "  {}  - Load a melody (LilyPond style)",
        "melody c'4 d' e' c'".cyan()
    );
    println!(
        "  {} - Voice a chord: division, chord, inversion, doubling",
        "voice 12 Gmaj 0 0,0,1,2".cyan()
    );
    println!(
        "  {}         - Rank candidate chords for a division",
        "suggest 12 [n]".cyan()
    );
    println!(
        "  {}            - Re-voice every chosen chord",
        "harmonize".cyan()
    );
    println!("  {}                 - Print the timeline", "show".cyan());
    println!("  {}                - Forget voiced chords", "clear".cyan());
    println!();
    println!("{}", "Other Commands:".green());
    println!("  {}              - Show this help", "help".bright_green());
    println!("  {}              - Exit the REPL", "quit".bright_red());
}
