//! Command registry for REPL commands
//!
//! Every line typed at the prompt is matched against registered prefixes,
//! longest first; the rest of the line is handed to the handler as its
//! arguments.

pub mod general;
pub mod harmony;

use crate::config::ShellConfig;
use chorale_core::harmony::Voicing;
use chorale_core::{ChordChoice, Harmonizer, Scale, Timeline};
use std::collections::BTreeMap;

/// Result of executing a command
#[derive(Debug)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// No registered command matches the input
    NotACommand,
    /// Error occurred
    Error(String),
}

/// Session state shared by all commands
pub struct CommandContext {
    pub scale: Scale,
    /// Melody notes as loaded, without any voicing
    pub melody: Timeline,
    /// Melody plus every voiced chord
    pub timeline: Timeline,
    pub choices: BTreeMap<u32, ChordChoice>,
    pub voicings: BTreeMap<u32, Voicing>,
    pub harmonizer: Harmonizer,
}

impl CommandContext {
    pub fn new(scale: Scale, harmonizer: Harmonizer) -> Self {
        Self {
            scale,
            melody: Timeline::new(),
            timeline: Timeline::new(),
            choices: BTreeMap::new(),
            voicings: BTreeMap::new(),
            harmonizer,
        }
    }

    pub fn from_config(config: ShellConfig) -> anyhow::Result<Self> {
        let scale = config.scale()?;
        Ok(Self::new(scale, Harmonizer::new(config.engine)))
    }

    /// Drop voiced chords, keeping the melody.
    pub fn clear_chords(&mut self) {
        self.timeline = self.melody.clone();
        self.choices.clear();
        self.voicings.clear();
    }

    /// Latest chosen chord strictly before `division`.
    pub fn choice_before(&self, division: u32) -> Option<&ChordChoice> {
        self.choices.range(..division).next_back().map(|(_, c)| c)
    }

    /// Earliest chosen chord strictly after `division`.
    pub fn choice_after(&self, division: u32) -> Option<&ChordChoice> {
        self.choices
            .range(division.saturating_add(1)..)
            .next()
            .map(|(_, c)| c)
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = input[prefix.len()..].trim();
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register("key", harmony::cmd_key);
    registry.register("chord", harmony::cmd_chord);
    registry.register("subs", harmony::cmd_subs);
    registry.register("next", harmony::cmd_next);
    registry.register("voice", harmony::cmd_voice);
    registry.register("melody", harmony::cmd_melody);
    registry.register("suggest", harmony::cmd_suggest);
    registry.register("harmonize", harmony::cmd_harmonize);
    registry.register("show", harmony::cmd_show);
    registry.register("clear", harmony::cmd_clear);

    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> CommandContext {
        CommandContext::new("C major".parse().unwrap(), Harmonizer::default())
    }

    #[test]
    fn test_longest_prefix_wins() {
        fn short(_: &str, _: &mut CommandContext) -> CommandResult {
            CommandResult::Message("short".into())
        }
        fn long(args: &str, _: &mut CommandContext) -> CommandResult {
            CommandResult::Message(format!("long {}", args))
        }
        let mut registry = CommandRegistry::new();
        registry.register("show", short);
        registry.register("show all", long);

        let mut ctx = ctx();
        match registry.execute("show all  now ", &mut ctx) {
            CommandResult::Message(m) => assert_eq!(m, "long now"),
            other => panic!("unexpected {:?}", other),
        }
        match registry.execute("show", &mut ctx) {
            CommandResult::Message(m) => assert_eq!(m, "short"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            registry.execute("showy", &mut ctx),
            CommandResult::NotACommand
        ));
    }

    #[test]
    fn test_neighbouring_choices() {
        let mut ctx = ctx();
        for division in [0, 24] {
            let choice = ChordChoice::new("Cmaj".parse().unwrap(), 0, [0, 0, 1, 2], division).unwrap();
            ctx.choices.insert(division, choice);
        }
        assert_eq!(ctx.choice_before(12).map(|c| c.division), Some(0));
        assert_eq!(ctx.choice_after(12).map(|c| c.division), Some(24));
        assert_eq!(ctx.choice_before(0), None);
        assert_eq!(ctx.choice_after(24), None);
    }

    #[test]
    fn test_registry_lists_everything() {
        let registry = create_registry();
        let commands = registry.list_commands();
        for name in ["key", "chord", "next", "voice", "suggest", "help", "quit"] {
            assert!(commands.contains(&name));
        }
    }
}
