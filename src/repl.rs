//! REPL (Read-Eval-Print Loop) for the harmony shell

use crate::commands::{create_registry, CommandContext, CommandRegistry, CommandResult};
use crate::config::ShellConfig;
use anyhow::Result;
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// What the loop should do after a line has been handled
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Interactive shell over a harmonizer session
pub struct Repl {
    editor: DefaultEditor,
    registry: CommandRegistry,
    ctx: CommandContext,
}

impl Repl {
    pub fn new(config: ShellConfig) -> Result<Self> {
        let editor = DefaultEditor::new()?;
        Ok(Repl {
            editor,
            registry: create_registry(),
            ctx: CommandContext::from_config(config)?,
        })
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!(
            "{} {}",
            "♪".bright_yellow(),
            "Chorale four-part harmony shell".bright_cyan().bold()
        );
        println!(
            "Key: {}. Try {}, {}, {}",
            self.ctx.scale.to_string().green(),
            "melody c'4 d' e' c'".cyan(),
            "voice 0 Cmaj".cyan(),
            "suggest 12".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        loop {
            let prompt = format!("{} ", "chorale>".bright_magenta().bold());
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    self.editor.add_history_entry(line.to_owned())?;
                    if handle_line(&self.registry, line, &mut self.ctx) == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => {
                    println!(
                        "{} {}",
                        "Error reading input:".bright_red().bold(),
                        err.to_string().red()
                    );
                }
            }
        }

        Ok(())
    }
}

fn handle_line(registry: &CommandRegistry, line: &str, ctx: &mut CommandContext) -> Flow {
    match registry.execute(line, ctx) {
        CommandResult::Success => {}
        CommandResult::Message(msg) => println!("{}", msg),
        CommandResult::Exit => {
            println!("{}", "Goodbye!".bright_cyan());
            return Flow::Exit;
        }
        CommandResult::Error(e) => {
            log::debug!("command '{}' failed: {}", line, e);
            println!("{} {}", "Error:".bright_red().bold(), e.red());
        }
        CommandResult::NotACommand => {
            let word = line.split_whitespace().next().unwrap_or(line);
            println!(
                "{} unknown command '{}', type '{}' for a list",
                "Error:".bright_red().bold(),
                word,
                "help".bright_green()
            );
        }
    }
    Flow::Continue
}

/// Convenience function to start the REPL
pub fn start(config: ShellConfig) -> Result<()> {
    let mut repl = Repl::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize REPL: {}", e))?;
    repl.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> CommandContext {
        CommandContext::from_config(ShellConfig::default()).unwrap()
    }

    #[test]
    fn test_session_flow() {
        let registry = create_registry();
        let mut ctx = ctx();
        for line in ["key G major", "melody g'4 fis' g'", "voice 0 Gmaj", "suggest 12 2"] {
            assert_eq!(handle_line(&registry, line, &mut ctx), Flow::Continue);
        }
        assert_eq!(ctx.scale.to_string(), "G major");
        assert_eq!(ctx.voicings.len(), 1);
        assert_eq!(handle_line(&registry, "quit", &mut ctx), Flow::Exit);
    }

    #[test]
    fn test_errors_keep_the_loop_alive() {
        let registry = create_registry();
        let mut ctx = ctx();
        assert_eq!(handle_line(&registry, "play C", &mut ctx), Flow::Continue);
        assert_eq!(handle_line(&registry, "key H major", &mut ctx), Flow::Continue);
        assert_eq!(ctx.scale.to_string(), "C major");
    }
}
