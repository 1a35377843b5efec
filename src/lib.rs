//! # Chorale
//!
//! Interactive shell over `chorale-core`, a four-part (SATB) harmony engine.
//! Load a melody, pick chords at divisions of the timeline and let the engine
//! voice them, or ask it to rank every candidate chord for a division.
//!
//! ## Modules
//!
//! - `commands`: the command registry and every shell command.
//! - `config`: the TOML configuration (starting key, engine parameters and
//!   rule weights).
//! - `repl`: the Read-Eval-Print Loop.

pub mod commands;
pub mod config;
pub mod repl;

pub use crate::config::ShellConfig;
