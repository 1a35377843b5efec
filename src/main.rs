use chorale::ShellConfig;
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::{env, process};

/// Four-part harmony shell.
///
/// Logging is controlled with RUST_LOG; it defaults to warnings only.
/// Set RUST_LOG=chorale_core=debug to watch the resolver and the harmonizer.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, verbatim_doc_comment)]
struct CliArgs {
    /// TOML configuration; defaults to ./chorale.toml when present
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Starting key, overriding the configuration, e.g. "D harmonicMinor"
    #[clap(long)]
    pub key: Option<String>,
}

fn run() -> anyhow::Result<()> {
    let cli_args = CliArgs::parse();
    let mut log_builder = env_logger::builder();
    if env::var("RUST_LOG").is_err() {
        log_builder.filter_level(LevelFilter::Warn);
    }
    log_builder.init();

    let mut config = ShellConfig::load(cli_args.config.as_deref())?;
    if let Some(key) = cli_args.key {
        config.key = key;
    }
    chorale::repl::start(config)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        process::exit(2);
    }
}
