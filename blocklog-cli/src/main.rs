//! blocklog command line
//!
//! Drives an edit log stored as JSON against a JSON entity store:
//!
//!   blocklog --store store.json --state state.json init
//!   blocklog --store store.json --state state.json commit '{"id":"delete","args":{"uuids":[...]}}'
//!   blocklog --store store.json --state state.json show
//!
//! Results go to stdout, logs to stderr.

use anyhow::Result;
use blocklog_cli::{run, Cli};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let output = run(cli)?;
    println!("{output}");
    Ok(())
}
