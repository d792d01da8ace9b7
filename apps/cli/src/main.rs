//! Hautū Waka CLI: builds the single-page site from its JSON content.
//!
//! Reads the content documents, checks their cross-references and writes one
//! self-contained HTML file.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
