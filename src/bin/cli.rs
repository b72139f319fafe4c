// src/bin/cli.rs
use clap::Parser;
use g2b_collect::{cli, log};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = cli::Cli::parse();
    log::init_stderr(args.verbose);
    cli::run(args)
}
