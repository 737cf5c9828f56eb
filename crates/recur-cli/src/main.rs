use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use recur_cli::commands;
use recur_cli::source::{parse_source, read_input};
use recur_cli::{Cli, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // stdout carries the JSON result; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let text = read_input(cli.input.as_deref())?;
    let source = parse_source(&text, cli.kind)?;
    let output = commands::run(&cli.command, source, &config)?;

    println!("{}", commands::render(&output, config.pretty)?);
    Ok(())
}
