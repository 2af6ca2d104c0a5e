//! `redline`: stream a proposed rewrite into a file as reviewable change
//! blocks, then accept or reject them.

mod app;
mod cli;
mod config;
mod logging;
mod render;

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

	logging::setup_tracing(cli.verbose, &config.log);
	tracing::debug!(original = %cli.original.display(), proposed = %cli.proposed.display(), "Starting redline");

	let output = app::run(&cli, config).await?;
	eprint!("{}", output.stderr);
	std::io::stdout()
		.lock()
		.write_all(output.stdout.as_bytes())
		.context("writing output")?;
	Ok(())
}
