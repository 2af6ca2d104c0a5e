use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use redline_diff::{LineOp, edit_script, split_lines};
use redline_patch::{FileId, RopeBuffer, SessionRegistry, SessionSpec, TextTarget};

use crate::cli::{Cli, Resolution};
use crate::config::Config;
use crate::render;

/// What a run produced, split by destination.
#[derive(Debug, Default)]
pub struct Output {
	/// Annotated view and/or final text, for stdout.
	pub stdout: String,
	/// Block summary, for stderr.
	pub stderr: String,
}

pub async fn run(cli: &Cli, config: Config) -> anyhow::Result<Output> {
	let original = std::fs::read_to_string(&cli.original)
		.with_context(|| format!("reading {}", cli.original.display()))?;
	let ops = load_ops(cli, &original)?;
	tracing::debug!(file = %cli.original.display(), ops = ops.len(), "Loaded edit script");

	let buffer = Arc::new(RopeBuffer::from_text(&original));
	let target: Arc<dyn TextTarget> = buffer.clone();
	let file = FileId::from(cli.original.as_path());
	let registry = SessionRegistry::new(config.engine);

	let session = registry
		.run(SessionSpec::new(file.clone(), target), futures::stream::iter(ops))
		.await
		.context("applying edit script")?;
	let blocks = session.blocks();

	let mut output = Output {
		stderr: render::summary(&blocks),
		..Output::default()
	};
	let resolution = cli.resolution();
	if resolution.is_none() || cli.annotate {
		output
			.stdout
			.push_str(&render::annotate(&buffer.snapshot_lines(), &session.decorations().await));
	}

	let Some(resolution) = resolution else {
		registry.teardown().await;
		return Ok(output);
	};
	if !blocks.is_empty() {
		resolve(&registry, &file, &resolution, blocks.len()).await?;
	}
	// Whatever the picks left open goes back to the original.
	registry.teardown().await;

	let text = buffer.snapshot_text();
	if cli.write {
		std::fs::write(&cli.original, &text).with_context(|| format!("writing {}", cli.original.display()))?;
		tracing::info!(file = %cli.original.display(), blocks = blocks.len(), "Wrote result");
	} else {
		output.stdout.push_str(&text);
	}
	Ok(output)
}

async fn resolve(registry: &SessionRegistry, file: &FileId, resolution: &Resolution, count: usize) -> anyhow::Result<()> {
	let picks = match resolution {
		Resolution::AcceptAll | Resolution::RejectAll => {
			let accept = *resolution == Resolution::AcceptAll;
			let report = registry.resolve_all(file, accept).await?;
			if !report.is_complete() {
				bail!("{} of {count} blocks could not be resolved", report.failures.len());
			}
			return Ok(());
		}
		Resolution::Pick { accept, reject } => ordered_picks(accept, reject, count)?,
	};

	// Highest index first, so the indices still to come stay valid.
	for (index, accept) in picks {
		if registry.resolve_block(file, index, accept).await?.is_none() {
			bail!("block {index} is gone");
		}
	}
	Ok(())
}

fn ordered_picks(accept: &[usize], reject: &[usize], count: usize) -> anyhow::Result<Vec<(usize, bool)>> {
	let mut picks: Vec<(usize, bool)> = accept
		.iter()
		.map(|&i| (i, true))
		.chain(reject.iter().map(|&i| (i, false)))
		.collect();
	if let Some(&(index, _)) = picks.iter().find(|(index, _)| *index >= count) {
		bail!("block {index} does not exist ({count} blocks)");
	}
	picks.sort_unstable_by(|a, b| b.0.cmp(&a.0));
	if let Some(pair) = picks.windows(2).find(|pair| pair[0].0 == pair[1].0) {
		bail!("block {} is listed twice", pair[0].0);
	}
	Ok(picks)
}

fn load_ops(cli: &Cli, original: &str) -> anyhow::Result<Vec<LineOp>> {
	let proposed = read_input(&cli.proposed)?;
	if !cli.ops {
		return Ok(edit_script(&split_lines(original), &split_lines(&proposed)));
	}
	proposed
		.lines()
		.enumerate()
		.filter(|(_, line)| !line.trim().is_empty())
		.map(|(n, line)| {
			let op = serde_json::from_str::<LineOp>(line)
				.with_context(|| format!("{}:{}: invalid op", cli.proposed.display(), n + 1))?;
			if !op.is_single_line() {
				bail!("{}:{}: op text spans several lines", cli.proposed.display(), n + 1);
			}
			Ok(op)
		})
		.collect()
}

fn read_input(path: &Path) -> anyhow::Result<String> {
	if path == Path::new("-") {
		let mut text = String::new();
		std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
		return Ok(text);
	}
	std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
