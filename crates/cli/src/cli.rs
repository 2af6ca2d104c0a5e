use std::path::PathBuf;

use clap::{ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(name = "redline")]
#[command(about = "Review a proposed rewrite of a file block by block")]
#[command(version)]
#[command(group(
	ArgGroup::new("resolution")
		.multiple(true)
		.args(["accept_all", "reject_all", "accept", "reject"])
))]
/// Command-line arguments.
pub struct Cli {
	/// File to patch
	pub original: PathBuf,

	/// Proposed new content, or a JSON-lines op stream with --ops ("-" reads stdin)
	pub proposed: PathBuf,

	/// Treat PROPOSED as JSON lines of {"kind": "kept"|"removed"|"inserted", "text": ...}
	#[arg(long)]
	pub ops: bool,

	/// Configuration file (defaults to $XDG_CONFIG_HOME/redline/config.toml)
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,

	/// Accept every block
	#[arg(long, conflicts_with_all = ["reject_all", "accept", "reject"])]
	pub accept_all: bool,

	/// Reject every block
	#[arg(long, conflicts_with_all = ["accept", "reject"])]
	pub reject_all: bool,

	/// Accept the listed blocks (indices as printed); unlisted blocks are rejected
	#[arg(long, value_name = "N", num_args = 1.., value_delimiter = ',')]
	pub accept: Vec<usize>,

	/// Reject the listed blocks
	#[arg(long, value_name = "N", num_args = 1.., value_delimiter = ',')]
	pub reject: Vec<usize>,

	/// Write the result back to ORIGINAL instead of printing it
	#[arg(long, requires = "resolution")]
	pub write: bool,

	/// Print the annotated buffer before resolving
	#[arg(long)]
	pub annotate: bool,
}

/// How the blocks of the session get resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	AcceptAll,
	RejectAll,
	/// Per-block decisions; blocks not listed are rejected.
	Pick { accept: Vec<usize>, reject: Vec<usize> },
}

impl Cli {
	/// `None` means review only.
	pub fn resolution(&self) -> Option<Resolution> {
		if self.accept_all {
			Some(Resolution::AcceptAll)
		} else if self.reject_all {
			Some(Resolution::RejectAll)
		} else if self.accept.is_empty() && self.reject.is_empty() {
			None
		} else {
			Some(Resolution::Pick {
				accept: self.accept.clone(),
				reject: self.reject.clone(),
			})
		}
	}
}
