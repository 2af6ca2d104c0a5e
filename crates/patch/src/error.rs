use redline_diff::DiffError;
use thiserror::Error;

use crate::ids::FileId;

/// Errors reported by a [`TextTarget`](crate::TextTarget).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
	/// The target cannot take edits right now (hidden, being reloaded, ...).
	/// The engine treats this as transient and retries.
	#[error("target is not live")]
	NotLive,
	/// A line index past the end of the buffer.
	#[error("line {line} out of range (buffer has {len} lines)")]
	LineOutOfRange { line: usize, len: usize },
	/// The host refused the edit.
	#[error("target rejected edit: {0}")]
	Rejected(String),
}

/// Why reconciliation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileCause {
	#[error(transparent)]
	Diff(#[from] DiffError),
	#[error(transparent)]
	Target(#[from] TargetError),
}

/// Errors surfaced by patch sessions and the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
	#[error(transparent)]
	Target(#[from] TargetError),
	/// Recomputing the minimal script or rewriting the buffer failed. The
	/// session has been rejected and closed.
	#[error("reconciliation failed for {file}: {source}")]
	Reconcile {
		file: FileId,
		#[source]
		source: ReconcileCause,
	},
	/// Block resolution was requested while the session is still streaming.
	#[error("session for {file} is not reconciled yet")]
	NotReconciled { file: FileId },
	/// An op whose text contains a line break.
	#[error("op for {file} spans several lines")]
	MultilineOp { file: FileId },
	/// The session was closed or cancelled.
	#[error("session for {file} is closed")]
	Closed { file: FileId },
	/// No live session for the file.
	#[error("no patch session for {0}")]
	UnknownFile(FileId),
}

impl PatchError {
	/// Returns true for failures the drain loop recovers from by retrying.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::Target(TargetError::NotLive))
	}
}
