//! Line-level edit scripts.
//!
//! An edit script is an ordered list of [`LineOp`]s turning an original line
//! sequence into a target one. [`edit_script`] computes the minimal script with
//! the Myers O(N·D) algorithm; the helpers in [`lines`] split text into the
//! normalized line form the algorithm expects and reassemble either side of a
//! script.

/// Text-to-line normalization and script reconstruction.
pub mod lines;
/// Edit operation types.
pub mod op;

mod myers;

pub use lines::{edit_cost, join_lines, source_lines, split_lines, target_lines};
pub use myers::{edit_script, edit_script_bounded};
pub use op::{LineOp, LineOpKind};

/// Errors produced while computing an edit script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
	/// The edit distance exceeded the caller's budget.
	#[error("edit distance exceeds limit of {limit} operations")]
	TooExpensive {
		/// The configured maximum number of removed plus inserted lines.
		limit: usize,
	},
}
