//! The text buffer a session edits.
//!
//! Hosts implement [`TextTarget`] over whatever holds the visible document.
//! Lines are indexed from zero and never include their terminator. Every
//! mutation is async because hosts may validate or persist edits, and every
//! mutation is all-or-nothing: an `Err` leaves the buffer untouched.

use std::ops::Range;

use async_trait::async_trait;

use crate::error::TargetError;

mod rope;

pub use rope::RopeBuffer;

/// Mutable, user-visible line buffer.
#[async_trait]
pub trait TextTarget: Send + Sync {
	/// Whether the target accepts edits right now.
	///
	/// Checked before every mutation; `false` makes the engine put the
	/// pending op back and retry later.
	fn is_live(&self) -> bool;

	async fn line_count(&self) -> usize;

	/// Full text, lines joined with `'\n'`.
	async fn text(&self) -> String;

	async fn lines(&self, range: Range<usize>) -> Result<Vec<String>, TargetError>;

	/// Inserts `lines` so the first one ends up at index `before`.
	async fn insert_lines(&self, before: usize, lines: &[String]) -> Result<(), TargetError>;

	async fn delete_lines(&self, range: Range<usize>) -> Result<(), TargetError>;

	/// Replaces `range` with `lines` in one step. Must not be split into a
	/// delete and an insert that can fail independently.
	async fn replace_lines(&self, range: Range<usize>, lines: &[String]) -> Result<(), TargetError>;
}
