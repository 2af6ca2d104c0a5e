use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use redline_diff::{join_lines, split_lines};
use ropey::Rope;

use super::TextTarget;
use crate::error::TargetError;

/// In-memory [`TextTarget`] backed by a [`Rope`].
///
/// Every line, including the last, is stored followed by `'\n'`, so the rope
/// holds `line_count() + 1` ropey lines and an empty rope is a buffer with no
/// lines at all. This keeps "no lines" and "one empty line" distinct and makes
/// appending after the last line an ordinary insert.
pub struct RopeBuffer {
	rope: RwLock<Rope>,
	live: AtomicBool,
}

impl RopeBuffer {
	/// Creates a buffer with no lines.
	pub fn new() -> Self {
		Self {
			rope: RwLock::new(Rope::new()),
			live: AtomicBool::new(true),
		}
	}

	/// Creates a buffer from text, splitting on `'\n'` (a trailing newline
	/// becomes a trailing empty line).
	pub fn from_text(text: &str) -> Self {
		Self::from_lines(&split_lines(text))
	}

	/// Creates a buffer holding `lines`. A line containing `'\n'` ends up as
	/// several buffer lines.
	pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
		let buffer = Self::new();
		if !lines.is_empty() {
			buffer.rope.write().insert(0, &terminated(lines));
		}
		buffer
	}

	/// Marks the buffer as (not) accepting edits.
	pub fn set_live(&self, live: bool) {
		self.live.store(live, Ordering::Release);
	}

	pub fn snapshot_lines(&self) -> Vec<String> {
		let rope = self.rope.read();
		(0..stored_lines(&rope)).map(|i| line_text(&rope, i)).collect()
	}

	pub fn snapshot_text(&self) -> String {
		join_lines(&self.snapshot_lines())
	}

	fn check_live(&self) -> Result<(), TargetError> {
		if self.is_live() { Ok(()) } else { Err(TargetError::NotLive) }
	}
}

impl Default for RopeBuffer {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl TextTarget for RopeBuffer {
	fn is_live(&self) -> bool {
		self.live.load(Ordering::Acquire)
	}

	async fn line_count(&self) -> usize {
		stored_lines(&self.rope.read())
	}

	async fn text(&self) -> String {
		self.snapshot_text()
	}

	async fn lines(&self, range: Range<usize>) -> Result<Vec<String>, TargetError> {
		let rope = self.rope.read();
		check_range(&rope, &range)?;
		Ok(range.map(|i| line_text(&rope, i)).collect())
	}

	async fn insert_lines(&self, before: usize, lines: &[String]) -> Result<(), TargetError> {
		self.check_live()?;
		check_lines(lines)?;
		let mut rope = self.rope.write();
		check_range(&rope, &(before..before))?;
		if !lines.is_empty() {
			let at = rope.line_to_char(before);
			rope.insert(at, &terminated(lines));
		}
		Ok(())
	}

	async fn delete_lines(&self, range: Range<usize>) -> Result<(), TargetError> {
		self.check_live()?;
		let mut rope = self.rope.write();
		check_range(&rope, &range)?;
		let from = rope.line_to_char(range.start);
		let to = rope.line_to_char(range.end);
		rope.remove(from..to);
		Ok(())
	}

	async fn replace_lines(&self, range: Range<usize>, lines: &[String]) -> Result<(), TargetError> {
		self.check_live()?;
		check_lines(lines)?;
		let mut rope = self.rope.write();
		check_range(&rope, &range)?;
		let from = rope.line_to_char(range.start);
		let to = rope.line_to_char(range.end);
		rope.remove(from..to);
		if !lines.is_empty() {
			rope.insert(from, &terminated(lines));
		}
		Ok(())
	}
}

fn stored_lines(rope: &Rope) -> usize {
	rope.len_lines() - 1
}

fn line_text(rope: &Rope, line: usize) -> String {
	let mut text = rope.line(line).to_string();
	if text.ends_with('\n') {
		text.pop();
	}
	text
}

fn check_range(rope: &Rope, range: &Range<usize>) -> Result<(), TargetError> {
	let len = stored_lines(rope);
	if range.start > range.end || range.end > len {
		return Err(TargetError::LineOutOfRange { line: range.end.max(range.start), len });
	}
	Ok(())
}

fn check_lines(lines: &[String]) -> Result<(), TargetError> {
	match lines.iter().position(|line| line.contains('\n')) {
		Some(index) => Err(TargetError::Rejected(format!("line {index} of the edit contains a newline"))),
		None => Ok(()),
	}
}

fn terminated<S: AsRef<str>>(lines: &[S]) -> String {
	let mut text = String::with_capacity(lines.iter().map(|l| l.as_ref().len() + 1).sum());
	for line in lines {
		text.push_str(line.as_ref());
		text.push('\n');
	}
	text
}
