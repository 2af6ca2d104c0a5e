use serde::{Deserialize, Serialize};

/// What a single line does in an edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineOpKind {
	/// Line is present in both the original and the target.
	Kept,
	/// Line exists only in the original.
	Removed,
	/// Line exists only in the target.
	Inserted,
}

/// One unit of an edit script.
///
/// Serializes as `{"kind": "kept" | "removed" | "inserted", "text": "..."}`,
/// which is also the shape external producers stream to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineOp {
	pub kind: LineOpKind,
	pub text: String,
}

impl LineOp {
	pub fn new(kind: LineOpKind, text: impl Into<String>) -> Self {
		Self { kind, text: text.into() }
	}

	pub fn kept(text: impl Into<String>) -> Self {
		Self::new(LineOpKind::Kept, text)
	}

	pub fn removed(text: impl Into<String>) -> Self {
		Self::new(LineOpKind::Removed, text)
	}

	pub fn inserted(text: impl Into<String>) -> Self {
		Self::new(LineOpKind::Inserted, text)
	}

	/// Returns true if the line belongs to the original text.
	#[inline]
	pub fn in_source(&self) -> bool {
		self.kind != LineOpKind::Inserted
	}

	/// Returns true if the line belongs to the target text.
	#[inline]
	pub fn in_target(&self) -> bool {
		self.kind != LineOpKind::Removed
	}

	#[inline]
	pub fn is_change(&self) -> bool {
		self.kind != LineOpKind::Kept
	}

	/// Returns true if `text` is a single line, i.e. has no `'\n'`.
	#[inline]
	pub fn is_single_line(&self) -> bool {
		!self.text.contains('\n')
	}
}
