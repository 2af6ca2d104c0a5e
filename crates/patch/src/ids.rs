use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

/// Identity of a file under patch (a path or URI).
///
/// Cheap to clone; used as the registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(Arc<str>);

impl FileId {
	pub fn new(id: impl AsRef<str>) -> Self {
		Self(Arc::from(id.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for FileId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for FileId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for FileId {
	fn from(id: String) -> Self {
		Self(Arc::from(id))
	}
}

impl From<&Path> for FileId {
	fn from(path: &Path) -> Self {
		Self::new(path.to_string_lossy())
	}
}

/// Half-open range of buffer lines `[start, end)` managed by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
	pub start: usize,
	pub end: usize,
}

impl LineRange {
	pub fn new(start: usize, end: usize) -> Self {
		debug_assert!(start <= end, "line range start {start} after end {end}");
		Self { start, end }
	}

	/// Builds a range from inclusive `[first, last]` line bounds.
	pub fn inclusive(first: usize, last: usize) -> Self {
		Self::new(first, last + 1)
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.end - self.start
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	#[inline]
	pub fn contains(&self, line: usize) -> bool {
		(self.start..self.end).contains(&line)
	}
}

impl From<Range<usize>> for LineRange {
	fn from(range: Range<usize>) -> Self {
		Self::new(range.start, range.end)
	}
}

impl From<LineRange> for Range<usize> {
	fn from(range: LineRange) -> Self {
		range.start..range.end
	}
}

impl fmt::Display for LineRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}..{}", self.start, self.end)
	}
}
