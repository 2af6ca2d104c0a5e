/// One contiguous run of removed and added lines between unchanged lines.
///
/// In the buffer a block occupies `num_removed` placeholder lines followed by
/// `num_added` added lines, starting at `start_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeBlock {
	pub start_line: usize,
	pub num_removed: usize,
	pub num_added: usize,
}

impl ChangeBlock {
	pub fn new(start_line: usize, num_removed: usize, num_added: usize) -> Self {
		debug_assert!(num_removed + num_added > 0, "empty change block at line {start_line}");
		Self {
			start_line,
			num_removed,
			num_added,
		}
	}

	/// First added line.
	#[inline]
	pub fn added_start(&self) -> usize {
		self.start_line + self.num_removed
	}

	/// One past the last line of the block.
	#[inline]
	pub fn end_line(&self) -> usize {
		self.start_line + self.num_removed + self.num_added
	}

	/// Lines the block gives up when resolved: placeholders on accept, added
	/// lines on reject.
	#[inline]
	pub fn shrink_on(&self, accept: bool) -> usize {
		if accept { self.num_removed } else { self.num_added }
	}
}
