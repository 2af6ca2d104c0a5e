//! Line-range bookkeeping for removed/added decorations.
//!
//! A session keeps two trackers: one for removed lines (virtual, shown as
//! annotations over placeholder lines, so their text is stored) and one for
//! added lines (real buffer lines, no text stored). Every buffer mutation that
//! moves lines goes through [`RangeTracker::shift_from`] or
//! [`RangeTracker::shift_at_or_after`]; the ranges stay sorted and
//! non-overlapping after every call.

/// A run of consecutive tracked lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRange {
	pub start_line: usize,
	pub count: usize,
	/// Original text of each line, for ranges whose lines are not in the buffer.
	pub text: Option<Vec<String>>,
}

impl TrackedRange {
	/// One past the last line.
	#[inline]
	pub fn end_line(&self) -> usize {
		self.start_line + self.count
	}

	#[inline]
	pub fn contains(&self, line: usize) -> bool {
		(self.start_line..self.end_line()).contains(&line)
	}
}

/// Sorted, non-overlapping collection of [`TrackedRange`]s.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RangeTracker {
	ranges: Vec<TrackedRange>,
}

impl RangeTracker {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn ranges(&self) -> &[TrackedRange] {
		&self.ranges
	}

	pub fn len(&self) -> usize {
		self.ranges.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ranges.is_empty()
	}

	/// Total number of tracked lines.
	pub fn line_count(&self) -> usize {
		self.ranges.iter().map(|r| r.count).sum()
	}

	pub fn clear(&mut self) {
		self.ranges.clear();
	}

	/// Tracks `count` lines from `start`.
	///
	/// A range ending exactly at `start` with the same text-ness is extended
	/// instead, so lines added one by one collapse into a single range.
	pub fn add_range(&mut self, start: usize, count: usize, text: Option<Vec<String>>) {
		if count == 0 {
			return;
		}
		debug_assert!(text.as_ref().is_none_or(|t| t.len() == count), "range text does not match count {count}");

		let pos = self.ranges.partition_point(|r| r.start_line < start);
		if pos > 0 {
			let prev = &mut self.ranges[pos - 1];
			if prev.end_line() == start && prev.text.is_some() == text.is_some() {
				prev.count += count;
				if let (Some(prev_text), Some(text)) = (prev.text.as_mut(), text) {
					prev_text.extend(text);
				}
				self.debug_check();
				return;
			}
		}

		self.ranges.insert(
			pos,
			TrackedRange {
				start_line: start,
				count,
				text,
			},
		);
		self.debug_check();
	}

	/// Returns the range starting exactly at `start`.
	pub fn range_at(&self, start: usize) -> Option<&TrackedRange> {
		self.index_of(start).map(|i| &self.ranges[i])
	}

	/// Returns the range covering `line`.
	pub fn range_containing(&self, line: usize) -> Option<&TrackedRange> {
		let pos = self.ranges.partition_point(|r| r.start_line <= line);
		pos.checked_sub(1).map(|i| &self.ranges[i]).filter(|r| r.contains(line))
	}

	/// Removes and returns the range starting exactly at `start`.
	pub fn delete_range_at(&mut self, start: usize) -> Option<TrackedRange> {
		self.index_of(start).map(|i| self.ranges.remove(i))
	}

	/// Removes and returns every range starting at or after `start`.
	pub fn delete_ranges_from(&mut self, start: usize) -> Vec<TrackedRange> {
		let pos = self.ranges.partition_point(|r| r.start_line < start);
		self.ranges.split_off(pos)
	}

	/// Moves every range starting strictly after `start` by `offset` lines.
	pub fn shift_from(&mut self, start: usize, offset: isize) {
		let pos = self.ranges.partition_point(|r| r.start_line <= start);
		self.shift_tail(pos, offset);
	}

	/// Moves every range starting at or after `start` by `offset` lines.
	pub fn shift_at_or_after(&mut self, start: usize, offset: isize) {
		let pos = self.ranges.partition_point(|r| r.start_line < start);
		self.shift_tail(pos, offset);
	}

	/// Returns true if ranges are sorted, non-empty, non-overlapping and carry
	/// text of the right length.
	pub fn is_consistent(&self) -> bool {
		let well_formed = self
			.ranges
			.iter()
			.all(|r| r.count > 0 && r.text.as_ref().is_none_or(|t| t.len() == r.count));
		let ordered = self.ranges.windows(2).all(|w| w[0].end_line() <= w[1].start_line);
		well_formed && ordered
	}

	fn index_of(&self, start: usize) -> Option<usize> {
		self.ranges.binary_search_by_key(&start, |r| r.start_line).ok()
	}

	/// Shifts `ranges[pos..]`. A shift that would move the first of them
	/// before line 0 is refused as a whole.
	fn shift_tail(&mut self, pos: usize, offset: isize) {
		let Some(first) = self.ranges.get(pos) else {
			return;
		};
		if offset == 0 {
			return;
		}
		// Sorted, so only the first shifted range can underflow.
		let fits = first.start_line.checked_add_signed(offset).is_some();
		debug_assert!(fits, "shifting line {} by {offset} moves it before line 0", first.start_line);
		if !fits {
			tracing::error!(start = first.start_line, offset, "Refusing to shift ranges before line 0");
			return;
		}
		for range in &mut self.ranges[pos..] {
			range.start_line = range.start_line.saturating_add_signed(offset);
		}
		self.debug_check();
	}

	#[inline]
	fn debug_check(&self) {
		debug_assert!(self.is_consistent(), "range tracker invariant violated: {:?}", self.ranges);
	}
}

#[cfg(test)]
mod tests;
