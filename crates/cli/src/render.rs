//! Plain-text views of a session for the terminal.

use std::fmt::Write as _;

use redline_patch::{ChangeBlock, Decorations};

/// One line per buffer line: `- ` with the removed text over a placeholder,
/// `+ ` for an added line, two spaces otherwise.
pub fn annotate(lines: &[String], decorations: &Decorations) -> String {
	let mut out = String::new();
	let mut removed = decorations.removed.iter().peekable();
	let mut added = decorations.added.iter().peekable();

	for (i, line) in lines.iter().enumerate() {
		while removed.next_if(|r| r.end_line() <= i).is_some() {}
		while added.next_if(|r| r.end_line() <= i).is_some() {}

		let (marker, text) = if let Some(range) = removed.peek().filter(|r| r.contains(i)) {
			let original = range.text.as_ref().and_then(|text| text.get(i - range.start_line));
			('-', original.map_or(line.as_str(), String::as_str))
		} else if added.peek().is_some_and(|r| r.contains(i)) {
			('+', line.as_str())
		} else {
			(' ', line.as_str())
		};
		out.push(marker);
		out.push(' ');
		out.push_str(text);
		out.push('\n');
	}
	out
}

/// `block N: line L, -R +A` per block, lines numbered from one.
pub fn summary(blocks: &[ChangeBlock]) -> String {
	let mut out = String::new();
	for (index, block) in blocks.iter().enumerate() {
		let _ = writeln!(
			out,
			"block {index}: line {}, -{} +{}",
			block.start_line + 1,
			block.num_removed,
			block.num_added
		);
	}
	out
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use redline_patch::TrackedRange;

	use super::*;

	fn owned(lines: &[&str]) -> Vec<String> {
		lines.iter().map(|l| l.to_string()).collect()
	}

	#[test]
	fn marks_removed_and_added_lines() {
		let decorations = Decorations {
			removed: vec![TrackedRange {
				start_line: 1,
				count: 1,
				text: Some(owned(&["b"])),
			}],
			added: vec![TrackedRange {
				start_line: 2,
				count: 2,
				text: None,
			}],
		};
		let view = annotate(&owned(&["a", "", "x", "y", "c"]), &decorations);
		assert_eq!(view, "  a\n- b\n+ x\n+ y\n  c\n");
	}

	#[test]
	fn summary_numbers_from_one() {
		let blocks = [ChangeBlock::new(0, 1, 1), ChangeBlock::new(4, 0, 2)];
		assert_eq!(summary(&blocks), "block 0: line 1, -1 +1\nblock 1: line 5, -0 +2\n");
	}
}
