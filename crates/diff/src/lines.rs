use crate::op::LineOp;

/// Splits text into lines on `'\n'`.
///
/// A trailing newline yields a trailing empty element, so `"a"` and `"a\n"`
/// stay distinguishable (`["a"]` vs `["a", ""]`). The empty string is a single
/// empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
	text.split('\n').collect()
}

/// Inverse of [`split_lines`].
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
	let mut out = String::with_capacity(lines.iter().map(|l| l.as_ref().len() + 1).sum());
	for (i, line) in lines.iter().enumerate() {
		if i > 0 {
			out.push('\n');
		}
		out.push_str(line.as_ref());
	}
	out
}

/// Original side of a script: every op that is not an insertion.
pub fn source_lines(ops: &[LineOp]) -> Vec<&str> {
	ops.iter().filter(|op| op.in_source()).map(|op| op.text.as_str()).collect()
}

/// Target side of a script: every op that is not a removal.
pub fn target_lines(ops: &[LineOp]) -> Vec<&str> {
	ops.iter().filter(|op| op.in_target()).map(|op| op.text.as_str()).collect()
}

/// Number of removed plus inserted lines in a script.
pub fn edit_cost(ops: &[LineOp]) -> usize {
	ops.iter().filter(|op| op.is_change()).count()
}
