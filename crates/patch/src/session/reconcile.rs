use redline_diff::{LineOp, LineOpKind, edit_cost, edit_script, edit_script_bounded, source_lines, target_lines};

use super::{PatchSession, SessionPhase, SessionState};
use crate::block::ChangeBlock;
use crate::error::{PatchError, ReconcileCause, TargetError};

impl PatchSession {
	/// Rewrites the managed range to the rendering of the minimal script.
	///
	/// The original side is rebuilt from the applied ops plus any lines the
	/// stream never reached, which are kept as-is. After this the buffer layout
	/// and both trackers describe the minimal script exactly, whatever order
	/// the stream delivered its changes in.
	pub(super) async fn reconcile(&self, state: &mut SessionState) -> Result<(), PatchError> {
		self.ensure_live()?;
		let start = state.range.start;
		let end = state.extent_end();
		let leftover = if state.cursor < end {
			self.target
				.lines(state.cursor..end)
				.await
				.map_err(|err| self.reconcile_error(err))?
		} else {
			Vec::new()
		};

		let script = {
			let mut old = source_lines(&state.history);
			let mut new = target_lines(&state.history);
			old.extend(leftover.iter().map(String::as_str));
			new.extend(leftover.iter().map(String::as_str));
			if state.covers_end {
				pin_trailing_newline(&old, &mut new);
			}
			match self.config.max_edit_cost {
				Some(limit) => edit_script_bounded(&old, &new, limit).map_err(|err| self.reconcile_error(err))?,
				None => edit_script(&old, &new),
			}
		};

		let rendered: Vec<String> = script
			.iter()
			.map(|op| match op.kind {
				LineOpKind::Removed => self.config.placeholder.clone(),
				LineOpKind::Kept | LineOpKind::Inserted => op.text.clone(),
			})
			.collect();
		self.target
			.replace_lines(start..end, &rendered)
			.await
			.map_err(|err| self.reconcile_error(err))?;

		state.extent = rendered.len();
		state.cursor = start + state.extent;
		state.pending_removals.clear();
		state.inserted_in_run = 0;
		rebuild(state, &script);
		state.phase = SessionPhase::Reconciled;

		tracing::debug!(
			file = %self.file,
			blocks = state.blocks.len(),
			cost = edit_cost(&script),
			"Reconciled patch session"
		);
		Ok(())
	}

	/// Keeps an unavailable target retryable; everything else is fatal.
	fn reconcile_error(&self, cause: impl Into<ReconcileCause>) -> PatchError {
		match cause.into() {
			ReconcileCause::Target(TargetError::NotLive) => TargetError::NotLive.into(),
			source => PatchError::Reconcile {
				file: self.file.clone(),
				source,
			},
		}
	}
}

/// A range that ends the document keeps its original trailing-newline state.
fn pin_trailing_newline(old: &[&str], new: &mut Vec<&str>) {
	let had = old.last() == Some(&"");
	let has = new.last() == Some(&"");
	if had && !has {
		new.push("");
	} else if !had && has {
		new.pop();
	}
}

/// Rebuilds blocks and decorations from a canonical script.
fn rebuild(state: &mut SessionState, script: &[LineOp]) {
	state.removed.clear();
	state.added.clear();
	state.blocks.clear();

	let mut line = state.range.start;
	let mut ops = script.iter().peekable();
	while let Some(op) = ops.next() {
		if op.kind == LineOpKind::Kept {
			line += 1;
			continue;
		}

		let mut removed = Vec::new();
		let mut added = 0;
		let mut next = Some(op);
		while let Some(op) = next {
			if op.kind == LineOpKind::Removed {
				removed.push(op.text.clone());
			} else {
				added += 1;
			}
			next = ops.next_if(|op| op.kind != LineOpKind::Kept);
		}

		let num_removed = removed.len();
		if num_removed > 0 {
			state.removed.add_range(line, num_removed, Some(removed));
		}
		if added > 0 {
			state.added.add_range(line + num_removed, added, None);
		}
		let block = ChangeBlock::new(line, num_removed, added);
		line = block.end_line();
		state.blocks.push(block);
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn trailing_newline_follows_original() {
		let mut new = vec!["a", "c"];
		pin_trailing_newline(&["a", "b", ""], &mut new);
		assert_eq!(new, ["a", "c", ""]);

		let mut new = vec!["a", ""];
		pin_trailing_newline(&["a"], &mut new);
		assert_eq!(new, ["a"]);

		let mut new = vec!["x", ""];
		pin_trailing_newline(&["a", ""], &mut new);
		assert_eq!(new, ["x", ""]);
	}
}
