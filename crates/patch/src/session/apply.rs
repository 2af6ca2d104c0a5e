use redline_diff::{LineOp, LineOpKind};

use super::{PatchSession, SessionPhase, SessionState};
use crate::block::ChangeBlock;
use crate::error::PatchError;

impl PatchSession {
	/// Applies one streamed op at the cursor.
	///
	/// Removed lines leave the buffer immediately and are remembered until the
	/// run is flushed. Inserted lines go in at the cursor. Ops that point past
	/// the managed range are logged and absorbed without touching the buffer.
	pub(super) async fn apply(&self, state: &mut SessionState, op: &LineOp) -> Result<(), PatchError> {
		self.ensure_live()?;
		if state.phase == SessionPhase::Idle {
			state.phase = SessionPhase::Streaming;
		}

		match op.kind {
			LineOpKind::Kept => {
				self.flush(state).await?;
				if state.cursor < state.extent_end() {
					state.cursor += 1;
				} else {
					tracing::warn!(file = %self.file, cursor = state.cursor, "Kept line past end of managed range");
				}
			}
			LineOpKind::Removed => {
				if state.cursor < state.extent_end() {
					self.target.delete_lines(state.cursor..state.cursor + 1).await?;
					state.extent -= 1;
				} else {
					tracing::warn!(file = %self.file, cursor = state.cursor, "Removed line past end of managed range");
				}
				state.pending_removals.push(op.text.clone());
			}
			LineOpKind::Inserted => {
				self.target.insert_lines(state.cursor, std::slice::from_ref(&op.text)).await?;
				state.added.add_range(state.cursor, 1, None);
				state.cursor += 1;
				state.inserted_in_run += 1;
				state.extent += 1;
			}
		}

		tracing::trace!(file = %self.file, kind = ?op.kind, cursor = state.cursor, "Applied op");
		Ok(())
	}

	/// Closes the current change run.
	///
	/// Puts one placeholder per removed line back in front of the run's added
	/// lines and records the block. No-op when nothing changed since the last
	/// unchanged line.
	pub(super) async fn flush(&self, state: &mut SessionState) -> Result<(), PatchError> {
		let removed = state.pending_removals.len();
		let added = state.inserted_in_run;
		if removed == 0 && added == 0 {
			return Ok(());
		}
		self.ensure_live()?;

		let run_start = state.cursor - added;
		if removed > 0 {
			let placeholders = vec![self.config.placeholder.clone(); removed];
			self.target.insert_lines(run_start, &placeholders).await?;
			state.added.shift_at_or_after(run_start, removed as isize);
			let text = std::mem::take(&mut state.pending_removals);
			state.removed.add_range(run_start, removed, Some(text));
			state.cursor += removed;
			state.extent += removed;
		}
		state.inserted_in_run = 0;

		let block = ChangeBlock::new(run_start, removed, added);
		state.blocks.push(block);
		self.publish_blocks(state);
		tracing::debug!(file = %self.file, ?block, "Flushed change run");
		Ok(())
	}
}
