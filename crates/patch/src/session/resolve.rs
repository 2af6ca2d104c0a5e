use super::{PatchSession, SessionPhase, SessionState};
use crate::block::ChangeBlock;
use crate::error::PatchError;
use crate::event::SessionStatus;

/// A block that could not be resolved during [`PatchSession::close`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFailure {
	pub block: ChangeBlock,
	pub error: PatchError,
}

/// Outcome of resolving every block at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseReport {
	/// Blocks resolved, bottom-up.
	pub resolved: Vec<ChangeBlock>,
	pub failures: Vec<BlockFailure>,
}

impl CloseReport {
	/// True when no block failed.
	pub fn is_complete(&self) -> bool {
		self.failures.is_empty()
	}
}

impl PatchSession {
	/// Accepts or rejects the block at `index` of the current block list.
	///
	/// Returns `Ok(None)` for an index that no longer exists, which happens
	/// when a renderer acts on a list that was already superseded.
	pub async fn resolve_block(&self, index: usize, accept: bool) -> Result<Option<ChangeBlock>, PatchError> {
		let mut state = self.state.lock().await;
		if state.phase.is_terminal() {
			return Err(PatchError::Closed { file: self.file.clone() });
		}
		if !state.phase.is_reconciled() {
			return Err(PatchError::NotReconciled { file: self.file.clone() });
		}
		let Some(block) = state.blocks.get(index).copied() else {
			tracing::warn!(file = %self.file, index, blocks = state.blocks.len(), "Ignoring stale block index");
			return Ok(None);
		};

		self.resolve_locked(&mut state, block, accept).await?;
		self.publish_blocks(&state);
		if state.blocks.is_empty() {
			self.finish(&mut state).await;
		} else {
			state.phase = SessionPhase::BlockPending;
			self.emit_status(&state, SessionStatus::Done).await;
		}
		Ok(Some(block))
	}

	/// Resolves every remaining block the same way and closes the session.
	///
	/// Works in any phase: mid-stream, the current run is flushed first and
	/// the remaining ops are dropped. Blocks go bottom-up so that no block's
	/// resolution moves another pending one. Failures are collected rather
	/// than aborting; the session only closes once nothing failed. Closing a
	/// closed session is a no-op.
	pub async fn close(&self, accept: bool) -> Result<CloseReport, PatchError> {
		let mut state = self.state.lock().await;
		if state.phase.is_terminal() {
			return Ok(CloseReport::default());
		}
		self.flush(&mut state).await?;

		let mut report = CloseReport::default();
		let pending: Vec<ChangeBlock> = state.blocks.iter().rev().copied().collect();
		for block in pending {
			match self.resolve_locked(&mut state, block, accept).await {
				Ok(()) => report.resolved.push(block),
				Err(error) => {
					tracing::warn!(file = %self.file, ?block, %error, "Failed to resolve block on close");
					report.failures.push(BlockFailure { block, error });
				}
			}
		}

		self.publish_blocks(&state);
		if report.is_complete() {
			self.finish(&mut state).await;
		} else if state.phase.is_reconciled() {
			state.phase = SessionPhase::BlockPending;
			self.emit_status(&state, SessionStatus::Done).await;
		}
		Ok(report)
	}

	/// Resolves one block and moves everything below it.
	///
	/// Accepting drops the placeholders; rejecting puts the original lines back
	/// in place of placeholders and added lines together.
	async fn resolve_locked(&self, state: &mut SessionState, block: ChangeBlock, accept: bool) -> Result<(), PatchError> {
		self.ensure_live()?;
		let start = block.start_line;
		if accept {
			if block.num_removed > 0 {
				self.target.delete_lines(start..block.added_start()).await?;
			}
		} else {
			let original = state
				.removed
				.range_at(start)
				.and_then(|range| range.text.clone())
				.unwrap_or_default();
			debug_assert_eq!(original.len(), block.num_removed, "removed text missing for {block:?}");
			self.target.replace_lines(start..block.end_line(), &original).await?;
		}

		if block.num_removed > 0 {
			state.removed.delete_range_at(start);
		}
		if block.num_added > 0 {
			state.added.delete_range_at(block.added_start());
		}

		let shrink = block.shrink_on(accept);
		let offset = -(shrink as isize);
		state.removed.shift_from(start, offset);
		state.added.shift_from(start, offset);
		state.blocks.retain(|b| b.start_line != start);
		for b in state.blocks.iter_mut().filter(|b| b.start_line > start) {
			b.start_line -= shrink;
		}
		state.extent -= shrink;
		if state.cursor >= block.end_line() {
			state.cursor -= shrink;
		}

		tracing::debug!(file = %self.file, ?block, accept, "Resolved block");
		Ok(())
	}
}
