//! Patch session: one file's streamed edit lifecycle.
//!
//! ```text
//! Idle → Streaming → Flushing → Reconciled → BlockPending* → Closed
//!   └──────────┴──────────┴─→ Cancelled (closed before reconciliation)
//! ```
//!
//! Ops go through a [`Mailbox`] and are applied by one drain loop at a time,
//! holding the session's state lock. Each op is checked against the target's
//! liveness before any mutation; an op that cannot be applied yet is put back
//! at the head of the mailbox, so per-file order survives retries.
//!
//! While streaming, removed lines are deleted as they arrive and come back as
//! placeholder lines when their run is flushed, which keeps the buffer layout
//! of every block as `[placeholders][added lines]`. After the stream ends the
//! session recomputes the minimal script and rewrites its range to match it,
//! dropping whatever drift incremental application introduced.

mod apply;
mod reconcile;
mod resolve;

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures::{Stream, StreamExt};
use redline_diff::LineOp;
use redline_worker::{GenerationToken, Mailbox};
use tokio::sync::{Mutex, broadcast};

pub use self::resolve::{BlockFailure, CloseReport};
use crate::block::ChangeBlock;
use crate::config::EngineConfig;
use crate::error::{PatchError, TargetError};
use crate::event::{SessionEvent, SessionStatus, StatusUpdate};
use crate::ids::{FileId, LineRange};
use crate::ranges::{RangeTracker, TrackedRange};
use crate::target::TextTarget;

/// Lifecycle phase of a [`PatchSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
	/// Created, no op applied yet.
	Idle,
	/// Applying streamed ops.
	Streaming,
	/// Stream exhausted; flushing the last run and reconciling.
	Flushing,
	/// Buffer matches the minimal script; no block resolved yet.
	Reconciled,
	/// At least one block resolved, others remain.
	BlockPending,
	/// Every block resolved.
	Closed,
	/// Closed before reconciliation finished.
	Cancelled,
}

impl SessionPhase {
	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Closed | Self::Cancelled)
	}

	pub fn is_reconciled(self) -> bool {
		matches!(self, Self::Reconciled | Self::BlockPending)
	}
}

/// Result of one [`PatchSession::drain`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
	/// The mailbox is empty.
	Drained,
	/// The target was not live; the head op is back in the mailbox.
	Stalled,
	/// The session is cancelled; queued ops were dropped.
	Cancelled,
}

/// Snapshot of the decorations a renderer draws.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decorations {
	/// Placeholder lines, with the removed text to overlay.
	pub removed: Vec<TrackedRange>,
	/// Added buffer lines.
	pub added: Vec<TrackedRange>,
}

pub(crate) struct SessionState {
	phase: SessionPhase,
	range: LineRange,
	/// Current number of lines in the managed range.
	extent: usize,
	/// Range reaches the end of the document, so the trailing-newline rule applies.
	covers_end: bool,
	cursor: usize,
	pending_removals: Vec<String>,
	inserted_in_run: usize,
	blocks: Vec<ChangeBlock>,
	removed: RangeTracker,
	added: RangeTracker,
	/// Every op applied so far, in order.
	history: Vec<LineOp>,
}

impl SessionState {
	fn new(range: LineRange, covers_end: bool) -> Self {
		Self {
			phase: SessionPhase::Idle,
			range,
			extent: range.len(),
			covers_end,
			cursor: range.start,
			pending_removals: Vec::new(),
			inserted_in_run: 0,
			blocks: Vec::new(),
			removed: RangeTracker::new(),
			added: RangeTracker::new(),
			history: Vec::new(),
		}
	}

	fn extent_end(&self) -> usize {
		self.range.start + self.extent
	}
}

/// Live mutation context for one file's pending patch.
///
/// Created through [`SessionRegistry`](crate::SessionRegistry); shared as
/// `Arc<PatchSession>`.
pub struct PatchSession {
	file: FileId,
	tag: Option<String>,
	token: GenerationToken,
	target: Arc<dyn TextTarget>,
	config: Arc<EngineConfig>,
	queue: Mailbox<LineOp>,
	state: Mutex<SessionState>,
	blocks: ArcSwap<Vec<ChangeBlock>>,
	events: broadcast::Sender<SessionEvent>,
}

impl fmt::Debug for PatchSession {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PatchSession")
			.field("file", &self.file)
			.field("generation", &self.generation())
			.field("tag", &self.tag)
			.field("blocks", &self.block_count())
			.finish_non_exhaustive()
	}
}

impl PatchSession {
	#[allow(clippy::too_many_arguments)]
	pub(crate) fn new(
		file: FileId,
		tag: Option<String>,
		token: GenerationToken,
		target: Arc<dyn TextTarget>,
		config: Arc<EngineConfig>,
		events: broadcast::Sender<SessionEvent>,
		range: LineRange,
		covers_end: bool,
	) -> Self {
		Self {
			file,
			tag,
			token,
			target,
			config,
			queue: Mailbox::new(),
			state: Mutex::new(SessionState::new(range, covers_end)),
			blocks: ArcSwap::from_pointee(Vec::new()),
			events,
		}
	}

	pub fn file(&self) -> &FileId {
		&self.file
	}

	pub fn tag(&self) -> Option<&str> {
		self.tag.as_deref()
	}

	pub fn generation(&self) -> u64 {
		self.token.generation()
	}

	pub fn target(&self) -> &Arc<dyn TextTarget> {
		&self.target
	}

	/// True once the session is closed or cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}

	/// Last published block list. Lock-free.
	pub fn blocks(&self) -> Vec<ChangeBlock> {
		self.blocks.load().as_ref().clone()
	}

	pub fn block_count(&self) -> usize {
		self.blocks.load().len()
	}

	/// Ops waiting in the mailbox.
	pub fn pending_ops(&self) -> usize {
		self.queue.len()
	}

	pub async fn phase(&self) -> SessionPhase {
		self.state.lock().await.phase
	}

	pub async fn decorations(&self) -> Decorations {
		let state = self.state.lock().await;
		Decorations {
			removed: state.removed.ranges().to_vec(),
			added: state.added.ranges().to_vec(),
		}
	}

	/// Queues an op without applying it. Ops whose text spans several lines
	/// are refused.
	pub fn enqueue(&self, op: LineOp) -> Result<(), PatchError> {
		if !op.is_single_line() {
			return Err(PatchError::MultilineOp { file: self.file.clone() });
		}
		self.queue.send(op).map_err(|_| PatchError::Closed { file: self.file.clone() })
	}

	/// Queues an op and drains the mailbox.
	pub async fn push(&self, op: LineOp) -> Result<DrainOutcome, PatchError> {
		self.enqueue(op)?;
		self.drain().await
	}

	/// Applies queued ops in order until the mailbox is empty, the target
	/// stops being live, or the session is cancelled.
	///
	/// Only one drain loop runs at a time; concurrent callers wait for the
	/// active loop and then pick up whatever it left.
	pub async fn drain(&self) -> Result<DrainOutcome, PatchError> {
		let mut state = self.state.lock().await;
		while let Some(op) = self.queue.try_recv() {
			if self.token.is_cancelled() {
				let dropped = self.queue.close_and_clear() + 1;
				tracing::debug!(file = %self.file, dropped, "Dropping ops for cancelled session");
				return Ok(DrainOutcome::Cancelled);
			}
			match self.apply(&mut state, &op).await {
				Ok(()) => state.history.push(op),
				Err(err) if err.is_transient() => {
					tracing::debug!(file = %self.file, cursor = state.cursor, "Target not live, requeueing op");
					self.queue.requeue_front(op);
					return Ok(DrainOutcome::Stalled);
				}
				Err(err) => {
					self.queue.requeue_front(op);
					return Err(err);
				}
			}
		}
		if self.token.is_cancelled() {
			Ok(DrainOutcome::Cancelled)
		} else {
			Ok(DrainOutcome::Drained)
		}
	}

	/// Drives `ops` through the session, then flushes and reconciles.
	///
	/// Returns early with `Ok` if the session is closed meanwhile. Any other
	/// failure rejects the session's blocks, closes it, and is returned.
	pub async fn run<S>(&self, ops: S) -> Result<(), PatchError>
	where
		S: Stream<Item = LineOp> + Send,
	{
		let mut ops = std::pin::pin!(ops);
		loop {
			let next = tokio::select! {
				biased;
				() = self.token.cancelled() => None,
				op = ops.next() => op,
			};
			let Some(op) = next else {
				break;
			};
			match self.push(op).await {
				Ok(_) => {}
				Err(_) if self.token.is_cancelled() => return Ok(()),
				Err(err) => return Err(self.abort(err).await),
			}
		}
		self.complete().await
	}

	/// Marks the end of the op stream: waits out stalled ops, flushes the last
	/// run and reconciles the buffer against the minimal script.
	pub async fn complete(&self) -> Result<(), PatchError> {
		self.queue.close();
		loop {
			match self.drain().await {
				Ok(DrainOutcome::Drained) => break,
				Ok(DrainOutcome::Cancelled) => return Ok(()),
				Ok(DrainOutcome::Stalled) => tokio::time::sleep(self.config.retry_interval()).await,
				Err(_) if self.token.is_cancelled() => return Ok(()),
				Err(err) => return Err(self.abort(err).await),
			}
		}

		loop {
			let mut state = self.state.lock().await;
			if self.token.is_cancelled() {
				return Ok(());
			}
			match self.end_of_stream(&mut state).await {
				Ok(()) => return Ok(()),
				Err(err) if err.is_transient() => {
					drop(state);
					tracing::debug!(file = %self.file, "Target not live at end of stream, retrying");
					tokio::time::sleep(self.config.retry_interval()).await;
				}
				Err(err) => {
					drop(state);
					return Err(self.abort(err).await);
				}
			}
		}
	}

	async fn end_of_stream(&self, state: &mut SessionState) -> Result<(), PatchError> {
		state.phase = SessionPhase::Flushing;
		self.flush(state).await?;
		if self.token.is_cancelled() {
			return Ok(());
		}
		self.reconcile(state).await?;
		self.publish_blocks(state);
		self.emit_status(state, SessionStatus::Done).await;
		if state.blocks.is_empty() {
			self.finish(state).await;
		}
		Ok(())
	}

	/// Rejects and closes the session after a fatal streaming error.
	async fn abort(&self, err: PatchError) -> PatchError {
		tracing::warn!(file = %self.file, error = %err, "Patch session failed, rejecting pending blocks");
		match self.close(false).await {
			Ok(report) if !report.is_complete() => {
				tracing::warn!(file = %self.file, failures = report.failures.len(), "Rollback left unresolved blocks");
			}
			Ok(_) => {}
			Err(close_err) => tracing::warn!(file = %self.file, error = %close_err, "Rollback failed"),
		}
		err
	}

	/// Emits the initial `Streaming` status.
	pub(crate) async fn announce(&self) {
		let state = self.state.lock().await;
		self.emit_status(&state, SessionStatus::Streaming).await;
	}

	/// Closes the session without touching the buffer.
	pub(crate) async fn abandon(&self) {
		let mut state = self.state.lock().await;
		if !state.phase.is_terminal() {
			tracing::warn!(file = %self.file, blocks = state.blocks.len(), "Abandoning patch session");
			self.finish(&mut state).await;
		}
	}

	async fn finish(&self, state: &mut SessionState) {
		state.phase = if state.phase.is_reconciled() {
			SessionPhase::Closed
		} else {
			SessionPhase::Cancelled
		};
		self.token.cancel();
		self.queue.close_and_clear();
		state.pending_removals.clear();
		state.inserted_in_run = 0;
		self.publish_blocks(state);
		self.emit_status(state, SessionStatus::Closed).await;
		tracing::debug!(file = %self.file, phase = ?state.phase, "Patch session finished");
	}

	fn ensure_live(&self) -> Result<(), PatchError> {
		if self.target.is_live() {
			Ok(())
		} else {
			Err(TargetError::NotLive.into())
		}
	}

	fn publish_blocks(&self, state: &SessionState) {
		self.blocks.store(Arc::new(state.blocks.clone()));
	}

	async fn emit_status(&self, state: &SessionState, status: SessionStatus) {
		let update = StatusUpdate {
			file: self.file.clone(),
			generation: self.generation(),
			tag: self.tag.clone(),
			status,
			block_count: state.blocks.len(),
			text: self.target.text().await,
		};
		let _ = self.events.send(SessionEvent::Status(update));
	}
}
