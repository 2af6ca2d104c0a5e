//! At most one [`PatchSession`] per file.
//!
//! Opening a session for a file that already has one rejects and closes the
//! old session first, so its `Closed` status always precedes the new
//! session's `Streaming` status on the event channel. Sessions leave the map
//! once they have no blocks left.

use std::collections::HashMap;
use std::sync::Arc;

use futures::Stream;
use parking_lot::Mutex;
use redline_diff::LineOp;
use redline_worker::GenerationClock;
use tokio::sync::broadcast;

use crate::block::ChangeBlock;
use crate::config::EngineConfig;
use crate::error::{PatchError, TargetError};
use crate::event::SessionEvent;
use crate::ids::{FileId, LineRange};
use crate::session::{CloseReport, PatchSession};
use crate::target::TextTarget;

/// What to open a session on.
pub struct SessionSpec {
	file: FileId,
	target: Arc<dyn TextTarget>,
	range: Option<LineRange>,
	tag: Option<String>,
}

impl SessionSpec {
	/// Session over the whole document of `target`.
	pub fn new(file: impl Into<FileId>, target: Arc<dyn TextTarget>) -> Self {
		Self {
			file: file.into(),
			target,
			range: None,
			tag: None,
		}
	}

	/// Restricts the session to `range` of the document.
	pub fn range(mut self, range: impl Into<LineRange>) -> Self {
		self.range = Some(range.into());
		self
	}

	/// Opaque correlation tag echoed in status events.
	pub fn tag(mut self, tag: impl Into<String>) -> Self {
		self.tag = Some(tag.into());
		self
	}

	pub fn file(&self) -> &FileId {
		&self.file
	}
}

/// Owns the live session of every file.
pub struct SessionRegistry {
	config: Arc<EngineConfig>,
	clock: GenerationClock,
	sessions: Mutex<HashMap<FileId, Arc<PatchSession>>>,
	events: broadcast::Sender<SessionEvent>,
}

impl SessionRegistry {
	pub fn new(config: EngineConfig) -> Self {
		let (events, _) = broadcast::channel(config.event_capacity.max(1));
		Self {
			config: Arc::new(config),
			clock: GenerationClock::new(),
			sessions: Mutex::new(HashMap::new()),
			events,
		}
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Receives status and block-list events from every session.
	pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
		self.events.subscribe()
	}

	pub fn session(&self, file: &FileId) -> Option<Arc<PatchSession>> {
		self.sessions.lock().get(file).cloned()
	}

	pub fn active_files(&self) -> Vec<FileId> {
		let mut files: Vec<FileId> = self.sessions.lock().keys().cloned().collect();
		files.sort();
		files
	}

	/// Installs a fresh session, rejecting and closing any previous one for
	/// the same file first.
	pub async fn open(&self, spec: SessionSpec) -> Result<Arc<PatchSession>, PatchError> {
		let SessionSpec {
			file,
			target,
			range,
			tag,
		} = spec;

		let previous = self.sessions.lock().remove(&file);
		if let Some(previous) = previous {
			tracing::debug!(%file, generation = previous.generation(), "Replacing patch session");
			self.retire(&previous).await;
		}

		let len = target.line_count().await;
		let range = range.unwrap_or(LineRange::new(0, len));
		if range.start > range.end || range.end > len {
			return Err(TargetError::LineOutOfRange {
				line: range.end.max(range.start),
				len,
			}
			.into());
		}

		let session = Arc::new(PatchSession::new(
			file.clone(),
			tag,
			self.clock.issue(),
			target,
			Arc::clone(&self.config),
			self.events.clone(),
			range,
			range.end == len,
		));
		let displaced = self.sessions.lock().insert(file.clone(), Arc::clone(&session));
		if let Some(displaced) = displaced {
			self.retire(&displaced).await;
		}

		session.announce().await;
		tracing::debug!(%file, generation = session.generation(), %range, "Opened patch session");
		Ok(session)
	}

	/// Opens a session and drives `ops` through it up to reconciliation.
	pub async fn run<S>(&self, spec: SessionSpec, ops: S) -> Result<Arc<PatchSession>, PatchError>
	where
		S: Stream<Item = LineOp> + Send,
	{
		let session = self.open(spec).await?;
		let result = session.run(ops).await;
		self.publish_blocks(&session);
		self.reap(&session);
		result.map(|()| session)
	}

	/// Accepts or rejects one block of `file`'s session.
	pub async fn resolve_block(&self, file: &FileId, index: usize, accept: bool) -> Result<Option<ChangeBlock>, PatchError> {
		let session = self.require(file)?;
		let resolved = session.resolve_block(index, accept).await?;
		if resolved.is_some() {
			self.publish_blocks(&session);
		}
		self.reap(&session);
		Ok(resolved)
	}

	/// Resolves every block of `file`'s session the same way.
	pub async fn resolve_all(&self, file: &FileId, accept: bool) -> Result<CloseReport, PatchError> {
		let session = self.require(file)?;
		let report = session.close(accept).await?;
		self.publish_blocks(&session);
		self.reap(&session);
		Ok(report)
	}

	/// Last published block list of `file`; empty without a session.
	pub fn get_blocks(&self, file: &FileId) -> Vec<ChangeBlock> {
		self.session(file).map(|session| session.blocks()).unwrap_or_default()
	}

	/// Rejects and closes every live session.
	pub async fn teardown(&self) {
		let sessions: Vec<Arc<PatchSession>> = self.sessions.lock().drain().map(|(_, session)| session).collect();
		tracing::debug!(count = sessions.len(), "Tearing down patch sessions");
		for session in sessions {
			self.retire(&session).await;
		}
	}

	fn require(&self, file: &FileId) -> Result<Arc<PatchSession>, PatchError> {
		self.session(file).ok_or_else(|| PatchError::UnknownFile(file.clone()))
	}

	/// Rejects a session that is leaving the map. A session that cannot be
	/// rolled back is abandoned with its blocks in place.
	async fn retire(&self, session: &PatchSession) {
		match session.close(false).await {
			Ok(report) if report.is_complete() => {}
			Ok(report) => {
				tracing::warn!(file = %session.file(), failures = report.failures.len(), "Could not reject every block");
				session.abandon().await;
			}
			Err(err) => {
				tracing::warn!(file = %session.file(), error = %err, "Could not reject session");
				session.abandon().await;
			}
		}
		self.publish_blocks(session);
	}

	fn publish_blocks(&self, session: &PatchSession) {
		let _ = self.events.send(SessionEvent::Blocks {
			file: session.file().clone(),
			generation: session.generation(),
			blocks: session.blocks(),
		});
	}

	/// Drops a finished session, unless it was already replaced.
	fn reap(&self, session: &Arc<PatchSession>) {
		if !session.is_cancelled() {
			return;
		}
		let mut sessions = self.sessions.lock();
		if sessions.get(session.file()).is_some_and(|live| Arc::ptr_eq(live, session)) {
			sessions.remove(session.file());
			tracing::debug!(file = %session.file(), generation = session.generation(), "Removed finished patch session");
		}
	}
}
