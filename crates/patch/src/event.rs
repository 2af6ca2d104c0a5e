use crate::block::ChangeBlock;
use crate::ids::FileId;

/// Coarse session status reported to renderers and caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
	/// Ops are being applied.
	Streaming,
	/// Reconciled; blocks await resolution.
	Done,
	/// Session is gone; the buffer holds its final content.
	Closed,
}

/// Payload of a status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
	pub file: FileId,
	pub generation: u64,
	/// Caller-supplied correlation tag, passed through untouched.
	pub tag: Option<String>,
	pub status: SessionStatus,
	pub block_count: usize,
	/// Full buffer text at the time of the transition.
	pub text: String,
}

/// Broadcast to [`SessionRegistry`](crate::SessionRegistry) subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
	Status(StatusUpdate),
	/// The block list of a file changed.
	Blocks {
		file: FileId,
		generation: u64,
		blocks: Vec<ChangeBlock>,
	},
}

impl SessionEvent {
	pub fn file(&self) -> &FileId {
		match self {
			Self::Status(update) => &update.file,
			Self::Blocks { file, .. } => file,
		}
	}

	pub fn generation(&self) -> u64 {
		match self {
			Self::Status(update) => update.generation,
			Self::Blocks { generation, .. } => *generation,
		}
	}
}
