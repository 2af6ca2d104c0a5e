use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Hands out increasing session generations, starting at 1.
///
/// Clones share the counter.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	issued: Arc<AtomicU64>,
}

impl GenerationClock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Latest generation handed out, 0 before the first.
	pub fn current(&self) -> u64 {
		self.issued.load(Ordering::Acquire)
	}

	/// Starts a new generation with its own cancellation switch.
	pub fn issue(&self) -> GenerationToken {
		GenerationToken {
			generation: self.issued.fetch_add(1, Ordering::AcqRel) + 1,
			cancel: CancellationToken::new(),
		}
	}
}

/// Identity and cancellation switch of one generation.
///
/// Clones observe the same switch. Once cancelled, always cancelled.
#[derive(Debug, Clone)]
pub struct GenerationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl GenerationToken {
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Resolves once [`cancel`](Self::cancel) has been called on any clone.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}
}
