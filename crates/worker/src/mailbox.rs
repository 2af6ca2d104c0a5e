use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// Mailbox send error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxSendError {
	/// Mailbox is closed.
	Closed,
}

struct MailboxState<T> {
	queue: VecDeque<T>,
	closed: bool,
}

/// Unbounded single-consumer FIFO.
///
/// Producers call [`send`](Self::send); the consumer pops with
/// [`try_recv`](Self::try_recv). A consumer that cannot handle the head message
/// right now hands it back with [`requeue_front`](Self::requeue_front), which
/// keeps enqueue order intact across retries.
///
/// The lock is synchronous and never held across an await point.
pub struct Mailbox<T> {
	state: Arc<Mutex<MailboxState<T>>>,
}

impl<T> Clone for Mailbox<T> {
	fn clone(&self) -> Self {
		Self {
			state: Arc::clone(&self.state),
		}
	}
}

impl<T> Default for Mailbox<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Mailbox<T> {
	pub fn new() -> Self {
		Self {
			state: Arc::new(Mutex::new(MailboxState {
				queue: VecDeque::new(),
				closed: false,
			})),
		}
	}

	/// Appends a message. Fails once the mailbox is closed.
	pub fn send(&self, msg: T) -> Result<(), MailboxSendError> {
		let mut state = self.state.lock();
		if state.closed {
			return Err(MailboxSendError::Closed);
		}
		state.queue.push_back(msg);
		Ok(())
	}

	/// Puts a message back at the head of the queue.
	///
	/// Accepted even after [`close`](Self::close): the message was already
	/// admitted once.
	pub fn requeue_front(&self, msg: T) {
		self.state.lock().queue.push_front(msg);
	}

	/// Pops the head message, if any.
	pub fn try_recv(&self) -> Option<T> {
		self.state.lock().queue.pop_front()
	}

	/// Rejects further sends. Queued messages stay drainable.
	pub fn close(&self) {
		self.state.lock().closed = true;
	}

	/// Closes the mailbox and discards everything still queued, returning the
	/// number of dropped messages.
	pub fn close_and_clear(&self) -> usize {
		let mut state = self.state.lock();
		state.closed = true;
		let dropped = state.queue.len();
		state.queue.clear();
		dropped
	}

	pub fn is_closed(&self) -> bool {
		self.state.lock().closed
	}

	pub fn len(&self) -> usize {
		self.state.lock().queue.len()
	}

	pub fn is_empty(&self) -> bool {
		self.state.lock().queue.is_empty()
	}
}
