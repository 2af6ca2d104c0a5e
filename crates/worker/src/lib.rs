//! Worker primitives shared by patch sessions.
//!
//! * [`Mailbox`]: unbounded FIFO drained by exactly one consumer, with support
//!   for putting a message back at the head when it could not be handled yet.
//! * [`GenerationClock`] / [`GenerationToken`]: monotonic session generations
//!   paired with cooperative cancellation.

pub mod mailbox;
pub mod token;

pub use mailbox::{Mailbox, MailboxSendError};
pub use token::{GenerationClock, GenerationToken};
