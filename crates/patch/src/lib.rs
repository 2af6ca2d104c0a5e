//! Incremental patch sessions.
//!
//! A [`PatchSession`] streams an edit script onto a live [`TextTarget`],
//! keeping removed lines as annotated placeholders and inserted lines as
//! decorated buffer lines. Once the stream ends the session recomputes the
//! minimal script and rewrites its range to match it exactly, after which
//! [`ChangeBlock`]s can be accepted or rejected one at a time or all at once.
//!
//! [`SessionRegistry`] keeps at most one session per file and fans state
//! changes out to subscribers as [`SessionEvent`]s.

/// Change blocks: contiguous runs of removed and added lines.
pub mod block;
/// Engine configuration.
pub mod config;
/// Session lifecycle events.
pub mod event;
/// File identities and managed line ranges.
pub mod ids;
/// Ordered line-range bookkeeping for decorations.
pub mod ranges;
/// Single-session-per-file registry.
pub mod registry;
/// Patch session state machine.
pub mod session;
/// Text buffer collaborator trait and a rope-backed implementation.
pub mod target;

mod error;

pub use block::ChangeBlock;
pub use config::EngineConfig;
pub use error::{PatchError, ReconcileCause, TargetError};
pub use event::{SessionEvent, SessionStatus, StatusUpdate};
pub use ids::{FileId, LineRange};
pub use ranges::{RangeTracker, TrackedRange};
pub use redline_diff::{LineOp, LineOpKind};
pub use registry::{SessionRegistry, SessionSpec};
pub use session::{BlockFailure, CloseReport, Decorations, DrainOutcome, PatchSession, SessionPhase};
pub use target::{RopeBuffer, TextTarget};
