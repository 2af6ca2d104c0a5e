use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for patch sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
	/// Text written into the buffer for each removed line. Renderers overlay
	/// the removed text on top of these lines.
	pub placeholder: String,
	/// Delay between drain attempts while the target is not live.
	pub retry_interval_ms: u64,
	/// Capacity of the event broadcast channel. Slow subscribers lag past it.
	pub event_capacity: usize,
	/// Upper bound on removed plus inserted lines during reconciliation.
	/// `None` means unbounded.
	pub max_edit_cost: Option<usize>,
}

impl EngineConfig {
	pub fn retry_interval(&self) -> Duration {
		Duration::from_millis(self.retry_interval_ms)
	}
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			placeholder: String::new(),
			retry_interval_ms: 25,
			event_capacity: 256,
			max_edit_cost: None,
		}
	}
}
