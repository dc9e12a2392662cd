use std::time::Duration;

/// Upper bound on the work one [`drain_with`](crate::OwningContext::drain_with) call performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainBudget {
	/// Wall-clock time after which no further job is started.
	pub duration: Duration,
	/// Maximum number of jobs executed.
	pub max_jobs: usize,
}

impl DrainBudget {
	/// A budget that executes every job queued when the pass starts.
	pub const UNBOUNDED: Self = Self {
		duration: Duration::MAX,
		max_jobs: usize::MAX,
	};
}

impl Default for DrainBudget {
	fn default() -> Self {
		Self {
			duration: Duration::from_millis(16),
			max_jobs: 1024,
		}
	}
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
	/// Jobs executed during this pass.
	pub executed: usize,
	/// Jobs still queued when the pass ended.
	pub pending: usize,
	/// Whether the pass stopped because the budget ran out rather than the queue emptying.
	pub budget_exhausted: bool,
}
