use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::budget::{DrainBudget, DrainReport};
use crate::config::ContextConfig;
use crate::error::ContextError;

/// One unit of work bound for the owning context.
pub struct Job {
	label: &'static str,
	run: Box<dyn FnOnce() + Send + 'static>,
}

impl Job {
	/// Wraps `f` as a job. `label` identifies the job in logs.
	pub fn new(label: &'static str, f: impl FnOnce() + Send + 'static) -> Self {
		Self { label, run: Box::new(f) }
	}

	/// Returns the job's log label.
	pub fn label(&self) -> &'static str {
		self.label
	}

	fn execute(self, context: &str) {
		tracing::trace!(context, job = self.label, "context.job");
		(self.run)();
	}
}

impl std::fmt::Debug for Job {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Job").field("label", &self.label).finish_non_exhaustive()
	}
}

/// Cloneable, thread-safe port into an [`OwningContext`].
///
/// Handles can be moved to any thread. Jobs sent through them are executed
/// on the owning thread in the order each sending thread issued them.
#[derive(Clone)]
pub struct ContextHandle {
	tx: mpsc::UnboundedSender<Job>,
	owner: ThreadId,
	name: Arc<str>,
}

impl ContextHandle {
	/// Returns the context name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns `true` when called on the owning thread.
	pub fn is_current(&self) -> bool {
		thread::current().id() == self.owner
	}

	/// Returns `true` once the [`OwningContext`] has been dropped.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}

	/// Enqueues `job` for the owning context, even when called on the owning thread.
	///
	/// Returns `false` if the context is gone; the job is dropped without running.
	pub fn post(&self, job: Job) -> bool {
		match self.tx.send(job) {
			Ok(()) => true,
			Err(mpsc::error::SendError(job)) => {
				tracing::debug!(context = %self.name, job = job.label, "context closed, job discarded");
				false
			}
		}
	}

	/// Runs `job` immediately when called on the owning thread, otherwise enqueues it.
	pub fn dispatch(&self, job: Job) {
		if self.is_current() {
			job.execute(&self.name);
		} else {
			self.post(job);
		}
	}
}

impl std::fmt::Debug for ContextHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ContextHandle")
			.field("name", &self.name)
			.field("owner", &self.owner)
			.field("closed", &self.is_closed())
			.finish()
	}
}

/// Single-consumer job queue bound to the thread that created it.
///
/// All state owned by the context's clients is mutated by jobs executed here,
/// through [`drain`](Self::drain) in a frame loop or [`run`](Self::run) in an
/// async one. Dropping the context closes every [`ContextHandle`].
pub struct OwningContext {
	rx: mpsc::UnboundedReceiver<Job>,
	handle: ContextHandle,
	config: ContextConfig,
}

impl Default for OwningContext {
	fn default() -> Self {
		Self::new()
	}
}

impl OwningContext {
	/// Creates a context owned by the current thread with default configuration.
	pub fn new() -> Self {
		Self::with_config(ContextConfig::default())
	}

	/// Creates a context owned by the current thread.
	pub fn with_config(config: ContextConfig) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		let handle = ContextHandle {
			tx,
			owner: thread::current().id(),
			name: Arc::from(config.name.as_str()),
		};
		tracing::debug!(context = %config.name, "context.create");
		Self { rx, handle, config }
	}

	/// Returns a new handle for posting jobs.
	pub fn handle(&self) -> ContextHandle {
		self.handle.clone()
	}

	/// Returns the context configuration.
	pub fn config(&self) -> &ContextConfig {
		&self.config
	}

	/// Number of jobs currently queued.
	pub fn pending(&self) -> usize {
		self.rx.len()
	}

	/// Executes queued jobs under the configured [`DrainBudget`].
	pub fn drain(&mut self) -> Result<DrainReport, ContextError> {
		let budget = self.config.drain_budget;
		self.drain_with(budget)
	}

	/// Executes queued jobs until the queue is empty or `budget` runs out.
	///
	/// Every pass over a non-empty queue executes at least one job, whatever the
	/// budget. Under a bounded budget, jobs enqueued by the jobs themselves are
	/// picked up in the same pass; under [`DrainBudget::UNBOUNDED`] the pass stops
	/// after the jobs that were queued when it started.
	pub fn drain_with(&mut self, budget: DrainBudget) -> Result<DrainReport, ContextError> {
		self.ensure_owner()?;

		let backlog = self.rx.len();
		if backlog > self.config.backlog_warn {
			tracing::warn!(context = %self.config.name, backlog, limit = self.config.backlog_warn, "context backlog above limit");
		}

		let max_jobs = if budget.max_jobs == usize::MAX {
			backlog
		} else {
			budget.max_jobs.max(1)
		};
		let deadline = Instant::now().checked_add(budget.duration);
		let mut report = DrainReport::default();

		loop {
			let out_of_time = report.executed > 0 && deadline.is_some_and(|d| Instant::now() >= d);
			if report.executed >= max_jobs || out_of_time {
				report.budget_exhausted = !self.rx.is_empty();
				break;
			}
			let Ok(job) = self.rx.try_recv() else {
				break;
			};
			job.execute(&self.config.name);
			report.executed += 1;
		}

		report.pending = self.rx.len();
		if report.executed > 0 {
			tracing::debug!(
				context = %self.config.name,
				executed = report.executed,
				pending = report.pending,
				"context.drain"
			);
		}
		Ok(report)
	}

	/// Executes jobs as they arrive until `shutdown` is cancelled.
	///
	/// Must be polled on the owning thread, e.g. from a current-thread runtime.
	/// Jobs still queued at shutdown stay queued; a later [`drain`](Self::drain)
	/// picks them up.
	pub async fn run(&mut self, shutdown: &CancellationToken) -> Result<(), ContextError> {
		tracing::debug!(context = %self.config.name, "context.run");
		loop {
			self.ensure_owner()?;
			let job = tokio::select! {
				biased;
				_ = shutdown.cancelled() => break,
				maybe_job = self.rx.recv() => {
					// The context holds its own sender, so the channel never closes here.
					let Some(job) = maybe_job else {
						break;
					};
					job
				}
			};
			job.execute(&self.config.name);
		}
		tracing::debug!(context = %self.config.name, pending = self.rx.len(), "context.run stopped");
		Ok(())
	}

	fn ensure_owner(&self) -> Result<(), ContextError> {
		if self.handle.is_current() {
			Ok(())
		} else {
			Err(ContextError::NotOwner {
				name: self.config.name.clone(),
			})
		}
	}
}

impl std::fmt::Debug for OwningContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OwningContext")
			.field("name", &self.config.name)
			.field("pending", &self.rx.len())
			.finish()
	}
}
