//! Change notification for committed mediator writes.
//!
//! Callbacks are held weakly by the mediator and strongly by the returned
//! [`Subscription`]; dropping the guard unsubscribes. Dead slots are pruned
//! lazily during notification.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback = dyn Fn(u64) + Send + Sync;

/// RAII guard keeping a change callback registered.
///
/// Dropping the subscription removes the callback before the next notification.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
	_callback: Arc<Callback>,
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription").finish_non_exhaustive()
	}
}

#[derive(Default)]
pub(crate) struct Observers {
	slots: Mutex<Vec<Weak<Callback>>>,
}

impl Observers {
	pub(crate) fn subscribe(&self, callback: impl Fn(u64) + Send + Sync + 'static) -> Subscription {
		let callback: Arc<Callback> = Arc::new(callback);
		self.slots.lock().push(Arc::downgrade(&callback));
		Subscription { _callback: callback }
	}

	/// Calls every live callback in registration order.
	///
	/// The slot lock is released before any callback runs, so callbacks may
	/// subscribe or write to the mediator again.
	pub(crate) fn notify(&self, version: u64) {
		let live: Vec<Arc<Callback>> = {
			let mut slots = self.slots.lock();
			slots.retain(|slot| slot.strong_count() > 0);
			slots.iter().filter_map(Weak::upgrade).collect()
		};
		for callback in live {
			callback(version);
		}
	}

	pub(crate) fn len(&self) -> usize {
		self.slots.lock().iter().filter(|slot| slot.strong_count() > 0).count()
	}
}
