use std::any::type_name;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use medial_context::{ContextHandle, Job};
use parking_lot::RwLock;

use crate::binding::Binding;
use crate::field::Field;
use crate::observe::{Observers, Subscription};

/// Contract implemented by every concrete mediator.
///
/// A mediator is generic over the capabilities it is handed, the input record
/// the view reads and writes, and the content the view renders. `content` has
/// no default: a mediator that does not derive its content does not compile.
///
/// ```compile_fail
/// use medial::Mediate;
///
/// struct Forgetful;
///
/// impl Mediate for Forgetful {
///     type Capabilities = ();
///     type Input = String;
///     type Content = String;
/// }
/// ```
pub trait Mediate: Send + Sync + 'static {
	/// Services and callbacks the mediator may invoke.
	type Capabilities: Send + Sync + 'static;
	/// State the view may observe and request changes to.
	type Input: Send + Sync + 'static;
	/// Value the view renders.
	type Content;

	/// Derives the content from the current capabilities and input.
	///
	/// Called on every read. Must not write to the mediator.
	fn content(&self, capabilities: &Self::Capabilities, input: &Self::Input) -> Self::Content;
}

struct Shared<M: Mediate> {
	model: M,
	context: ContextHandle,
	capabilities: RwLock<M::Capabilities>,
	input: RwLock<M::Input>,
	version: AtomicU64,
	observers: Observers,
	/// Read or write guards currently held by the owning thread.
	owner_borrows: AtomicUsize,
}

/// Marks the owning thread as inside a read or write of the state.
///
/// The locks are not reentrant: while this is held, writes requested on the
/// owning thread are queued instead of applied inline.
struct OwnerBorrow<'a>(Option<&'a AtomicUsize>);

impl Drop for OwnerBorrow<'_> {
	fn drop(&mut self) {
		if let Some(borrows) = self.0 {
			borrows.fetch_sub(1, Ordering::AcqRel);
		}
	}
}

impl<M: Mediate> Shared<M> {
	fn borrow(&self) -> OwnerBorrow<'_> {
		if self.context.is_current() {
			self.owner_borrows.fetch_add(1, Ordering::AcqRel);
			OwnerBorrow(Some(&self.owner_borrows))
		} else {
			OwnerBorrow(None)
		}
	}

	fn is_borrowed(&self) -> bool {
		self.owner_borrows.load(Ordering::Acquire) > 0
	}

	fn read<R>(&self, f: impl FnOnce(&M::Capabilities, &M::Input) -> R) -> R {
		let _borrow = self.borrow();
		let capabilities = self.capabilities.read();
		let input = self.input.read();
		f(&capabilities, &input)
	}

	fn content(&self) -> M::Content {
		self.read(|capabilities, input| self.model.content(capabilities, input))
	}

	/// Applies one write and notifies subscribers. Runs on the owning context.
	fn commit(&self, label: &'static str, write: impl FnOnce(&Self)) {
		{
			let _borrow = self.borrow();
			write(self);
		}
		let version = self.version.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
		tracing::trace!(mediator = type_name::<M>(), field = label, version, "mediator.commit");
		self.observers.notify(version);
	}
}

/// Routes `write` onto the owning context, dropping it if the mediator is gone by then.
///
/// On the owning thread the write lands inline, unless that thread is itself
/// inside a read or write of the mediator; then it is queued for the next drain.
fn schedule<M, W>(shared: &Weak<Shared<M>>, context: &ContextHandle, label: &'static str, write: W)
where
	M: Mediate,
	W: FnOnce(&Shared<M>) + Send + 'static,
{
	let weak = Weak::clone(shared);
	let requeue = context.clone();
	let job = Job::new(label, move || {
		let Some(shared) = weak.upgrade() else {
			tracing::trace!(mediator = type_name::<M>(), field = label, "mediator released, write dropped");
			return;
		};
		if shared.is_borrowed() {
			drop(shared);
			schedule(&weak, &requeue, label, write);
			return;
		}
		shared.commit(label, write);
	});

	let busy = context.is_current() && shared.upgrade().is_some_and(|shared| shared.is_borrowed());
	if busy {
		tracing::trace!(mediator = type_name::<M>(), field = label, "mediator busy, write queued");
		context.post(job);
	} else {
		context.dispatch(job);
	}
}

/// Owner of a mediator's capabilities and input.
///
/// The input is only mutated by jobs on the owning context the mediator was
/// created with; reads may happen anywhere and see the last committed state.
/// Dropping the `Mediator` releases the state; outstanding [`Binding`]s and
/// [`WeakMediator`]s then read `None` and their writes become no-ops.
///
/// Writes requested on the owning thread from inside [`with_input`](Self::with_input),
/// [`with_capabilities`](Self::with_capabilities) or an input update are queued
/// rather than applied inline, and land on the next drain.
pub struct Mediator<M: Mediate> {
	shared: Arc<Shared<M>>,
}

impl<M: Mediate> Mediator<M> {
	/// Creates a mediator bound to the owning context behind `context`.
	pub fn new(model: M, capabilities: M::Capabilities, input: M::Input, context: ContextHandle) -> Self {
		tracing::debug!(mediator = type_name::<M>(), context = context.name(), "mediator.create");
		Self {
			shared: Arc::new(Shared {
				model,
				context,
				capabilities: RwLock::new(capabilities),
				input: RwLock::new(input),
				version: AtomicU64::new(0),
				observers: Observers::default(),
				owner_borrows: AtomicUsize::new(0),
			}),
		}
	}

	/// Returns the concrete mediator.
	pub fn model(&self) -> &M {
		&self.shared.model
	}

	/// Returns the handle of the owning context.
	pub fn context(&self) -> &ContextHandle {
		&self.shared.context
	}

	/// Derives the content from the current state.
	pub fn content(&self) -> M::Content {
		self.shared.content()
	}

	/// Hands the current content to `render` and returns what it produces.
	pub fn view<R>(&self, render: impl FnOnce(M::Content) -> R) -> R {
		render(self.content())
	}

	/// Reads the input through `f`.
	pub fn with_input<R>(&self, f: impl FnOnce(&M::Input) -> R) -> R {
		self.shared.read(|_, input| f(input))
	}

	/// Returns a snapshot of the input.
	pub fn input(&self) -> M::Input
	where
		M::Input: Clone,
	{
		self.shared.input.read().clone()
	}

	/// Reads the capabilities through `f`.
	pub fn with_capabilities<R>(&self, f: impl FnOnce(&M::Capabilities) -> R) -> R {
		self.shared.read(|capabilities, _| f(capabilities))
	}

	/// Replaces the capabilities on the owning context.
	pub fn set_capabilities(&self, capabilities: M::Capabilities) {
		schedule(&Arc::downgrade(&self.shared), &self.shared.context, "capabilities", move |shared| {
			*shared.capabilities.write() = capabilities;
		});
	}

	/// Returns an accessor for one field of the input.
	pub fn binding<V>(&self, field: Field<M::Input, V>) -> Binding<V>
	where
		V: Clone + Send + 'static,
	{
		self.downgrade().binding(field)
	}

	/// Applies `update` to the input on the owning context.
	///
	/// `label` names the write in logs.
	pub fn update_input(&self, label: &'static str, update: impl FnOnce(&mut M::Input) + Send + 'static) {
		schedule(&Arc::downgrade(&self.shared), &self.shared.context, label, move |shared| {
			let mut input = shared.input.write();
			update(&mut *input);
		});
	}

	/// Number of writes committed so far.
	pub fn version(&self) -> u64 {
		self.shared.version.load(Ordering::Acquire)
	}

	/// Registers `callback` to run on the owning context after every committed write.
	///
	/// The callback receives the new [`version`](Self::version).
	pub fn subscribe(&self, callback: impl Fn(u64) + Send + Sync + 'static) -> Subscription {
		self.shared.observers.subscribe(callback)
	}

	/// Number of live subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.shared.observers.len()
	}

	/// Returns a non-owning handle to this mediator.
	pub fn downgrade(&self) -> WeakMediator<M> {
		WeakMediator {
			shared: Arc::downgrade(&self.shared),
			context: self.shared.context.clone(),
		}
	}
}

impl<M: Mediate> Drop for Mediator<M> {
	fn drop(&mut self) {
		tracing::debug!(mediator = type_name::<M>(), version = self.version(), "mediator.release");
	}
}

impl<M: Mediate> std::fmt::Debug for Mediator<M> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Mediator")
			.field("mediator", &type_name::<M>())
			.field("context", &self.shared.context.name())
			.field("version", &self.version())
			.finish()
	}
}

/// Non-owning handle to a [`Mediator`].
///
/// Background collaborators hold one to report results back: writes go
/// through the owning context exactly like binding writes and are dropped if
/// the mediator has been released.
pub struct WeakMediator<M: Mediate> {
	shared: Weak<Shared<M>>,
	context: ContextHandle,
}

impl<M: Mediate> Clone for WeakMediator<M> {
	fn clone(&self) -> Self {
		Self {
			shared: Weak::clone(&self.shared),
			context: self.context.clone(),
		}
	}
}

impl<M: Mediate> WeakMediator<M> {
	/// Returns `true` while the owning [`Mediator`] exists.
	pub fn is_alive(&self) -> bool {
		self.shared.strong_count() > 0
	}

	/// Derives the current content, or `None` once the mediator is released.
	pub fn content(&self) -> Option<M::Content> {
		self.shared.upgrade().map(|shared| shared.content())
	}

	/// Applies `update` to the input on the owning context.
	pub fn update_input(&self, label: &'static str, update: impl FnOnce(&mut M::Input) + Send + 'static) {
		schedule(&self.shared, &self.context, label, move |shared| {
			let mut input = shared.input.write();
			update(&mut *input);
		});
	}

	/// Returns an accessor for one field of the input.
	pub fn binding<V>(&self, field: Field<M::Input, V>) -> Binding<V>
	where
		V: Clone + Send + 'static,
	{
		let reader = Weak::clone(&self.shared);
		let writer = Weak::clone(&self.shared);
		let context = self.context.clone();

		Binding::new(
			field.name(),
			move || {
				let shared = reader.upgrade()?;
				Some(shared.read(|_, input| field.read(input).clone()))
			},
			move |value: V| {
				schedule(&writer, &context, field.name(), move |shared| {
					let mut input = shared.input.write();
					field.write(&mut input, value);
				});
			},
		)
	}
}

impl<M: Mediate> std::fmt::Debug for WeakMediator<M> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WeakMediator")
			.field("mediator", &type_name::<M>())
			.field("alive", &self.is_alive())
			.finish()
	}
}
