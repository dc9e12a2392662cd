use std::sync::Arc;

/// Read/write accessor for one field of a mediator's input.
///
/// Obtained from [`Mediator::binding`](crate::Mediator::binding). A binding
/// holds only a weak reference to its mediator, so it never keeps the state
/// alive, and it hides the mediator type from the rendering layer.
///
/// * [`get`](Self::get) reads the committed value at call time.
/// * [`set`](Self::set) requests a write, applied on the mediator's owning
///   context: immediately when called there, otherwise after the context
///   drains. It never blocks and never fails; a write whose mediator is gone
///   by the time it runs is dropped.
pub struct Binding<V> {
	field: &'static str,
	get: Arc<dyn Fn() -> Option<V> + Send + Sync>,
	set: Arc<dyn Fn(V) + Send + Sync>,
}

impl<V> Clone for Binding<V> {
	fn clone(&self) -> Self {
		Self {
			field: self.field,
			get: Arc::clone(&self.get),
			set: Arc::clone(&self.set),
		}
	}
}

impl<V: 'static> Binding<V> {
	/// Creates a binding from a custom getter and setter.
	pub fn new(
		field: &'static str,
		get: impl Fn() -> Option<V> + Send + Sync + 'static,
		set: impl Fn(V) + Send + Sync + 'static,
	) -> Self {
		Self {
			field,
			get: Arc::new(get),
			set: Arc::new(set),
		}
	}

	/// Creates a binding that always reads `value` and ignores writes.
	pub fn constant(value: V) -> Self
	where
		V: Clone + Send + Sync,
	{
		Self::new("constant", move || Some(value.clone()), |_| {})
	}

	/// Returns the current value, or `None` once the mediator has been released.
	#[must_use]
	pub fn get(&self) -> Option<V> {
		(self.get)()
	}

	/// Requests that the field be set to `value`.
	pub fn set(&self, value: V) {
		(self.set)(value)
	}

	/// Returns the path name of the bound field.
	pub fn field(&self) -> &'static str {
		self.field
	}
}

impl<V: std::fmt::Debug + 'static> std::fmt::Debug for Binding<V> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Binding")
			.field("field", &self.field)
			.field("value", &self.get())
			.finish()
	}
}
