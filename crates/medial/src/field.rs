/// Addressable path to one field of an input record.
///
/// A `Field` pairs a shared and a mutable projection from `I` to `V`. It is
/// `Copy` and carries no reference to any particular record, so one value can
/// address the same field in every mediator of a type. Build one with
/// [`field!`](crate::field).
pub struct Field<I, V> {
	name: &'static str,
	get: fn(&I) -> &V,
	get_mut: fn(&mut I) -> &mut V,
}

impl<I, V> Clone for Field<I, V> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<I, V> Copy for Field<I, V> {}

impl<I, V> Field<I, V> {
	/// Creates a field path from its two projections.
	pub const fn new(name: &'static str, get: fn(&I) -> &V, get_mut: fn(&mut I) -> &mut V) -> Self {
		Self { name, get, get_mut }
	}

	/// Returns the dotted path name, e.g. `"address.city"`.
	pub const fn name(&self) -> &'static str {
		self.name
	}

	/// Borrows the field out of `input`.
	pub fn read<'a>(&self, input: &'a I) -> &'a V {
		(self.get)(input)
	}

	/// Overwrites the field in `input`.
	pub fn write(&self, input: &mut I, value: V) {
		*(self.get_mut)(input) = value;
	}
}

impl<I, V> std::fmt::Debug for Field<I, V> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Field").field(&self.name).finish()
	}
}

/// Creates a [`Field`] for a (possibly nested) path into an input type.
///
/// # Examples
///
/// ```
/// use medial::{Field, field};
///
/// struct Address {
///     city: String,
/// }
///
/// struct Form {
///     name: String,
///     address: Address,
/// }
///
/// let name: Field<Form, String> = field!(Form => name);
/// let city = field!(Form => address.city);
/// assert_eq!(city.name(), "address.city");
///
/// let mut form = Form {
///     name: "Ada".into(),
///     address: Address { city: "London".into() },
/// };
/// city.write(&mut form, "Paris".into());
/// assert_eq!(city.read(&form), "Paris");
/// assert_eq!(name.read(&form), "Ada");
/// ```
#[macro_export]
macro_rules! field {
	($input:ty => $head:ident $(. $tail:ident)*) => {
		$crate::Field::new(
			concat!(stringify!($head) $(, ".", stringify!($tail))*),
			|input: &$input| &input.$head $(.$tail)*,
			|input: &mut $input| &mut input.$head $(.$tail)*,
		)
	};
}
