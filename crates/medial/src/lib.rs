//! Mediators between a declarative view and the state it displays.
//!
//! A mediator owns three typed slots:
//!
//! * **capabilities**: services and callbacks handed in by its owner,
//! * **input**: the record the view reads and requests writes to,
//! * **content**: the read-only value the view renders, derived from the
//!   other two on every read.
//!
//! Concrete mediators implement [`Mediate`]; [`Mediator`] owns their state.
//! The view reads [`Mediator::content`] (or calls [`Mediator::view`]) and
//! writes single fields through [`Binding`]s addressed by [`field!`] paths.
//!
//! # Writes and the owning context
//!
//! Every mediator is bound to an [`OwningContext`], normally the UI thread.
//! Input is only ever mutated there. A binding write issued on the owning
//! thread lands immediately; one issued from a background thread is queued
//! and lands when the owning thread drains its context. Bindings hold the
//! mediator weakly, so a queued write for a mediator that has since been
//! dropped is discarded.
//!
//! # Example
//!
//! ```
//! use medial::{Mediate, Mediator, OwningContext, field};
//!
//! struct Echo;
//!
//! #[derive(Clone, Default)]
//! struct Input {
//!     text_input: String,
//! }
//!
//! impl Mediate for Echo {
//!     type Capabilities = ();
//!     type Input = Input;
//!     type Content = String;
//!
//!     fn content(&self, _: &(), input: &Input) -> String {
//!         input.text_input.clone()
//!     }
//! }
//!
//! let mut ctx = OwningContext::new();
//! let mediator = Mediator::new(Echo, (), Input::default(), ctx.handle());
//! assert_eq!(mediator.content(), "");
//!
//! let text = mediator.binding(field!(Input => text_input));
//! text.set("Hello World".to_string());
//! assert_eq!(mediator.content(), "Hello World");
//!
//! let worker = text.clone();
//! std::thread::spawn(move || worker.set("from the background".to_string()))
//!     .join()
//!     .unwrap();
//! assert_eq!(text.get().as_deref(), Some("Hello World"));
//!
//! ctx.drain().unwrap();
//! assert_eq!(mediator.view(|content| format!("<{content}>")), "<from the background>");
//! ```

mod binding;
mod field;
mod mediator;
mod observe;

pub use binding::Binding;
pub use field::Field;
pub use medial_context::{
	ConfigError, ContextConfig, ContextError, ContextHandle, DrainBudget, DrainReport, Job, OwningContext,
};
pub use mediator::{Mediate, Mediator, WeakMediator};
pub use observe::Subscription;

#[cfg(test)]
mod tests;
