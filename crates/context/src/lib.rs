//! Owning execution context for mediator state.
//!
//! State that a rendering layer observes must only be mutated on one thread.
//! Work produced anywhere else is posted here as a [`Job`] and applied when
//! the owning thread drains the queue.
//!
//! # Architecture
//!
//! ```text
//! Background thread ─┐
//!                    ├──► ContextHandle::post ──► OwningContext::drain / run ──► state update
//! Background task ───┘
//! Owning thread ─────────► ContextHandle::dispatch ──► applied inline
//! ```
//!
//! # Invariants
//!
//! * Jobs run only on the thread that created the [`OwningContext`]; driving
//!   it from elsewhere fails with [`ContextError::NotOwner`].
//! * Jobs posted from one thread run in the order that thread posted them.
//!   Jobs from different threads interleave in arrival order.
//! * Jobs posted after the context is dropped are discarded without running.

mod budget;
pub mod config;
mod context;
pub mod error;

pub use budget::{DrainBudget, DrainReport};
pub use config::ContextConfig;
pub use context::{ContextHandle, Job, OwningContext};
pub use error::{ConfigError, ContextError};
