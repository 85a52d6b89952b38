//! Runtime method delegation for host objects.
//!
//! A host type declares, at construction, which of its methods are
//! delegatable by installing each one into a [`SlotRegistry`] with its base
//! implementation. Later, any caller — typically glue loading callables from
//! a foreign runtime — registers a [`Delegate`] against an installed name
//! under a composition [`Policy`] (`"before"`, `"after"`, or `"replace"`).
//! The slot's active implementation is rebuilt on each registration, and the
//! host's ordinary methods observe the composed behavior with no change of
//! shape.
//!
//! Result-bearing delegates return `Option<R>`: `Some` means "I produced the
//! value", `None` means "defer to the previous behavior".
//!
//! ```
//! use baton::{Delegate, SlotFn, SlotRegistry};
//!
//! # fn main() -> Result<(), baton::DelegationError> {
//! let mut slots = SlotRegistry::new();
//! let rate = slots.install("rate", SlotFn::scalar_of_scalar(|_t| 2.0))?;
//!
//! // An "after" delegate adds its produced value to the base result.
//! slots.register("rate", "after", Delegate::scalar_of_scalar(|_t| Some(3.0)))?;
//! assert_eq!(slots.call_scalar_of_scalar(rate, 0.0), 5.0);
//!
//! // A declining delegate leaves the previous behavior in force.
//! slots.register("rate", "before", Delegate::scalar_of_scalar(|_t| None))?;
//! assert_eq!(slots.call_scalar_of_scalar(rate, 0.0), 5.0);
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod error;
pub mod registry;
pub mod signature;

pub use compose::Policy;
pub use error::DelegationError;
pub use registry::{SlotKey, SlotRegistry};
pub use signature::{Delegate, SignatureFamily, SlotFn};
