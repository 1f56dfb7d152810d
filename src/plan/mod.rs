//! The deferred reference counting plan, and the contexts that drive it.
//!
//! * [`rc`] holds the plan itself: the header protocol, the buffers, and the count
//!   reconciliation and backup trace closures.
//! * A [`Mutator`] allocates and runs the write barrier ([`barriers`]) for one thread.
//! * A [`Collector`] drains the plan's pools for one collector thread.
//! * [`phase`] sequences an increment over all of them.

pub mod barriers;
mod collector_context;
mod global;
mod mutator_context;
pub mod phase;
pub mod rc;
pub mod tracing;

pub use self::collector_context::Collector;
pub use self::global::{AllocationSemantics, CollectionKind};
pub use self::mutator_context::{Mutator, MutatorConfig, ALLOCATOR_MAPPING};
pub use self::phase::{Phase, Schedule};
