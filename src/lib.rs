//! A deferred reference counting garbage collector core.
//!
//! Objects carry a reference count in one header word owned by the collector. Mutators do not
//! update counts on every store. Instead, each reference write goes through a write barrier
//! that logs the first write to an object (or to a field) per *increment*, remembering the
//! overwritten referents. At each increment, with the mutators stopped, collector threads:
//!
//! 1. increment the count of every referent of the logged objects and fields, and of every
//!    root;
//! 2. decrement the count of every overwritten referent, and of the previous increment's
//!    roots, freeing objects whose count reaches zero and decrementing their referents in turn;
//! 3. optionally run a backup trace that reclaims garbage cycles and stuck counts.
//!
//! The host runtime (the *binding*) implements the traits in [`vm`] to describe its object
//! model, and drives the collector through [`memory_manager`].
//!
//! Logging is done with the [`log`] crate. With the `builtin_env_logger` feature (on by
//! default), [`memory_manager::mmtk_init`] installs an `env_logger` at `info` level unless the
//! binding has installed a logger already.

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod mmtk;
pub use mmtk::HeapResources;
pub use mmtk::MMTKBuilder;
pub use mmtk::MMTK;

pub mod build_info;
mod global_state;
pub use global_state::GlobalState;
pub mod memory_manager;
pub mod plan;
pub use plan::{AllocationSemantics, CollectionKind, Mutator};
pub mod policy;
pub mod util;
pub mod vm;
