//! Deferred reference counting.
//!
//! Mutators never touch reference counts. Their write barriers log the first write to each
//! object (or field) per increment into thread-local buffers, recording the overwritten
//! referents as decrements. At the next increment the collectors apply the increments for the
//! new referents of everything logged, then the decrements, freeing objects whose count drops
//! to zero. An optional backup trace reclaims cycles.

pub mod backup_trace;
pub mod buffers;
pub mod decrements;
mod global;
pub mod header;
pub mod modified;

pub use self::global::RC;
