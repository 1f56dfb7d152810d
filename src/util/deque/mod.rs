//! Deferred-work storage: thread-local deques that spill into a shared pool.
//!
//! A [`LocalDeque`] is owned by exactly one thread. Pushing never blocks: when the local buffer
//! reaches its capacity, the whole buffer is handed to the [`SharedDeque`] it is attached to.
//! Collector threads drain a pool cooperatively with [`SharedDeque::spin`], which returns `None`
//! only once every consumer has run out of work.

mod local_deque;
mod shared_deque;

pub use self::local_deque::LocalDeque;
pub use self::shared_deque::SharedDeque;
