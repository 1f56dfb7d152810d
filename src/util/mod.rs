//! Utilities shared by the plan, the policies and the allocators.

/// Address and object reference types.
pub mod address;
/// Thread-local allocators.
pub mod alloc;
/// Constants of the memory layout.
pub mod constants;
/// Conversions between bytes, words and pages.
pub mod conversions;
/// Shared pools with thread-local buffers.
pub mod deque;
/// An intrusive list of large objects.
pub mod doubly_linked_list;
/// Page resources and their accounting.
pub mod heap;
/// The built-in logger.
pub mod logger;
/// Runtime options.
pub mod options;
/// Barrier counters.
pub mod statistics;
/// Test utilities. We need this module for `MockVM` in criterion benches.
#[cfg(any(test, feature = "test_private"))]
pub mod test_util;

pub use self::address::Address;
pub use self::address::ObjectReference;
