//! Types shared by the plan and its clients.

use bytemuck::NoUninit;

/// Allocation semantics that MMTk provides.
/// Each allocation request requires a desired semantic for the object to allocate.
#[repr(i32)]
#[derive(Clone, Copy, Debug, enum_map::Enum, PartialEq, Eq)]
pub enum AllocationSemantics {
    /// The default semantic. Small objects go to the RC space; objects too large for its cells
    /// are redirected to the large object space.
    Default = 0,
    /// Immortal objects are never reclaimed. They are not reference counted, but their
    /// referents are.
    Immortal = 1,
    /// Large objects. They are allocated with page granularity and reference counted.
    Los = 2,
    /// Code objects. Treated as immortal.
    Code = 3,
    /// Read-only objects. Not supported by the reference counting plan.
    ReadOnly = 4,
    /// Los + Code. Treated as large objects.
    LargeCode = 5,
    /// Non moving objects. Nothing moves in this plan, so this is the default semantic.
    NonMoving = 6,
    /// Large objects without reference fields.
    PrimitiveLos = 7,
}

/// What an increment does beyond reconciling counts.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, NoUninit)]
pub enum CollectionKind {
    /// Apply the buffered increments and decrements.
    Increment,
    /// Also run the backup trace, reclaiming cycles.
    Cycle,
}
