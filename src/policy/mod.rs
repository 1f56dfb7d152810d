//! Memory policies: how each space hands out and reclaims memory.

pub mod space;

pub mod immortalspace;
pub mod largeobjectspace;
pub mod rcspace;
