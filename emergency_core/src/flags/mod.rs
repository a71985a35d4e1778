//! Emergency flags and per-node flag sets

mod mask;
mod set;

pub use mask::{FlagMask, Iter};
pub use set::{FlagSet, FlagSnapshot};

/// Identifier of a single emergency condition
pub type FlagId = u8;

/// Number of distinct flags a [`FlagSet`] can track
pub const CAPACITY: usize = 64;
