//! Error types for the emergency core
//!
//! Flag operations return narrow, per-operation errors ([`OutOfRange`],
//! [`SolveError`], [`AlreadyInitialized`]) so callers can match on exactly what
//! an operation can report. Configuration and hardware paths use the wider
//! [`EmergencyError`].

use crate::flags::{FlagId, FlagMask, CAPACITY};
use thiserror::Error;

/// Flag identifier is not below [`CAPACITY`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("flag {id} is out of range (capacity {})", CAPACITY)]
pub struct OutOfRange {
    pub id: FlagId,
}

/// Reasons a `solve` can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),

    /// A dependency of `id` is still raised in the same flag set.
    #[error("flag {id} cannot be solved while dependencies {blocking} are active")]
    DependencyActive { id: FlagId, blocking: FlagMask },
}

/// The aggregator has already been initialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("emergency aggregator already initialized")]
pub struct AlreadyInitialized;

/// Crate-level error for configuration and hardware integration
#[derive(Debug, Error)]
pub enum EmergencyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid dependency: {0}")]
    InvalidDependency(String),

    #[error("Dependency cycle makes flags {flags:?} unclearable")]
    DependencyCycle { flags: Vec<FlagId> },

    #[error("Indicator error: {0}")]
    Indicator(String),

    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error(transparent)]
    AlreadyInitialized(#[from] AlreadyInitialized),
}

/// Result type for configuration and hardware operations
pub type EmergencyResult<T> = Result<T, EmergencyError>;
