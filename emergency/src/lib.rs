//! # Emergency - fault flag tracking for embedded control nodes
//!
//! Every node keeps a set of emergency flags; the process keeps one emergency
//! indicator that is on while any node has an unresolved fault.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use emergency::prelude::*;
//!
//! fn main() -> EmergencyResult<()> {
//!     let config = EmergencyConfig::from_env_or_default()?;
//!     let aggregator = config.build_aggregator()?;
//!     let deps = Arc::new(config.dependency_table()?);
//!
//!     let mut motor = FlagSet::new(Arc::clone(&aggregator), deps);
//!     motor.raise(3)?;
//!     assert!(motor.is_emergency_active());
//!     motor.solve(3)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Dependency-aware clearing** of related faults
//! - **Interrupt-safe aggregation** behind a short spinlock
//! - **Pluggable indicator** (atomic level, or sysfs GPIO with `gpio-hardware`)
//! - **TOML configuration** for dependency tables

// Re-export core components
pub use emergency_core::{self, *};

/// The emergency prelude - everything you need to get started
pub mod prelude {
    // Flag sets and dependencies
    pub use emergency_core::{DependencyTable, FlagId, FlagMask, FlagSet, CAPACITY};

    // Aggregation and indicator
    pub use emergency_core::{
        global, global_indicator, AggregatorState, AtomicIndicator, EmergencyIndicator,
        GlobalAggregator,
    };

    // Configuration
    pub use emergency_core::{EmergencyConfig, IndicatorConfig};

    // Error types
    pub use emergency_core::{
        AlreadyInitialized, EmergencyError, EmergencyResult, OutOfRange, SolveError,
    };

    // Common std types
    pub use std::sync::Arc;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the crate version
pub fn version() -> &'static str {
    VERSION
}
