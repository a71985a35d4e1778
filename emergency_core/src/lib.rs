//! # Emergency Core
//!
//! Fault tracking for embedded control nodes.
//!
//! Each node owns a [`FlagSet`]: a fixed-capacity set of emergency flags that
//! can be raised and solved. Solving respects a static [`DependencyTable`]: a
//! flag cannot be cleared while a flag it depends on is still raised in the
//! same set. Node-local state is folded into one process-wide
//! [`GlobalAggregator`], which drives an external [`EmergencyIndicator`] (an
//! LED, a GPIO line to a safety relay, ...).
//!
//! - **Flags**: per-node bitsets with dependency-aware clearing
//! - **Aggregation**: spinlock-guarded counter of active nodes, safe to call
//!   from interrupt and task context alike
//! - **Indicator**: pluggable output for the aggregate emergency state
//! - **Config**: dependency tables and indicator backends from TOML
//!
//! ## Quick Start
//!
//! ```rust
//! use emergency_core::{AtomicIndicator, DependencyTable, FlagSet, GlobalAggregator};
//! use std::sync::Arc;
//!
//! let aggregator = Arc::new(GlobalAggregator::new(Box::new(AtomicIndicator::new())));
//! aggregator.init_once().expect("aggregator initialized twice");
//!
//! // Emergency 4 cannot be solved while emergency 2 is active.
//! let deps = Arc::new(DependencyTable::builder().depends_on(4, 2).unwrap().build());
//!
//! let mut node = FlagSet::new(Arc::clone(&aggregator), deps);
//! node.raise(2).unwrap();
//! node.raise(4).unwrap();
//! assert!(node.solve(4).is_err());
//! node.solve(2).unwrap();
//! node.solve(4).unwrap();
//! assert!(!node.is_emergency_active());
//! ```

pub mod aggregator;
pub mod config;
pub mod dependency;
pub mod error;
pub mod flags;
pub mod indicator;

// Re-export commonly used types for easy access
pub use aggregator::{global, global_indicator, AggregatorState, GlobalAggregator};
pub use config::{EmergencyConfig, IndicatorConfig};
pub use dependency::{DependencyTable, DependencyTableBuilder};
pub use error::{AlreadyInitialized, EmergencyError, EmergencyResult, OutOfRange, SolveError};
pub use flags::{FlagId, FlagMask, FlagSet, FlagSnapshot, CAPACITY};
pub use indicator::{AtomicIndicator, EmergencyIndicator, IndicatorStats};

#[cfg(feature = "gpio-hardware")]
pub use indicator::GpioIndicator;
