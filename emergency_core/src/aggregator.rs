//! Process-wide emergency aggregation
//!
//! Every [`FlagSet`](crate::FlagSet) with at least one raised flag contributes
//! exactly one to the aggregator's counter, however many flags it holds. The
//! aggregator owns the external indicator and keeps it consistent with the
//! counter: when the counter reaches zero the indicator is cleared, in the same
//! critical section.
//!
//! Asserting the indicator is deliberately not tied to the counter. Every
//! successful raise forces it on through [`GlobalAggregator::assert_indicator`],
//! while the counter decides when it may go off again.

use crate::error::AlreadyInitialized;
use crate::indicator::{AtomicIndicator, EmergencyIndicator};
use once_cell::sync::Lazy;
use spin::Mutex;
use std::fmt;
use std::sync::Arc;

/// Aggregate state as seen by the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    /// No flag set holds a raised flag; indicator off
    Idle,
    /// At least one flag set holds a raised flag; indicator on
    Active,
}

impl fmt::Display for AggregatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregatorState::Idle => write!(f, "Idle"),
            AggregatorState::Active => write!(f, "Active"),
        }
    }
}

struct Shared {
    active_sets: u32,
    initialized: bool,
    indicator: Box<dyn EmergencyIndicator>,
}

/// Shared counter of active flag sets plus the external indicator
///
/// All fields live behind one busy-spin [`spin::Mutex`], usable where
/// blocking primitives are not. The lock is held only for a counter update and
/// at most one indicator write, never across calls into other components.
pub struct GlobalAggregator {
    shared: Mutex<Shared>,
}

impl GlobalAggregator {
    /// Create an aggregator driving `indicator`
    ///
    /// The aggregator must be initialized with [`init_once`](Self::init_once)
    /// before any flag set uses it.
    pub fn new(indicator: Box<dyn EmergencyIndicator>) -> Self {
        Self {
            shared: Mutex::new(Shared {
                active_sets: 0,
                initialized: false,
                indicator,
            }),
        }
    }

    /// Reset the counter, clear the indicator and mark the aggregator ready
    ///
    /// Succeeds once per aggregator. A second call is a start-up sequencing
    /// bug; callers should treat the error as fatal.
    pub fn init_once(&self) -> Result<(), AlreadyInitialized> {
        {
            let mut shared = self.shared.lock();
            if !shared.initialized {
                shared.active_sets = 0;
                shared.indicator.clear_emergency();
                shared.initialized = true;
                drop(shared);
                log::debug!("Emergency aggregator initialized");
                return Ok(());
            }
        }
        log::warn!("Rejected second initialization of emergency aggregator");
        Err(AlreadyInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.lock().initialized
    }

    /// Record one more active flag set
    ///
    /// Only the counter changes here; the indicator is asserted separately by
    /// [`assert_indicator`](Self::assert_indicator).
    pub fn increment(&self) {
        let now = {
            let mut shared = self.shared.lock();
            debug_assert!(shared.initialized, "emergency aggregator used before init_once");
            shared.active_sets += 1;
            shared.active_sets
        };
        if now == 1 {
            log::debug!("Emergency aggregator Idle -> Active");
        }
    }

    /// Record one flag set returning to all-clear
    ///
    /// Clears the indicator when no active flag sets remain. Callers must never
    /// decrement more often than they incremented. A decrement at zero is a
    /// detected defect: the counter saturates at zero, the error is logged,
    /// and debug builds panic.
    pub fn decrement(&self) {
        let remaining = {
            let mut shared = self.shared.lock();
            match shared.active_sets.checked_sub(1) {
                Some(remaining) => {
                    shared.active_sets = remaining;
                    if remaining == 0 {
                        shared.indicator.clear_emergency();
                    }
                    Some(remaining)
                }
                None => None,
            }
        };

        match remaining {
            Some(0) => log::debug!("Emergency aggregator Active -> Idle"),
            Some(_) => {}
            None => {
                log::error!("Emergency aggregator decremented below zero; count held at 0");
                debug_assert!(false, "emergency aggregator counter underflow");
            }
        }
    }

    /// Force the indicator on regardless of the counter
    pub fn assert_indicator(&self) {
        self.shared.lock().indicator.assert_emergency();
    }

    /// Number of flag sets currently holding at least one raised flag
    pub fn read_count(&self) -> u32 {
        self.shared.lock().active_sets
    }

    pub fn state(&self) -> AggregatorState {
        if self.read_count() > 0 {
            AggregatorState::Active
        } else {
            AggregatorState::Idle
        }
    }

    /// Level of the external indicator, read under the aggregator lock
    pub fn indicator_asserted(&self) -> bool {
        self.shared.lock().indicator.is_asserted()
    }
}

impl fmt::Debug for GlobalAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.lock();
        f.debug_struct("GlobalAggregator")
            .field("active_sets", &shared.active_sets)
            .field("initialized", &shared.initialized)
            .field("indicator", &shared.indicator.is_asserted())
            .finish()
    }
}

static GLOBAL_INDICATOR: AtomicIndicator = AtomicIndicator::new();

static GLOBAL: Lazy<Arc<GlobalAggregator>> =
    Lazy::new(|| Arc::new(GlobalAggregator::new(Box::new(&GLOBAL_INDICATOR))));

/// Handle to the process-wide aggregator driving [`global_indicator`]
///
/// Every call returns the same instance, ready to hand to
/// [`FlagSet::new`](crate::FlagSet::new). Still needs
/// [`GlobalAggregator::init_once`] at start-up like any other instance.
pub fn global() -> Arc<GlobalAggregator> {
    Arc::clone(&GLOBAL)
}

/// Indicator driven by the process-wide aggregator
pub fn global_indicator() -> &'static AtomicIndicator {
    &GLOBAL_INDICATOR
}
