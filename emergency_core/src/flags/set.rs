use super::{FlagId, FlagMask, CAPACITY};
use crate::aggregator::GlobalAggregator;
use crate::dependency::DependencyTable;
use crate::error::{OutOfRange, SolveError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Emergency flags of one monitored node
///
/// A flag set contributes at most one to its [`GlobalAggregator`]: it
/// increments the shared counter when its first flag is raised and decrements
/// it when its last flag is solved (or when it is destroyed).
///
/// Operations take `&mut self`; concurrent use of one instance needs external
/// synchronization. Separate instances are independent and may live on
/// different threads.
pub struct FlagSet {
    bits: FlagMask,
    active_count: u32,
    aggregator: Arc<GlobalAggregator>,
    dependencies: Arc<DependencyTable>,
}

/// Serializable view of a flag set for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSnapshot {
    pub active: Vec<FlagId>,
    pub active_count: u32,
}

#[inline]
fn check_range(id: FlagId) -> Result<(), OutOfRange> {
    if usize::from(id) < CAPACITY {
        Ok(())
    } else {
        Err(OutOfRange { id })
    }
}

impl FlagSet {
    /// Create an all-clear flag set reporting to `aggregator`
    pub fn new(aggregator: Arc<GlobalAggregator>, dependencies: Arc<DependencyTable>) -> Self {
        Self {
            bits: FlagMask::empty(),
            active_count: 0,
            aggregator,
            dependencies,
        }
    }

    /// Reset to all-clear without touching the aggregator
    ///
    /// Meant for fresh or destroyed instances; use [`destroy`](Self::destroy)
    /// to release an instance that may still hold raised flags.
    pub fn init(&mut self) {
        self.bits.clear_all();
        self.active_count = 0;
    }

    /// Raise flag `id`
    ///
    /// Raising an already raised flag leaves the set unchanged. Every
    /// successful call re-asserts the external indicator, even when the set
    /// itself did not change.
    pub fn raise(&mut self, id: FlagId) -> Result<(), OutOfRange> {
        check_range(id)?;

        if !self.bits.contains(id) {
            // Aggregator first: a panicking increment must leave this set clear.
            if self.active_count == 0 {
                self.aggregator.increment();
            }
            self.bits.set(id);
            self.active_count += 1;
            log::trace!("Raised emergency {} ({} active)", id, self.active_count);
        }

        self.aggregator.assert_indicator();
        Ok(())
    }

    /// Solve (clear) flag `id`
    ///
    /// Fails without modifying the set while any dependency of `id` is raised.
    /// Solving a flag that is not raised is a no-op.
    pub fn solve(&mut self, id: FlagId) -> Result<(), SolveError> {
        check_range(id)?;

        let blocking = self.dependencies.blocking(id, &self.bits);
        if !blocking.is_empty() {
            log::trace!("Emergency {} blocked by {}", id, blocking);
            return Err(SolveError::DependencyActive { id, blocking });
        }

        if self.bits.clear(id) {
            self.active_count -= 1;
            if self.active_count == 0 {
                self.aggregator.decrement();
            }
            log::trace!("Solved emergency {} ({} active)", id, self.active_count);
        }

        Ok(())
    }

    /// True if this set has raised flags or any flag set in the process does
    pub fn is_emergency_active(&self) -> bool {
        self.active_count > 0 || self.aggregator.read_count() > 0
    }

    /// Release this set's contribution to the aggregator and reset to all-clear
    pub fn destroy(&mut self) {
        if self.active_count > 0 {
            self.aggregator.decrement();
            log::debug!(
                "Destroyed flag set with {} active emergencies",
                self.active_count
            );
        }
        self.init();
    }

    pub fn is_raised(&self, id: FlagId) -> bool {
        self.bits.contains(id)
    }

    /// Whether `id` has no raised dependencies in this set
    ///
    /// Out-of-range identifiers are never solvable.
    pub fn can_solve(&self, id: FlagId) -> bool {
        check_range(id).is_ok() && self.dependencies.can_solve(id, &self.bits)
    }

    /// Raised dependencies currently preventing `id` from being solved
    pub fn blocking_dependencies(&self, id: FlagId) -> FlagMask {
        self.dependencies.blocking(id, &self.bits)
    }

    pub fn active_count(&self) -> u32 {
        self.active_count
    }

    pub fn is_clear(&self) -> bool {
        self.active_count == 0
    }

    pub fn active_flags(&self) -> impl Iterator<Item = FlagId> + '_ {
        self.bits.iter()
    }

    pub fn bits(&self) -> &FlagMask {
        &self.bits
    }

    pub fn aggregator(&self) -> &Arc<GlobalAggregator> {
        &self.aggregator
    }

    pub fn snapshot(&self) -> FlagSnapshot {
        FlagSnapshot {
            active: self.bits.iter().collect(),
            active_count: self.active_count,
        }
    }
}

impl Drop for FlagSet {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSet")
            .field("active", &self.bits)
            .field("active_count", &self.active_count)
            .finish_non_exhaustive()
    }
}
