//! Static dependency relation between flags
//!
//! Flag `a` depends on flag `b` when `a` may not be solved while `b` is still
//! raised in the same flag set. The relation is fixed once the table is built.
//!
//! The table may contain cycles (including a flag depending on itself). Raising
//! still works, but every flag on or behind a cycle becomes impossible to solve
//! once its blockers are raised. This is a configuration hazard rather than a
//! runtime error; [`DependencyTable::unclearable`] reports the affected flags.

use crate::error::OutOfRange;
use crate::flags::{FlagId, FlagMask, CAPACITY};
use std::fmt;

/// Read-only map from flag to the flags it depends on
#[derive(Clone, PartialEq, Eq)]
pub struct DependencyTable {
    entries: [FlagMask; CAPACITY],
}

impl DependencyTable {
    /// Table without any dependencies
    pub const fn empty() -> Self {
        Self {
            entries: [FlagMask::empty(); CAPACITY],
        }
    }

    pub fn builder() -> DependencyTableBuilder {
        DependencyTableBuilder {
            table: Self::empty(),
        }
    }

    /// Dependency mask of `id`; empty for out-of-range identifiers
    pub fn dependencies_of(&self, id: FlagId) -> &FlagMask {
        static NONE: FlagMask = FlagMask::empty();
        self.entries.get(usize::from(id)).unwrap_or(&NONE)
    }

    /// Dependencies of `id` that are raised in `active`
    #[inline]
    pub fn blocking(&self, id: FlagId, active: &FlagMask) -> FlagMask {
        self.dependencies_of(id).intersection(active)
    }

    /// Whether `id` may be solved given the raised flags in `active`
    #[inline]
    pub fn can_solve(&self, id: FlagId, active: &FlagMask) -> bool {
        !self.dependencies_of(id).intersects(active)
    }

    /// Iterate `(flag, dependencies)` for every flag with at least one dependency
    pub fn iter(&self) -> impl Iterator<Item = (FlagId, &FlagMask)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, deps)| !deps.is_empty())
            .map(|(id, deps)| (id as FlagId, deps))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(FlagMask::is_empty)
    }

    /// Flags that can reach a dependency cycle
    ///
    /// These flags are permanently unclearable whenever the flags of the cycle
    /// they reach are raised together.
    pub fn unclearable(&self) -> FlagMask {
        // Transitive closure over the dependency masks; CAPACITY is small
        // enough for a fixed-point iteration.
        let mut reach = self.entries;
        loop {
            let mut changed = false;
            for id in 0..CAPACITY {
                let mut grown = reach[id];
                for dep in reach[id].iter() {
                    for transitive in reach[usize::from(dep)].iter() {
                        grown.set(transitive);
                    }
                }
                if grown != reach[id] {
                    reach[id] = grown;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let on_cycle: FlagMask = (0..CAPACITY)
            .filter(|&id| reach[id].contains(id as FlagId))
            .map(|id| id as FlagId)
            .collect();

        (0..CAPACITY)
            .filter(|&id| on_cycle.contains(id as FlagId) || reach[id].intersects(&on_cycle))
            .map(|id| id as FlagId)
            .collect()
    }
}

impl Default for DependencyTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for DependencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Builder for a [`DependencyTable`]
#[derive(Debug, Clone)]
pub struct DependencyTableBuilder {
    table: DependencyTable,
}

impl DependencyTableBuilder {
    /// Declare that `flag` cannot be solved while `dependency` is raised
    pub fn depends_on(mut self, flag: FlagId, dependency: FlagId) -> Result<Self, OutOfRange> {
        check_range(dependency)?;
        let entry = self
            .table
            .entries
            .get_mut(usize::from(flag))
            .ok_or(OutOfRange { id: flag })?;
        entry.set(dependency);
        Ok(self)
    }

    /// Declare every identifier in `dependencies` as a dependency of `flag`
    pub fn depends_on_all<I>(mut self, flag: FlagId, dependencies: I) -> Result<Self, OutOfRange>
    where
        I: IntoIterator<Item = FlagId>,
    {
        for dependency in dependencies {
            self = self.depends_on(flag, dependency)?;
        }
        Ok(self)
    }

    pub fn build(self) -> DependencyTable {
        self.table
    }
}

fn check_range(id: FlagId) -> Result<(), OutOfRange> {
    if usize::from(id) < CAPACITY {
        Ok(())
    } else {
        Err(OutOfRange { id })
    }
}
