//! External emergency indicator
//!
//! The aggregate emergency state leaves the core through this trait. What it
//! drives (an LED, a GPIO line to a safety relay, a flag polled by a watchdog)
//! is up to the embedder.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Binary output driven by the aggregate emergency state
///
/// Both writes are called with the aggregator lock held, so implementations
/// must be short and must not call back into the aggregator. The lock's O(1)
/// hold time holds only for in-memory backends such as [`AtomicIndicator`];
/// a hardware backend adds its own write latency to every critical section.
pub trait EmergencyIndicator: Send + Sync {
    /// Drive the signal to its "emergency" level
    fn assert_emergency(&self);

    /// Drive the signal to its "all clear" level
    fn clear_emergency(&self);

    /// Current level as last written
    fn is_asserted(&self) -> bool;
}

impl<I: EmergencyIndicator + ?Sized> EmergencyIndicator for Arc<I> {
    fn assert_emergency(&self) {
        (**self).assert_emergency()
    }

    fn clear_emergency(&self) {
        (**self).clear_emergency()
    }

    fn is_asserted(&self) -> bool {
        (**self).is_asserted()
    }
}

impl<I: EmergencyIndicator + ?Sized> EmergencyIndicator for &'static I {
    fn assert_emergency(&self) {
        (**self).assert_emergency()
    }

    fn clear_emergency(&self) {
        (**self).clear_emergency()
    }

    fn is_asserted(&self) -> bool {
        (**self).is_asserted()
    }
}

/// Write counters for an [`AtomicIndicator`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorStats {
    pub asserts: u64,
    pub clears: u64,
}

/// In-process indicator backed by an atomic level
#[derive(Debug, Default)]
pub struct AtomicIndicator {
    level: AtomicBool,
    asserts: AtomicU64,
    clears: AtomicU64,
}

impl AtomicIndicator {
    pub const fn new() -> Self {
        Self {
            level: AtomicBool::new(false),
            asserts: AtomicU64::new(0),
            clears: AtomicU64::new(0),
        }
    }

    /// Number of assert/clear writes seen so far, including redundant ones
    pub fn stats(&self) -> IndicatorStats {
        IndicatorStats {
            asserts: self.asserts.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }
}

impl EmergencyIndicator for AtomicIndicator {
    fn assert_emergency(&self) {
        self.level.store(true, Ordering::Release);
        self.asserts.fetch_add(1, Ordering::Relaxed);
    }

    fn clear_emergency(&self) {
        self.level.store(false, Ordering::Release);
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    fn is_asserted(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }
}

#[cfg(feature = "gpio-hardware")]
pub use gpio::GpioIndicator;

#[cfg(feature = "gpio-hardware")]
mod gpio {
    use super::EmergencyIndicator;
    use crate::error::{EmergencyError, EmergencyResult};
    use std::sync::atomic::{AtomicBool, Ordering};
    use sysfs_gpio::{Direction, Pin};

    /// Emergency line on a Linux sysfs GPIO pin
    ///
    /// Write failures are logged and the cached level is still updated: the
    /// aggregate state transition is never abandoned because of hardware.
    ///
    /// Each write is a sysfs file write performed under the aggregator lock,
    /// so waiters spin for the duration of the syscall (plus the error log on
    /// failure). Avoid this backend when raising from latency-critical
    /// contexts.
    pub struct GpioIndicator {
        pin: Pin,
        pin_num: u64,
        active_low: bool,
        level: AtomicBool,
    }

    impl GpioIndicator {
        /// Export `pin_num` as an output and drive it to the "all clear" level
        pub fn open(pin_num: u64, active_low: bool) -> EmergencyResult<Self> {
            let pin = Pin::new(pin_num);
            pin.export()
                .map_err(|e| EmergencyError::Indicator(format!("export gpio {}: {}", pin_num, e)))?;
            let idle = if active_low {
                Direction::High
            } else {
                Direction::Low
            };
            pin.set_direction(idle).map_err(|e| {
                EmergencyError::Indicator(format!("configure gpio {}: {}", pin_num, e))
            })?;
            log::info!(
                "Emergency indicator on gpio {} ({})",
                pin_num,
                if active_low { "active low" } else { "active high" }
            );
            Ok(Self {
                pin,
                pin_num,
                active_low,
                level: AtomicBool::new(false),
            })
        }

        fn write(&self, asserted: bool) {
            let value = u8::from(asserted != self.active_low);
            if let Err(e) = self.pin.set_value(value) {
                log::error!(
                    "Failed to drive emergency gpio {} to {}: {}",
                    self.pin_num,
                    value,
                    e
                );
            }
            self.level.store(asserted, Ordering::Release);
        }
    }

    impl EmergencyIndicator for GpioIndicator {
        fn assert_emergency(&self) {
            self.write(true);
        }

        fn clear_emergency(&self) {
            self.write(false);
        }

        fn is_asserted(&self) -> bool {
            self.level.load(Ordering::Acquire)
        }
    }
}
