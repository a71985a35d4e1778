//! Emergency configuration
//!
//! Dependency relations and the indicator backend are injected as data rather
//! than compiled in. Configuration is TOML:
//!
//! ```toml
//! reject_cycles = false
//!
//! [indicator]
//! kind = "atomic"
//!
//! [[dependencies]]
//! flag = 4
//! depends_on = [2]
//! ```

use crate::aggregator::GlobalAggregator;
use crate::dependency::DependencyTable;
use crate::error::{EmergencyError, EmergencyResult};
use crate::flags::FlagId;
use crate::indicator::{AtomicIndicator, EmergencyIndicator};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Environment variable naming a configuration file
pub const CONFIG_ENV_VAR: &str = "EMERGENCY_CONFIG";

/// Top-level emergency configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmergencyConfig {
    /// Refuse dependency tables whose cycles make flags unclearable
    pub reject_cycles: bool,
    pub indicator: IndicatorConfig,
    pub dependencies: Vec<DependencyEntry>,
}

/// One `flag depends on ...` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyEntry {
    pub flag: FlagId,
    pub depends_on: Vec<FlagId>,
}

/// Backend for the external emergency indicator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IndicatorConfig {
    /// In-process atomic level
    #[default]
    Atomic,
    /// Linux sysfs GPIO line (requires the `gpio-hardware` feature)
    Gpio {
        pin: u64,
        #[serde(default)]
        active_low: bool,
    },
}

impl EmergencyConfig {
    pub fn from_toml_str(source: &str) -> EmergencyResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> EmergencyResult<Self> {
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::info!(
            "Loaded emergency configuration from {:?} ({} dependency entries)",
            path,
            config.dependencies.len()
        );
        Ok(config)
    }

    /// Load from the file named by `EMERGENCY_CONFIG`, or fall back to defaults
    pub fn from_env_or_default() -> EmergencyResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Build the dependency table described by this configuration
    ///
    /// Identifiers must be below [`CAPACITY`](crate::CAPACITY). Cycles are
    /// reported as a warning, or rejected when `reject_cycles` is set.
    pub fn dependency_table(&self) -> EmergencyResult<DependencyTable> {
        let mut builder = DependencyTable::builder();
        for entry in &self.dependencies {
            builder = builder
                .depends_on_all(entry.flag, entry.depends_on.iter().copied())
                .map_err(|e| {
                    EmergencyError::InvalidDependency(format!(
                        "flag {} depends on {:?}: {}",
                        entry.flag, entry.depends_on, e
                    ))
                })?;
        }
        let table = builder.build();

        let unclearable = table.unclearable();
        if !unclearable.is_empty() {
            let flags: Vec<FlagId> = unclearable.iter().collect();
            if self.reject_cycles {
                return Err(EmergencyError::DependencyCycle { flags });
            }
            log::warn!(
                "Dependency cycle: flags {} can become permanently unclearable",
                unclearable
            );
        }

        Ok(table)
    }

    /// Create the configured indicator backend
    pub fn build_indicator(&self) -> EmergencyResult<Box<dyn EmergencyIndicator>> {
        match &self.indicator {
            IndicatorConfig::Atomic => Ok(Box::new(AtomicIndicator::new())),
            #[cfg(feature = "gpio-hardware")]
            IndicatorConfig::Gpio { pin, active_low } => Ok(Box::new(
                crate::indicator::GpioIndicator::open(*pin, *active_low)?,
            )),
            #[cfg(not(feature = "gpio-hardware"))]
            IndicatorConfig::Gpio { pin, .. } => Err(EmergencyError::Indicator(format!(
                "gpio {} requested but the gpio-hardware feature is disabled",
                pin
            ))),
        }
    }

    /// Create and initialize an aggregator driving the configured indicator
    pub fn build_aggregator(&self) -> EmergencyResult<Arc<GlobalAggregator>> {
        let aggregator = Arc::new(GlobalAggregator::new(self.build_indicator()?));
        aggregator.init_once()?;
        Ok(aggregator)
    }
}
