//! Configuration types deserialized from `trellis.toml`.

use serde::Deserialize;
use trellis_common::DisplayFormat;

/// Default cap on propagation passes per stabilization.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Default free-running clock period in milliseconds.
pub const DEFAULT_RUN_INTERVAL_MS: u64 = 500;

/// The top-level configuration parsed from `trellis.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrellisConfig {
    /// Propagation engine and clock settings.
    #[serde(default)]
    pub simulation: SimulationSettings,
    /// How values are rendered for humans.
    #[serde(default)]
    pub display: DisplaySettings,
}

/// The `[simulation]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    /// Maximum number of propagation passes before reporting non-convergence.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Fixed seed for sweep-order shuffling. Absent means seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Free-running clock period in milliseconds.
    #[serde(default = "default_run_interval_ms")]
    pub run_interval_ms: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
            run_interval_ms: DEFAULT_RUN_INTERVAL_MS,
        }
    }
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_run_interval_ms() -> u64 {
    DEFAULT_RUN_INTERVAL_MS
}

/// The `[display]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplaySettings {
    /// Radix used when printing terminal values.
    #[serde(default)]
    pub format: DisplayFormat,
}
