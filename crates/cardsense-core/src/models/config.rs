//! Configuration structures for the inference engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main configuration for the cardsense engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Token harvesting configuration.
    pub harvest: HarvestConfig,

    /// Numeric-cluster assignment configuration.
    pub cluster: ClusterConfig,

    /// Statistical fallback configuration.
    pub fallback: FallbackConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            harvest: HarvestConfig::default(),
            cluster: ClusterConfig::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

/// Token harvesting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Maximum number of leading pages/rows to scan. Summary fields never
    /// appear deeper than the first few units.
    pub max_units: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self { max_units: 4 }
    }
}

/// Numeric-cluster constraint assignment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Smallest cluster size considered a candidate.
    pub min_cluster: usize,

    /// Largest cluster size considered a candidate. The permutation
    /// search is O(k!), so this bounds the work per line.
    pub max_cluster: usize,

    /// Minimum score a permutation must reach before its assignment is
    /// committed. Below the floor, slots are left for the fallback stage.
    pub acceptance_floor: i32,

    /// TotalDue above this multiple of CreditLimit is implausible.
    pub max_due_to_limit_ratio: Decimal,

    /// MinimumDue at or below this fraction of TotalDue is rewarded.
    pub min_due_fraction: Decimal,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_cluster: 2,
            max_cluster: 6,
            acceptance_floor: 4,
            max_due_to_limit_ratio: Decimal::new(3, 0),
            min_due_fraction: Decimal::new(2, 1),
        }
    }
}

/// Statistical fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Whether rank-based fallback runs at all.
    pub enabled: bool,

    /// Minimum number of distinct money tokens required before the
    /// fallback will guess money fields.
    pub min_samples: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_samples: 4,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
