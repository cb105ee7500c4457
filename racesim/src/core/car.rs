use crate::core::stats::{CarStat, CarStats};
use serde::{Deserialize, Serialize};

/// * `stats` - Capability levels
/// * `total_stats` - Sum of all capability levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub stats: CarStats,
    pub total_stats: u32,
}

impl Car {
    pub fn new(stats: CarStats) -> Car {
        Car {
            total_stats: stats.total(),
            stats,
        }
    }

    /// reset_stats sets every capability to the same level.
    pub fn reset_stats(&mut self, level: u32) {
        self.stats = CarStats::uniform(level);
        self.total_stats = self.stats.total();
    }

    /// upgrade_stat raises one capability by a single level (hook for the upgrade purchasing
    /// layer).
    pub fn upgrade_stat(&mut self, stat: CarStat) {
        self.stats[stat] += 1;
        self.total_stats += 1;
    }
}
