use crate::core::grid::TeamId;
use crate::core::names::DriverIdentity;
use crate::core::stats::{DriverStat, DriverStats};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DriverId identifies a driver by the rank slot of its team and its seat (0 or 1) in the team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DriverId {
    pub team: u32,
    pub seat: u32,
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "driver-{}-{}", self.team, self.seat)
    }
}

/// * `id` - Unique driver id
/// * `name` - Display name, e.g. Lando Norris
/// * `nationality` - Country name
/// * `flag` - Flag glyph of the nationality
/// * `team_id` - Id of the team the driver races for
/// * `stats` - Capability levels
/// * `total_stats` - Sum of all capability levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub nationality: String,
    pub flag: String,
    pub team_id: TeamId,
    pub stats: DriverStats,
    pub total_stats: u32,
}

impl Driver {
    pub fn new(
        id: DriverId,
        team_id: TeamId,
        identity: DriverIdentity,
        stats: DriverStats,
    ) -> Driver {
        Driver {
            id,
            name: identity.name,
            nationality: identity.nationality,
            flag: identity.flag,
            team_id,
            total_stats: stats.total(),
            stats,
        }
    }

    /// reset_stats sets every capability to the same level.
    pub fn reset_stats(&mut self, level: u32) {
        self.stats = DriverStats::uniform(level);
        self.total_stats = self.stats.total();
    }

    /// upgrade_stat raises one capability by a single level. This is the hook used by the
    /// upgrade purchasing layer. Consistency cannot be raised beyond 100. Returns false if the
    /// upgrade was refused.
    pub fn upgrade_stat(&mut self, stat: DriverStat) -> bool {
        if let Some(cap) = stat.effective_cap() {
            if self.stats[stat] >= cap {
                return false;
            }
        }

        self.stats[stat] += 1;
        self.total_stats += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> Driver {
        Driver::new(
            DriverId { team: 20, seat: 1 },
            TeamId(20),
            DriverIdentity {
                name: "Ann Example".to_owned(),
                nationality: "Germany".to_owned(),
                flag: String::new(),
            },
            DriverStats::uniform(3),
        )
    }

    #[test]
    fn id_is_formatted_with_team_and_seat() {
        assert_eq!(driver().id.to_string(), "driver-20-1");
    }

    #[test]
    fn upgrade_keeps_total_in_sync() {
        let mut d = driver();
        assert!(d.upgrade_stat(DriverStat::Pace));

        assert_eq!(d.stats[DriverStat::Pace], 4);
        assert_eq!(d.total_stats, 22);

        d.reset_stats(1);
        assert_eq!(d.total_stats, 7);
    }

    #[test]
    fn consistency_upgrade_stops_at_cap() {
        let mut d = driver();
        d.stats[DriverStat::Consistency] = 100;

        assert!(!d.upgrade_stat(DriverStat::Consistency));
        assert_eq!(d.stats[DriverStat::Consistency], 100);
    }
}
