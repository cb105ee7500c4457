use crate::core::track::SegmentType;
use anyhow::Context;
use helpers::general::InputValueError;
use serde::{Deserialize, Serialize};

/// SegmentTable stores one value per segment type, e.g. base times for the qualifying model.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SegmentTable<T> {
    pub low_speed_corner: T,
    pub medium_speed_corner: T,
    pub high_speed_corner: T,
    pub short_straight: T,
    pub medium_straight: T,
    pub long_straight: T,
}

impl<T> SegmentTable<T> {
    pub fn get(&self, segment_type: SegmentType) -> &T {
        match segment_type {
            SegmentType::LowSpeedCorner => &self.low_speed_corner,
            SegmentType::MediumSpeedCorner => &self.medium_speed_corner,
            SegmentType::HighSpeedCorner => &self.high_speed_corner,
            SegmentType::ShortStraight => &self.short_straight,
            SegmentType::MediumStraight => &self.medium_straight,
            SegmentType::LongStraight => &self.long_straight,
        }
    }
}

/// * `total_teams` - Number of teams on the grid
/// * `drivers_per_team` - Number of drivers per team
/// * `max_budget` - Capability budget of the strongest team (rank 1)
/// * `min_budget` - Capability budget of the weakest team (rank `total_teams`)
/// * `distribution_factor` - Shape of the budget curve (1.0 is linear, larger values make the
/// field drop off faster behind the top teams)
/// * `car_share` - Fraction of a team budget that goes into the car, the rest goes to the drivers
/// * `second_driver_divisor` - Range of the divisor applied to the second driver's budget
/// * `player_start_level` - Level of every capability of the player team at game start
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GridPars {
    pub total_teams: u32,
    pub drivers_per_team: u32,
    pub max_budget: f64,
    pub min_budget: f64,
    pub distribution_factor: f64,
    pub car_share: f64,
    pub second_driver_divisor: [f64; 2],
    pub player_start_level: u32,
}

impl Default for GridPars {
    fn default() -> Self {
        GridPars {
            total_teams: 20,
            drivers_per_team: 2,
            max_budget: 600.0,
            min_budget: 150.0,
            distribution_factor: 1.6,
            car_share: 0.6,
            second_driver_divisor: [1.01, 1.10],
            player_start_level: 1,
        }
    }
}

/// * `segment_count` - Inclusive range of the number of segments per lap
/// * `lap_constant` - Lap count is `lap_constant / segment_count`, clamped to `lap_count`
/// * `lap_count` - Inclusive range of the number of laps
/// * `difficulty_scale` - Scale of the track difficulty
/// * `difficulty_range` - Range of the uniform draw multiplied with `difficulty_scale`
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct TrackGenPars {
    pub segment_count: [u32; 2],
    pub lap_constant: f64,
    pub lap_count: [u32; 2],
    pub difficulty_scale: f64,
    pub difficulty_range: [f64; 2],
}

impl Default for TrackGenPars {
    fn default() -> Self {
        TrackGenPars {
            segment_count: [13, 28],
            lap_constant: 1000.0,
            lap_count: [50, 80],
            difficulty_scale: 200.0,
            difficulty_range: [0.5, 1.5],
        }
    }
}

/// * `pace_exponent` - Sensitivity of the segment time with respect to the capability score
/// * `base_times` - (s) Reference time per segment type
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct QualifyingPars {
    pub pace_exponent: f64,
    pub base_times: SegmentTable<f64>,
}

impl Default for QualifyingPars {
    fn default() -> Self {
        QualifyingPars {
            pace_exponent: 0.2,
            base_times: SegmentTable {
                low_speed_corner: 6.0,
                medium_speed_corner: 7.5,
                high_speed_corner: 6.5,
                short_straight: 3.5,
                medium_straight: 5.5,
                long_straight: 9.0,
            },
        }
    }
}

/// * `max_speed` - (m/s) Top speed
/// * `max_accel` - (m/s²) Maximum acceleration
/// * `max_braking` - (m/s²) Maximum deceleration (positive)
/// * `max_cornering_g` - (G) Maximum lateral acceleration
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct TierPhysics {
    pub max_speed: f64,
    pub max_accel: f64,
    pub max_braking: f64,
    pub max_cornering_g: f64,
}

/// * `tiers` - Physical limits per car tier, ordered from slowest to fastest. The first tier
/// corresponds to capability level 0, the last tier to level 100.
/// * `efficiency_range` - Driver efficiency multiplier at 0 and at `efficiency_max_points`
/// * `efficiency_max_points` - Total driver capability points that yield the maximum efficiency
/// * `grip_efficiency_blend` - Fraction of the efficiency that is applied to cornering grip
/// * `stat_ratio_cap` - Upper bound of the level / 100 ratio when mapping levels to physics
/// * `grid_gap` - (m) Distance between two grid slots
/// * `gravity` - (m/s²) Gravitational acceleration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PhysicsPars {
    pub tiers: Vec<TierPhysics>,
    pub efficiency_range: [f64; 2],
    pub efficiency_max_points: f64,
    pub grip_efficiency_blend: f64,
    pub stat_ratio_cap: f64,
    pub grid_gap: f64,
    pub gravity: f64,
}

/// Used in place of an empty tier list.
const FALLBACK_TIER: TierPhysics = TierPhysics {
    max_speed: 80.0,
    max_accel: 8.0,
    max_braking: 15.0,
    max_cornering_g: 3.0,
};

impl Default for PhysicsPars {
    fn default() -> Self {
        let tier = |max_speed, max_accel, max_braking, max_cornering_g| TierPhysics {
            max_speed,
            max_accel,
            max_braking,
            max_cornering_g,
        };

        PhysicsPars {
            tiers: vec![
                tier(80.0, 8.0, 15.0, 3.0),
                tier(85.0, 9.0, 18.0, 3.5),
                tier(90.0, 10.0, 22.0, 4.0),
                tier(95.0, 11.0, 26.0, 4.5),
                tier(105.0, 13.0, 30.0, 5.5),
            ],
            efficiency_range: [0.70, 1.05],
            efficiency_max_points: 380.0,
            grip_efficiency_blend: 0.35,
            stat_ratio_cap: 1.2,
            grid_gap: 8.0,
            gravity: 9.81,
        }
    }
}

impl PhysicsPars {
    /// Slowest tier, mapped to capability level 0.
    pub fn floor_tier(&self) -> TierPhysics {
        self.tiers.first().copied().unwrap_or(FALLBACK_TIER)
    }

    /// Fastest tier, mapped to capability level 100.
    pub fn ceiling_tier(&self) -> TierPhysics {
        self.tiers.last().copied().unwrap_or(FALLBACK_TIER)
    }
}

/// * `dirty_air_gap` - (s) Time gap below which the trailing car of a pair is held up
/// * `dirty_air_penalty` - (s) Range of the uniformly drawn dirty air time penalty
/// * `same_segment_tolerance` - (m) Distance below which two cars count as side by side
/// * `sort_tolerance` - (m) Distance below which the ranking falls back to the race time
/// * `lap_tolerance` - (m) Tolerance when checking lap and race completion
/// * `overtaking_contests` - Resolve close pairs on straights by an attack/defence roll
/// * `overtake_loser_time` - (s) Time lost by a defender that is passed in a contest
/// * `consistency_variance` - Vary acceleration and braking per lap based on consistency
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RaceConsts {
    pub dirty_air_gap: f64,
    pub dirty_air_penalty: [f64; 2],
    pub same_segment_tolerance: f64,
    pub sort_tolerance: f64,
    pub lap_tolerance: f64,
    pub overtaking_contests: bool,
    pub overtake_loser_time: f64,
    pub consistency_variance: bool,
}

impl Default for RaceConsts {
    fn default() -> Self {
        RaceConsts {
            dirty_air_gap: 0.3,
            dirty_air_penalty: [0.05, 0.15],
            same_segment_tolerance: 1.0,
            sort_tolerance: 0.1,
            lap_tolerance: 0.1,
            overtaking_contests: false,
            overtake_loser_time: 0.2,
            consistency_variance: false,
        }
    }
}

/// SimConstants bundles all tunable constants of the simulation. Every section falls back to its
/// defaults if it is missing in the parameter file.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct SimConstants {
    pub grid: GridPars,
    pub track_gen: TrackGenPars,
    pub qualifying: QualifyingPars,
    pub physics: PhysicsPars,
    pub race: RaceConsts,
}

fn check(cond: bool, msg: &str) -> anyhow::Result<()> {
    if cond {
        Ok(())
    } else {
        Err(InputValueError(msg.to_owned())).context("Simulation constants failed validation!")
    }
}

fn check_range<T: PartialOrd>(range: &[T; 2], name: &str) -> anyhow::Result<()> {
    check(
        range[0] <= range[1],
        &format!("{} lower bound must not exceed its upper bound", name),
    )
}

impl SimConstants {
    /// validate checks the constants for values that would make the generators or the engine
    /// misbehave.
    pub fn validate(&self) -> anyhow::Result<()> {
        check(self.grid.total_teams >= 1, "grid.total_teams must be at least 1")?;
        check(
            self.grid.drivers_per_team >= 1,
            "grid.drivers_per_team must be at least 1",
        )?;
        check(
            self.grid.min_budget >= 0.0 && self.grid.min_budget <= self.grid.max_budget,
            "grid budgets must fulfill 0 <= min_budget <= max_budget",
        )?;
        check(
            self.grid.distribution_factor > 0.0,
            "grid.distribution_factor must be positive",
        )?;
        check(
            (0.0..=1.0).contains(&self.grid.car_share),
            "grid.car_share must be in [0, 1]",
        )?;
        check_range(&self.grid.second_driver_divisor, "grid.second_driver_divisor")?;
        check(
            self.grid.second_driver_divisor[0] >= 1.0,
            "grid.second_driver_divisor must not boost the second driver",
        )?;

        check_range(&self.track_gen.segment_count, "track_gen.segment_count")?;
        check(
            self.track_gen.segment_count[0] >= 3,
            "track_gen.segment_count must allow three sectors",
        )?;
        check_range(&self.track_gen.lap_count, "track_gen.lap_count")?;
        check(
            self.track_gen.lap_count[0] >= 1,
            "track_gen.lap_count must be at least 1",
        )?;
        check_range(&self.track_gen.difficulty_range, "track_gen.difficulty_range")?;

        check(
            self.qualifying.pace_exponent > 0.0,
            "qualifying.pace_exponent must be positive",
        )?;

        check(!self.physics.tiers.is_empty(), "physics.tiers must not be empty")?;
        check(
            self.physics
                .tiers
                .iter()
                .all(|t| t.max_speed > 0.0 && t.max_accel > 0.0 && t.max_braking > 0.0),
            "physics.tiers must only contain positive limits",
        )?;
        check(
            self.physics.efficiency_max_points > 0.0,
            "physics.efficiency_max_points must be positive",
        )?;
        check(self.physics.grid_gap >= 0.0, "physics.grid_gap must not be negative")?;

        check(
            self.race.dirty_air_penalty[0] >= 0.0,
            "race.dirty_air_penalty must not be negative",
        )?;
        check_range(&self.race.dirty_air_penalty, "race.dirty_air_penalty")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimConstants::default().validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let consts: SimConstants =
            serde_json::from_str(r#"{ "race": { "dirty_air_gap": 0.5 } }"#).unwrap();
        assert_eq!(consts.race.dirty_air_gap, 0.5);
        assert_eq!(consts.race.dirty_air_penalty, [0.05, 0.15]);
        assert_eq!(consts.grid.total_teams, 20);
        assert_eq!(consts.physics.tiers.len(), 5);
    }

    #[test]
    fn inverted_lap_range_is_rejected() {
        let mut consts = SimConstants::default();
        consts.track_gen.lap_count = [80, 50];
        let err = consts.validate().unwrap_err();
        assert!(err.root_cause().to_string().contains("lap_count"));
    }

    #[test]
    fn empty_tier_list_falls_back_to_one_tier() {
        let consts: SimConstants =
            serde_json::from_str(r#"{ "physics": { "tiers": [] } }"#).unwrap();

        assert!(consts.validate().is_err());
        assert_eq!(consts.physics.floor_tier(), consts.physics.ceiling_tier());
        assert_eq!(
            consts.physics.floor_tier(),
            PhysicsPars::default().tiers[0]
        );
    }

    #[test]
    fn non_positive_pace_exponent_is_rejected() {
        let mut consts = SimConstants::default();
        consts.qualifying.pace_exponent = 0.0;
        assert!(consts.validate().is_err());
    }
}
