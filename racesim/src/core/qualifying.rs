use crate::core::car::Car;
use crate::core::driver::{Driver, DriverId};
use crate::core::grid::{Team, TeamId};
use crate::core::stats::{effective_stat, DriverStat};
use crate::core::track::{SegmentType, Track};
use crate::pre::sim_constants::QualifyingPars;
use helpers::general::{argsort, SortOrder};
use serde::{Deserialize, Serialize};

/// segment_weights returns the capability dimensions that matter on a segment type together with
/// their weights.
pub fn segment_weights(segment_type: SegmentType) -> &'static [(DriverStat, f64)] {
    match segment_type {
        SegmentType::LowSpeedCorner => &[
            (DriverStat::Braking, 0.4),
            (DriverStat::Acceleration, 0.4),
            (DriverStat::Cornering, 0.2),
        ],
        SegmentType::MediumSpeedCorner => &[
            (DriverStat::Braking, 0.33),
            (DriverStat::Acceleration, 0.33),
            (DriverStat::Cornering, 0.34),
        ],
        SegmentType::HighSpeedCorner => &[
            (DriverStat::Cornering, 0.8),
            (DriverStat::Acceleration, 0.1),
            (DriverStat::Braking, 0.1),
        ],
        SegmentType::ShortStraight | SegmentType::MediumStraight | SegmentType::LongStraight => {
            &[(DriverStat::Pace, 0.8), (DriverStat::Acceleration, 0.2)]
        }
    }
}

/// Multiplier applied to every segment score, 1 + instincts^0.6 / 50.
pub fn instincts_multiplier(instincts: u32) -> f64 {
    1.0 + (instincts as f64).powf(0.6) / 50.0
}

/// segment_score returns the weighted capability score of a driver/car pair on a segment type.
pub fn segment_score(driver: &Driver, car: &Car, segment_type: SegmentType) -> f64 {
    let raw: f64 = segment_weights(segment_type)
        .iter()
        .map(|&(stat, weight)| effective_stat(&driver.stats, &car.stats, stat) as f64 * weight)
        .sum();

    raw * instincts_multiplier(effective_stat(
        &driver.stats,
        &car.stats,
        DriverStat::Instincts,
    ))
}

/// * `total_time` - (s) Qualifying lap time
/// * `sectors` - (s) Sector times, summing up to the lap time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualifyingPace {
    pub total_time: f64,
    pub sectors: [f64; 3],
}

/// compute_qualifying_pace calculates the single-lap time of a driver/car pair on the given track.
/// The model is deterministic, every segment time is
/// `base_time * (difficulty / max(score, 1))^pace_exponent`.
pub fn compute_qualifying_pace(
    driver: &Driver,
    car: &Car,
    track: &Track,
    qualifying_pars: &QualifyingPars,
) -> QualifyingPace {
    let mut pace = QualifyingPace {
        total_time: 0.0,
        sectors: [0.0; 3],
    };

    for (idx, &segment_type) in track.segments.iter().enumerate() {
        let score = segment_score(driver, car, segment_type).max(1.0);
        let t_segment = qualifying_pars.base_times.get(segment_type)
            * (track.difficulty / score).powf(qualifying_pars.pace_exponent);

        pace.total_time += t_segment;
        pace.sectors[track.sector_of(idx)] += t_segment;
    }

    pace
}

/// * `driver_id` - Driver id
/// * `driver_name` - Driver display name
/// * `team_id` - Team id
/// * `team_name` - Team display name
/// * `position` - Grid position (1 = pole)
/// * `pace` - Lap and sector times
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifyingResult {
    pub driver_id: DriverId,
    pub driver_name: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub position: u32,
    pub pace: QualifyingPace,
}

/// run_qualifying computes the qualifying pace of every driver on the grid and returns the results
/// sorted by ascending lap time. Equal lap times keep the roster order.
pub fn run_qualifying(
    teams: &[Team],
    track: &Track,
    qualifying_pars: &QualifyingPars,
) -> Vec<QualifyingResult> {
    let results: Vec<QualifyingResult> = teams
        .iter()
        .flat_map(|team| {
            team.drivers.iter().map(move |driver| QualifyingResult {
                driver_id: driver.id,
                driver_name: driver.name.to_owned(),
                team_id: team.id,
                team_name: team.name.to_owned(),
                position: 0,
                pace: compute_qualifying_pace(driver, &team.car, track, qualifying_pars),
            })
        })
        .collect();

    let times: Vec<f64> = results.iter().map(|res| res.pace.total_time).collect();
    let order = argsort(&times, SortOrder::Ascending);

    let mut sorted: Vec<QualifyingResult> = Vec::with_capacity(results.len());
    for (pos, idx) in order.into_iter().enumerate() {
        let mut res = results[idx].clone();
        res.position = pos as u32 + 1;
        sorted.push(res);
    }

    if let Some(pole) = sorted.first() {
        log::info!(
            "Pole position for {} ({}) with {:.3}s",
            pole.driver_name,
            pole.team_name,
            pole.pace.total_time
        );
    }

    sorted
}

/// qualifying_order extracts the grid order from sorted qualifying results.
pub fn qualifying_order(results: &[QualifyingResult]) -> Vec<DriverId> {
    results.iter().map(|res| res.driver_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::names::DriverIdentity;
    use crate::core::stats::{CarStats, DriverStats};
    use approx::assert_relative_eq;

    fn driver(level: u32) -> Driver {
        Driver::new(
            DriverId { team: 1, seat: 0 },
            TeamId(1),
            DriverIdentity {
                name: "Test Driver".to_owned(),
                nationality: "Japan".to_owned(),
                flag: String::new(),
            },
            DriverStats::uniform(level),
        )
    }

    fn track() -> Track {
        Track::new(
            "Test Ring".to_owned(),
            vec![
                SegmentType::LongStraight,
                SegmentType::LowSpeedCorner,
                SegmentType::MediumStraight,
                SegmentType::HighSpeedCorner,
                SegmentType::ShortStraight,
                SegmentType::MediumSpeedCorner,
            ],
            60,
            200.0,
        )
    }

    #[test]
    fn weights_sum_to_one() {
        for &segment_type in SegmentType::ALL.iter() {
            let sum: f64 = segment_weights(segment_type).iter().map(|w| w.1).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn score_includes_instincts() {
        let d = driver(10);
        let car = Car::new(CarStats::uniform(0));
        let expected = 10.0 * instincts_multiplier(10);

        assert_relative_eq!(segment_score(&d, &car, SegmentType::LongStraight), expected);
    }

    #[test]
    fn pace_is_idempotent_and_sectors_add_up() {
        let d = driver(30);
        let car = Car::new(CarStats::uniform(20));
        let pars = QualifyingPars::default();
        let t = track();

        let a = compute_qualifying_pace(&d, &car, &t, &pars);
        let b = compute_qualifying_pace(&d, &car, &t, &pars);

        assert_eq!(a, b);
        assert_relative_eq!(a.sectors.iter().sum::<f64>(), a.total_time, epsilon = 1e-9);
        assert!(a.sectors.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn zero_capabilities_are_floored() {
        let d = driver(0);
        let car = Car::new(CarStats::uniform(0));
        let pace = compute_qualifying_pace(&d, &car, &track(), &QualifyingPars::default());

        assert!(pace.total_time.is_finite());
    }

    #[test]
    fn stronger_driver_is_faster() {
        let car = Car::new(CarStats::uniform(20));
        let pars = QualifyingPars::default();
        let t = track();

        let slow = compute_qualifying_pace(&driver(5), &car, &t, &pars);
        let fast = compute_qualifying_pace(&driver(60), &car, &t, &pars);
        assert!(fast.total_time < slow.total_time);
    }
}
