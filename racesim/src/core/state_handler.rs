use crate::core::car::Car;
use crate::core::driver::{Driver, DriverId};
use crate::core::grid::TeamId;
use crate::core::physics::{solve_segment, DriverLimits, SegmentResult};
use crate::core::stats::{effective_stat, DriverStat};
use crate::core::track::Track;
use crate::pre::sim_constants::PhysicsPars;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Lower bound of the per-lap consistency factor.
const MIN_CONSISTENCY_FACTOR: f64 = 0.5;

/// Information about a lap that was completed in the current step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapCompletion {
    pub lap: u32,
    pub lap_time: f64,
    /// true if the lap beat an already existing best lap
    pub personal_best: bool,
}

/// StateHandler tracks the race progress of one driver: time, distance, velocity, lap and segment
/// as well as lap times. The physical limits are derived once when the race starts.
#[derive(Debug, Clone)]
pub struct StateHandler {
    // identity
    pub driver_id: DriverId,
    pub team_id: TeamId,
    pub driver_name: String,
    pub flag: String,
    pub team_name: String,

    // parameters
    pub limits: DriverLimits,
    lap_limits: DriverLimits,
    consistency: u32,
    pub overtaking: u32,
    pub instincts: u32,
    grid_offset: f64,

    // variables related to the progress
    pub total_time: f64,
    pub total_distance: f64,
    pub velocity: f64,
    pub compl_laps: u32,
    lap_start_time: f64,
    pub last_lap: Option<f64>,
    pub best_lap: Option<f64>,
    pub finished: bool,
    pub penalized: bool,
}

impl StateHandler {
    /// new creates the state of a driver standing on grid slot `grid_pos` (0 = pole). Each slot
    /// lies one grid gap further behind the start line.
    pub fn new(
        driver: &Driver,
        car: &Car,
        team_name: &str,
        grid_pos: usize,
        physics_pars: &PhysicsPars,
    ) -> StateHandler {
        let limits = DriverLimits::from_capabilities(driver, car, physics_pars);
        let grid_offset = grid_pos as f64 * physics_pars.grid_gap;

        StateHandler {
            driver_id: driver.id,
            team_id: driver.team_id,
            driver_name: driver.name.to_owned(),
            flag: driver.flag.to_owned(),
            team_name: team_name.to_owned(),
            limits,
            lap_limits: limits,
            consistency: effective_stat(&driver.stats, &car.stats, DriverStat::Consistency),
            overtaking: effective_stat(&driver.stats, &car.stats, DriverStat::Overtaking),
            instincts: effective_stat(&driver.stats, &car.stats, DriverStat::Instincts),
            grid_offset,
            total_time: 0.0,
            total_distance: -grid_offset,
            velocity: 0.0,
            compl_laps: 0,
            lap_start_time: 0.0,
            last_lap: None,
            best_lap: None,
            finished: false,
            penalized: false,
        }
    }

    /// start_lap sets the limits used for the following lap. If `vary` is set, acceleration and
    /// braking are scaled by a factor drawn from N(1, σ) with σ = (1 - consistency / 100) * 0.05.
    pub fn start_lap<R: Rng + ?Sized>(&mut self, vary: bool, rng: &mut R) {
        self.lap_limits = self.limits;

        if !vary {
            return;
        }

        let sigma = (1.0 - self.consistency.min(100) as f64 / 100.0) * 0.05;
        let factor = Normal::new(1.0, sigma)
            .map(|dist| dist.sample(rng))
            .unwrap_or(1.0)
            .max(MIN_CONSISTENCY_FACTOR);

        self.lap_limits.accel *= factor;
        self.lap_limits.braking *= factor;
    }

    /// drive_segment moves the driver through segment `segment_idx` of the given lap. The first
    /// segment of lap 1 is extended by the grid offset such that every car reaches the end of that
    /// segment.
    pub fn drive_segment(
        &mut self,
        track: &Track,
        lap: u32,
        segment_idx: usize,
        physics_pars: &PhysicsPars,
    ) -> SegmentResult {
        let segment = track.segments[segment_idx];
        let next = track.next_segment(segment_idx);

        let mut length = segment.length();
        if lap == 1 && segment_idx == 0 {
            length += self.grid_offset;
        }

        let v_max = self.lap_limits.speed_limit(segment.radius(), physics_pars.gravity);
        let v_target = self.lap_limits.speed_limit(next.radius(), physics_pars.gravity);

        let res = solve_segment(
            self.velocity,
            length,
            self.lap_limits.accel,
            self.lap_limits.braking,
            v_max,
            v_target,
        );

        self.total_time += res.time;
        self.total_distance += length;
        self.velocity = res.v_exit;

        res
    }

    /// add_time_loss adds a time penalty caused by another car and flags the driver.
    pub fn add_time_loss(&mut self, t_loss: f64) {
        self.total_time += t_loss.max(0.0);
        self.penalized = true;
    }

    /// check_lap_completion checks if the driver crossed the start line for the next lap. Lap and
    /// best lap times are updated and the driver is marked finished after the final lap.
    pub fn check_lap_completion(
        &mut self,
        track_length: f64,
        tot_no_laps: u32,
        tolerance: f64,
    ) -> Option<LapCompletion> {
        let s_next_lap = track_length * (self.compl_laps + 1) as f64;

        if self.finished || self.total_distance < s_next_lap - tolerance {
            return None;
        }

        self.compl_laps += 1;

        let lap_time = self.total_time - self.lap_start_time;
        self.lap_start_time = self.total_time;
        self.last_lap = Some(lap_time);

        let personal_best = matches!(self.best_lap, Some(best) if lap_time < best);
        if self.best_lap.map_or(true, |best| lap_time < best) {
            self.best_lap = Some(lap_time);
        }

        if self.compl_laps >= tot_no_laps {
            self.finished = true;
        }

        Some(LapCompletion {
            lap: self.compl_laps,
            lap_time,
            personal_best,
        })
    }
}
