use crate::core::car::Car;
use crate::core::driver::Driver;
use crate::core::stats::{effective_stat, DriverStat};
use crate::pre::sim_constants::PhysicsPars;
use helpers::general::lin_interp;

/// (m/s²) Lower bound for acceleration and braking inputs of the solver.
pub const MIN_RATE: f64 = 0.1;
/// (m/s) Lower bound for the segment speed ceiling, a car never stops for good.
pub const MIN_SPEED_LIMIT: f64 = 0.1;

/// Kinematic regime that determined the end of a segment traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Accelerate (if needed) to the segment ceiling, cruise, then brake to the exit target.
    Cruise,
    /// Accelerate to an apex below the segment ceiling, then brake to the exit target.
    ApexLimited,
    /// Entered above the segment ceiling and braked the whole segment without reaching it.
    ForcedBrake,
    /// Too fast to reach the exit target even when braking the whole remaining distance.
    FullBrake,
    /// Too slow to reach the exit target even when accelerating the whole remaining distance.
    AccelLimited,
}

/// * `time` - (s) Traversal time
/// * `v_exit` - (m/s) Exit velocity
/// * `regime` - Regime that finished the traversal
#[derive(Debug, Clone, Copy)]
pub struct SegmentResult {
    pub time: f64,
    pub v_exit: f64,
    pub regime: Regime,
}

/// (m/s) Velocity after braking with `braking` over `dist`, zero if the car stops before.
fn full_brake_exit(v: f64, dist: f64, braking: f64) -> f64 {
    (v * v - 2.0 * braking * dist).max(0.0).sqrt()
}

/// (s) Time to cover `dist` under constant acceleration from `v_start` to `v_end`.
fn time_at_mean_velocity(dist: f64, v_start: f64, v_end: f64) -> f64 {
    if dist <= 0.0 || v_start + v_end <= 0.0 {
        0.0
    } else {
        2.0 * dist / (v_start + v_end)
    }
}

/// solve_segment determines exit velocity and traversal time of one segment in closed form.
///
/// * `v_entry` - (m/s) Entry velocity
/// * `length` - (m) Segment length, must not be negative
/// * `accel` - (m/s²) Acceleration capability
/// * `braking` - (m/s²) Braking capability (positive)
/// * `v_max_segment` - (m/s) Speed ceiling within the segment
/// * `v_target_exit` - (m/s) Speed ceiling of the following segment
///
/// The regimes are checked in this order: forced deceleration if the car enters above the
/// ceiling, accelerate-cruise-brake if the ceiling is reachable, full throttle if even that does
/// not reach the exit target, and apex-limited otherwise (with a full braking fallback if the car
/// cannot accelerate at all).
pub fn solve_segment(
    v_entry: f64,
    length: f64,
    accel: f64,
    braking: f64,
    v_max_segment: f64,
    v_target_exit: f64,
) -> SegmentResult {
    debug_assert!(length >= 0.0, "segment length must not be negative");

    let accel = accel.max(MIN_RATE);
    let braking = braking.max(MIN_RATE);
    let v_max = v_max_segment.max(MIN_SPEED_LIMIT);
    let length = length.max(0.0);

    let mut v_cur = v_entry.max(0.0);
    let mut s_rem = length;
    let mut t_tot = 0.0;

    let finish = |t_tot: f64, v_exit: f64, regime: Regime| SegmentResult {
        time: t_tot,
        v_exit,
        regime,
    };

    // forced deceleration down to the segment ceiling
    if v_cur > v_max {
        let s_brake = (v_cur * v_cur - v_max * v_max) / (2.0 * braking);

        if s_brake >= s_rem {
            let v_exit = full_brake_exit(v_cur, s_rem, braking);
            let t = time_at_mean_velocity(s_rem, v_cur, v_exit);
            return finish(t, v_exit, Regime::ForcedBrake);
        }

        t_tot += (v_cur - v_max) / braking;
        s_rem -= s_brake;
        v_cur = v_max;
    }

    let v_final = v_target_exit.max(0.0).min(v_max);

    let s_accel = if v_cur < v_max {
        (v_max * v_max - v_cur * v_cur) / (2.0 * accel)
    } else {
        0.0
    };
    let s_decel = if v_max > v_final {
        (v_max * v_max - v_final * v_final) / (2.0 * braking)
    } else {
        0.0
    };

    if s_accel + s_decel <= s_rem {
        // accelerate to the ceiling, cruise and brake for the next segment
        t_tot += (v_max - v_cur) / accel;
        t_tot += (s_rem - s_accel - s_decel) / v_max;
        t_tot += (v_max - v_final) / braking;
        return finish(t_tot, v_final, Regime::Cruise);
    }

    // exit target not reachable at full throttle
    let v_full_accel = (v_cur * v_cur + 2.0 * accel * s_rem).sqrt();
    if v_full_accel <= v_final {
        t_tot += (v_full_accel - v_cur) / accel;
        return finish(t_tot, v_full_accel, Regime::AccelLimited);
    }

    // ceiling not reachable, solve (v_apex² - v²)/2a + (v_apex² - v_final²)/2b = s_rem
    let k = 1.0 / (2.0 * accel) + 1.0 / (2.0 * braking);
    let rhs = s_rem + v_cur * v_cur / (2.0 * accel) + v_final * v_final / (2.0 * braking);
    let v_apex = (rhs / k).sqrt().min(v_max);

    if v_apex >= v_cur {
        t_tot += (v_apex - v_cur) / accel + (v_apex - v_final) / braking;
        finish(t_tot, v_final, Regime::ApexLimited)
    } else {
        let v_exit = full_brake_exit(v_cur, s_rem, braking);
        t_tot += time_at_mean_velocity(s_rem, v_cur, v_exit);
        finish(t_tot, v_exit, Regime::FullBrake)
    }
}

/// corner_speed_limit returns the maximum velocity through a corner with the given radius for the
/// given lateral grip, v = sqrt(r * g * 9.81). Straights have no limit.
pub fn corner_speed_limit(radius: Option<f64>, grip_g: f64, gravity: f64) -> f64 {
    match radius {
        Some(r) if r.is_finite() => (r * grip_g.max(0.0) * gravity).sqrt(),
        _ => f64::INFINITY,
    }
}

/// driver_efficiency maps the total capability points of a driver linearly onto the efficiency
/// range, clamped at both ends.
pub fn driver_efficiency(total_points: u32, physics_pars: &PhysicsPars) -> f64 {
    lin_interp(
        total_points as f64,
        &[0.0, physics_pars.efficiency_max_points],
        &physics_pars.efficiency_range,
    )
}

/// map_stat_to_phys maps a capability level linearly onto a physical range, level 0 being
/// `min_phys` and level 100 being `max_phys`. The ratio is clamped to [0, ratio_cap].
pub fn map_stat_to_phys(level: u32, min_phys: f64, max_phys: f64, ratio_cap: f64) -> f64 {
    let ratio = (level as f64 / 100.0).clamp(0.0, ratio_cap.max(0.0));
    min_phys + (max_phys - min_phys) * ratio
}

/// * `accel` - (m/s²) Maximum acceleration
/// * `braking` - (m/s²) Maximum braking deceleration
/// * `grip` - (G) Maximum cornering grip
/// * `max_speed` - (m/s) Top speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverLimits {
    pub accel: f64,
    pub braking: f64,
    pub grip: f64,
    pub max_speed: f64,
}

impl DriverLimits {
    /// from_capabilities derives the physical limits of a driver/car pair. Acceleration and
    /// braking are scaled fully by the driver efficiency, cornering grip only partially.
    pub fn from_capabilities(
        driver: &Driver,
        car: &Car,
        physics_pars: &PhysicsPars,
    ) -> DriverLimits {
        let floor = physics_pars.floor_tier();
        let ceiling = physics_pars.ceiling_tier();
        let cap = physics_pars.stat_ratio_cap;

        let raw_accel = effective_stat(&driver.stats, &car.stats, DriverStat::Acceleration);
        let raw_braking = effective_stat(&driver.stats, &car.stats, DriverStat::Braking);
        let raw_cornering = effective_stat(&driver.stats, &car.stats, DriverStat::Cornering);

        let efficiency = driver_efficiency(driver.total_stats, physics_pars);
        let grip_efficiency = 1.0 + (efficiency - 1.0) * physics_pars.grip_efficiency_blend;

        let accel = map_stat_to_phys(raw_accel, floor.max_accel, ceiling.max_accel, cap);
        let braking = map_stat_to_phys(raw_braking, floor.max_braking, ceiling.max_braking, cap);
        let grip = map_stat_to_phys(
            raw_cornering,
            floor.max_cornering_g,
            ceiling.max_cornering_g,
            cap,
        );

        DriverLimits {
            accel: accel * efficiency,
            braking: braking * efficiency,
            grip: grip * grip_efficiency,
            max_speed: ceiling.max_speed,
        }
    }

    /// (m/s) Speed ceiling of a segment with the given corner radius.
    pub fn speed_limit(&self, radius: Option<f64>, gravity: f64) -> f64 {
        self.max_speed.min(corner_speed_limit(radius, self.grip, gravity))
    }
}
