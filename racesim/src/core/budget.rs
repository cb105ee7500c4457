use rand::Rng;

/// team_stats_budget returns the total capability budget of the team with the given rank
/// (1 = strongest). The budget falls from `max_budget` at rank 1 to `min_budget` at rank
/// `total_teams` along `(1 - t)^distribution_factor` with `t` being the normalized rank. Ranks
/// outside of [1, total_teams] are clamped.
pub fn team_stats_budget(
    rank: u32,
    total_teams: u32,
    min_budget: f64,
    max_budget: f64,
    distribution_factor: f64,
) -> f64 {
    if total_teams <= 1 {
        return max_budget;
    }

    let rank = rank.clamp(1, total_teams);
    let t = (rank - 1) as f64 / (total_teams - 1) as f64;

    min_budget + (max_budget - min_budget) * (1.0 - t).powf(distribution_factor)
}

/// split_budget splits a team budget into the whole-unit car budget and the whole-unit base
/// budget of a driver.
pub fn split_budget(team_budget: f64, car_share: f64) -> (u32, u32) {
    let car = (team_budget * car_share).floor().max(0.0) as u32;
    let driver = (team_budget * (1.0 - car_share)).floor().max(0.0) as u32;
    (car, driver)
}

/// second_driver_budget reduces the base driver budget by a random divisor drawn from
/// `divisor_range` such that the two drivers of a team do not start out identical.
pub fn second_driver_budget<R: Rng + ?Sized>(
    driver_budget: u32,
    divisor_range: [f64; 2],
    rng: &mut R,
) -> u32 {
    let divisor = if divisor_range[0] < divisor_range[1] {
        rng.gen_range(divisor_range[0]..=divisor_range[1])
    } else {
        divisor_range[0]
    };

    (driver_budget as f64 / divisor.max(1.0)).floor() as u32
}

/// distribute_points spreads `total_points` whole units over `levels`. Every dimension gets one
/// unit first, the remaining units go one at a time to a uniformly chosen dimension. If there are
/// fewer units than dimensions, the first `total_points` dimensions receive one unit each.
/// `levels` is overwritten.
pub fn distribute_points<R: Rng + ?Sized>(total_points: u32, levels: &mut [u32], rng: &mut R) {
    levels.iter_mut().for_each(|level| *level = 0);

    if levels.is_empty() {
        return;
    }

    let no_dims = levels.len() as u32;

    if total_points < no_dims {
        levels
            .iter_mut()
            .take(total_points as usize)
            .for_each(|level| *level = 1);
        return;
    }

    levels.iter_mut().for_each(|level| *level = 1);

    for _ in 0..total_points - no_dims {
        let idx = rng.gen_range(0..levels.len());
        levels[idx] += 1;
    }
}
