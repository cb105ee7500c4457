use crate::core::budget::{distribute_points, second_driver_budget, split_budget, team_stats_budget};
use crate::core::car::Car;
use crate::core::driver::{Driver, DriverId};
use crate::core::names::{generate_driver_identity, team_name};
use crate::core::stats::{CarStats, DriverStats};
use crate::pre::sim_constants::GridPars;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// TeamId identifies a team by the rank slot it was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "team-{}", self.0)
    }
}

/// * `id` - Unique team id
/// * `name` - Display name
/// * `rank` - Competitive rank at generation time (1 = strongest)
/// * `drivers` - Drivers of the team
/// * `car` - Car shared by both drivers
/// * `total_stats` - Capability budget the team was generated with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub rank: u32,
    pub drivers: Vec<Driver>,
    pub car: Car,
    pub total_stats: f64,
}

impl Team {
    pub fn get_driver(&self, driver_id: DriverId) -> Option<&Driver> {
        self.drivers.iter().find(|driver| driver.id == driver_id)
    }
}

/// generate_field builds all teams of the grid. The team with rank r gets the capability budget
/// of rank r, 60 % of which go into the car. Each driver receives the remaining share, the second
/// driver slightly less than the first one.
pub fn generate_field<R: Rng + ?Sized>(grid_pars: &GridPars, rng: &mut R) -> Vec<Team> {
    let mut teams = Vec::with_capacity(grid_pars.total_teams as usize);

    for rank in 1..=grid_pars.total_teams {
        let team_budget = team_stats_budget(
            rank,
            grid_pars.total_teams,
            grid_pars.min_budget,
            grid_pars.max_budget,
            grid_pars.distribution_factor,
        );
        let (car_budget, driver_budget) = split_budget(team_budget, grid_pars.car_share);
        let team_id = TeamId(rank);

        let mut car_stats = CarStats::default();
        distribute_points(car_budget, &mut car_stats.0, rng);

        let mut drivers = Vec::with_capacity(grid_pars.drivers_per_team as usize);

        for seat in 0..grid_pars.drivers_per_team {
            let budget = if seat == 0 {
                driver_budget
            } else {
                second_driver_budget(driver_budget, grid_pars.second_driver_divisor, rng)
            };

            let mut driver_stats = DriverStats::default();
            distribute_points(budget, &mut driver_stats.0, rng);

            drivers.push(Driver::new(
                DriverId { team: rank, seat },
                team_id,
                generate_driver_identity(rng),
                driver_stats,
            ));
        }

        teams.push(Team {
            id: team_id,
            name: team_name(rank),
            rank,
            drivers,
            car: Car::new(car_stats),
            total_stats: team_budget,
        });
    }

    log::debug!(
        "Generated field of {} teams, budgets from {:.1} to {:.1}",
        teams.len(),
        teams.first().map_or(0.0, |t| t.total_stats),
        teams.last().map_or(0.0, |t| t.total_stats)
    );

    teams
}

/// install_player_team turns the lowest-ranked team into the player team: its name and driver
/// names are replaced and all driver and car capabilities are reset to `start_level`. Returns the
/// id of the player team, or `None` for an empty roster.
pub fn install_player_team(
    teams: &mut [Team],
    team_name: &str,
    driver_names: &[&str],
    start_level: u32,
) -> Option<TeamId> {
    let team = teams.iter_mut().max_by_key(|team| team.rank)?;

    team.name = team_name.to_owned();
    team.car.reset_stats(start_level);

    for (driver, name) in team.drivers.iter_mut().zip(driver_names.iter()) {
        driver.name = (*name).to_owned();
    }
    for driver in team.drivers.iter_mut() {
        driver.reset_stats(start_level);
    }

    team.total_stats = (team.car.total_stats
        + team.drivers.iter().map(|d| d.total_stats).sum::<u32>()) as f64;

    log::info!("{} enters the grid as {}", team.name, team.id);
    Some(team.id)
}

/// find_driver returns the driver with the given id together with its team.
pub fn find_driver(teams: &[Team], driver_id: DriverId) -> Option<(&Team, &Driver)> {
    teams
        .iter()
        .find_map(|team| team.get_driver(driver_id).map(|driver| (team, driver)))
}

/// all_drivers returns the drivers of all teams in roster order.
pub fn all_drivers(teams: &[Team]) -> impl Iterator<Item = &Driver> {
    teams.iter().flat_map(|team| team.drivers.iter())
}
