use crate::core::driver::DriverId;
use crate::core::grid::{all_drivers, find_driver, Team, TeamId};
use crate::core::qualifying::QualifyingResult;
use crate::core::state_handler::{LapCompletion, StateHandler};
use crate::core::track::{SegmentType, Track};
use crate::post::race_result::{
    FeedKind, FeedMessage, LapSnapshot, RaceResult, RaceStatus, ResultRow,
};
use crate::pre::sim_constants::{PhysicsPars, RaceConsts, SimConstants};
use rand::Rng;

/// overtaking_weight returns the weight of the overtaking capability in a contest on the given
/// segment type, `None` on corners where no contests take place.
pub fn overtaking_weight(segment_type: SegmentType) -> Option<f64> {
    match segment_type {
        SegmentType::LongStraight => Some(2.0),
        SegmentType::MediumStraight => Some(1.5),
        SegmentType::ShortStraight => Some(1.0),
        _ => None,
    }
}

fn draw_in_range<R: Rng + ?Sized>(range: [f64; 2], rng: &mut R) -> f64 {
    if range[0] < range[1] {
        rng.gen_range(range[0]..range[1])
    } else {
        range[0]
    }
}

/// build_grid resolves the qualifying order against the roster. Unknown or duplicate ids are
/// skipped, drivers that are missing in the qualifying order start behind the others in roster
/// order.
fn build_grid(teams: &[Team], qualifying_order: &[DriverId]) -> Vec<DriverId> {
    let mut grid: Vec<DriverId> = Vec::with_capacity(qualifying_order.len());

    for &driver_id in qualifying_order.iter() {
        if find_driver(teams, driver_id).is_none() {
            log::warn!("Skipping unknown driver {} in qualifying order", driver_id);
        } else if !grid.contains(&driver_id) {
            grid.push(driver_id);
        }
    }

    for driver in all_drivers(teams) {
        if !grid.contains(&driver.id) {
            log::warn!("{} did not qualify and starts from the back", driver.id);
            grid.push(driver.id);
        }
    }

    grid
}

#[derive(Debug)]
pub struct Race {
    pub track: Track,
    pub player_team: Option<TeamId>,
    physics_pars: PhysicsPars,
    race_consts: RaceConsts,
    pub drivers: Vec<StateHandler>,
    order: Vec<usize>,
    prev_ranks: Vec<u32>,
    pub cur_lap: u32,
    pub cur_segment: usize,
    pub history: Vec<LapSnapshot>,
}

impl Race {
    /// new places the drivers on the grid in qualifying order and derives their physical limits.
    pub fn new(
        teams: &[Team],
        track: Track,
        player_team: Option<TeamId>,
        qualifying_order: &[DriverId],
        sim_consts: &SimConstants,
    ) -> Race {
        let grid = build_grid(teams, qualifying_order);
        let mut drivers = Vec::with_capacity(grid.len());

        for (grid_pos, &driver_id) in grid.iter().enumerate() {
            if let Some((team, driver)) = find_driver(teams, driver_id) {
                drivers.push(StateHandler::new(
                    driver,
                    &team.car,
                    &team.name,
                    grid_pos,
                    &sim_consts.physics,
                ));
            }
        }

        let no_drivers = drivers.len();

        log::info!(
            "Starting race at {} with {} drivers over {} laps ({:.0}m per lap)",
            track.name,
            no_drivers,
            track.laps,
            track.length()
        );

        Race {
            track,
            player_team,
            physics_pars: sim_consts.physics.to_owned(),
            race_consts: sim_consts.race.to_owned(),
            drivers,
            order: (0..no_drivers).collect(),
            prev_ranks: (1..=no_drivers as u32).collect(),
            cur_lap: 1,
            cur_segment: 0,
            history: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// simulate_step moves every running driver through the current segment, resolves close
    /// pairs, detects completed laps and returns the emitted snapshot. Returns `None` once the race
    /// is complete.
    pub fn simulate_step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&LapSnapshot> {
        if self.get_all_finished() {
            return None;
        }

        let lap = self.cur_lap;
        let segment_idx = self.cur_segment;
        let segment_type = self.track.segments[segment_idx];

        // drive
        for sh in self.drivers.iter_mut() {
            sh.penalized = false;

            if sh.finished {
                continue;
            }

            if segment_idx == 0 {
                sh.start_lap(self.race_consts.consistency_variance, rng);
            }
            sh.drive_segment(&self.track, lap, segment_idx, &self.physics_pars);
        }

        // rank and resolve close pairs
        self.update_order();
        self.resolve_close_pairs(segment_type, rng);
        self.update_order();

        // lap completion
        let track_length = self.track.length();
        let mut completions: Vec<(usize, LapCompletion)> = Vec::new();

        for (idx, sh) in self.drivers.iter_mut().enumerate() {
            if let Some(completion) = sh.check_lap_completion(
                track_length,
                self.track.laps,
                self.race_consts.lap_tolerance,
            ) {
                completions.push((idx, completion));
            }
        }

        let last_step = lap >= self.track.laps && segment_idx + 1 >= self.track.segments.len();
        if last_step {
            for sh in self.drivers.iter_mut().filter(|sh| !sh.finished) {
                log::warn!(
                    "{} reached the end of the race at {:.3}m without completing it",
                    sh.driver_id,
                    sh.total_distance
                );
                sh.finished = true;
            }
        }

        // snapshot
        let messages = self.create_feed_messages(lap, segment_idx, &completions);
        let snapshot = self.create_snapshot(lap, segment_idx, messages);
        self.history.push(snapshot);

        // advance cursor
        self.cur_segment += 1;
        if self.cur_segment >= self.track.segments.len() {
            self.cur_segment = 0;
            self.cur_lap += 1;

            if self.cur_lap <= self.track.laps {
                log::debug!(
                    "Simulating... leader started lap {} at {:.3}s",
                    self.cur_lap,
                    self.leader_time()
                );
            }
        }

        self.history.last()
    }

    /// run_to_completion simulates all remaining steps and returns the full history.
    pub fn run_to_completion<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &[LapSnapshot] {
        while self.simulate_step(rng).is_some() {}

        if let Some(winner) = self.history.last().and_then(|snapshot| snapshot.leader()) {
            log::info!(
                "{} ({}) wins at {} in {:.3}s",
                winner.driver_name,
                winner.team_name,
                self.track.name,
                winner.total_time
            );
        }

        &self.history
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// get_all_finished returns true if no further step can be simulated.
    pub fn get_all_finished(&self) -> bool {
        self.track.segments.is_empty()
            || self.cur_lap > self.track.laps
            || self.drivers.iter().all(|sh| sh.finished)
    }

    pub fn get_race_result(&self, qualifying: Vec<QualifyingResult>) -> RaceResult {
        RaceResult {
            track_name: self.track.name.to_owned(),
            tot_no_laps: self.track.laps,
            qualifying,
            history: self.history.to_owned(),
        }
    }

    pub fn into_history(self) -> Vec<LapSnapshot> {
        self.history
    }

    fn leader_time(&self) -> f64 {
        self.order
            .first()
            .map_or(0.0, |&idx| self.drivers[idx].total_time)
    }

    /// update_order ranks the drivers by descending distance and, for drivers within the sort
    /// tolerance of each other, by ascending race time. Distances are bucketed by the tolerance to
    /// keep the ordering total.
    fn update_order(&mut self) {
        let drivers = &self.drivers;
        let tolerance = self.race_consts.sort_tolerance.max(1e-9);
        let bucket = |s: f64| (s / tolerance).round() as i64;

        self.order.sort_by(|&a, &b| {
            bucket(drivers[b].total_distance)
                .cmp(&bucket(drivers[a].total_distance))
                .then(drivers[a].total_time.total_cmp(&drivers[b].total_time))
        });
    }

    /// resolve_close_pairs checks all adjacent pairs from the front to the back. If a running
    /// driver is on the same segment as the car ahead and within the dirty air gap, it is held up
    /// by a random time penalty. With overtaking contests enabled, pairs on straights first roll an
    /// attack against a defence. A successful attacker pushes the defender behind it.
    fn resolve_close_pairs<R: Rng + ?Sized>(&mut self, segment_type: SegmentType, rng: &mut R) {
        let dirty_air_gap = self.race_consts.dirty_air_gap;
        let dirty_air_penalty = self.race_consts.dirty_air_penalty;
        let same_segment_tolerance = self.race_consts.same_segment_tolerance;
        let overtake_loser_time = self.race_consts.overtake_loser_time;
        let contest_weight = if self.race_consts.overtaking_contests {
            overtaking_weight(segment_type)
        } else {
            None
        };

        for pos in 1..self.order.len() {
            let idx_ahead = self.order[pos - 1];
            let idx_behind = self.order[pos];
            let ahead = &self.drivers[idx_ahead];
            let behind = &self.drivers[idx_behind];

            if ahead.finished
                || behind.finished
                || (ahead.total_distance - behind.total_distance).abs() >= same_segment_tolerance
            {
                continue;
            }

            let gap = behind.total_time - ahead.total_time;
            if gap >= dirty_air_gap {
                continue;
            }

            if let Some(weight) = contest_weight {
                let attack = behind.overtaking as f64 * weight * rng.gen_range(0.8..1.2);
                let defence = ahead.instincts as f64 * rng.gen_range(0.8..1.2);

                if attack > defence {
                    log::debug!(
                        "{} passes {} on lap {}",
                        behind.driver_id,
                        ahead.driver_id,
                        self.cur_lap
                    );
                    self.drivers[idx_ahead].add_time_loss(gap.max(0.0) + overtake_loser_time);
                    continue;
                }
            }

            let penalty = draw_in_range(dirty_air_penalty, rng);
            self.drivers[idx_behind].add_time_loss(penalty);
        }
    }

    /// create_feed_messages reports rank changes and personal best laps of the player team. The
    /// rank of the previous step is compared before it is overwritten.
    fn create_feed_messages(
        &mut self,
        lap: u32,
        segment_idx: usize,
        completions: &[(usize, LapCompletion)],
    ) -> Vec<FeedMessage> {
        let mut messages = Vec::new();

        for (pos, &idx) in self.order.iter().enumerate() {
            let rank = pos as u32 + 1;
            let prev_rank = self.prev_ranks[idx];
            self.prev_ranks[idx] = rank;

            let sh = &self.drivers[idx];
            if self.player_team != Some(sh.team_id) || rank == prev_rank {
                continue;
            }

            let (kind, message) = if rank < prev_rank {
                (FeedKind::Gain, format!("Overtook for P{}!", rank))
            } else {
                (FeedKind::Loss, format!("Dropped to P{}.", rank))
            };

            messages.push(FeedMessage {
                id: format!("{}-{}-{}", lap, segment_idx, sh.driver_id),
                lap,
                segment_idx,
                driver_id: sh.driver_id,
                driver_name: sh.driver_name.to_owned(),
                kind,
                message,
            });
        }

        for &(idx, completion) in completions.iter() {
            let sh = &self.drivers[idx];
            if self.player_team != Some(sh.team_id) || !completion.personal_best {
                continue;
            }

            messages.push(FeedMessage {
                id: format!("{}-{}-{}-pb", lap, segment_idx, sh.driver_id),
                lap,
                segment_idx,
                driver_id: sh.driver_id,
                driver_name: sh.driver_name.to_owned(),
                kind: FeedKind::Neutral,
                message: format!("Personal best lap: {:.3}s", completion.lap_time),
            });
        }

        messages
    }

    fn create_snapshot(
        &self,
        lap: u32,
        segment_idx: usize,
        messages: Vec<FeedMessage>,
    ) -> LapSnapshot {
        let t_leader = self.leader_time();
        let mut results = Vec::with_capacity(self.order.len());
        let mut t_ahead = t_leader;

        for (pos, &idx) in self.order.iter().enumerate() {
            let sh = &self.drivers[idx];

            results.push(ResultRow {
                rank: pos as u32 + 1,
                driver_id: sh.driver_id,
                driver_name: sh.driver_name.to_owned(),
                flag: sh.flag.to_owned(),
                team_name: sh.team_name.to_owned(),
                total_time: sh.total_time,
                total_distance: sh.total_distance,
                gap_to_leader: sh.total_time - t_leader,
                gap_to_ahead: sh.total_time - t_ahead,
                laps_completed: sh.compl_laps,
                last_lap_time: sh.last_lap,
                best_lap_time: sh.best_lap,
                penalty: sh.penalized,
                status: if sh.finished {
                    RaceStatus::Finished
                } else {
                    RaceStatus::Running
                },
            });

            t_ahead = sh.total_time;
        }

        LapSnapshot {
            lap_number: lap,
            segment_idx,
            results,
            messages,
        }
    }
}

/// run_race_simulation simulates a complete race and returns all snapshots in order.
pub fn run_race_simulation<R: Rng + ?Sized>(
    teams: &[Team],
    track: &Track,
    player_team: Option<TeamId>,
    qualifying_order: &[DriverId],
    sim_consts: &SimConstants,
    rng: &mut R,
) -> Vec<LapSnapshot> {
    let mut race = Race::new(teams, track.to_owned(), player_team, qualifying_order, sim_consts);
    race.run_to_completion(rng);
    race.into_history()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::car::Car;
    use crate::core::driver::Driver;
    use crate::core::names::DriverIdentity;
    use crate::core::stats::{CarStats, DriverStat, DriverStats};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn team(rank: u32, stats: DriverStats) -> Team {
        let drivers = vec![Driver::new(
            DriverId { team: rank, seat: 0 },
            TeamId(rank),
            DriverIdentity {
                name: format!("Driver {}", rank),
                nationality: "Italy".to_owned(),
                flag: String::new(),
            },
            stats,
        )];

        Team {
            id: TeamId(rank),
            name: format!("Team {}", rank),
            rank,
            drivers,
            car: Car::new(CarStats::uniform(0)),
            total_stats: 0.0,
        }
    }

    fn straight_track(laps: u32) -> Track {
        Track::new("Oval".to_owned(), vec![SegmentType::LongStraight; 3], laps, 200.0)
    }

    fn id(team: u32) -> DriverId {
        DriverId { team, seat: 0 }
    }

    #[test]
    fn grid_skips_unknown_and_appends_missing() {
        let teams = vec![team(1, DriverStats::uniform(10)), team(2, DriverStats::uniform(10))];
        let grid = build_grid(&teams, &[id(2), id(7), id(2)]);

        assert_eq!(grid, vec![id(2), id(1)]);
    }

    #[test]
    fn race_produces_one_snapshot_per_segment() {
        let teams = vec![team(1, DriverStats::uniform(30)), team(2, DriverStats::uniform(20))];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let consts = SimConstants::default();
        let mut race = Race::new(&teams, straight_track(2), None, &[id(1), id(2)], &consts);

        let history = race.run_to_completion(&mut rng);

        assert_eq!(history.len(), 6);
        let last = history.last().unwrap();
        assert!(last.results.iter().all(|r| r.status == RaceStatus::Finished));
        assert!(last.results.iter().all(|r| r.laps_completed == 2));
        assert!(race.get_all_finished());
        assert!(race.simulate_step(&mut rng).is_none());
    }

    #[test]
    fn dirty_air_holds_up_every_follower() {
        let teams: Vec<Team> = (1..=4).map(|r| team(r, DriverStats::uniform(20))).collect();
        let mut consts = SimConstants::default();
        consts.race.dirty_air_gap = 100.0;
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let order: Vec<DriverId> = (1..=4).map(id).collect();
        let mut race = Race::new(&teams, straight_track(1), None, &order, &consts);

        let snapshot = race.simulate_step(&mut rng).unwrap();

        assert!(!snapshot.results[0].penalty);
        assert!(snapshot.results[1..].iter().all(|r| r.penalty));
    }

    #[test]
    fn contest_winner_passes_and_player_is_notified() {
        let mut defender = DriverStats::uniform(50);
        defender[DriverStat::Instincts] = 0;
        let mut attacker = DriverStats::uniform(50);
        attacker[DriverStat::Overtaking] = 100;
        let teams = vec![team(1, defender), team(2, attacker)];

        let mut consts = SimConstants::default();
        consts.race.dirty_air_gap = 100.0;
        consts.race.overtaking_contests = true;
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut race =
            Race::new(&teams, straight_track(1), Some(TeamId(2)), &[id(1), id(2)], &consts);

        let snapshot = race.simulate_step(&mut rng).unwrap();

        assert_eq!(snapshot.results[0].driver_id, id(2));
        assert!(snapshot.results[1].penalty);
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].message, "Overtook for P1!");
        assert_eq!(snapshot.messages[0].id, "1-0-driver-2-0");
        assert_eq!(snapshot.messages[0].kind, FeedKind::Gain);
    }

    #[test]
    fn personal_best_is_reported_next_to_rank_change() {
        let mut rival = DriverStats::uniform(50);
        rival[DriverStat::Instincts] = 0;
        let mut player = DriverStats::uniform(50);
        player[DriverStat::Overtaking] = 100;
        let teams = vec![team(1, rival), team(2, player)];

        let mut consts = SimConstants::default();
        consts.race.dirty_air_gap = 100.0;
        consts.race.overtaking_contests = true;
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let track = Track::new("Loop".to_owned(), vec![SegmentType::LongStraight], 2, 200.0);
        let mut race = Race::new(&teams, track, Some(TeamId(2)), &[id(1), id(2)], &consts);

        // first lap: pass on the standing start, no best lap to beat yet
        let first = race.simulate_step(&mut rng).unwrap().to_owned();
        assert_eq!(first.messages.len(), 1);
        assert_eq!(first.messages[0].message, "Overtook for P1!");

        // second lap: repassed by the rival, but faster than the standing start lap
        let second = race.simulate_step(&mut rng).unwrap();
        assert_eq!(second.messages.len(), 2);
        assert!(second.messages.iter().all(|msg| msg.driver_id == id(2)));

        assert_eq!(second.messages[0].id, "2-0-driver-2-0");
        assert_eq!(second.messages[0].kind, FeedKind::Loss);
        assert_eq!(second.messages[0].message, "Dropped to P2.");

        let pb = &second.messages[1];
        assert_eq!(pb.id, "2-0-driver-2-0-pb");
        assert_eq!(pb.kind, FeedKind::Neutral);
        assert!(pb.message.starts_with("Personal best lap"));

        let row = second.results.iter().find(|r| r.driver_id == id(2)).unwrap();
        assert!(row.best_lap_time < first.results[0].last_lap_time);
    }

    #[test]
    fn empty_track_finishes_immediately() {
        let teams = vec![team(1, DriverStats::uniform(10))];
        let track = Track::new("Nowhere".to_owned(), Vec::new(), 50, 200.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let consts = SimConstants::default();
        let history = run_race_simulation(&teams, &track, None, &[id(1)], &consts, &mut rng);
        assert!(history.is_empty());
    }
}
