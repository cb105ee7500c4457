use crate::core::grid::{generate_field, install_player_team, Team, TeamId};
use crate::core::qualifying::{qualifying_order, run_qualifying, QualifyingResult};
use crate::core::race::run_race_simulation;
use crate::core::track::{generate_track, Track};
use crate::interfaces::standings_interface::StandingsConsumer;
use crate::post::race_result::{LapSnapshot, RaceResult};
use crate::pre::sim_constants::SimConstants;
use anyhow::Context;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Start,
    Hq,
    Qualifying,
    Race,
    Results,
}

/// Session owns everything a running game consists of: constants, the seeded random number
/// generator, the roster, the current track, qualifying results and the precomputed race history
/// including the playback position.
#[derive(Debug)]
pub struct Session {
    sim_consts: SimConstants,
    rng: ChaCha8Rng,
    pub state: GameState,
    pub teams: Vec<Team>,
    pub player_team: Option<TeamId>,
    pub track: Option<Track>,
    pub qualifying: Vec<QualifyingResult>,
    pub race_history: Vec<LapSnapshot>,
    playback_idx: usize,
    pub race_number: u32,
}

impl Session {
    /// new checks the constants and creates a session in the `Start` state.
    pub fn new(sim_consts: SimConstants, seed: u64) -> anyhow::Result<Session> {
        sim_consts
            .validate()
            .context("Cannot create session from invalid constants!")?;

        Ok(Session {
            sim_consts,
            rng: ChaCha8Rng::seed_from_u64(seed),
            state: GameState::Start,
            teams: Vec::new(),
            player_team: None,
            track: None,
            qualifying: Vec::new(),
            race_history: Vec::new(),
            playback_idx: 0,
            race_number: 0,
        })
    }

    /// start_new_game generates the field, turns the weakest team into the player team and
    /// generates the first track.
    pub fn start_new_game(&mut self, team_name: &str, driver1: &str, driver2: &str) {
        self.teams = generate_field(&self.sim_consts.grid, &mut self.rng);
        self.player_team = install_player_team(
            &mut self.teams,
            team_name,
            &[driver1, driver2],
            self.sim_consts.grid.player_start_level,
        );
        self.race_number = 1;
        self.prepare_race_weekend();
    }

    /// start_qualifying computes the qualifying results on the current track.
    pub fn start_qualifying(&mut self) {
        let track = match &self.track {
            Some(track) => track,
            None => {
                log::warn!("No track available, qualifying is skipped");
                return;
            }
        };

        self.qualifying = run_qualifying(&self.teams, track, &self.sim_consts.qualifying);
        self.state = GameState::Qualifying;
    }

    /// start_race simulates the complete race in qualifying order. Qualifying is run first if it
    /// has not happened yet.
    pub fn start_race(&mut self) {
        if self.track.is_none() {
            log::warn!("No track available, race is skipped");
            return;
        }

        if self.qualifying.is_empty() {
            self.start_qualifying();
        }

        let track = match &self.track {
            Some(track) => track,
            None => return,
        };

        self.race_history = run_race_simulation(
            &self.teams,
            track,
            self.player_team,
            &qualifying_order(&self.qualifying),
            &self.sim_consts,
            &mut self.rng,
        );
        self.playback_idx = 0;
        self.state = GameState::Race;
    }

    /// advance_playback returns the next snapshot of the race history. The state switches to
    /// `Results` once the last snapshot was handed out.
    pub fn advance_playback(&mut self) -> Option<&LapSnapshot> {
        if self.state != GameState::Race {
            return None;
        }

        if self.playback_idx >= self.race_history.len() {
            self.state = GameState::Results;
            return None;
        }

        self.playback_idx += 1;
        if self.playback_idx == self.race_history.len() {
            self.state = GameState::Results;
        }

        self.race_history.get(self.playback_idx - 1)
    }

    /// Snapshot that was handed out last by the playback.
    pub fn current_snapshot(&self) -> Option<&LapSnapshot> {
        self.playback_idx
            .checked_sub(1)
            .and_then(|idx| self.race_history.get(idx))
    }

    /// complete_race skips the remaining playback and returns the final snapshot.
    pub fn complete_race(&mut self) -> Option<&LapSnapshot> {
        if self.state == GameState::Race {
            self.playback_idx = self.race_history.len();
            self.state = GameState::Results;
        }

        self.final_snapshot()
    }

    /// next_race moves on to the next race weekend on a new track.
    pub fn next_race(&mut self) {
        self.race_number += 1;
        self.prepare_race_weekend();
    }

    pub fn final_snapshot(&self) -> Option<&LapSnapshot> {
        self.race_history.last()
    }

    pub fn race_result(&self) -> Option<RaceResult> {
        let track = self.track.as_ref()?;

        Some(RaceResult {
            track_name: track.name.to_owned(),
            tot_no_laps: track.laps,
            qualifying: self.qualifying.to_owned(),
            history: self.race_history.to_owned(),
        })
    }

    /// report_results hands the final snapshot to the standings collaborator. Returns false if the
    /// race is not finished yet.
    pub fn report_results(&self, consumer: &mut dyn StandingsConsumer) -> bool {
        match (self.state, self.final_snapshot()) {
            (GameState::Results, Some(snapshot)) => {
                consumer.on_race_finished(snapshot);
                true
            }
            _ => false,
        }
    }

    fn prepare_race_weekend(&mut self) {
        self.track = Some(generate_track(&self.sim_consts.track_gen, &mut self.rng));
        self.qualifying.clear();
        self.race_history.clear();
        self.playback_idx = 0;
        self.state = GameState::Hq;

        log::info!("Race {} is ready", self.race_number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<u32>);

    impl StandingsConsumer for Recorder {
        fn on_race_finished(&mut self, final_snapshot: &LapSnapshot) {
            self.0 = final_snapshot.results.iter().map(|row| row.rank).collect();
        }
    }

    fn small_consts() -> SimConstants {
        let mut consts = SimConstants::default();
        consts.grid.total_teams = 4;
        consts.track_gen.lap_count = [2, 3];
        consts.track_gen.lap_constant = 30.0;
        consts
    }

    #[test]
    fn without_track_nothing_happens() {
        let mut session = Session::new(small_consts(), 1).unwrap();

        session.start_qualifying();
        session.start_race();

        assert_eq!(session.state, GameState::Start);
        assert!(session.race_history.is_empty());
        assert!(session.advance_playback().is_none());
    }

    #[test]
    fn full_weekend_flow() {
        let mut session = Session::new(small_consts(), 4).unwrap();
        session.start_new_game("Garage 56", "Ann", "Bo");

        assert_eq!(session.state, GameState::Hq);
        assert_eq!(session.player_team, Some(TeamId(4)));

        session.start_qualifying();
        assert_eq!(session.state, GameState::Qualifying);
        assert_eq!(session.qualifying.len(), 8);

        session.start_race();
        assert_eq!(session.state, GameState::Race);
        let no_snapshots = session.race_history.len();
        assert!(no_snapshots > 0);

        let first = session.advance_playback().cloned().unwrap();
        assert_eq!(first.lap_number, 1);
        assert_eq!(first.segment_idx, 0);
        assert_eq!(session.current_snapshot(), Some(&first));

        let mut recorder = Recorder(Vec::new());
        assert!(!session.report_results(&mut recorder));

        let last = session.complete_race().cloned().unwrap();
        assert_eq!(session.state, GameState::Results);
        assert_eq!(last.results.len(), 8);
        assert!(session.report_results(&mut recorder));
        assert_eq!(recorder.0, (1..=8).collect::<Vec<u32>>());

        session.next_race();
        assert_eq!(session.state, GameState::Hq);
        assert_eq!(session.race_number, 2);
        assert!(session.race_history.is_empty());
        assert!(session.qualifying.is_empty());
    }

    #[test]
    fn playback_ends_in_results() {
        let mut session = Session::new(small_consts(), 9).unwrap();
        session.start_new_game("Garage 56", "Ann", "Bo");
        session.start_race();

        let no_snapshots = session.race_history.len();
        let mut count = 0;
        while session.advance_playback().is_some() {
            count += 1;
        }

        assert_eq!(count, no_snapshots);
        assert_eq!(session.state, GameState::Results);
    }

    #[test]
    fn invalid_constants_are_rejected() {
        let consts: SimConstants =
            serde_json::from_str(r#"{ "physics": { "tiers": [] } }"#).unwrap();
        assert!(Session::new(consts, 1).is_err());

        let consts: SimConstants =
            serde_json::from_str(r#"{ "track_gen": { "lap_count": [80, 50] } }"#).unwrap();
        assert!(Session::new(consts, 1).is_err());
    }

    #[test]
    fn same_seed_same_race() {
        let run = |seed| {
            let mut session = Session::new(small_consts(), seed).unwrap();
            session.start_new_game("Garage 56", "Ann", "Bo");
            session.start_race();
            session.race_history
        };

        assert_eq!(run(21), run(21));
    }
}
