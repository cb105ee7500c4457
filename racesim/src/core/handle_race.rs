use crate::core::grid::{Team, TeamId};
use crate::core::qualifying::{qualifying_order, QualifyingResult};
use crate::core::race::Race;
use crate::core::track::Track;
use crate::post::race_result::{LapSnapshot, RaceResult};
use crate::pre::sim_constants::SimConstants;
use anyhow::Context;
use flume::Sender;
use helpers::general::InputValueError;
use rand::Rng;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// handle_race creates and simulates a race on the basis of the inserted parameters, and returns
/// the results for post-processing. The race is always computed completely first. If a sender is
/// inserted, the history is afterwards replayed over the channel with `realtime_factor` snapshots
/// per second.
#[allow(clippy::too_many_arguments)]
pub fn handle_race<R: Rng + ?Sized>(
    teams: &[Team],
    track: &Track,
    player_team: Option<TeamId>,
    qualifying: Vec<QualifyingResult>,
    sim_consts: &SimConstants,
    rng: &mut R,
    tx: Option<&Sender<LapSnapshot>>,
    realtime_factor: f64,
) -> anyhow::Result<RaceResult> {
    sim_consts
        .validate()
        .context("Cannot simulate race with invalid constants!")?;

    let t_start = Instant::now();
    let mut race = Race::new(
        teams,
        track.to_owned(),
        player_team,
        &qualifying_order(&qualifying),
        sim_consts,
    );
    race.run_to_completion(rng);

    log::debug!(
        "Simulated {} snapshots in {}ms",
        race.history.len(),
        t_start.elapsed().as_millis()
    );

    let race_result = race.get_race_result(qualifying);

    if let Some(tx) = tx {
        replay_history(&race_result.history, tx, realtime_factor)?;
    }

    Ok(race_result)
}

/// replay_history sends every snapshot over the channel and sleeps such that the consumer receives
/// `realtime_factor` snapshots per second.
pub fn replay_history(
    history: &[LapSnapshot],
    tx: &Sender<LapSnapshot>,
    realtime_factor: f64,
) -> anyhow::Result<()> {
    if !(realtime_factor > 0.0) {
        return Err(InputValueError(format!(
            "realtime factor must be positive, but is {}",
            realtime_factor
        )))
        .context("Cannot replay race!");
    }

    let t_step = Duration::from_secs_f64(1.0 / realtime_factor);
    let mut warned = false;

    for snapshot in history.iter() {
        let t_start = Instant::now();

        tx.send(snapshot.to_owned())
            .context("Failed to send snapshot to the replay consumer!")?;

        // sleep until the step is finished in real-time as well
        match t_step.checked_sub(t_start.elapsed()) {
            Some(t_sleep) => sleep(t_sleep),
            None if !warned => {
                log::warn!("Could not keep up with real-time!");
                warned = true;
            }
            None => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::generate_field;
    use crate::core::qualifying::run_qualifying;
    use crate::core::track::SegmentType;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (Vec<Team>, Track, Vec<QualifyingResult>, SimConstants) {
        let mut consts = SimConstants::default();
        consts.grid.total_teams = 3;
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let teams = generate_field(&consts.grid, &mut rng);
        let track = Track::new(
            "Short".to_owned(),
            vec![
                SegmentType::LongStraight,
                SegmentType::MediumSpeedCorner,
                SegmentType::ShortStraight,
            ],
            2,
            200.0,
        );
        let qualifying = run_qualifying(&teams, &track, &consts.qualifying);

        (teams, track, qualifying, consts)
    }

    #[test]
    fn replay_sends_every_snapshot() {
        let (teams, track, qualifying, consts) = setup();
        let (tx, rx) = flume::unbounded();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let res =
            handle_race(&teams, &track, None, qualifying, &consts, &mut rng, Some(&tx), 1000.0)
                .unwrap();
        drop(tx);

        let received: Vec<LapSnapshot> = rx.iter().collect();
        assert_eq!(received.len(), 6);
        assert_eq!(received, res.history);
        assert_eq!(res.qualifying.len(), 6);
    }

    #[test]
    fn invalid_constants_are_rejected() {
        let (teams, track, qualifying, mut consts) = setup();
        consts.physics.tiers.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let res = handle_race(&teams, &track, None, qualifying, &consts, &mut rng, None, 1.0);
        assert!(res.is_err());
    }

    #[test]
    fn replay_rejects_non_positive_factor() {
        let (teams, track, qualifying, consts) = setup();
        let (tx, _rx) = flume::unbounded();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(
            handle_race(&teams, &track, None, qualifying, &consts, &mut rng, Some(&tx), 0.0)
                .is_err()
        );
    }
}
