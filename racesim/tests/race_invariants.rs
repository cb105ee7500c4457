use racesim::core::grid::{generate_field, install_player_team};
use racesim::core::qualifying::{qualifying_order, run_qualifying};
use racesim::core::race::{run_race_simulation, Race};
use racesim::core::track::generate_track;
use racesim::post::race_result::{LapSnapshot, RaceStatus};
use racesim::pre::sim_constants::SimConstants;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn simulate(seed: u64, sim_consts: &SimConstants) -> Vec<LapSnapshot> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut teams = generate_field(&sim_consts.grid, &mut rng);
    let player = install_player_team(&mut teams, "Garage 56", &["Ann", "Bo"], 1);
    let track = generate_track(&sim_consts.track_gen, &mut rng);
    let qualifying = run_qualifying(&teams, &track, &sim_consts.qualifying);

    run_race_simulation(
        &teams,
        &track,
        player,
        &qualifying_order(&qualifying),
        sim_consts,
        &mut rng,
    )
}

fn check_snapshot_invariants(history: &[LapSnapshot]) {
    let mut prev_distance: Option<Vec<(String, f64)>> = None;

    for snapshot in history.iter() {
        let mut ranks: Vec<u32> = snapshot.results.iter().map(|row| row.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=snapshot.results.len() as u32).collect::<Vec<u32>>());

        assert_eq!(snapshot.results[0].gap_to_leader, 0.0);
        assert!(snapshot.results.iter().all(|row| row.gap_to_leader >= 0.0));
        assert!(snapshot.results.iter().all(|row| row.gap_to_ahead >= 0.0));
        assert!(snapshot.results.iter().all(|row| row.total_time.is_finite()));

        let mut distances: Vec<(String, f64)> = snapshot
            .results
            .iter()
            .map(|row| (row.driver_id.to_string(), row.total_distance))
            .collect();
        distances.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some(prev) = &prev_distance {
            for (before, after) in prev.iter().zip(distances.iter()) {
                assert_eq!(before.0, after.0);
                assert!(after.1 >= before.1);
            }
        }
        prev_distance = Some(distances);
    }
}

#[test]
fn snapshots_fulfill_ranking_invariants() {
    let sim_consts = SimConstants::default();
    let history = simulate(3, &sim_consts);

    assert!(!history.is_empty());
    check_snapshot_invariants(&history);
}

#[test]
fn races_terminate_with_everybody_finished() {
    let mut sim_consts = SimConstants::default();
    sim_consts.race.overtaking_contests = true;
    sim_consts.race.consistency_variance = true;

    for seed in 0..5 {
        let history = simulate(seed, &sim_consts);
        let last = history.last().unwrap();

        assert!(last.results.iter().all(|row| row.status == RaceStatus::Finished));
        assert!(last.results.iter().all(|row| row.best_lap_time.is_some()));
        check_snapshot_invariants(&history);
    }
}

#[test]
fn same_seed_gives_identical_history() {
    let sim_consts = SimConstants::default();

    assert_eq!(simulate(77, &sim_consts), simulate(77, &sim_consts));
}

#[test]
fn stepping_matches_free_function() {
    let sim_consts = SimConstants::default();
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let teams = generate_field(&sim_consts.grid, &mut rng);
    let track = generate_track(&sim_consts.track_gen, &mut rng);
    let order = qualifying_order(&run_qualifying(&teams, &track, &sim_consts.qualifying));

    let mut rng_a = ChaCha8Rng::seed_from_u64(1);
    let mut race = Race::new(&teams, track.clone(), None, &order, &sim_consts);
    let mut stepped = Vec::new();
    while let Some(snapshot) = race.simulate_step(&mut rng_a) {
        stepped.push(snapshot.clone());
    }

    let mut rng_b = ChaCha8Rng::seed_from_u64(1);
    let history = run_race_simulation(&teams, &track, None, &order, &sim_consts, &mut rng_b);

    assert_eq!(stepped.len(), track.laps as usize * track.segments.len());
    assert_eq!(stepped, history);
}
