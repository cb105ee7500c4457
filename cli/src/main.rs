use anyhow::Context;
use clap::Parser;
use log::{Level, LevelFilter};
use racesim::core::grid::{generate_field, install_player_team};
use racesim::core::handle_race::{handle_race, replay_history};
use racesim::core::qualifying::run_qualifying;
use racesim::core::session::Session;
use racesim::core::track::generate_track;
use racesim::post::race_result::{FeedKind, LapSnapshot};
use racesim::pre::read_sim_pars::read_sim_constants_or_default;
use racesim::pre::sim_constants::SimConstants;
use racesim::pre::sim_opts::SimOpts;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::io::Write;
use std::thread;
use std::time::Instant;

// LOGGING -----------------------------------------------------------------------------------------

/// init_logger prints log records with the level as prefix, e.g. `INFO: ...`. `RUST_LOG` overrides
/// the level selected on the command line.
fn init_logger(debug: bool) -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let prefix = match record.level() {
                Level::Error => "ERROR",
                Level::Warn => "WARNING",
                Level::Info => "INFO",
                Level::Debug => "DEBUG",
                Level::Trace => "TRACE",
            };
            writeln!(buf, "{}: {}", prefix, record.args())
        })
        .try_init()
        .context("Failed to install console logger!")
}

// SINGLE RACE -------------------------------------------------------------------------------------

/// print_live_timing prints the leader and the player team drivers of a replayed snapshot.
fn print_live_timing(snapshot: &LapSnapshot, player_team: Option<u32>) {
    let leader = match snapshot.leader() {
        Some(leader) => leader,
        None => return,
    };

    let mut line = format!(
        "LIVE: Lap {:3} seg {:2} | P1 {} {:.3}s",
        snapshot.lap_number, snapshot.segment_idx, leader.driver_name, leader.total_time
    );

    for row in snapshot
        .results
        .iter()
        .filter(|row| Some(row.driver_id.team) == player_team)
    {
        line.push_str(&format!(
            " | P{} {} +{:.3}s",
            row.rank, row.driver_name, row.gap_to_leader
        ));
    }
    println!("{}", line);

    for msg in snapshot.messages.iter() {
        let tag = match msg.kind {
            FeedKind::Gain => "+",
            FeedKind::Loss => "-",
            FeedKind::Neutral => "*",
        };
        println!("FEED: [{}] {}: {}", tag, msg.driver_name, msg.message);
    }
}

fn run_single(sim_opts: &SimOpts, sim_consts: SimConstants) -> anyhow::Result<()> {
    let mut session = Session::new(sim_consts, sim_opts.seed)?;
    session.start_new_game(&sim_opts.team_name, &sim_opts.driver1, &sim_opts.driver2);

    if let Some(track) = &session.track {
        log::info!(
            "Race weekend at {}: {} segments, {} laps, difficulty {:.1}",
            track.name,
            track.segments.len(),
            track.laps,
            track.difficulty
        );
    }

    session.start_qualifying();
    for res in session.qualifying.iter().take(3) {
        log::info!(
            "Qualifying P{}: {} ({}) {:.3}s",
            res.position,
            res.driver_name,
            res.team_name,
            res.pace.total_time
        );
    }

    let t_start = Instant::now();
    session.start_race();
    log::info!("Execution time: {}ms", t_start.elapsed().as_millis());

    if sim_opts.replay {
        let (tx, rx) = flume::unbounded::<LapSnapshot>();
        let player_team = session.player_team.map(|id| id.0);

        let consumer = thread::spawn(move || {
            for snapshot in rx.iter() {
                print_live_timing(&snapshot, player_team);
            }
        });

        replay_history(&session.race_history, &tx, sim_opts.realtime_factor)?;
        drop(tx);

        consumer
            .join()
            .map_err(|_| anyhow::anyhow!("Replay consumer thread panicked!"))?;
    }

    session.complete_race();

    let race_result = session
        .race_result()
        .context("Session does not contain a race result!")?;
    race_result.print_classification();

    if let Some(output_path) = &sim_opts.output_path {
        race_result.write_classification_csv(output_path)?;
        log::info!("Classification written to {}", output_path.display());
    }

    Ok(())
}

// BATCH RUNS --------------------------------------------------------------------------------------

/// * `winner` - Name of the race winner
/// * `player_best_rank` - Best finishing position of the player team
struct RunSummary {
    winner: String,
    player_best_rank: Option<u32>,
}

fn run_batch_race(
    sim_opts: &SimOpts,
    sim_consts: &SimConstants,
    seed: u64,
) -> anyhow::Result<RunSummary> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut teams = generate_field(&sim_consts.grid, &mut rng);
    let player_team = install_player_team(
        &mut teams,
        &sim_opts.team_name,
        &[sim_opts.driver1.as_str(), sim_opts.driver2.as_str()],
        sim_consts.grid.player_start_level,
    );
    let track = generate_track(&sim_consts.track_gen, &mut rng);
    let qualifying = run_qualifying(&teams, &track, &sim_consts.qualifying);

    let race_result = handle_race(
        &teams,
        &track,
        player_team,
        qualifying,
        sim_consts,
        &mut rng,
        None,
        sim_opts.realtime_factor,
    )?;

    let final_snapshot = race_result
        .final_snapshot()
        .context(format!("Race with seed {} produced no snapshots!", seed))?;

    Ok(RunSummary {
        winner: final_snapshot
            .leader()
            .map_or_else(String::new, |row| row.driver_name.to_owned()),
        player_best_rank: final_snapshot
            .results
            .iter()
            .filter(|row| player_team.map(|id| id.0) == Some(row.driver_id.team))
            .map(|row| row.rank)
            .min(),
    })
}

fn run_batch(sim_opts: &SimOpts, sim_consts: &SimConstants) -> anyhow::Result<()> {
    let t_start = Instant::now();

    let summaries: Vec<RunSummary> = (0..sim_opts.no_sim_runs as u64)
        .into_par_iter()
        .map(|i| run_batch_race(sim_opts, sim_consts, sim_opts.seed + i))
        .collect::<anyhow::Result<Vec<RunSummary>>>()?;

    log::info!(
        "Executed {} races in {}ms",
        summaries.len(),
        t_start.elapsed().as_millis()
    );

    let mut wins: BTreeMap<&str, u32> = BTreeMap::new();
    for summary in summaries.iter() {
        *wins.entry(summary.winner.as_str()).or_insert(0) += 1;
    }

    let mut wins: Vec<(&str, u32)> = wins.into_iter().collect();
    wins.sort_by(|a, b| b.1.cmp(&a.1));

    println!("RESULT: Winners");
    for (name, count) in wins.iter() {
        println!("{:26}, {:4}", name, count);
    }

    let player_ranks: Vec<u32> = summaries
        .iter()
        .filter_map(|summary| summary.player_best_rank)
        .collect();

    if !player_ranks.is_empty() {
        println!(
            "RESULT: {} finished on average in P{:.1}",
            sim_opts.team_name,
            player_ranks.iter().sum::<u32>() as f64 / player_ranks.len() as f64
        );
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();
    init_logger(sim_opts.debug)?;

    if sim_opts.no_sim_runs < 1 {
        anyhow::bail!("Number of simulation runs must be at least 1!");
    }
    if sim_opts.replay && !(sim_opts.realtime_factor > 0.0) {
        anyhow::bail!("Realtime factor must be positive in replay mode!");
    }

    if let Some(parfile_path) = &sim_opts.parfile_path {
        log::info!("Reading simulation constants from {:?}", parfile_path);
    }
    let sim_consts = read_sim_constants_or_default(sim_opts.parfile_path.as_deref())?;

    // EXECUTION -----------------------------------------------------------------------------------
    if sim_opts.no_sim_runs == 1 {
        run_single(&sim_opts, sim_consts)
    } else {
        if sim_opts.replay {
            log::warn!("Replay is ignored for more than one simulation run");
        }
        log::info!(
            "Running {} simulations with seeds {} to {}",
            sim_opts.no_sim_runs,
            sim_opts.seed,
            sim_opts.seed + sim_opts.no_sim_runs as u64 - 1
        );
        run_batch(&sim_opts, &sim_consts)
    }
}
