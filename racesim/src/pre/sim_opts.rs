use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    author = "Alexander Heilmeier <alexander.heilmeier@tum.de>",
    name = "RS-SEG",
    about = "A segment-based race simulator with procedurally generated fields and tracks"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing
    #[clap(short, long)]
    pub debug: bool,

    /// Replay the computed race history step by step in the console
    #[clap(long)]
    pub replay: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set the seed of the random number generator
    #[clap(short, long, default_value = "0")]
    pub seed: u64,

    /// Set number of simulation runs (runs are executed in parallel, replay is ignored if > 1)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the simulation constants file (OPTIONAL: if not set, built-in defaults are used)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set the name of the player team
    #[clap(long, default_value = "Privateer Racing")]
    pub team_name: String,

    /// Set the name of the first player driver
    #[clap(long, default_value = "Driver One")]
    pub driver1: String,

    /// Set the name of the second player driver
    #[clap(long, default_value = "Driver Two")]
    pub driver2: String,

    /// Set number of replayed snapshots per second (only relevant in replay mode)
    #[clap(short, long, default_value = "20.0")]
    pub realtime_factor: f64,

    /// Set path of the CSV file the final classification is written to
    #[clap(short, long)]
    pub output_path: Option<PathBuf>,
}
