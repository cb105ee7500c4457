use crate::core::driver::DriverId;
use crate::core::qualifying::QualifyingResult;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    Running,
    Finished,
}

/// Tone of a feed message from the point of view of the player team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedKind {
    Gain,
    Loss,
    Neutral,
}

/// * `id` - Unique message id, `{lap}-{segment}-{driver}`
/// * `lap` - Lap the message was generated in
/// * `segment_idx` - Segment the message was generated in
/// * `driver_id` - Driver the message refers to
/// * `driver_name` - Display name of that driver
/// * `kind` - Tone of the message
/// * `message` - Message text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMessage {
    pub id: String,
    pub lap: u32,
    pub segment_idx: usize,
    pub driver_id: DriverId,
    pub driver_name: String,
    pub kind: FeedKind,
    pub message: String,
}

/// ResultRow is the state of one driver in a snapshot.
///
/// * `rank` - Position in the race (1 = leader)
/// * `total_time` - (s) Race time
/// * `total_distance` - (m) Distance covered since the start line (negative on the grid)
/// * `gap_to_leader` - (s) Gap to the leader, 0 for the leader
/// * `gap_to_ahead` - (s) Gap to the car in front, 0 for the leader
/// * `laps_completed` - Completed laps
/// * `last_lap_time` - (s) Time of the last completed lap
/// * `best_lap_time` - (s) Best completed lap
/// * `penalty` - Lost time to another car in this step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub rank: u32,
    pub driver_id: DriverId,
    pub driver_name: String,
    pub flag: String,
    pub team_name: String,
    pub total_time: f64,
    pub total_distance: f64,
    pub gap_to_leader: f64,
    pub gap_to_ahead: f64,
    pub laps_completed: u32,
    pub last_lap_time: Option<f64>,
    pub best_lap_time: Option<f64>,
    pub penalty: bool,
    pub status: RaceStatus,
}

/// LapSnapshot is the ranked state of the field after one simulation step (one segment of one
/// lap). `results` is ordered by rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapSnapshot {
    pub lap_number: u32,
    pub segment_idx: usize,
    pub results: Vec<ResultRow>,
    pub messages: Vec<FeedMessage>,
}

impl LapSnapshot {
    pub fn leader(&self) -> Option<&ResultRow> {
        self.results.first()
    }
}

/// Flat classification line written to CSV.
#[derive(Debug, Serialize)]
struct ClassificationRecord<'a> {
    position: u32,
    driver_id: String,
    driver: &'a str,
    team: &'a str,
    laps: u32,
    total_time: f64,
    gap_to_leader: f64,
    best_lap: Option<f64>,
    status: RaceStatus,
}

/// RaceResult contains all race information that is required for post-processing the results.
///
/// * `track_name` - Name of the track
/// * `tot_no_laps` - Number of race laps
/// * `qualifying` - Qualifying results in grid order
/// * `history` - All snapshots in simulation order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    pub track_name: String,
    pub tot_no_laps: u32,
    pub qualifying: Vec<QualifyingResult>,
    pub history: Vec<LapSnapshot>,
}

impl RaceResult {
    pub fn final_snapshot(&self) -> Option<&LapSnapshot> {
        self.history.last()
    }

    /// fastest_lap returns the row of the driver with the best lap of the race.
    pub fn fastest_lap(&self) -> Option<&ResultRow> {
        self.final_snapshot()?
            .results
            .iter()
            .filter(|row| row.best_lap_time.is_some())
            .min_by(|a, b| {
                a.best_lap_time
                    .unwrap_or(f64::INFINITY)
                    .total_cmp(&b.best_lap_time.unwrap_or(f64::INFINITY))
            })
    }

    /// classification_string formats the final classification as a table.
    pub fn classification_string(&self) -> String {
        let mut out = String::new();
        let snapshot = match self.final_snapshot() {
            Some(snapshot) => snapshot,
            None => return out,
        };

        let _ = writeln!(
            &mut out,
            "RESULT: {} ({} laps)",
            self.track_name, self.tot_no_laps
        );
        let _ = writeln!(
            &mut out,
            "{:>3}, {:26}, {:20}, {:>4}, {:>9}, {:>8}, best lap",
            "pos", "driver", "team", "laps", "time", "gap"
        );

        for row in snapshot.results.iter() {
            let best = row
                .best_lap_time
                .map_or_else(|| "-".to_owned(), |t| format!("{:.3}s", t));
            let _ = writeln!(
                &mut out,
                "{:3}, {:26}, {:20}, {:4}, {:8.3}s, {:+7.3}s, {}",
                row.rank,
                row.driver_name,
                row.team_name,
                row.laps_completed,
                row.total_time,
                row.gap_to_leader,
                best
            );
        }

        if let Some(row) = self.fastest_lap() {
            let _ = writeln!(
                &mut out,
                "RESULT: Fastest lap {} ({:.3}s)",
                row.driver_name,
                row.best_lap_time.unwrap_or(0.0)
            );
        }

        out
    }

    /// print_classification prints the final classification to the console output.
    pub fn print_classification(&self) {
        print!("{}", self.classification_string());
    }

    /// write_classification_csv writes the final classification to a CSV file.
    pub fn write_classification_csv(&self, path: &Path) -> anyhow::Result<()> {
        let snapshot = self
            .final_snapshot()
            .context("Race result does not contain any snapshot!")?;

        let mut wtr = csv::Writer::from_path(path)
            .context(format!("Failed to create output file {}!", path.display()))?;

        for row in snapshot.results.iter() {
            wtr.serialize(ClassificationRecord {
                position: row.rank,
                driver_id: row.driver_id.to_string(),
                driver: &row.driver_name,
                team: &row.team_name,
                laps: row.laps_completed,
                total_time: row.total_time,
                gap_to_leader: row.gap_to_leader,
                best_lap: row.best_lap_time,
                status: row.status,
            })
            .context("Failed to serialize classification row!")?;
        }

        wtr.flush()
            .context(format!("Failed to write output file {}!", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rank: u32, seat: u32, best: Option<f64>) -> ResultRow {
        ResultRow {
            rank,
            driver_id: DriverId { team: 1, seat },
            driver_name: format!("Driver {}", seat),
            flag: String::new(),
            team_name: "Team".to_owned(),
            total_time: 100.0 + rank as f64,
            total_distance: 5000.0,
            gap_to_leader: rank as f64 - 1.0,
            gap_to_ahead: if rank == 1 { 0.0 } else { 1.0 },
            laps_completed: 3,
            last_lap_time: best,
            best_lap_time: best,
            penalty: false,
            status: RaceStatus::Finished,
        }
    }

    fn result() -> RaceResult {
        RaceResult {
            track_name: "Imola".to_owned(),
            tot_no_laps: 3,
            qualifying: Vec::new(),
            history: vec![LapSnapshot {
                lap_number: 3,
                segment_idx: 4,
                results: vec![row(1, 0, Some(33.5)), row(2, 1, Some(33.1)), row(3, 2, None)],
                messages: Vec::new(),
            }],
        }
    }

    #[test]
    fn fastest_lap_ignores_missing_laps() {
        let res = result();
        assert_eq!(res.fastest_lap().unwrap().driver_id.seat, 1);
    }

    #[test]
    fn classification_lists_every_driver() {
        let text = result().classification_string();
        assert!(text.contains("Imola"));
        assert!(text.contains("Driver 2"));
        assert!(text.contains("Fastest lap Driver 1"));
    }

    #[test]
    fn empty_history_has_no_classification() {
        let mut res = result();
        res.history.clear();

        assert!(res.classification_string().is_empty());
        assert!(res.fastest_lap().is_none());
        assert!(res
            .write_classification_csv(Path::new("unused.csv"))
            .is_err());
    }
}
