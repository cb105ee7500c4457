use crate::core::names::generate_track_name;
use crate::pre::sim_constants::TrackGenPars;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Segment types a track is composed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentType {
    LowSpeedCorner,
    MediumSpeedCorner,
    HighSpeedCorner,
    ShortStraight,
    MediumStraight,
    LongStraight,
}

impl SegmentType {
    pub const ALL: [SegmentType; 6] = [
        SegmentType::LowSpeedCorner,
        SegmentType::MediumSpeedCorner,
        SegmentType::HighSpeedCorner,
        SegmentType::ShortStraight,
        SegmentType::MediumStraight,
        SegmentType::LongStraight,
    ];

    /// (m) Length of the segment.
    pub fn length(self) -> f64 {
        match self {
            SegmentType::LowSpeedCorner => 100.0,
            SegmentType::MediumSpeedCorner => 200.0,
            SegmentType::HighSpeedCorner => 300.0,
            SegmentType::ShortStraight => 250.0,
            SegmentType::MediumStraight => 500.0,
            SegmentType::LongStraight => 900.0,
        }
    }

    /// (m) Corner radius, `None` for straights.
    pub fn radius(self) -> Option<f64> {
        match self {
            SegmentType::LowSpeedCorner => Some(30.0),
            SegmentType::MediumSpeedCorner => Some(80.0),
            SegmentType::HighSpeedCorner => Some(200.0),
            _ => None,
        }
    }
}

/// * `name` - Track name
/// * `segments` - Ordered segments of one lap (closed loop)
/// * `laps` - Number of race laps
/// * `difficulty` - Capability score a driver needs to match the base segment times
/// * `sector_ends` - Exclusive end index of sectors 1, 2 and 3 (the last one equals the number
/// of segments)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub segments: Vec<SegmentType>,
    pub laps: u32,
    pub difficulty: f64,
    pub sector_ends: [usize; 3],
}

impl Track {
    /// new creates a track from the given segments and derives the sector boundaries.
    pub fn new(name: String, segments: Vec<SegmentType>, laps: u32, difficulty: f64) -> Track {
        let sector_ends = calc_sector_ends(segments.len());

        Track {
            name,
            segments,
            laps,
            difficulty,
            sector_ends,
        }
    }

    /// (m) Length of one lap.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(|seg| seg.length()).sum()
    }

    /// sector_of returns the sector index (0, 1 or 2) of the segment with the given index.
    pub fn sector_of(&self, segment_idx: usize) -> usize {
        self.sector_ends
            .iter()
            .position(|&end| segment_idx < end)
            .unwrap_or(2)
    }

    /// The segment following `segment_idx` on the closed loop.
    pub fn next_segment(&self, segment_idx: usize) -> SegmentType {
        self.segments[(segment_idx + 1) % self.segments.len()]
    }
}

/// calc_sector_ends splits `no_segments` into three contiguous, roughly equal groups.
fn calc_sector_ends(no_segments: usize) -> [usize; 3] {
    let s1 = (no_segments as f64 / 3.0).round() as usize;
    let s2 = (2.0 * no_segments as f64 / 3.0).round() as usize;
    [s1, s2.max(s1), no_segments]
}

/// calc_no_laps derives the number of race laps from the number of segments: fewer segments per
/// lap result in more laps within the configured bounds.
pub fn calc_no_laps(no_segments: usize, track_gen_pars: &TrackGenPars) -> u32 {
    let laps = (track_gen_pars.lap_constant / no_segments.max(1) as f64).round();
    let [bound_a, bound_b] = track_gen_pars.lap_count;
    let (min_laps, max_laps) = (bound_a.min(bound_b), bound_a.max(bound_b));

    laps.clamp(min_laps as f64, max_laps as f64) as u32
}

/// generate_track draws a random track. The number of segments is drawn from the configured range
/// and every segment type is drawn uniformly. A track always contains at least one long
/// straight.
pub fn generate_track<R: Rng + ?Sized>(track_gen_pars: &TrackGenPars, rng: &mut R) -> Track {
    let [min_segs, max_segs] = track_gen_pars.segment_count;
    let no_segments = rng.gen_range(min_segs.max(1)..=max_segs.max(min_segs.max(1))) as usize;

    let mut segments: Vec<SegmentType> = (0..no_segments)
        .map(|_| SegmentType::ALL[rng.gen_range(0..SegmentType::ALL.len())])
        .collect();

    if !segments.contains(&SegmentType::LongStraight) {
        let idx = rng.gen_range(0..no_segments);
        segments[idx] = SegmentType::LongStraight;
    }

    let laps = calc_no_laps(no_segments, track_gen_pars);

    let [diff_min, diff_max] = track_gen_pars.difficulty_range;
    let draw = if diff_min < diff_max {
        rng.gen_range(diff_min..diff_max)
    } else {
        diff_min
    };
    let difficulty = track_gen_pars.difficulty_scale * draw;

    let track = Track::new(generate_track_name(rng), segments, laps, difficulty);

    log::info!(
        "Generated track {} with {} segments ({:.0}m), {} laps, difficulty {:.1}",
        track.name,
        track.segments.len(),
        track.length(),
        track.laps,
        track.difficulty
    );

    track
}
