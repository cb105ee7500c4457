use crate::post::race_result::LapSnapshot;

/// StandingsConsumer is implemented by the championship and economy bookkeeping. It receives the
/// final snapshot of every race, i.e. the rank and best lap time of every driver, and assigns
/// championship and progression points on that basis.
pub trait StandingsConsumer {
    fn on_race_finished(&mut self, final_snapshot: &LapSnapshot);
}
