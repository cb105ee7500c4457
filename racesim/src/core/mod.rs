pub mod budget;
pub mod car;
pub mod driver;
pub mod grid;
pub mod handle_race;
pub mod names;
pub mod physics;
pub mod qualifying;
pub mod race;
pub mod session;
pub mod state_handler;
pub mod stats;
pub mod track;
