pub mod standings_interface;
