use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Capability dimensions of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverStat {
    Pace,
    Acceleration,
    Braking,
    Cornering,
    Overtaking,
    Instincts,
    Consistency,
}

impl DriverStat {
    pub const COUNT: usize = 7;
    pub const ALL: [DriverStat; DriverStat::COUNT] = [
        DriverStat::Pace,
        DriverStat::Acceleration,
        DriverStat::Braking,
        DriverStat::Cornering,
        DriverStat::Overtaking,
        DriverStat::Instincts,
        DriverStat::Consistency,
    ];

    /// Car capability that adds to this driver capability.
    pub fn car_bonus(self) -> CarStat {
        match self {
            DriverStat::Cornering | DriverStat::Braking | DriverStat::Pace => CarStat::Aero,
            DriverStat::Overtaking | DriverStat::Acceleration => CarStat::Engine,
            DriverStat::Instincts | DriverStat::Consistency => CarStat::Engineering,
        }
    }

    /// Upper bound of the effective value, if any.
    pub fn effective_cap(self) -> Option<u32> {
        match self {
            DriverStat::Consistency => Some(100),
            _ => None,
        }
    }
}

/// Capability dimensions of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarStat {
    Aero,
    Engine,
    Engineering,
}

impl CarStat {
    pub const COUNT: usize = 3;
    pub const ALL: [CarStat; CarStat::COUNT] =
        [CarStat::Aero, CarStat::Engine, CarStat::Engineering];
}

/// Levels of all driver capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriverStats(pub [u32; DriverStat::COUNT]);

/// Levels of all car capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CarStats(pub [u32; CarStat::COUNT]);

impl DriverStats {
    pub fn uniform(level: u32) -> DriverStats {
        DriverStats([level; DriverStat::COUNT])
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl CarStats {
    pub fn uniform(level: u32) -> CarStats {
        CarStats([level; CarStat::COUNT])
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl Index<DriverStat> for DriverStats {
    type Output = u32;

    fn index(&self, stat: DriverStat) -> &u32 {
        &self.0[stat as usize]
    }
}

impl IndexMut<DriverStat> for DriverStats {
    fn index_mut(&mut self, stat: DriverStat) -> &mut u32 {
        &mut self.0[stat as usize]
    }
}

impl Index<CarStat> for CarStats {
    type Output = u32;

    fn index(&self, stat: CarStat) -> &u32 {
        &self.0[stat as usize]
    }
}

impl IndexMut<CarStat> for CarStats {
    fn index_mut(&mut self, stat: CarStat) -> &mut u32 {
        &mut self.0[stat as usize]
    }
}

/// effective_stat returns the driver level plus the car bonus of the matching car capability,
/// capped where the capability has an upper bound.
pub fn effective_stat(driver: &DriverStats, car: &CarStats, stat: DriverStat) -> u32 {
    let val = driver[stat] + car[stat.car_bonus()];

    match stat.effective_cap() {
        Some(cap) => val.min(cap),
        None => val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_bonus_follows_mapping() {
        let mut driver = DriverStats::uniform(10);
        driver[DriverStat::Pace] = 20;
        let car = CarStats([1, 2, 3]);

        assert_eq!(effective_stat(&driver, &car, DriverStat::Pace), 21);
        assert_eq!(effective_stat(&driver, &car, DriverStat::Cornering), 11);
        assert_eq!(effective_stat(&driver, &car, DriverStat::Acceleration), 12);
        assert_eq!(effective_stat(&driver, &car, DriverStat::Overtaking), 12);
        assert_eq!(effective_stat(&driver, &car, DriverStat::Instincts), 13);
    }

    #[test]
    fn consistency_is_capped_at_100() {
        let mut driver = DriverStats::uniform(1);
        driver[DriverStat::Consistency] = 95;
        let car = CarStats([0, 0, 20]);

        assert_eq!(effective_stat(&driver, &car, DriverStat::Consistency), 100);
        assert_eq!(effective_stat(&driver, &car, DriverStat::Instincts), 21);
    }

    #[test]
    fn totals_sum_levels() {
        assert_eq!(DriverStats::uniform(1).total(), 7);
        assert_eq!(CarStats([4, 5, 6]).total(), 15);
    }
}
