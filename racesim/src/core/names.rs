use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const TEAM_NAMES: [&str; 20] = [
    "Velocity Racing",
    "Scuderia Rosso",
    "Silver Arrows",
    "Papaya Speed",
    "Alpine Blue",
    "Green Martin",
    "Alpha Dogs",
    "Haas Brothers",
    "Williams Blue",
    "Clean Sauber",
    "Dragon Speed",
    "Panther Racing",
    "Cosmic Motors",
    "Thunder Bolt",
    "Apex Predators",
    "Quantum Racing",
    "Nebula GP",
    "Vortex Autosport",
    "Titanium F1",
    "Phoenix Rising",
];

pub const TRACK_NAMES: [&str; 13] = [
    "Monza Park",
    "Silverstone Circuit",
    "Spa Francorchamps",
    "Suzuka International",
    "Interlagos",
    "Circuit of the Americas",
    "Marina Bay",
    "Monte Carlo",
    "Red Bull Ring",
    "Zandvoort",
    "Hungaroring",
    "Imola",
    "Catalunya",
];

/// * `country` - Display name of the nationality
/// * `flag` - Flag glyph
/// * `weight` - Relative frequency of the nationality on the grid
struct NamePool {
    country: &'static str,
    flag: &'static str,
    weight: u32,
    first: &'static [&'static str],
    last: &'static [&'static str],
}

const NAME_POOLS: [NamePool; 8] = [
    NamePool {
        country: "United Kingdom",
        flag: "🇬🇧",
        weight: 4,
        first: &["James", "Lewis", "George", "Lando", "Oliver", "Harry", "Jack", "Charlie", "Thomas", "Callum"],
        last: &["Smith", "Taylor", "Wilson", "Norris", "Russell", "Brown", "Evans", "Walker", "Wright", "Hughes"],
    },
    NamePool {
        country: "Italy",
        flag: "🇮🇹",
        weight: 3,
        first: &["Alessandro", "Lorenzo", "Matteo", "Francesco", "Davide", "Federico", "Marco", "Andrea", "Luca", "Simone"],
        last: &["Rossi", "Ferrari", "Esposito", "Bianchi", "Romano", "Colombo", "Ricci", "Marino", "Greco", "Conti"],
    },
    NamePool {
        country: "Germany",
        flag: "🇩🇪",
        weight: 3,
        first: &["Maximilian", "Paul", "Lukas", "Felix", "Jonas", "Leon", "Julian", "Niklas", "Sebastian", "Nico"],
        last: &["Muller", "Schmidt", "Schneider", "Fischer", "Weber", "Meyer", "Wagner", "Becker", "Hoffmann", "Richter"],
    },
    NamePool {
        country: "France",
        flag: "🇫🇷",
        weight: 3,
        first: &["Lucas", "Hugo", "Louis", "Arthur", "Nathan", "Theo", "Maxime", "Antoine", "Pierre", "Esteban"],
        last: &["Martin", "Bernard", "Dubois", "Robert", "Richard", "Petit", "Durand", "Leroy", "Moreau", "Fournier"],
    },
    NamePool {
        country: "Spain",
        flag: "🇪🇸",
        weight: 2,
        first: &["Antonio", "Manuel", "Jose", "David", "Javier", "Carlos", "Alejandro", "Miguel", "Pablo", "Fernando"],
        last: &["Garcia", "Gonzalez", "Rodriguez", "Fernandez", "Lopez", "Martinez", "Sanchez", "Perez", "Alonso", "Sainz"],
    },
    NamePool {
        country: "Brazil",
        flag: "🇧🇷",
        weight: 2,
        first: &["Mateo", "Felipe", "Lucas", "Gabriel", "Enzo", "Rafael", "Bruno", "Thiago", "Pedro", "Gustavo"],
        last: &["Silva", "Santos", "Oliveira", "Souza", "Lima", "Ferreira", "Costa", "Pereira", "Carvalho", "Almeida"],
    },
    NamePool {
        country: "United States",
        flag: "🇺🇸",
        weight: 2,
        first: &["James", "John", "Robert", "Michael", "William", "David", "Joseph", "Daniel", "Matthew", "Logan"],
        last: &["Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Wilson", "Anderson", "Sargeant"],
    },
    NamePool {
        country: "Japan",
        flag: "🇯🇵",
        weight: 1,
        first: &["Hiroshi", "Takashi", "Kenji", "Akira", "Yuki", "Kazuo", "Naoki", "Satoshi", "Yusuke", "Ryota"],
        last: &["Sato", "Suzuki", "Takahashi", "Tanaka", "Watanabe", "Ito", "Yamamoto", "Nakamura", "Kobayashi", "Kato"],
    },
];

/// Identity of a generated driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverIdentity {
    pub name: String,
    pub nationality: String,
    pub flag: String,
}

/// generate_driver_identity draws a nationality according to the pool weights and combines a
/// random first and last name of that nationality.
pub fn generate_driver_identity<R: Rng + ?Sized>(rng: &mut R) -> DriverIdentity {
    let pool_idx = WeightedIndex::new(NAME_POOLS.iter().map(|pool| pool.weight))
        .map(|dist| dist.sample(rng))
        .unwrap_or(0);
    let pool = &NAME_POOLS[pool_idx];

    let first = pool.first.choose(rng).copied().unwrap_or("Unknown");
    let last = pool.last.choose(rng).copied().unwrap_or("Driver");

    DriverIdentity {
        name: format!("{} {}", first, last),
        nationality: pool.country.to_owned(),
        flag: pool.flag.to_owned(),
    }
}

/// team_name returns the name of the team with the given rank, or a generic name if the grid is
/// larger than the name list.
pub fn team_name(rank: u32) -> String {
    (rank as usize)
        .checked_sub(1)
        .and_then(|idx| TEAM_NAMES.get(idx))
        .map(|&name| name.to_owned())
        .unwrap_or_else(|| format!("Team {}", rank))
}

/// generate_track_name draws a random track name.
pub fn generate_track_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    TRACK_NAMES.choose(rng).copied().unwrap_or("Circuit").to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn identity_comes_from_one_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..50 {
            let identity = generate_driver_identity(&mut rng);
            let pool = NAME_POOLS
                .iter()
                .find(|pool| pool.country == identity.nationality)
                .expect("nationality must come from a pool");

            assert_eq!(identity.flag, pool.flag);
            let (first, last) = identity.name.split_once(' ').unwrap();
            assert!(pool.first.contains(&first));
            assert!(pool.last.contains(&last));
        }
    }

    #[test]
    fn team_names_fall_back_beyond_list() {
        assert_eq!(team_name(1), "Velocity Racing");
        assert_eq!(team_name(25), "Team 25");
    }
}
