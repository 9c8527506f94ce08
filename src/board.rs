use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Axial hex coordinate. `r` is the row (A = 0), `q` the column offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Hex { q, r }
    }

    pub fn neighbors(&self) -> [Hex; 6] {
        NEIGHBOR_DIRECTIONS.map(|(dq, dr)| Hex::new(self.q + dq, self.r + dr))
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

const NEIGHBOR_DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Terrain {
    Plains,
    Swamp,
    Lake,
    Forest,
    Mountain,
    Wasteland,
    Desert,
    River,
}

impl Terrain {
    pub const LAND: [Terrain; 7] = [
        Terrain::Plains,
        Terrain::Swamp,
        Terrain::Lake,
        Terrain::Forest,
        Terrain::Mountain,
        Terrain::Wasteland,
        Terrain::Desert,
    ];

    /// Short code used in transform tokens. River has none.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Terrain::Plains => Some("Br"),
            Terrain::Swamp => Some("Bk"),
            Terrain::Lake => Some("Bl"),
            Terrain::Forest => Some("G"),
            Terrain::Mountain => Some("Gy"),
            Terrain::Wasteland => Some("R"),
            Terrain::Desert => Some("Y"),
            Terrain::River => None,
        }
    }

    /// Case-insensitive inverse of [`Terrain::code`]
    pub fn from_code(code: &str) -> Option<Terrain> {
        match code.to_ascii_uppercase().as_str() {
            "BR" => Some(Terrain::Plains),
            "BK" => Some(Terrain::Swamp),
            "BL" => Some(Terrain::Lake),
            "G" => Some(Terrain::Forest),
            "GY" => Some(Terrain::Mountain),
            "R" => Some(Terrain::Wasteland),
            "Y" => Some(Terrain::Desert),
            _ => None,
        }
    }

    fn from_map_colour(colour: &str) -> Option<Terrain> {
        match colour {
            "brown" => Some(Terrain::Plains),
            "black" => Some(Terrain::Swamp),
            "blue" => Some(Terrain::Lake),
            "green" => Some(Terrain::Forest),
            "gray" => Some(Terrain::Mountain),
            "red" => Some(Terrain::Wasteland),
            "yellow" => Some(Terrain::Desert),
            "x" => Some(Terrain::River),
            _ => None,
        }
    }
}

/// Read access to a hex map. The coordinate codec only needs this much.
pub trait BoardLayout {
    fn terrain(&self, hex: Hex) -> Option<Terrain>;

    /// Number of rows; rows are lettered from A
    fn row_count(&self) -> i32;

    /// First axial `q` of row `r`
    fn row_start(&self, r: i32) -> i32 {
        -(r / 2)
    }

    fn contains(&self, hex: Hex) -> bool {
        self.terrain(hex).is_some()
    }

    fn is_river(&self, hex: Hex) -> bool {
        self.terrain(hex) == Some(Terrain::River)
    }

    /// Neighbors of `hex` that are on the map
    fn neighbors(&self, hex: Hex) -> Vec<Hex> {
        hex.neighbors()
            .into_iter()
            .filter(|neighbor| self.contains(*neighbor))
            .collect()
    }
}

const BASE_MAP: [&str; 9] = [
    "brown gray green blue yellow red brown black red green blue red black",
    "yellow x x brown black x x yellow black x x yellow",
    "x x black x gray x green x green x gray x x",
    "green blue yellow x x red brown x red x red brown",
    "black brown red blue black brown gray yellow x x green black blue",
    "gray green x x yellow green x x x brown gray brown",
    "x x x gray x red x green x yellow black blue yellow",
    "yellow blue brown x x x blue black x gray brown gray",
    "red black gray blue red green yellow brown gray x blue green red",
];

/// The base game map
pub struct BaseBoard {
    terrain: HashMap<Hex, Terrain>,
}

pub static BASE_BOARD: LazyLock<BaseBoard> = LazyLock::new(|| {
    let mut terrain = HashMap::new();
    for (r, row) in BASE_MAP.iter().enumerate() {
        let r = r as i32;
        let start = -(r / 2);
        for (offset, colour) in row.split_whitespace().enumerate() {
            if let Some(hex_terrain) = Terrain::from_map_colour(colour) {
                terrain.insert(Hex::new(start + offset as i32, r), hex_terrain);
            }
        }
    }
    BaseBoard { terrain }
});

impl BaseBoard {
    /// Every non-river hex, row by row
    pub fn land_hexes(&self) -> Vec<Hex> {
        let mut hexes: Vec<Hex> = self
            .terrain
            .iter()
            .filter(|(_, terrain)| **terrain != Terrain::River)
            .map(|(hex, _)| *hex)
            .collect();
        hexes.sort_by_key(|hex| (hex.r, hex.q));
        hexes
    }
}

impl BoardLayout for BaseBoard {
    fn terrain(&self, hex: Hex) -> Option<Terrain> {
        self.terrain.get(&hex).copied()
    }

    fn row_count(&self) -> i32 {
        BASE_MAP.len() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_board_row_lengths() {
        let lengths: Vec<usize> = (0..9)
            .map(|r| {
                (-10..20)
                    .filter(|q| BASE_BOARD.contains(Hex::new(*q, r)))
                    .count()
            })
            .collect();
        assert_eq!(lengths, vec![13, 12, 13, 12, 13, 12, 13, 12, 13]);
    }

    #[test]
    fn test_row_start_offsets() {
        assert_eq!(BASE_BOARD.terrain(Hex::new(0, 0)), Some(Terrain::Plains));
        assert_eq!(BASE_BOARD.terrain(Hex::new(-1, 2)), Some(Terrain::River));
        assert_eq!(BASE_BOARD.terrain(Hex::new(-4, 8)), Some(Terrain::Wasteland));
        assert_eq!(BASE_BOARD.terrain(Hex::new(-5, 8)), None);
    }

    #[test]
    fn test_land_hexes() {
        let land = BASE_BOARD.land_hexes();
        assert_eq!(land.len(), 77);
        assert_eq!(land[0], Hex::new(0, 0));
        assert!(land.iter().all(|hex| !BASE_BOARD.is_river(*hex)));
    }

    #[test]
    fn test_neighbors_are_clipped_to_map() {
        let corner = BASE_BOARD.neighbors(Hex::new(0, 0));
        assert_eq!(corner, vec![Hex::new(1, 0), Hex::new(0, 1)]);
    }

    #[test]
    fn test_terrain_codes() {
        for terrain in Terrain::LAND {
            let code = terrain.code().unwrap();
            assert_eq!(Terrain::from_code(code), Some(terrain));
            assert_eq!(Terrain::from_code(&code.to_lowercase()), Some(terrain));
        }
        assert_eq!(Terrain::River.code(), None);
        assert_eq!(Terrain::from_code("X"), None);
    }
}
