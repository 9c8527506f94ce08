use std::collections::HashSet;
use std::sync::LazyLock;

pub const KNOWN_FACTIONS: [&str; 14] = [
    "Alchemists",
    "Auren",
    "Chaos Magicians",
    "Cultists",
    "Darklings",
    "Dwarves",
    "Engineers",
    "Fakirs",
    "Giants",
    "Halflings",
    "Mermaids",
    "Nomads",
    "Swarmlings",
    "Witches",
];

static NORMALIZED_FACTIONS: LazyLock<HashSet<String>> =
    LazyLock::new(|| KNOWN_FACTIONS.iter().map(|name| normalize_player(name)).collect());

/// Lowercase with spaces removed, so "Chaos Magicians" matches "chaosmagicians"
pub fn normalize_player(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn is_known_faction(name: &str) -> bool {
    NORMALIZED_FACTIONS.contains(&normalize_player(name))
}

pub fn same_player(a: &str, b: &str) -> bool {
    normalize_player(a) == normalize_player(b)
}

/// Player names a parser will accept as header cells
#[derive(Debug, Clone, Default)]
pub struct PlayerRoster {
    extra: HashSet<String>,
}

impl PlayerRoster {
    pub fn register(&mut self, name: &str) {
        let normalized = normalize_player(name);
        if !normalized.is_empty() {
            self.extra.insert(normalized);
        }
    }

    pub fn knows(&self, name: &str) -> bool {
        is_known_faction(name) || self.extra.contains(&normalize_player(name))
    }
}
