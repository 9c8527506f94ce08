use serde::Serialize;

use super::action::{Action, PlayerId};

pub const STARTING_VPS_KEY: &str = "StartingVPs";
pub const PLAYER_KEY_PREFIX: &str = "Player:";
pub const STARTING_VP_KEY_PREFIX: &str = "StartingVP:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "item")]
pub enum LogItem {
    GameSettings(GameSettings),
    RoundStart(RoundStart),
    Action { action: Action },
}

impl LogItem {
    pub fn action(&self) -> Option<&Action> {
        match self {
            LogItem::Action { action } => Some(action),
            _ => None,
        }
    }
}

impl From<Action> for LogItem {
    fn from(action: Action) -> Self {
        LogItem::Action { action }
    }
}

/// Free-form settings in the order they were written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameSettings {
    entries: Vec<(String, String)>,
}

impl GameSettings {
    /// Sets `key`, replacing any earlier value in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seeds the per-player entries for a `StartingVPs` list of `Name:Score`
    /// pairs. Returns the player names found; malformed pairs are skipped.
    pub fn insert_starting_vps(&mut self, list: &str) -> Vec<String> {
        self.insert(STARTING_VPS_KEY, list.trim());
        let mut players = Vec::new();
        for pair in list.split(',') {
            let Some((name, score)) = pair.rsplit_once(':') else {
                log::warn!("Ignoring starting VP entry without a score: {:?}", pair);
                continue;
            };
            let (name, score) = (name.trim(), score.trim());
            if name.is_empty() {
                continue;
            }
            self.insert(format!("{}{}", PLAYER_KEY_PREFIX, name), name);
            self.insert(format!("{}{}", STARTING_VP_KEY_PREFIX, name), score);
            players.push(name.to_string());
        }
        players
    }

    /// `(player, score)` pairs seeded by [`GameSettings::insert_starting_vps`]
    pub fn starting_vps(&self) -> Vec<(&str, &str)> {
        self.entries()
            .filter_map(|(key, value)| {
                key.strip_prefix(STARTING_VP_KEY_PREFIX)
                    .map(|player| (player, value))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundStart {
    pub round: u32,
    pub turn_order: Vec<PlayerId>,
}

/// Holds a `Round` line until its `TurnOrder` line arrives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundStartBuilder {
    round: u32,
    turn_order: Option<Vec<PlayerId>>,
}

impl RoundStartBuilder {
    pub fn new(round: u32) -> Self {
        RoundStartBuilder {
            round,
            turn_order: None,
        }
    }

    pub fn turn_order(mut self, turn_order: Vec<PlayerId>) -> Self {
        self.turn_order = Some(turn_order);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.turn_order.is_some()
    }

    /// Builds the item; a round whose turn order never arrived has an empty one
    pub fn build(self) -> RoundStart {
        RoundStart {
            round: self.round,
            turn_order: self.turn_order.unwrap_or_default(),
        }
    }
}

/// Where an item was rendered. Items with no cell use [`LogLocation::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LogLocation {
    pub line: isize,
    pub column: isize,
}

impl LogLocation {
    pub const NONE: LogLocation = LogLocation { line: -1, column: -1 };

    pub fn new(line: usize, column: usize) -> Self {
        LogLocation {
            line: line as isize,
            column: column as isize,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == LogLocation::NONE
    }
}

impl Default for LogLocation {
    fn default() -> Self {
        LogLocation::NONE
    }
}
