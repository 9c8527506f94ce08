use linked_hash_set::LinkedHashSet;
use std::collections::HashMap;

use super::action::Action;
use super::config::NotationConfig;
use super::encode::encode_action;
use super::error::GenerateError;
use super::item::{GameSettings, LogItem, LogLocation, PLAYER_KEY_PREFIX, STARTING_VPS_KEY, STARTING_VP_KEY_PREFIX};
use super::reorder::{reorder_block, GridEvent, Row};

const CELL_SEPARATOR: &str = " | ";

/// Rendered text plus where each input item ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConciseLog {
    pub lines: Vec<String>,
    /// One entry per input item, [`LogLocation::NONE`] for items without a cell
    pub locations: Vec<LogLocation>,
}

impl ConciseLog {
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// The trimmed text of the cell at `location`
    pub fn cell_at(&self, location: LogLocation) -> Option<&str> {
        if location.is_none() {
            return None;
        }
        self.lines
            .get(location.line as usize)?
            .split('|')
            .nth(location.column as usize)
            .map(str::trim)
    }
}

/// Items chained into one cell; indices into the input
type CellItems = Vec<usize>;

/// Lays an item stream out as the grid notation
pub struct ConciseGenerator {
    config: NotationConfig,
    lines: Vec<String>,
    locations: Vec<LogLocation>,
    columns: Vec<String>,
    column_of: HashMap<String, usize>,
    block: Vec<Row<CellItems>>,
    row: Row<CellItems>,
    last_column: Option<usize>,
    header_written: bool,
    round_seen: bool,
}

impl ConciseGenerator {
    pub fn new() -> Self {
        ConciseGenerator::with_config(NotationConfig::default())
    }

    pub fn with_config(config: NotationConfig) -> Self {
        ConciseGenerator {
            config,
            lines: Vec::new(),
            locations: Vec::new(),
            columns: Vec::new(),
            column_of: HashMap::new(),
            block: Vec::new(),
            row: Vec::new(),
            last_column: None,
            header_written: false,
            round_seen: false,
        }
    }

    /// Renders `items`.
    ///
    /// # Errors
    ///
    /// Fails if an action refers to a hex with no land coordinate.
    pub fn generate(mut self, items: &[LogItem]) -> Result<ConciseLog, GenerateError> {
        self.locations = vec![LogLocation::NONE; items.len()];
        self.set_columns(discover_players(items));

        let mut previous: Option<(usize, &Action)> = None;
        for (index, item) in items.iter().enumerate() {
            match item {
                LogItem::GameSettings(settings) => {
                    self.flush_block();
                    self.write_settings(settings);
                    self.header_written = false;
                    previous = None;
                }
                LogItem::RoundStart(round) => {
                    self.flush_block();
                    if !round.turn_order.is_empty() {
                        self.set_columns(round.turn_order.clone());
                    }
                    if self.lines.last().is_some_and(|line| !line.is_empty()) {
                        self.lines.push(String::new());
                    }
                    self.lines.push(format!("Round {}", round.round));
                    self.lines.push(format!("TurnOrder: {}", self.columns.join(", ")));
                    self.write_header();
                    self.round_seen = true;
                    previous = None;
                }
                LogItem::Action { action } => {
                    let Some(column) = self.column_of.get(action.player_id()).copied() else {
                        log::warn!(
                            "Item {}: {} has no column in {:?}, skipping",
                            index,
                            action.player_id(),
                            self.columns
                        );
                        continue;
                    };
                    if !self.header_written {
                        if !self.round_seen {
                            self.lines.push("Setup".to_string());
                            self.lines.push(format!("TurnOrder: {}", self.columns.join(", ")));
                        }
                        self.write_header();
                    }
                    let code = encode_action(action).map_err(|source| GenerateError::Coordinate {
                        index,
                        player: action.player_id().to_string(),
                        source,
                    })?;
                    let chains = previous.is_some_and(|(previous_column, previous_action)| {
                        previous_column == column && action.can_chain_after(previous_action)
                    });
                    if action.is_conversion() && !chains {
                        return Err(GenerateError::UnhostedConversion {
                            index,
                            player: action.player_id().to_string(),
                            code,
                        });
                    }
                    self.place(index, column, action, code, chains);
                    previous = Some((column, action));
                }
            }
        }
        self.flush_block();
        Ok(ConciseLog {
            lines: self.lines,
            locations: self.locations,
        })
    }

    fn set_columns(&mut self, columns: Vec<String>) {
        self.column_of = columns
            .iter()
            .enumerate()
            .map(|(index, player)| (player.clone(), index))
            .collect();
        self.columns = columns;
        self.row = self.empty_row();
        self.last_column = None;
    }

    fn empty_row(&self) -> Row<CellItems> {
        (0..self.columns.len()).map(|_| None).collect()
    }

    fn place(&mut self, index: usize, column: usize, action: &Action, code: String, chains: bool) {
        if chains {
            if let Some(cell) = self.row[column].as_mut() {
                cell.token.push('.');
                cell.token.push_str(&code);
                cell.may_trigger |= action.may_trigger_leech();
                cell.payload.push(index);
                return;
            }
        }
        if self.row[column].is_some() || self.last_column.is_some_and(|last| column <= last) {
            let empty = self.empty_row();
            let row = std::mem::replace(&mut self.row, empty);
            self.block.push(row);
        }
        self.row[column] = Some(GridEvent {
            column,
            player: action.player_id().to_string(),
            token: code,
            is_reaction: action.is_leech_response(),
            source: action.leech_source().map(String::from),
            may_trigger: action.may_trigger_leech(),
            payload: vec![index],
        });
        self.last_column = Some(column);
    }

    /// Reorders and writes out the rows collected since the last boundary
    fn flush_block(&mut self) {
        if self.row.iter().any(Option::is_some) {
            let empty = self.empty_row();
            let row = std::mem::replace(&mut self.row, empty);
            self.block.push(row);
        }
        self.last_column = None;
        let block = std::mem::take(&mut self.block);
        if block.is_empty() {
            return;
        }
        let block = if self.config.anchor_leeches {
            reorder_block(block, self.columns.len())
        } else {
            block
        };
        log::trace!("Writing block of {} rows", block.len());
        for row in block {
            let line = self.lines.len();
            let mut cells = Vec::with_capacity(row.len());
            for (column, cell) in row.into_iter().enumerate() {
                match cell {
                    Some(event) => {
                        for item in event.payload {
                            self.locations[item] = LogLocation::new(line, column);
                        }
                        cells.push(event.token);
                    }
                    None => cells.push(String::new()),
                }
            }
            self.lines.push(self.render_row(&cells));
        }
    }

    fn render_row(&self, cells: &[String]) -> String {
        let width = self.config.column_width;
        cells
            .iter()
            .map(|cell| format!("{:<width$}", cell, width = width))
            .collect::<Vec<String>>()
            .join(CELL_SEPARATOR)
            .trim_end()
            .to_string()
    }

    fn separator(&self) -> String {
        let count = self.columns.len().max(1);
        "-".repeat(self.config.column_width * count + CELL_SEPARATOR.len() * (count - 1))
    }

    fn write_header(&mut self) {
        let header = self.render_row(&self.columns);
        self.lines.push(self.separator());
        self.lines.push(header);
        self.lines.push(self.separator());
        self.header_written = true;
    }

    fn write_settings(&mut self, settings: &GameSettings) {
        let has_list = settings.get(STARTING_VPS_KEY).is_some();
        for (key, value) in settings.entries() {
            if key.starts_with(PLAYER_KEY_PREFIX) || key.starts_with(STARTING_VP_KEY_PREFIX) {
                continue;
            }
            self.lines.push(format!("{}: {}", key, value).trim_end().to_string());
        }
        let seeded = settings.starting_vps();
        if !has_list && !seeded.is_empty() {
            let list: Vec<String> = seeded
                .iter()
                .map(|(player, score)| format!("{}:{}", player, score))
                .collect();
            self.lines.push(format!("{}: {}", STARTING_VPS_KEY, list.join(", ")));
        }
        self.lines.push(String::new());
    }
}

impl Default for ConciseGenerator {
    fn default() -> Self {
        ConciseGenerator::new()
    }
}

/// Every player in first-appearance order, from turn orders and actions
fn discover_players(items: &[LogItem]) -> Vec<String> {
    let mut players: LinkedHashSet<String> = LinkedHashSet::new();
    for item in items {
        match item {
            LogItem::RoundStart(round) => {
                for player in &round.turn_order {
                    players.insert_if_absent(player.clone());
                }
            }
            LogItem::Action { action } => {
                if !action.player_id().is_empty() {
                    players.insert_if_absent(action.player_id().to_string());
                }
            }
            LogItem::GameSettings(_) => {}
        }
    }
    players.into_iter().collect()
}
