use regex::Regex;
use std::sync::LazyLock;

use super::action::Action;
use super::error::ParseError;
use super::grammar::decode_token;
use super::item::{GameSettings, LogItem, RoundStartBuilder, STARTING_VPS_KEY};
use super::players::{same_player, PlayerRoster};

static SETTING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_ ]*):(?:\s+(.*))?$").expect("setting pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Log and skip cells that do not decode
    #[default]
    Lenient,
    /// Stop at the first cell that does not decode
    Strict,
}

/// Line-by-line reader for the grid notation
#[derive(Debug)]
pub struct ConciseParser {
    mode: ParseMode,
    roster: PlayerRoster,
    columns: Vec<String>,
    settings: GameSettings,
    settings_closed: bool,
    pending_round: Option<RoundStartBuilder>,
    in_setup: bool,
    items: Vec<LogItem>,
}

impl ConciseParser {
    pub fn new(mode: ParseMode) -> Self {
        ConciseParser {
            mode,
            roster: PlayerRoster::default(),
            columns: Vec::new(),
            settings: GameSettings::default(),
            settings_closed: false,
            pending_round: None,
            in_setup: false,
            items: Vec::new(),
        }
    }

    /// Feeds every line of `text`. In lenient mode this only fails if a
    /// problem cannot be skipped.
    pub fn parse_lines(&mut self, text: &str) -> Result<(), ParseError> {
        for (index, line) in text.lines().enumerate() {
            self.parse_line(index + 1, line)?;
        }
        Ok(())
    }

    /// Emits anything still pending and returns the items in source order
    pub fn finish(mut self) -> Vec<LogItem> {
        self.close_settings();
        self.flush_round();
        self.items
    }

    fn fail(&self, error: ParseError) -> Result<(), ParseError> {
        match self.mode {
            ParseMode::Strict => Err(error),
            ParseMode::Lenient => {
                log::warn!("Skipping: {}", error);
                Ok(())
            }
        }
    }

    fn parse_line(&mut self, number: usize, line: &str) -> Result<(), ParseError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_separator(trimmed) {
            return Ok(());
        }
        if let Some(round) = trimmed.strip_prefix("Round ") {
            return self.start_round(number, round.trim());
        }
        if trimmed.eq_ignore_ascii_case("Setup") {
            self.flush_round();
            self.in_setup = true;
            return Ok(());
        }
        if let Some(order) = trimmed.strip_prefix("TurnOrder:") {
            self.turn_order(order);
            return Ok(());
        }
        if self.is_header(trimmed) {
            self.columns = trimmed.split('|').map(|cell| cell.trim().to_string()).collect();
            log::debug!("Line {}: columns {:?}", number, self.columns);
            return Ok(());
        }
        if trimmed.contains('|') || (self.columns.len() == 1 && !SETTING_PATTERN.is_match(trimmed)) {
            return self.parse_row(number, line);
        }
        if let Some(captures) = SETTING_PATTERN.captures(trimmed) {
            let key = captures[1].trim();
            let value = captures.get(2).map_or("", |value| value.as_str().trim());
            self.add_setting(number, key, value);
            return Ok(());
        }
        self.fail(ParseError::Layout {
            line: number,
            message: format!("unrecognised line {:?}", trimmed),
        })
    }

    fn start_round(&mut self, number: usize, text: &str) -> Result<(), ParseError> {
        match text.parse::<u32>() {
            Ok(round) if round > 0 => {
                self.flush_round();
                self.close_settings();
                self.in_setup = false;
                self.pending_round = Some(RoundStartBuilder::new(round));
                Ok(())
            }
            _ => self.fail(ParseError::Layout {
                line: number,
                message: format!("round number {:?} is not a positive integer", text),
            }),
        }
    }

    fn turn_order(&mut self, order: &str) {
        let players: Vec<String> = order
            .split(',')
            .map(str::trim)
            .filter(|player| !player.is_empty())
            .map(String::from)
            .collect();
        for player in &players {
            self.roster.register(player);
        }
        self.columns = players.clone();
        match self.pending_round.take() {
            Some(pending) if !pending.is_complete() => {
                self.emit(LogItem::RoundStart(pending.turn_order(players).build()));
            }
            Some(pending) => self.pending_round = Some(pending),
            None if self.in_setup => {}
            None => log::warn!("Turn order {:?} does not follow a round header", order.trim()),
        }
    }

    fn add_setting(&mut self, number: usize, key: &str, value: &str) {
        if self.settings_closed {
            log::warn!("Line {}: ignoring setting {:?} after the log started", number, key);
            return;
        }
        if key == STARTING_VPS_KEY {
            for player in self.settings.insert_starting_vps(value) {
                self.roster.register(&player);
            }
        } else {
            self.settings.insert(key, value);
        }
    }

    /// A row whose cells are all known player names
    fn is_header(&self, line: &str) -> bool {
        line.split('|')
            .map(str::trim)
            .all(|cell| !cell.is_empty() && self.roster.knows(cell))
    }

    fn parse_row(&mut self, number: usize, line: &str) -> Result<(), ParseError> {
        if self.columns.is_empty() {
            return self.fail(ParseError::Layout {
                line: number,
                message: "data row before any player header".to_string(),
            });
        }
        for (index, cell) in line.split('|').enumerate() {
            let token = cell.trim();
            if token.is_empty() {
                continue;
            }
            let Some(player) = self.columns.get(index).cloned() else {
                self.fail(ParseError::Layout {
                    line: number,
                    message: format!("cell {} ({:?}) has no player column", index + 1, token),
                })?;
                continue;
            };
            match decode_token(&player, token) {
                Ok(action) => {
                    let action = self.canonical_sources(action);
                    log::trace!("Line {}: {} {:?}", number, player, action);
                    self.emit(LogItem::from(action));
                }
                Err(source) => self.fail(ParseError::Token {
                    line: number,
                    column: index + 1,
                    player,
                    token: token.to_string(),
                    source,
                })?,
            }
        }
        Ok(())
    }

    /// Leech sources take the header's spelling of the player name
    fn canonical_sources(&self, action: Action) -> Action {
        let canonical = |source: Option<String>| {
            source.map(|source| {
                self.columns
                    .iter()
                    .find(|column| same_player(column, &source))
                    .cloned()
                    .unwrap_or(source)
            })
        };
        match action {
            Action::AcceptLeech {
                player,
                from_player,
                amount,
                vp_cost,
                explicit_amount,
            } => Action::AcceptLeech {
                player,
                from_player: canonical(from_player),
                amount,
                vp_cost,
                explicit_amount,
            },
            Action::DeclineLeech {
                player,
                from_player,
            } => Action::DeclineLeech {
                player,
                from_player: canonical(from_player),
            },
            Action::PostIncome { action } => Action::PostIncome {
                action: Box::new(self.canonical_sources(*action)),
            },
            Action::Compound { actions } => Action::Compound {
                actions: actions
                    .into_iter()
                    .map(|action| self.canonical_sources(action))
                    .collect(),
            },
            other => other,
        }
    }

    fn close_settings(&mut self) {
        if self.settings_closed {
            return;
        }
        self.settings_closed = true;
        if !self.settings.is_empty() {
            let settings = std::mem::take(&mut self.settings);
            self.items.push(LogItem::GameSettings(settings));
        }
    }

    fn flush_round(&mut self) {
        if let Some(pending) = self.pending_round.take() {
            self.emit(LogItem::RoundStart(pending.build()));
        }
    }

    fn emit(&mut self, item: LogItem) {
        self.close_settings();
        if let LogItem::Action { .. } = item {
            self.flush_round();
        }
        self.items.push(item);
    }
}

fn is_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}
