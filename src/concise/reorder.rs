//! Moves leech responses next to the build that caused them.
//!
//! Works on one block of rows at a time (everything between two round or
//! settings boundaries). The pass only ever changes the order of cells.
use std::collections::HashMap;

use super::players::{normalize_player, same_player};

/// One non-empty cell of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridEvent<T> {
    pub column: usize,
    pub player: String,
    pub token: String,
    /// Leech accept or decline
    pub is_reaction: bool,
    /// For reactions, whose action opened the leech
    pub source: Option<String>,
    /// Whether this cell could have opened a leech window
    pub may_trigger: bool,
    pub payload: T,
}

pub type Row<T> = Vec<Option<GridEvent<T>>>;

/// Reorders a block if any reaction names its source, otherwise returns it untouched
pub fn reorder_block<T>(rows: Vec<Row<T>>, width: usize) -> Vec<Row<T>> {
    let sourced = rows
        .iter()
        .flatten()
        .flatten()
        .any(|event| event.is_reaction && event.source.is_some());
    if !sourced {
        return rows;
    }
    rebuild_rows(anchor_reactions(flatten_rows(rows)), width)
}

pub fn flatten_rows<T>(rows: Vec<Row<T>>) -> Vec<GridEvent<T>> {
    rows.into_iter().flatten().flatten().collect()
}

/// Upper bound on moves for a block of `event_count` cells
pub fn iteration_limit(event_count: usize) -> usize {
    4 * event_count + 16
}

/// Moves one misplaced reaction per pass until a pass finds nothing to move
/// or the iteration limit is reached.
pub fn anchor_reactions<T>(mut events: Vec<GridEvent<T>>) -> Vec<GridEvent<T>> {
    let limit = iteration_limit(events.len());
    for pass in 0..limit {
        let Some((from, anchor)) = find_move(&events) else {
            log::trace!("Leech anchoring settled after {} passes", pass);
            return events;
        };
        let event = events.remove(from);
        let to = if from < anchor { anchor } else { anchor + 1 };
        log::debug!(
            "Moving {} {:?} from {} to after {} {:?}",
            event.player,
            event.token,
            from,
            events[to - 1].player,
            events[to - 1].token
        );
        events.insert(to, event);
    }
    log::warn!(
        "Leech anchoring stopped after {} passes with reactions still out of place",
        limit
    );
    events
}

/// First reaction in the current order that is not sitting after its anchor
fn find_move<T>(events: &[GridEvent<T>]) -> Option<(usize, usize)> {
    let mut assigned: HashMap<String, usize> = HashMap::new();
    for (index, event) in events.iter().enumerate() {
        if !event.is_reaction {
            continue;
        }
        let Some(source) = event.source.as_deref() else {
            continue;
        };
        let Some(mut anchor) = find_anchor(events, index, source) else {
            log::debug!(
                "No action by {} can explain {} {:?}",
                source,
                event.player,
                event.token
            );
            continue;
        };
        let reactor = normalize_player(&event.player);
        if assigned.get(&reactor) == Some(&anchor) {
            if let Some(later) = next_trigger(events, anchor, source) {
                anchor = later;
            }
        }
        assigned.insert(reactor, anchor);
        if previous_action(events, index) != Some(anchor) {
            return Some((index, anchor));
        }
    }
    None
}

fn is_trigger_by<T>(event: &GridEvent<T>, source: &str) -> bool {
    !event.is_reaction && event.may_trigger && same_player(&event.player, source)
}

/// Nearest trigger by `source` before `index`, else the nearest after it
fn find_anchor<T>(events: &[GridEvent<T>], index: usize, source: &str) -> Option<usize> {
    (0..index)
        .rev()
        .find(|candidate| is_trigger_by(&events[*candidate], source))
        .or_else(|| next_trigger(events, index, source))
}

fn next_trigger<T>(events: &[GridEvent<T>], after: usize, source: &str) -> Option<usize> {
    (after + 1..events.len()).find(|candidate| is_trigger_by(&events[*candidate], source))
}

/// Nearest non-reaction before `index`
fn previous_action<T>(events: &[GridEvent<T>], index: usize) -> Option<usize> {
    (0..index).rev().find(|candidate| !events[*candidate].is_reaction)
}

/// Lays events back out left to right, opening a new row whenever an event's
/// column is at or before the last filled column.
pub fn rebuild_rows<T>(events: Vec<GridEvent<T>>, width: usize) -> Vec<Row<T>> {
    let width = events
        .iter()
        .map(|event| event.column + 1)
        .max()
        .unwrap_or(0)
        .max(width)
        .max(1);
    let mut rows: Vec<Row<T>> = Vec::new();
    let mut position = 0;
    for event in events {
        while position % width != event.column {
            position += 1;
        }
        let row = position / width;
        while rows.len() <= row {
            rows.push((0..width).map(|_| None).collect());
        }
        let column = event.column;
        rows[row][column] = Some(event);
        position += 1;
    }
    rows.retain(|row| row.iter().any(Option::is_some));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(column: usize, player: &str, token: &str, may_trigger: bool) -> GridEvent<()> {
        GridEvent {
            column,
            player: player.into(),
            token: token.into(),
            is_reaction: false,
            source: None,
            may_trigger,
            payload: (),
        }
    }

    fn leech(column: usize, player: &str, source: Option<&str>) -> GridEvent<()> {
        GridEvent {
            column,
            player: player.into(),
            token: "L".into(),
            is_reaction: true,
            source: source.map(String::from),
            may_trigger: false,
            payload: (),
        }
    }

    fn tokens(events: &[GridEvent<()>]) -> Vec<String> {
        events
            .iter()
            .map(|event| format!("{}:{}", event.player, event.token))
            .collect()
    }

    #[test]
    fn test_reaction_moves_back_to_its_trigger() {
        let events = vec![
            action(0, "Witches", "E5", true),
            action(1, "Nomads", "BURN1.ACT6", false),
            leech(2, "Giants", Some("Witches")),
        ];
        let anchored = anchor_reactions(events);
        assert_eq!(
            tokens(&anchored),
            vec!["Witches:E5", "Giants:L", "Nomads:BURN1.ACT6"]
        );
    }

    #[test]
    fn test_reaction_before_trigger_moves_forward() {
        let events = vec![
            leech(1, "Nomads", Some("Witches")),
            action(2, "Giants", "PASS", false),
            action(0, "Witches", "UP-TH-E5", true),
        ];
        let anchored = anchor_reactions(events);
        assert_eq!(
            tokens(&anchored),
            vec!["Giants:PASS", "Witches:UP-TH-E5", "Nomads:L"]
        );
    }

    #[test]
    fn test_passes_do_not_anchor() {
        let events = vec![
            action(0, "Witches", "E5", true),
            action(1, "Nomads", "ACT6", false),
            action(0, "Witches", "PASS", false),
            leech(1, "Nomads", Some("Witches")),
        ];
        let anchored = anchor_reactions(events);
        assert_eq!(
            tokens(&anchored),
            vec!["Witches:E5", "Nomads:L", "Nomads:ACT6", "Witches:PASS"]
        );
    }

    #[test]
    fn test_two_reactors_share_one_trigger() {
        let events = vec![
            action(0, "Witches", "E5", true),
            action(1, "Nomads", "ACT6", false),
            action(2, "Giants", "ACT5", false),
            leech(1, "Nomads", Some("Witches")),
            leech(2, "Giants", Some("Witches")),
        ];
        let anchored = anchor_reactions(events);
        assert_eq!(
            tokens(&anchored),
            vec!["Witches:E5", "Giants:L", "Nomads:L", "Nomads:ACT6", "Giants:ACT5"]
        );
        assert_eq!(tokens(&anchor_reactions(anchored.clone())), tokens(&anchored));
    }

    #[test]
    fn test_same_reactor_advances_to_next_trigger() {
        let events = vec![
            action(0, "Witches", "E5", true),
            leech(1, "Nomads", Some("Witches")),
            leech(1, "Nomads", Some("Witches")),
            action(0, "Witches", "E6", true),
        ];
        let anchored = anchor_reactions(events);
        assert_eq!(
            tokens(&anchored),
            vec!["Witches:E5", "Nomads:L", "Witches:E6", "Nomads:L"]
        );
    }

    #[test]
    fn test_three_reactions_spread_over_three_triggers() {
        let events = vec![
            action(0, "Witches", "E5", true),
            leech(1, "Nomads", Some("Witches")),
            leech(1, "Nomads", Some("Witches")),
            leech(1, "Nomads", Some("Witches")),
            action(2, "Giants", "+F", false),
            action(0, "Witches", "E6", true),
            action(2, "Giants", "+W", false),
            action(0, "Witches", "E7", true),
        ];
        let anchored = anchor_reactions(events);
        assert_eq!(
            tokens(&anchored),
            vec![
                "Witches:E5",
                "Nomads:L",
                "Giants:+F",
                "Witches:E6",
                "Nomads:L",
                "Giants:+W",
                "Witches:E7",
                "Nomads:L"
            ]
        );
        assert_eq!(anchor_reactions(anchored.clone()), anchored);
    }

    #[test]
    fn test_unknown_source_is_left_alone() {
        let events = vec![
            action(0, "Witches", "E5", true),
            action(1, "Nomads", "ACT6", false),
            leech(2, "Giants", Some("Darklings")),
        ];
        assert_eq!(tokens(&anchor_reactions(events.clone())), tokens(&events));
    }

    #[test]
    fn test_rebuild_rows_walks_columns() {
        let events = vec![
            action(1, "Nomads", "A", false),
            action(2, "Giants", "B", false),
            action(0, "Witches", "C", false),
            action(0, "Witches", "D", false),
            action(2, "Giants", "E", false),
        ];
        let rows = rebuild_rows(events, 3);
        let layout: Vec<Vec<Option<String>>> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map(|event| event.token.clone()))
                    .collect()
            })
            .collect();
        assert_eq!(
            layout,
            vec![
                vec![None, Some("A".into()), Some("B".into())],
                vec![Some("C".into()), None, None],
                vec![Some("D".into()), None, Some("E".into())],
            ]
        );
    }

    #[test]
    fn test_block_without_sources_is_untouched() {
        let rows = vec![vec![None, Some(leech(1, "Nomads", None))], vec![Some(action(0, "Witches", "E5", true)), None]];
        assert_eq!(reorder_block(rows.clone(), 2), rows);
    }

    #[test]
    fn test_reorder_is_a_permutation() {
        let rows = vec![
            vec![Some(action(0, "Witches", "E5", true)), Some(action(1, "Nomads", "ACT6", false)), None],
            vec![None, None, Some(leech(2, "Giants", Some("Witches")))],
        ];
        let before = tokens(&flatten_rows(rows.clone()));
        let after = tokens(&flatten_rows(reorder_block(rows, 3)));
        let mut sorted_before = before.clone();
        let mut sorted_after = after.clone();
        sorted_before.sort();
        sorted_after.sort();
        assert_eq!(sorted_before, sorted_after);
        assert_ne!(before, after);
    }
}
