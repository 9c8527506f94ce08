//! Decoding of single grid cells into actions.
//!
//! Dispatch is by prefix and the first matching family wins, so the order of
//! the checks in [`decode_piece`] matters: `->` before `-`, `SPADES-` before
//! `S-`, the `ACT-xxx` specials before the generic `ACT` power actions, and
//! the bare coordinate fallback last.
use regex::Regex;
use std::sync::LazyLock;

use super::action::{Action, BonusCard, Building, CultTrack, FavorTile, Resource, Resources};
use super::coordinate::{coordinate_to_axial, looks_like_coordinate, river_coordinate_to_axial};
use super::error::TokenError;
use crate::board::{Hex, Terrain};

/// Default number of spaces a priest climbs when the token has no number
pub const DEFAULT_PRIEST_SPACES: u8 = 3;

/// VP values printed on town tiles
pub const TOWN_TILE_VPS: [u32; 8] = [2, 4, 5, 6, 7, 8, 9, 11];

static LEECH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^L(\d+)?(?:-(.+))?$").expect("leech pattern"));
static CONVERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^C((?:\d+[A-Z]{1,2})+):((?:\d+[A-Z]{1,2})+)$").expect("conversion pattern")
});
static RESOURCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)([A-Z]{1,2})").expect("resource pattern"));
static TOWN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TW(\d+)VP$").expect("town pattern"));
static DIG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^DIG(\d+)-(.+)$").expect("dig pattern"));
static AXIAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d+)_(-?\d+)$").expect("axial pattern"));

/// Decodes one cell (possibly a `.`-chained compound) for `player`.
///
/// # Errors
///
/// Fails with the first problem found. Pieces of a compound report through
/// [`TokenError::CompoundSubError`].
pub fn decode_token(player: &str, token: &str) -> Result<Action, TokenError> {
    let token = token.trim();
    if token.contains('.') {
        return decode_compound(player, token);
    }
    let action = decode_piece(player, token)?;
    if action.is_conversion() {
        return Err(TokenError::StandaloneConversion(token.to_string()));
    }
    Ok(action)
}

/// Pieces of a compound after the merge pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Plain(&'a str),
    /// A transform token whose bare build token was found later in the cell
    TransformAndBuild(&'a str),
    /// A spade special immediately followed by a build on the same hex
    SpecialWithBuild(&'a str, &'a str),
}

fn decode_compound(player: &str, token: &str) -> Result<Action, TokenError> {
    let raw: Vec<&str> = token
        .split('.')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect();
    let pieces = merge_transform_builds(merge_special_builds(&raw));

    let mut actions = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let action = match piece {
            Piece::Plain(text) => decode_piece(player, text),
            Piece::TransformAndBuild(text) => decode_transform(player, text, true),
            Piece::SpecialWithBuild(special, build) => decode_special(player, special).map(|_| {
                Action::Special {
                    player: player.to_string(),
                    code: format!("{}.{}", special, build).to_ascii_uppercase(),
                }
            }),
        }
        .map_err(|error| TokenError::CompoundSubError(Box::new(error)))?;
        actions.push(action);
    }

    match actions.len() {
        0 => Err(TokenError::UnknownCode(token.to_string())),
        1 => match actions.pop() {
            Some(action) if action.is_conversion() => {
                Err(TokenError::StandaloneConversion(token.to_string()))
            }
            Some(action) => Ok(action),
            None => Err(TokenError::UnknownCode(token.to_string())),
        },
        _ => Ok(Action::Compound { actions }),
    }
}

/// `ACTS-G2.G2` and `ACT-SH-T-F4.F4` describe one move; only merged when adjacent
fn merge_special_builds<'a>(raw: &[&'a str]) -> Vec<Piece<'a>> {
    let mut pieces = Vec::with_capacity(raw.len());
    let mut index = 0;
    while index < raw.len() {
        let current = raw[index];
        if let (Some(hex), Some(next)) = (spade_special_hex(current), raw.get(index + 1)) {
            if next.eq_ignore_ascii_case(hex) {
                pieces.push(Piece::SpecialWithBuild(current, *next));
                index += 2;
                continue;
            }
        }
        pieces.push(Piece::Plain(current));
        index += 1;
    }
    pieces
}

fn spade_special_hex(piece: &str) -> Option<&str> {
    let upper = piece.to_ascii_uppercase();
    let segments: Vec<&str> = piece.split('-').collect();
    if upper.starts_with("ACTS-") && (2..=3).contains(&segments.len()) {
        Some(segments[1])
    } else if upper.starts_with("ACT-SH-T-") && segments.len() == 4 {
        Some(segments[3])
    } else {
        None
    }
}

/// A transform token and a later bare build on the same hex become one action.
/// Everything in between keeps its place.
fn merge_transform_builds(mut pieces: Vec<Piece<'_>>) -> Vec<Piece<'_>> {
    let mut index = 0;
    while index < pieces.len() {
        if let Piece::Plain(text) = pieces[index] {
            if let Some(hex) = transform_hex(text) {
                let build = pieces[index + 1..].iter().position(|later| {
                    matches!(later, Piece::Plain(other)
                        if looks_like_coordinate(other) && other.eq_ignore_ascii_case(hex))
                });
                if let Some(offset) = build {
                    pieces.remove(index + 1 + offset);
                    pieces[index] = Piece::TransformAndBuild(text);
                }
            }
        }
        index += 1;
    }
    pieces
}

fn transform_hex(piece: &str) -> Option<&str> {
    let segments: Vec<&str> = piece.split('-').collect();
    if segments[0].eq_ignore_ascii_case("T") && (2..=3).contains(&segments.len()) {
        Some(segments[1])
    } else {
        None
    }
}

/// Decodes one piece with no `.` in it. Conversions are accepted here; the
/// caller decides whether they stand alone.
fn decode_piece(player: &str, piece: &str) -> Result<Action, TokenError> {
    let upper = piece.to_ascii_uppercase();
    let owned = || player.to_string();

    if let Some(inner) = piece.strip_prefix('^') {
        if inner.is_empty() {
            return Err(TokenError::UnknownCode(piece.to_string()));
        }
        return Ok(Action::PostIncome {
            action: Box::new(decode_piece(player, inner)?),
        });
    }

    if upper == "PASS" {
        return Ok(Action::Pass {
            player: owned(),
            bonus_card: None,
        });
    }
    if let Some(card) = upper.strip_prefix("PASS-") {
        return match BonusCard::from_code(card) {
            Some(card) => Ok(Action::Pass {
                player: owned(),
                bonus_card: Some(card),
            }),
            None => Err(TokenError::UnknownCode(piece.to_string())),
        };
    }
    if upper.starts_with("BON-") {
        return match BonusCard::from_code(&upper) {
            Some(card) => Ok(Action::SelectBonus {
                player: owned(),
                card,
            }),
            None => Err(TokenError::UnknownCode(piece.to_string())),
        };
    }

    if let Some(advance) = upper.strip_prefix('+') {
        return match advance {
            "SHIP" => Ok(Action::AdvanceShipping { player: owned() }),
            "DIG" => Ok(Action::AdvanceDigging { player: owned() }),
            track => match CultTrack::from_code(track) {
                Some(track) => Ok(Action::CultAdvance {
                    player: owned(),
                    track,
                }),
                None => Err(TokenError::UnknownCode(piece.to_string())),
            },
        };
    }
    if let Some(priest) = upper.strip_prefix("->") {
        return decode_send_priest(player, piece, priest);
    }
    if let Some(track) = upper.strip_prefix('-') {
        return match CultTrack::from_code(track) {
            Some(track) => Ok(Action::CultDecrease {
                player: owned(),
                track,
            }),
            None => Err(TokenError::UnknownCode(piece.to_string())),
        };
    }

    if upper == "DL" || upper.starts_with("DL-") {
        return Ok(Action::DeclineLeech {
            player: owned(),
            from_player: piece.get(3..).map(str::trim).filter(|s| !s.is_empty()).map(String::from),
        });
    }
    if let Some(captures) = LEECH_PATTERN.captures(piece) {
        let explicit = captures.get(1);
        let amount = match explicit {
            Some(digits) => digits
                .as_str()
                .parse()
                .map_err(|_| TokenError::malformed(piece, "leech amount is too large"))?,
            None => 1,
        };
        return Ok(Action::AcceptLeech {
            player: owned(),
            from_player: captures.get(2).map(|source| source.as_str().trim().to_string()),
            amount,
            vp_cost: amount.saturating_sub(1),
            explicit_amount: explicit.is_some(),
        });
    }

    if let Some(amount) = upper.strip_prefix("BURN") {
        return Ok(Action::Burn {
            player: owned(),
            amount: parse_count(piece, amount, "burn amount")?,
        });
    }
    if let Some(favor) = upper.strip_prefix("FAV-") {
        return decode_favor(player, piece, favor);
    }

    if is_special(&upper) {
        return decode_special(player, piece);
    }
    if upper.starts_with("ACT-") {
        return Err(TokenError::UnknownCode(piece.to_string()));
    }
    if upper.starts_with("ACT") {
        return decode_power_action(player, piece, &upper);
    }

    if let Some(captures) = CONVERSION_PATTERN.captures(&upper) {
        return Ok(Action::Conversion {
            player: owned(),
            cost: parse_resources(piece, &captures[1])?,
            reward: parse_resources(piece, &captures[2])?,
        });
    }
    if let Some(captures) = TOWN_PATTERN.captures(&upper) {
        let vp = parse_count(piece, &captures[1], "town VP")?;
        if !TOWN_TILE_VPS.contains(&vp) {
            return Err(TokenError::UnknownCode(piece.to_string()));
        }
        return Ok(Action::Town {
            player: owned(),
            vp,
        });
    }

    if upper.starts_with("UP-") {
        let segments: Vec<&str> = upper.split('-').collect();
        if segments.len() != 3 {
            return Err(TokenError::malformed(piece, "upgrade needs UP-<building>-<coordinate>"));
        }
        let building = Building::from_code(segments[1])
            .ok_or_else(|| TokenError::UnknownCode(piece.to_string()))?;
        return Ok(Action::Upgrade {
            player: owned(),
            hex: coordinate_to_axial(segments[2])?,
            building,
        });
    }
    if upper.starts_with("SPADES-") {
        return decode_multi_spade(player, piece, &upper["SPADES-".len()..]);
    }
    if upper.starts_with("S-") {
        let segments: Vec<&str> = upper.split('-').collect();
        if segments.len() != 2 {
            return Err(TokenError::malformed(piece, "setup needs S-<coordinate>"));
        }
        return Ok(Action::SetupDwelling {
            player: owned(),
            hex: coordinate_to_axial(segments[1])?,
        });
    }
    if upper.starts_with("T-") {
        return decode_transform(player, piece, false);
    }
    if let Some(captures) = DIG_PATTERN.captures(&upper) {
        let spades = parse_count(piece, &captures[1], "spade count")?;
        if spades == 0 {
            return Err(TokenError::malformed(piece, "dig needs at least one spade"));
        }
        return Ok(Action::DigTransform {
            player: owned(),
            spades,
            hex: coordinate_to_axial(&captures[2])?,
        });
    }

    if looks_like_coordinate(piece) {
        return Ok(Action::TransformAndBuild {
            player: owned(),
            hex: coordinate_to_axial(piece)?,
            target: None,
            build_dwelling: true,
        });
    }

    Err(TokenError::UnknownCode(piece.to_string()))
}

fn parse_count<T: std::str::FromStr>(piece: &str, digits: &str, what: &str) -> Result<T, TokenError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TokenError::malformed(piece, format!("{} must be a number", what)));
    }
    digits
        .parse()
        .map_err(|_| TokenError::malformed(piece, format!("{} is out of range", what)))
}

/// First character and the rest
fn split_first(text: &str) -> (&str, &str) {
    let boundary = text.chars().next().map_or(0, char::len_utf8);
    text.split_at(boundary)
}

fn parse_terrain(piece: &str, code: &str) -> Result<Terrain, TokenError> {
    Terrain::from_code(code).ok_or_else(|| TokenError::UnknownCode(piece.to_string()))
}

fn decode_send_priest(player: &str, piece: &str, rest: &str) -> Result<Action, TokenError> {
    let (track, spaces) = split_first(rest);
    let track = CultTrack::from_code(track).ok_or_else(|| TokenError::UnknownCode(piece.to_string()))?;
    let spaces = if spaces.is_empty() {
        DEFAULT_PRIEST_SPACES
    } else {
        parse_count(piece, spaces, "priest spaces")?
    };
    if !(1..=3).contains(&spaces) {
        return Err(TokenError::malformed(piece, "a priest climbs 1 to 3 spaces"));
    }
    Ok(Action::SendPriest {
        player: player.to_string(),
        track,
        spaces,
    })
}

fn decode_favor(player: &str, piece: &str, rest: &str) -> Result<Action, TokenError> {
    let (track, steps) = split_first(rest);
    match (CultTrack::from_code(track), steps) {
        (Some(track), "1" | "2" | "3") => Ok(Action::Favor {
            player: player.to_string(),
            tile: FavorTile {
                track,
                steps: parse_count(piece, steps, "favor steps")?,
            },
        }),
        _ => Err(TokenError::UnknownCode(piece.to_string())),
    }
}

fn decode_transform(player: &str, piece: &str, build_dwelling: bool) -> Result<Action, TokenError> {
    let segments: Vec<&str> = piece.split('-').collect();
    if !(2..=3).contains(&segments.len()) {
        return Err(TokenError::malformed(piece, "transform needs T-<coordinate>[-<terrain>]"));
    }
    let target = match segments.get(2) {
        Some(code) => Some(parse_terrain(piece, code)?),
        None => None,
    };
    Ok(Action::TransformAndBuild {
        player: player.to_string(),
        hex: coordinate_to_axial(segments[1])?,
        target,
        build_dwelling,
    })
}

fn decode_multi_spade(player: &str, piece: &str, rest: &str) -> Result<Action, TokenError> {
    let mut targets = Vec::new();
    for target in rest.split('-') {
        let (coordinate, terrain) = match target.split_once('/') {
            Some((coordinate, terrain)) => (coordinate, Some(parse_terrain(piece, terrain)?)),
            None => (target, None),
        };
        if coordinate.is_empty() {
            return Err(TokenError::malformed(piece, "empty spade target"));
        }
        targets.push((coordinate_to_axial(coordinate)?, terrain));
    }
    Ok(Action::MultiSpade {
        player: player.to_string(),
        targets,
    })
}

fn parse_resources(piece: &str, text: &str) -> Result<Resources, TokenError> {
    let mut resources = Resources::new();
    for captures in RESOURCE_PATTERN.captures_iter(text) {
        let amount: u32 = parse_count(piece, &captures[1], "resource amount")?;
        let resource =
            Resource::from_code(&captures[2]).ok_or_else(|| TokenError::UnknownCode(piece.to_string()))?;
        *resources.entry(resource).or_insert(0) += amount;
    }
    Ok(resources)
}

const SPECIAL_PREFIXES: [&str; 7] = ["ACT-SH-", "ACT-FAV", "ACT-BON-", "ACT-TOWN-", "ACT-BR-", "ACTS-", "ORD-"];

fn is_special(upper: &str) -> bool {
    SPECIAL_PREFIXES.iter().any(|prefix| upper.starts_with(prefix))
}

/// Validates a special action code and keeps it verbatim (uppercased)
fn decode_special(player: &str, piece: &str) -> Result<Action, TokenError> {
    let upper = piece.to_ascii_uppercase();
    let segments: Vec<&str> = upper.split('-').collect();
    let unknown = || TokenError::UnknownCode(piece.to_string());

    if upper.starts_with("ACT-SH-") {
        match (segments.get(2).copied(), segments.len()) {
            (Some("D" | "T" | "S" | "TP"), 4) => {
                coordinate_to_axial(segments[3])?;
            }
            (Some("D" | "T" | "S" | "TP"), _) => {
                return Err(TokenError::malformed(piece, "stronghold action needs a coordinate"))
            }
            (Some("2X" | "F" | "W" | "E" | "A"), 3) => {}
            (Some("2X" | "F" | "W" | "E" | "A"), _) => {
                return Err(TokenError::malformed(piece, "stronghold action takes no coordinate"))
            }
            _ => return Err(unknown()),
        }
    } else if upper.starts_with("ACT-FAV") {
        match &segments[..] {
            ["ACT", "FAV"] => {}
            ["ACT", "FAV", track] if CultTrack::from_code(track).is_some() => {}
            _ => return Err(unknown()),
        }
    } else if upper.starts_with("ACT-BON-") {
        match &segments[..] {
            ["ACT", "BON", "SPD"] => {}
            ["ACT", "BON", track] if CultTrack::from_code(track).is_some() => {}
            _ => return Err(unknown()),
        }
    } else if let Some(town) = upper.strip_prefix("ACT-TOWN-") {
        if town.starts_with("R~") {
            river_coordinate_to_axial(town)?;
        } else if looks_like_coordinate(town) {
            coordinate_to_axial(town)?;
        } else if !AXIAL_PATTERN.is_match(town) {
            return Err(TokenError::malformed(piece, "town needs <q>_<r>, R~<coordinate> or a coordinate"));
        }
    } else if upper.starts_with("ACT-BR-") {
        if segments.len() != 4 {
            return Err(TokenError::malformed(piece, "bridge needs two coordinates"));
        }
        coordinate_to_axial(segments[2])?;
        coordinate_to_axial(segments[3])?;
    } else if upper.starts_with("ACTS-") {
        if !(2..=3).contains(&segments.len()) {
            return Err(TokenError::malformed(piece, "spade action needs ACTS-<coordinate>[-<terrain>]"));
        }
        coordinate_to_axial(segments[1])?;
        if let Some(code) = segments.get(2) {
            parse_terrain(piece, code)?;
        }
    } else if let Some(count) = upper.strip_prefix("ORD-") {
        parse_count::<u32>(piece, count, "ordination count")?;
    } else {
        return Err(unknown());
    }

    Ok(Action::Special {
        player: player.to_string(),
        code: upper,
    })
}

/// `ACT1`..`ACT6` and the single-letter faction actions, with optional
/// coordinate arguments (`ACT1-C2-D4` places a bridge)
fn decode_power_action(player: &str, piece: &str, upper: &str) -> Result<Action, TokenError> {
    let mut segments = upper.split('-');
    let code = segments.next().unwrap_or_default();
    let suffix = &code["ACT".len()..];
    if suffix.is_empty() || suffix.len() > 2 || !suffix.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(TokenError::UnknownCode(piece.to_string()));
    }
    for argument in segments {
        coordinate_to_axial(argument)?;
    }
    Ok(Action::PowerAction {
        player: player.to_string(),
        code: upper.to_string(),
    })
}

/// Hex of an `ACT-TOWN-<q>_<r>` code, for callers that need the location
pub fn town_special_hex(code: &str) -> Option<Hex> {
    let rest = code.to_ascii_uppercase();
    let rest = rest.strip_prefix("ACT-TOWN-")?;
    if rest.starts_with("R~") {
        return river_coordinate_to_axial(rest).ok();
    }
    if looks_like_coordinate(rest) {
        return coordinate_to_axial(rest).ok();
    }
    let captures = AXIAL_PATTERN.captures(rest)?;
    Some(Hex::new(captures[1].parse().ok()?, captures[2].parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concise::action::ActionKind;

    fn decode(token: &str) -> Result<Action, TokenError> {
        decode_token("Cultists", token)
    }

    fn compound_len(action: &Action) -> usize {
        match action {
            Action::Compound { actions } => actions.len(),
            _ => 1,
        }
    }

    #[test]
    fn test_special_action_families() {
        for token in ["ACT-BON-E", "ACT-FAV", "ACT-FAV-W", "ACT-TOWN-2_-3", "ACT-BR-C2-D4", "ACT-SH-2X", "ORD-3"] {
            let action = decode(token).unwrap();
            assert_eq!(
                action,
                Action::Special {
                    player: "Cultists".into(),
                    code: token.into()
                },
                "Token {}",
                token
            );
        }
    }

    #[test]
    fn test_unknown_special_is_not_a_power_action() {
        assert_eq!(decode("ACT-XYZ"), Err(TokenError::UnknownCode("ACT-XYZ".into())));
        assert!(matches!(decode("ACT-SH-D"), Err(TokenError::MalformedSegment { .. })));
        assert!(matches!(decode("ACT-SH-2X-C1"), Err(TokenError::MalformedSegment { .. })));
    }

    #[test]
    fn test_power_actions() {
        assert_eq!(
            decode("act6"),
            Ok(Action::PowerAction {
                player: "Cultists".into(),
                code: "ACT6".into()
            })
        );
        assert!(matches!(decode("ACT1-C2-D4"), Ok(Action::PowerAction { .. })));
        assert!(matches!(decode("ACT1-C2-Z4"), Err(TokenError::InvalidCoordinate(_))));
        assert_eq!(decode("ACT"), Err(TokenError::UnknownCode("ACT".into())));
    }

    #[test]
    fn test_upgrade_with_cult_advance() {
        let action = decode("UP-TH-E6.+E").unwrap();
        assert_eq!(compound_len(&action), 2);
        let Action::Compound { actions } = action else {
            panic!("Expected compound");
        };
        assert!(matches!(
            actions[0],
            Action::Upgrade {
                building: Building::TradingHouse,
                ..
            }
        ));
        assert_eq!(
            actions[1],
            Action::CultAdvance {
                player: "Cultists".into(),
                track: CultTrack::Earth
            }
        );
    }

    #[test]
    fn test_cult_decrease_chain() {
        assert_eq!(
            decode("-W"),
            Ok(Action::CultDecrease {
                player: "Cultists".into(),
                track: CultTrack::Water
            })
        );
        assert_eq!(compound_len(&decode("-F.-W.-E.TW8VP").unwrap()), 4);
    }

    #[test]
    fn test_standalone_conversion_rejected() {
        assert_eq!(
            decode("C5PW:1P"),
            Err(TokenError::StandaloneConversion("C5PW:1P".into()))
        );
        let action = decode("BURN3.C5PW:1P.+SHIP").unwrap();
        assert_eq!(compound_len(&action), 3);
        assert_eq!(
            decode("^C1PW:1C"),
            Err(TokenError::StandaloneConversion("^C1PW:1C".into()))
        );
        assert_eq!(compound_len(&decode("^BURN1.^C1PW:1C").unwrap()), 2);
    }

    #[test]
    fn test_conversion_is_order_independent() {
        let Action::Compound { actions } = decode("BURN1.C1C2PW:1W").unwrap() else {
            panic!("Expected compound");
        };
        let Action::Conversion { cost, reward, .. } = &actions[1] else {
            panic!("Expected conversion, got {:?}", actions[1]);
        };
        assert_eq!(cost.get(&Resource::Coin), Some(&1));
        assert_eq!(cost.get(&Resource::Power), Some(&2));
        assert_eq!(reward.get(&Resource::Worker), Some(&1));
    }

    #[test]
    fn test_leech_tokens() {
        assert_eq!(
            decode("L"),
            Ok(Action::AcceptLeech {
                player: "Cultists".into(),
                from_player: None,
                amount: 1,
                vp_cost: 0,
                explicit_amount: false
            })
        );
        assert_eq!(
            decode("L3-Engineers"),
            Ok(Action::AcceptLeech {
                player: "Cultists".into(),
                from_player: Some("Engineers".into()),
                amount: 3,
                vp_cost: 2,
                explicit_amount: true
            })
        );
        assert_eq!(
            decode("dl-Chaos Magicians"),
            Ok(Action::DeclineLeech {
                player: "Cultists".into(),
                from_player: Some("Chaos Magicians".into())
            })
        );
        assert_eq!(
            decode("DL"),
            Ok(Action::DeclineLeech {
                player: "Cultists".into(),
                from_player: None
            })
        );
    }

    #[test]
    fn test_lowercase_tokens() {
        assert!(matches!(decode("up-sh-e6"), Ok(Action::Upgrade { .. })));
        assert!(matches!(decode("pass-bon-bb"), Ok(Action::Pass { .. })));
        assert!(matches!(decode("->a2"), Ok(Action::SendPriest { spaces: 2, .. })));
        assert!(matches!(decode("burn2"), Ok(Action::Burn { amount: 2, .. })));
    }

    #[test]
    fn test_pass_with_cult_advance() {
        let Action::Compound { actions } = decode("PASS-BON-BB.+A").unwrap() else {
            panic!("Expected compound");
        };
        assert_eq!(
            actions[0],
            Action::Pass {
                player: "Cultists".into(),
                bonus_card: Some(BonusCard::StrongholdSanctuaryVp)
            }
        );
        assert!(matches!(decode("PASS-BON-XX"), Err(TokenError::UnknownCode(_))));
    }

    #[test]
    fn test_spade_special_merges_with_adjacent_build() {
        assert_eq!(
            decode("ACTS-G2.G2"),
            Ok(Action::Special {
                player: "Cultists".into(),
                code: "ACTS-G2.G2".into()
            })
        );
        assert_eq!(
            decode("ACT-SH-T-F4.F4"),
            Ok(Action::Special {
                player: "Cultists".into(),
                code: "ACT-SH-T-F4.F4".into()
            })
        );
        assert_eq!(compound_len(&decode("ACTS-B5.B5.C1PW:1C").unwrap()), 2);
        // Only adjacent builds merge into the special
        assert_eq!(compound_len(&decode("ACTS-E3.C2PW:2C.E3").unwrap()), 3);
    }

    #[test]
    fn test_transform_merges_with_later_build() {
        let merged = decode("T-A7.A7").unwrap();
        assert_eq!(
            merged,
            Action::TransformAndBuild {
                player: "Cultists".into(),
                hex: Hex::new(6, 0),
                target: None,
                build_dwelling: true
            }
        );
        let Action::Compound { actions } = decode("T-A7-Y.ACT6.A7").unwrap() else {
            panic!("Expected compound");
        };
        assert_eq!(actions.len(), 2);
        assert_eq!(
            actions[0],
            Action::TransformAndBuild {
                player: "Cultists".into(),
                hex: Hex::new(6, 0),
                target: Some(Terrain::Desert),
                build_dwelling: true
            }
        );
        assert_eq!(actions[1].kind(), ActionKind::PowerAction);
    }

    #[test]
    fn test_transform_without_build() {
        assert_eq!(
            decode("T-A7-gy"),
            Ok(Action::TransformAndBuild {
                player: "Cultists".into(),
                hex: Hex::new(6, 0),
                target: Some(Terrain::Mountain),
                build_dwelling: false
            })
        );
        assert!(matches!(decode("T-A7-Y-X"), Err(TokenError::MalformedSegment { .. })));
        assert!(matches!(decode("T-A7-Q"), Err(TokenError::UnknownCode(_))));
    }

    #[test]
    fn test_upgrade_segment_count() {
        assert!(matches!(decode("UP-TH"), Err(TokenError::MalformedSegment { .. })));
        assert!(matches!(decode("UP-TH-E6-X"), Err(TokenError::MalformedSegment { .. })));
        assert!(matches!(decode("UP-XX-E6"), Err(TokenError::UnknownCode(_))));
    }

    #[test]
    fn test_invalid_coordinate_propagates() {
        assert!(matches!(decode("UP-TH-J6"), Err(TokenError::InvalidCoordinate(_))));
        assert!(matches!(decode("C10"), Err(TokenError::InvalidCoordinate(_))));
        let error = decode("BURN1.S-Z9").unwrap_err();
        assert!(matches!(error, TokenError::CompoundSubError(_)));
        assert!(matches!(error.root(), TokenError::InvalidCoordinate(_)));
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(decode("BADTOKEN"), Err(TokenError::UnknownCode("BADTOKEN".into())));
        assert_eq!(decode("TW3VP"), Err(TokenError::UnknownCode("TW3VP".into())));
        assert_eq!(decode("FAV-F4"), Err(TokenError::UnknownCode("FAV-F4".into())));
        assert!(matches!(decode("->F4"), Err(TokenError::MalformedSegment { .. })));
    }

    #[test]
    fn test_notation_only_markers() {
        assert_eq!(
            decode("DIG2-E5"),
            Ok(Action::DigTransform {
                player: "Cultists".into(),
                spades: 2,
                hex: Hex::new(2, 4)
            })
        );
        assert_eq!(
            decode("SPADES-E5-A1/Y"),
            Ok(Action::MultiSpade {
                player: "Cultists".into(),
                targets: vec![(Hex::new(2, 4), None), (Hex::new(0, 0), Some(Terrain::Desert))]
            })
        );
        assert_eq!(
            decode("^ACT3"),
            Ok(Action::PostIncome {
                action: Box::new(Action::PowerAction {
                    player: "Cultists".into(),
                    code: "ACT3".into()
                })
            })
        );
    }

    #[test]
    fn test_priest_default_spaces() {
        assert_eq!(
            decode("->F"),
            Ok(Action::SendPriest {
                player: "Cultists".into(),
                track: CultTrack::Fire,
                spaces: DEFAULT_PRIEST_SPACES
            })
        );
    }

    #[test]
    fn test_town_special_hex() {
        assert_eq!(town_special_hex("ACT-TOWN-2_-3"), Some(Hex::new(2, -3)));
        assert_eq!(town_special_hex("ACT-TOWN-E5"), Some(Hex::new(2, 4)));
        assert_eq!(town_special_hex("ACT6"), None);
    }
}
