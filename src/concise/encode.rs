use super::action::{Action, Resources};
use super::coordinate::axial_to_coordinate;
use super::error::CoordinateError;
use super::grammar::DEFAULT_PRIEST_SPACES;
use crate::board::Terrain;

/// Renders an action as the short code [`super::grammar::decode_token`] reads back.
///
/// Leech sources are not written, and an accepted leech only shows its
/// amount when the amount was given explicitly.
pub fn encode_action(action: &Action) -> Result<String, CoordinateError> {
    Ok(match action {
        Action::TransformAndBuild {
            hex,
            target,
            build_dwelling,
            ..
        } => {
            let coordinate = axial_to_coordinate(*hex)?;
            match (target, build_dwelling) {
                (None, true) => coordinate,
                (None, false) => format!("T-{}", coordinate),
                (Some(terrain), true) => {
                    format!("T-{}-{}.{}", coordinate, terrain_code(terrain), coordinate)
                }
                (Some(terrain), false) => format!("T-{}-{}", coordinate, terrain_code(terrain)),
            }
        }
        Action::Upgrade { hex, building, .. } => {
            format!("UP-{}-{}", building.code(), axial_to_coordinate(*hex)?)
        }
        Action::SetupDwelling { hex, .. } => format!("S-{}", axial_to_coordinate(*hex)?),
        Action::Pass { bonus_card, .. } => match bonus_card {
            Some(card) => format!("PASS-{}", card.code()),
            None => "PASS".to_string(),
        },
        Action::SendPriest { track, spaces, .. } => {
            if *spaces == DEFAULT_PRIEST_SPACES {
                format!("->{}", track.code())
            } else {
                format!("->{}{}", track.code(), spaces)
            }
        }
        Action::AdvanceShipping { .. } => "+SHIP".to_string(),
        Action::AdvanceDigging { .. } => "+DIG".to_string(),
        Action::AcceptLeech {
            amount,
            explicit_amount,
            ..
        } => {
            if *explicit_amount {
                format!("L{}", amount)
            } else {
                "L".to_string()
            }
        }
        Action::DeclineLeech { .. } => "DL".to_string(),
        Action::Burn { amount, .. } => format!("BURN{}", amount),
        Action::Favor { tile, .. } => tile.code(),
        Action::PowerAction { code, .. } | Action::Special { code, .. } => code.clone(),
        Action::Conversion { cost, reward, .. } => {
            format!("C{}:{}", encode_resources(cost), encode_resources(reward))
        }
        Action::Town { vp, .. } => format!("TW{}VP", vp),
        Action::CultAdvance { track, .. } => format!("+{}", track.code()),
        Action::CultDecrease { track, .. } => format!("-{}", track.code()),
        Action::SelectBonus { card, .. } => card.code().to_string(),
        Action::DigTransform { spades, hex, .. } => {
            format!("DIG{}-{}", spades, axial_to_coordinate(*hex)?)
        }
        // `^` marks a single piece, so a wrapped compound marks each of its pieces
        Action::PostIncome { action } => match action.as_ref() {
            Action::Compound { actions } => actions
                .iter()
                .map(|piece| {
                    encode_action(&Action::PostIncome {
                        action: Box::new(piece.clone()),
                    })
                })
                .collect::<Result<Vec<String>, CoordinateError>>()?
                .join("."),
            inner => format!("^{}", encode_action(inner)?),
        },
        Action::MultiSpade { targets, .. } => {
            let mut parts = Vec::with_capacity(targets.len());
            for (hex, terrain) in targets {
                let coordinate = axial_to_coordinate(*hex)?;
                parts.push(match terrain {
                    Some(terrain) => format!("{}/{}", coordinate, terrain_code(terrain)),
                    None => coordinate,
                });
            }
            format!("SPADES-{}", parts.join("-"))
        }
        Action::Compound { actions } => actions
            .iter()
            .map(encode_action)
            .collect::<Result<Vec<String>, CoordinateError>>()?
            .join("."),
    })
}

fn terrain_code(terrain: &Terrain) -> &'static str {
    terrain.code().unwrap_or("?")
}

fn encode_resources(resources: &Resources) -> String {
    resources
        .iter()
        .filter(|(_, amount)| **amount > 0)
        .map(|(resource, amount)| format!("{}{}", amount, resource.code()))
        .collect()
}
