use serde::Serialize;
use std::collections::BTreeMap;

use crate::board::{Hex, Terrain};

pub type PlayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Building {
    Dwelling,
    TradingHouse,
    Temple,
    Sanctuary,
    Stronghold,
}

impl Building {
    pub fn code(&self) -> &'static str {
        match self {
            Building::Dwelling => "D",
            Building::TradingHouse => "TH",
            Building::Temple => "TE",
            Building::Sanctuary => "SA",
            Building::Stronghold => "SH",
        }
    }

    /// Accepts `TP` as an older spelling of the trading house
    pub fn from_code(code: &str) -> Option<Building> {
        match code {
            "D" => Some(Building::Dwelling),
            "TH" | "TP" => Some(Building::TradingHouse),
            "TE" => Some(Building::Temple),
            "SA" => Some(Building::Sanctuary),
            "SH" => Some(Building::Stronghold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CultTrack {
    Fire,
    Water,
    Earth,
    Air,
}

impl CultTrack {
    pub const ALL: [CultTrack; 4] = [CultTrack::Fire, CultTrack::Water, CultTrack::Earth, CultTrack::Air];

    pub fn code(&self) -> &'static str {
        match self {
            CultTrack::Fire => "F",
            CultTrack::Water => "W",
            CultTrack::Earth => "E",
            CultTrack::Air => "A",
        }
    }

    pub fn from_code(code: &str) -> Option<CultTrack> {
        match code {
            "F" => Some(CultTrack::Fire),
            "W" => Some(CultTrack::Water),
            "E" => Some(CultTrack::Earth),
            "A" => Some(CultTrack::Air),
            _ => None,
        }
    }
}

/// Declaration order is the order conversions are written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Resource {
    Priest,
    Worker,
    Power,
    VictoryPoint,
    Coin,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Priest,
        Resource::Worker,
        Resource::Power,
        Resource::VictoryPoint,
        Resource::Coin,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Resource::Priest => "P",
            Resource::Worker => "W",
            Resource::Power => "PW",
            Resource::VictoryPoint => "VP",
            Resource::Coin => "C",
        }
    }

    pub fn from_code(code: &str) -> Option<Resource> {
        Resource::ALL.into_iter().find(|resource| resource.code() == code)
    }
}

pub type Resources = BTreeMap<Resource, u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BonusCard {
    Spade,
    CultAdvance,
    SixCoins,
    Shipping,
    WorkerPower,
    TradingHouseVp,
    StrongholdSanctuaryVp,
    Priest,
    DwellingVp,
    ShippingVp,
}

impl BonusCard {
    pub const ALL: [BonusCard; 10] = [
        BonusCard::Spade,
        BonusCard::CultAdvance,
        BonusCard::SixCoins,
        BonusCard::Shipping,
        BonusCard::WorkerPower,
        BonusCard::TradingHouseVp,
        BonusCard::StrongholdSanctuaryVp,
        BonusCard::Priest,
        BonusCard::DwellingVp,
        BonusCard::ShippingVp,
    ];

    /// Full code including the `BON-` prefix
    pub fn code(&self) -> &'static str {
        match self {
            BonusCard::Spade => "BON-SPD",
            BonusCard::CultAdvance => "BON-4C",
            BonusCard::SixCoins => "BON-6C",
            BonusCard::Shipping => "BON-SHIP",
            BonusCard::WorkerPower => "BON-WP",
            BonusCard::TradingHouseVp => "BON-TP",
            BonusCard::StrongholdSanctuaryVp => "BON-BB",
            BonusCard::Priest => "BON-P",
            BonusCard::DwellingVp => "BON-DW",
            BonusCard::ShippingVp => "BON-SHIP-VP",
        }
    }

    pub fn from_code(code: &str) -> Option<BonusCard> {
        BonusCard::ALL.into_iter().find(|card| card.code() == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FavorTile {
    pub track: CultTrack,
    pub steps: u8,
}

impl FavorTile {
    pub fn code(&self) -> String {
        format!("FAV-{}{}", self.track.code(), self.steps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionKind {
    TransformAndBuild,
    Upgrade,
    SetupDwelling,
    Pass,
    SendPriest,
    AdvanceShipping,
    AdvanceDigging,
    AcceptLeech,
    DeclineLeech,
    Burn,
    FavorTile,
    PowerAction,
    Special,
    Conversion,
    Town,
    CultAdvance,
    CultDecrease,
    BonusCard,
    DigTransform,
    PostIncome,
    MultiSpade,
    Compound,
}

/// One entry of a game history.
///
/// The first group mirrors moves the game engine executes; the rest only
/// exist in the notation and are carried through as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Transform `hex` (to `target`, or the home terrain when `None`), optionally
    /// building a dwelling on it
    TransformAndBuild {
        player: PlayerId,
        hex: Hex,
        target: Option<Terrain>,
        build_dwelling: bool,
    },
    Upgrade {
        player: PlayerId,
        hex: Hex,
        building: Building,
    },
    SetupDwelling {
        player: PlayerId,
        hex: Hex,
    },
    Pass {
        player: PlayerId,
        bonus_card: Option<BonusCard>,
    },
    SendPriest {
        player: PlayerId,
        track: CultTrack,
        spaces: u8,
    },
    AdvanceShipping {
        player: PlayerId,
    },
    AdvanceDigging {
        player: PlayerId,
    },
    /// `from_player` is whose build opened the leech; it never shows in the grid
    AcceptLeech {
        player: PlayerId,
        from_player: Option<PlayerId>,
        amount: u32,
        vp_cost: u32,
        explicit_amount: bool,
    },
    DeclineLeech {
        player: PlayerId,
        from_player: Option<PlayerId>,
    },
    Burn {
        player: PlayerId,
        amount: u32,
    },
    Favor {
        player: PlayerId,
        tile: FavorTile,
    },
    PowerAction {
        player: PlayerId,
        code: String,
    },
    Special {
        player: PlayerId,
        code: String,
    },
    Conversion {
        player: PlayerId,
        cost: Resources,
        reward: Resources,
    },
    Town {
        player: PlayerId,
        vp: u32,
    },
    CultAdvance {
        player: PlayerId,
        track: CultTrack,
    },
    CultDecrease {
        player: PlayerId,
        track: CultTrack,
    },
    SelectBonus {
        player: PlayerId,
        card: BonusCard,
    },
    /// Marks where a dig happened relative to other effects of the turn
    DigTransform {
        player: PlayerId,
        spades: u8,
        hex: Hex,
    },
    /// An action taken after income was paid out
    PostIncome {
        action: Box<Action>,
    },
    /// Several spades spent across hexes at once
    MultiSpade {
        player: PlayerId,
        targets: Vec<(Hex, Option<Terrain>)>,
    },
    Compound {
        actions: Vec<Action>,
    },
}

impl Action {
    pub fn player_id(&self) -> &str {
        match self {
            Action::TransformAndBuild { player, .. }
            | Action::Upgrade { player, .. }
            | Action::SetupDwelling { player, .. }
            | Action::Pass { player, .. }
            | Action::SendPriest { player, .. }
            | Action::AdvanceShipping { player }
            | Action::AdvanceDigging { player }
            | Action::AcceptLeech { player, .. }
            | Action::DeclineLeech { player, .. }
            | Action::Burn { player, .. }
            | Action::Favor { player, .. }
            | Action::PowerAction { player, .. }
            | Action::Special { player, .. }
            | Action::Conversion { player, .. }
            | Action::Town { player, .. }
            | Action::CultAdvance { player, .. }
            | Action::CultDecrease { player, .. }
            | Action::SelectBonus { player, .. }
            | Action::DigTransform { player, .. }
            | Action::MultiSpade { player, .. } => player,
            Action::PostIncome { action } => action.player_id(),
            Action::Compound { actions } => actions.first().map_or("", |first| first.player_id()),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::TransformAndBuild { .. } => ActionKind::TransformAndBuild,
            Action::Upgrade { .. } => ActionKind::Upgrade,
            Action::SetupDwelling { .. } => ActionKind::SetupDwelling,
            Action::Pass { .. } => ActionKind::Pass,
            Action::SendPriest { .. } => ActionKind::SendPriest,
            Action::AdvanceShipping { .. } => ActionKind::AdvanceShipping,
            Action::AdvanceDigging { .. } => ActionKind::AdvanceDigging,
            Action::AcceptLeech { .. } => ActionKind::AcceptLeech,
            Action::DeclineLeech { .. } => ActionKind::DeclineLeech,
            Action::Burn { .. } => ActionKind::Burn,
            Action::Favor { .. } => ActionKind::FavorTile,
            Action::PowerAction { .. } => ActionKind::PowerAction,
            Action::Special { .. } => ActionKind::Special,
            Action::Conversion { .. } => ActionKind::Conversion,
            Action::Town { .. } => ActionKind::Town,
            Action::CultAdvance { .. } => ActionKind::CultAdvance,
            Action::CultDecrease { .. } => ActionKind::CultDecrease,
            Action::SelectBonus { .. } => ActionKind::BonusCard,
            Action::DigTransform { .. } => ActionKind::DigTransform,
            Action::PostIncome { .. } => ActionKind::PostIncome,
            Action::MultiSpade { .. } => ActionKind::MultiSpade,
            Action::Compound { .. } => ActionKind::Compound,
        }
    }

    /// Accepting or declining a leech. These always get a cell of their own.
    pub fn is_leech_response(&self) -> bool {
        match self {
            Action::AcceptLeech { .. } | Action::DeclineLeech { .. } => true,
            Action::PostIncome { action } => action.is_leech_response(),
            _ => false,
        }
    }

    /// Whose action a leech response reacts to, if recorded
    pub fn leech_source(&self) -> Option<&str> {
        match self {
            Action::AcceptLeech { from_player, .. } | Action::DeclineLeech { from_player, .. } => {
                from_player.as_deref().filter(|source| !source.is_empty())
            }
            Action::PostIncome { action } => action.leech_source(),
            _ => None,
        }
    }

    /// Whether this action can put a building on the map and so offer
    /// neighbours a leech
    pub fn may_trigger_leech(&self) -> bool {
        match self {
            Action::TransformAndBuild { build_dwelling, .. } => *build_dwelling,
            Action::Upgrade { .. } => true,
            Action::Special { code, .. } => special_code_builds(code),
            Action::PostIncome { action } => action.may_trigger_leech(),
            Action::Compound { actions } => actions.iter().any(Action::may_trigger_leech),
            Action::SetupDwelling { .. }
            | Action::Pass { .. }
            | Action::SendPriest { .. }
            | Action::AdvanceShipping { .. }
            | Action::AdvanceDigging { .. }
            | Action::AcceptLeech { .. }
            | Action::DeclineLeech { .. }
            | Action::Burn { .. }
            | Action::Favor { .. }
            | Action::PowerAction { .. }
            | Action::Conversion { .. }
            | Action::Town { .. }
            | Action::CultAdvance { .. }
            | Action::CultDecrease { .. }
            | Action::SelectBonus { .. }
            | Action::DigTransform { .. }
            | Action::MultiSpade { .. } => false,
        }
    }

    /// A resource conversion, possibly behind a post-income marker. These
    /// only exist chained after another action.
    pub fn is_conversion(&self) -> bool {
        match self {
            Action::Conversion { .. } => true,
            Action::PostIncome { action } => action.is_conversion(),
            _ => false,
        }
    }

    /// Whether `self` may be dot-chained into the same cell after `previous`
    pub fn can_chain_after(&self, previous: &Action) -> bool {
        !previous.is_leech_response() && !self.is_leech_response()
    }

    /// Copy with leech sources dropped, which is all a render and re-parse keeps
    pub fn without_leech_source(&self) -> Action {
        match self {
            Action::AcceptLeech {
                player,
                amount,
                vp_cost,
                explicit_amount,
                ..
            } => Action::AcceptLeech {
                player: player.clone(),
                from_player: None,
                amount: *amount,
                vp_cost: *vp_cost,
                explicit_amount: *explicit_amount,
            },
            Action::DeclineLeech { player, .. } => Action::DeclineLeech {
                player: player.clone(),
                from_player: None,
            },
            Action::PostIncome { action } => Action::PostIncome {
                action: Box::new(action.without_leech_source()),
            },
            Action::Compound { actions } => Action::Compound {
                actions: actions.iter().map(Action::without_leech_source).collect(),
            },
            other => other.clone(),
        }
    }

    /// Compounds expanded in place, depth first
    pub fn flattened(&self) -> Vec<&Action> {
        match self {
            Action::Compound { actions } => actions.iter().flat_map(Action::flattened).collect(),
            other => vec![other],
        }
    }
}

/// Special codes carry any build they cause as `.`-joined parts, e.g. `ACTS-G2.G2`
fn special_code_builds(code: &str) -> bool {
    code.split('.').any(|part| {
        part.starts_with("ACT-SH-D-")
            || part.starts_with("ACT-SH-TP-")
            || part.starts_with("UP-")
            || super::coordinate::looks_like_coordinate(part)
    })
}
