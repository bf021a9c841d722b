use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The six base stats, named as the catalog names them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StatKind {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl StatKind {
    /// Short label used by stat charts and text displays.
    pub fn label(self) -> &'static str {
        match self {
            StatKind::Hp => "HP",
            StatKind::Attack => "Attack",
            StatKind::Defense => "Defense",
            StatKind::SpecialAttack => "Sp. Atk",
            StatKind::SpecialDefense => "Sp. Def",
            StatKind::Speed => "Speed",
        }
    }
}

/// Display label for a raw stat name; names outside the six known stats pass through.
pub fn stat_label(raw_name: &str) -> String {
    raw_name
        .parse::<StatKind>()
        .map(|kind| kind.label().to_string())
        .unwrap_or_else(|_| raw_name.to_string())
}
