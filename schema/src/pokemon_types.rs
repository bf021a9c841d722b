use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Elemental types as the catalog names them (lowercase on the wire).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    /// Card color for a type, as a CSS hex string.
    pub fn color(self) -> &'static str {
        use PokemonType::*;

        match self {
            Normal => "#A8A878",
            Fire => "#F08030",
            Water => "#6890F0",
            Grass => "#78C850",
            Electric => "#F8D030",
            Ice => "#98D8D8",
            Fighting => "#C03028",
            Poison => "#A040A0",
            Ground => "#E0C068",
            Flying => "#A890F0",
            Psychic => "#F85888",
            Bug => "#A8B820",
            Rock => "#B8A038",
            Ghost => "#705898",
            Dragon => "#7038F8",
            Dark => "#705848",
            Steel => "#B8B8D0",
            Fairy => "#EE99AC",
        }
    }
}

/// Background colors for a record card: the primary type's color, then the
/// secondary type's color or a light neutral for single-typed records.
/// Unknown type names fall back to the normal-type color.
pub fn card_gradient<S: AsRef<str>>(type_names: &[S]) -> (&'static str, &'static str) {
    let color_of = |name: &S| {
        name.as_ref()
            .parse::<PokemonType>()
            .map(PokemonType::color)
            .ok()
    };

    let primary = type_names
        .first()
        .and_then(color_of)
        .unwrap_or(PokemonType::Normal.color());
    let secondary = match type_names.get(1) {
        Some(name) => color_of(name).unwrap_or(PokemonType::Normal.color()),
        None => "#F5F5F5",
    };
    (primary, secondary)
}
