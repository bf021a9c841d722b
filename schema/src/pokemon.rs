use serde::{Deserialize, Serialize};

/// A `{name, url}` pair as the catalog returns it for every linked resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl NamedResource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A single sprite variant; the catalog nulls out variants it does not have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteVariant {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<SpriteVariant>,
    #[serde(default)]
    pub home: Option<SpriteVariant>,
    #[serde(default)]
    pub dream_world: Option<SpriteVariant>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub front_shiny: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

impl Sprites {
    /// Best available sprite, ranked artwork -> home -> dream-world -> default.
    /// Empty strings count as missing.
    pub fn best_url(&self) -> Option<&str> {
        let other = self.other.as_ref();
        let ranked = [
            other.and_then(|o| o.official_artwork.as_ref()),
            other.and_then(|o| o.home.as_ref()),
            other.and_then(|o| o.dream_world.as_ref()),
        ];

        ranked
            .into_iter()
            .flatten()
            .filter_map(|variant| variant.front_default.as_deref())
            .chain(self.front_default.as_deref())
            .find(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlot {
    #[serde(default)]
    pub is_hidden: bool,
    pub slot: u8,
    pub ability: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    pub base_stat: u16, // 0-255 by convention of the source API
    #[serde(default)]
    pub effort: u16,
    pub stat: NamedResource,
}

/// A fully hydrated catalog record, as returned by `GET /pokemon/{name}`.
///
/// Records are fetched fresh per request and never mutated; a newer fetch
/// replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
}

impl Pokemon {
    pub fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.kind.name.clone()).collect()
    }

    pub fn ability_names(&self) -> Vec<String> {
        self.abilities
            .iter()
            .map(|a| a.ability.name.clone())
            .collect()
    }

    pub fn sprite_url(&self) -> &str {
        self.sprites.best_url().unwrap_or("")
    }
}

/// Response of the index endpoint `GET /pokemon?limit=N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonListResponse {
    #[serde(default)]
    pub count: u32,
    pub results: Vec<NamedResource>,
}
