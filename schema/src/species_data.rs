use crate::NamedResource;
use serde::{Deserialize, Serialize};

/// A link-only resource (`{url}`), used for the species -> evolution chain reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorText {
    pub flavor_text: String,
    pub language: NamedResource,
    #[serde(default)]
    pub version: Option<NamedResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genus {
    pub genus: String,
    pub language: NamedResource,
}

/// Species metadata from `GET /pokemon-species/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonSpecies {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_baby: bool,
    #[serde(default)]
    pub is_legendary: bool,
    #[serde(default)]
    pub is_mythical: bool,
    #[serde(default)]
    pub evolution_chain: Option<ApiResource>, // Absent means "no evolutions"
    #[serde(default)]
    pub evolves_from_species: Option<NamedResource>,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorText>,
    #[serde(default)]
    pub genera: Vec<Genus>,
    #[serde(default)]
    pub color: Option<NamedResource>,
    #[serde(default)]
    pub habitat: Option<NamedResource>,
}

impl PokemonSpecies {
    /// The evolution chain URL, if the species has one and it is non-empty.
    pub fn evolution_chain_url(&self) -> Option<&str> {
        self.evolution_chain
            .as_ref()
            .map(|chain| chain.url.as_str())
            .filter(|url| !url.is_empty())
    }

    /// First flavor text in the given language, with the catalog's embedded
    /// line breaks and form feeds flattened to spaces.
    pub fn flavor_text(&self, language: &str) -> Option<String> {
        self.flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == language)
            .map(|entry| {
                entry
                    .flavor_text
                    .split(|c: char| c.is_whitespace())
                    .filter(|word| !word.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
    }

    pub fn genus(&self, language: &str) -> Option<&str> {
        self.genera
            .iter()
            .find(|genus| genus.language.name == language)
            .map(|genus| genus.genus.as_str())
    }
}

/// One node of an evolution chain.
///
/// `evolves_to` is optional on purpose: a node without the field is terminal,
/// exactly like a node with an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Option<Vec<ChainLink>>,
}

impl ChainLink {
    /// The first listed next node. Branching chains collapse to this one.
    pub fn first_next(&self) -> Option<&ChainLink> {
        self.evolves_to.as_ref().and_then(|next| next.first())
    }
}

/// Response of `GET {evolution_chain.url}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionChain {
    #[serde(default)]
    pub id: u32,
    pub chain: ChainLink,
}
