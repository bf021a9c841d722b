//! Text rendering and lookup commands shared by the terminal frontend and the
//! MCP server.

use crate::catalog::CatalogApi;
use crate::detail::{capitalize, DetailPanel};
use crate::evolution::{EvolutionDetail, EvolutionResolver};
use schema::{card_gradient, Pokemon, PokemonSpecies};

const STAT_BAR_WIDTH: usize = 20;
const MAX_BASE_STAT: u16 = 255;

fn stat_bar(value: u16) -> String {
    let filled = (value.min(MAX_BASE_STAT) as usize * STAT_BAR_WIDTH) / MAX_BASE_STAT as usize;
    format!(
        "{}{}",
        "#".repeat(filled),
        ".".repeat(STAT_BAR_WIDTH - filled)
    )
}

/// One line of the gallery list.
pub fn display_card_line(pokemon: &Pokemon, favorite: bool) -> String {
    let types = pokemon.type_names();
    let (primary, secondary) = card_gradient(&types);
    format!(
        "{} #{:03} {:<14} {:<18} [{} -> {}]",
        if favorite { "*" } else { " " },
        pokemon.id,
        capitalize(&pokemon.name),
        types.join("/"),
        primary,
        secondary
    )
}

pub fn display_list<F>(records: &[Pokemon], is_favorite: F) -> String
where
    F: Fn(u32) -> bool,
{
    if records.is_empty() {
        return "No Pokemon to show.".to_string();
    }
    records
        .iter()
        .map(|p| display_card_line(p, is_favorite(p.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The detail overlay as text: header, sprite, abilities and the stat chart.
pub fn display_detail(panel: &DetailPanel) -> String {
    let record = panel.record();
    let mut output = format!(
        "{} (#{})\nTypes: {}\nAbilities: {}\nHeight: {}  Weight: {}\n",
        panel.display_name(),
        record.id,
        record.type_names().join(", "),
        record.ability_names().join(", "),
        record.height,
        record.weight
    );
    if !panel.sprite_url().is_empty() {
        output.push_str(&format!("Sprite: {}\n", panel.sprite_url()));
    }

    output.push_str("Base stats:\n");
    for (label, value) in panel.stat_chart() {
        output.push_str(&format!("  {:<8} {:>3} {}\n", label, value, stat_bar(value)));
    }
    output
}

pub fn display_evolutions(evolutions: &[EvolutionDetail]) -> String {
    if evolutions.is_empty() {
        return "This Pokemon has no evolutions.".to_string();
    }
    evolutions
        .iter()
        .map(|e| {
            let types: Vec<&str> = e.types.iter().map(|t| t.kind.name.as_str()).collect();
            format!("{} ({})", capitalize(&e.name), types.join("/"))
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub fn display_species(species: &PokemonSpecies, language: &str) -> String {
    let mut output = String::new();
    if let Some(genus) = species.genus(language).or_else(|| species.genus("en")) {
        output.push_str(&format!("{}\n", genus));
    }
    let mut tags = Vec::new();
    if species.is_legendary {
        tags.push("legendary");
    }
    if species.is_mythical {
        tags.push("mythical");
    }
    if species.is_baby {
        tags.push("baby");
    }
    if !tags.is_empty() {
        output.push_str(&format!("Rarity: {}\n", tags.join(", ")));
    }
    if let Some(text) = species
        .flavor_text(language)
        .or_else(|| species.flavor_text("en"))
    {
        output.push_str(&format!("{}\n", text));
    }
    output
}

/// Record plus species summary, or an explanation of why the lookup failed.
pub async fn handle_lookup_pokemon_command(catalog: &dyn CatalogApi, name: &str) -> String {
    let record = match catalog.get_record(name).await {
        Ok(record) => record,
        Err(e) if e.is_not_found() => return format!("Pokemon '{}' not found.", name),
        Err(e) => return format!("Error looking up '{}': {}", name, e),
    };

    let mut output = display_detail(&DetailPanel::new(record));
    match catalog.get_species(name).await {
        Ok(species) => output.push_str(&display_species(&species, "en")),
        Err(e) => log::debug!("No species data for '{}': {}", name, e),
    }
    output
}

pub async fn handle_evolutions_command(resolver: &EvolutionResolver, name: &str) -> String {
    let evolutions = resolver.resolve(name).await;
    format!(
        "Evolutions of {}: {}",
        capitalize(name),
        display_evolutions(&evolutions)
    )
}
