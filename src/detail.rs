//! View model of the opened detail overlay.

use crate::bio::BioService;
use crate::evolution::{EvolutionDetail, EvolutionResolver};
use schema::{stat_label, Pokemon};

pub const BIO_EMPTY_MESSAGE: &str = "Could not generate a biography.";
pub const BIO_ERROR_MESSAGE: &str = "Could not generate a biography right now.";

/// "mr-mime" -> "Mr-mime"
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone)]
pub struct DetailPanel {
    record: Pokemon,
    pub evolutions: Vec<EvolutionDetail>,
    pub loading_evolutions: bool,
    pub bio: String,
    pub bio_loading: bool,
    /// Whether the pokedex screen with the biography is shown
    pub show_pokedex: bool,
}

impl DetailPanel {
    pub fn new(record: Pokemon) -> Self {
        Self {
            record,
            evolutions: Vec::new(),
            loading_evolutions: true,
            bio: String::new(),
            bio_loading: false,
            show_pokedex: false,
        }
    }

    pub fn record(&self) -> &Pokemon {
        &self.record
    }

    pub fn display_name(&self) -> String {
        capitalize(&self.record.name)
    }

    pub fn sprite_url(&self) -> &str {
        self.record.sprite_url()
    }

    /// (label, base value) rows in catalog order.
    pub fn stat_chart(&self) -> Vec<(String, u16)> {
        self.record
            .stats
            .iter()
            .map(|entry| (stat_label(&entry.stat.name), entry.base_stat))
            .collect()
    }

    pub async fn load_evolutions(&mut self, resolver: &EvolutionResolver) {
        self.loading_evolutions = true;
        self.evolutions = resolver.resolve(&self.record.name).await;
        self.loading_evolutions = false;
    }

    pub async fn generate_bio(&mut self, service: &dyn BioService) {
        self.show_pokedex = true;
        self.bio_loading = true;
        self.bio.clear();

        self.bio = match service.create_bio(&self.record).await {
            Ok(text) if text.trim().is_empty() => BIO_EMPTY_MESSAGE.to_string(),
            Ok(text) => text,
            Err(e) => {
                log::error!("Biography for '{}' failed: {}", self.record.name, e);
                BIO_ERROR_MESSAGE.to_string()
            }
        };
        self.bio_loading = false;
    }

    pub fn close_pokedex(&mut self) {
        self.show_pokedex = false;
    }
}
