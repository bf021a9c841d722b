//! Thin accessor for the external catalog REST API.
//!
//! Every lookup is single-shot: no caching, no retries. Callers decide how a
//! failure degrades.

use crate::errors::{CatalogError, CatalogResult};
use async_trait::async_trait;
use futures::future::try_join_all;
use rand::seq::IndexedRandom;
use reqwest::{Client, StatusCode};
use schema::{ChainLink, EvolutionChain, Pokemon, PokemonListResponse, PokemonSpecies};
use serde::de::DeserializeOwned;
use std::fmt;

/// Catalog lookups consumed by the resolver, the search pipeline and the modal.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /pokemon/{name}`; the name is matched case-insensitively.
    async fn get_record(&self, name: &str) -> CatalogResult<Pokemon>;

    /// `count` records sampled without replacement from the catalog index.
    /// Order is undefined.
    async fn get_random_records(&self, count: usize) -> CatalogResult<Vec<Pokemon>>;

    /// `GET /pokemon-species/{name}`
    async fn get_species(&self, name: &str) -> CatalogResult<PokemonSpecies>;

    /// `GET {evolution_chain.url}`, returning the root node of the chain.
    async fn get_evolution_chain(&self, url: &str) -> CatalogResult<ChainLink>;
}

/// reqwest-backed catalog client.
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
    index_limit: u32,
}

impl fmt::Debug for HttpCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCatalog")
            .field("base_url", &self.base_url)
            .field("index_limit", &self.index_limit)
            .finish()
    }
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, index_limit: u32) -> CatalogResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url, index_limit))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, index_limit: u32) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            index_limit,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn record_url(&self, name: &str) -> String {
        format!("{}/pokemon/{}", self.base_url, name.trim().to_lowercase())
    }

    fn species_url(&self, name: &str) -> String {
        format!(
            "{}/pokemon-species/{}",
            self.base_url,
            name.trim().to_lowercase()
        )
    }

    fn index_url(&self) -> String {
        format!("{}/pokemon?limit={}", self.base_url, self.index_limit)
    }

    /// GET a JSON document. `subject` names what was asked for so a 404 can be
    /// reported as `NotFound(subject)`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, subject: &str) -> CatalogResult<T> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(subject.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError::Decode(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn get_record(&self, name: &str) -> CatalogResult<Pokemon> {
        self.get_json(&self.record_url(name), name).await
    }

    async fn get_random_records(&self, count: usize) -> CatalogResult<Vec<Pokemon>> {
        let index: PokemonListResponse = self.get_json(&self.index_url(), "pokemon index").await?;

        // The thread rng is not Send, so sampling finishes before the next await.
        let selected: Vec<(String, String)> = {
            let mut rng = rand::rng();
            index
                .results
                .choose_multiple(&mut rng, count)
                .map(|entry| (entry.url.clone(), entry.name.clone()))
                .collect()
        };
        log::debug!("Sampled {} of {} index entries", selected.len(), index.results.len());

        let requests = selected
            .iter()
            .map(|(url, name)| self.get_json::<Pokemon>(url, name));
        try_join_all(requests).await
    }

    async fn get_species(&self, name: &str) -> CatalogResult<PokemonSpecies> {
        self.get_json(&self.species_url(name), name).await
    }

    async fn get_evolution_chain(&self, url: &str) -> CatalogResult<ChainLink> {
        let chain: EvolutionChain = self.get_json(url, url).await?;
        Ok(chain.chain)
    }
}
