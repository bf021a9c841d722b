//! Evolution lineage resolution.
//!
//! Species -> chain -> first-branch walk -> parallel record hydration. Any
//! failure along the way collapses to an empty lineage.

use crate::catalog::CatalogApi;
use crate::errors::CatalogResult;
use futures::future::try_join_all;
use schema::{ChainLink, Pokemon, TypeSlot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Upper bound on walked nodes; real chains have at most three.
pub const MAX_CHAIN_LENGTH: usize = 16;

/// View projection of a record, one per chain node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionDetail {
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub types: Vec<TypeSlot>,
}

impl From<&Pokemon> for EvolutionDetail {
    fn from(pokemon: &Pokemon) -> Self {
        Self {
            name: pokemon.name.clone(),
            image_url: pokemon.sprite_url().to_string(),
            types: pokemon.types.clone(),
        }
    }
}

/// Species names along the chain, root first, following the first branch only.
///
/// Stops when a node has no next node (a missing `evolves_to` and an empty
/// list both count), when a name repeats, or after `MAX_CHAIN_LENGTH` nodes.
pub fn chain_species_names(root: &ChainLink) -> Vec<String> {
    let mut names = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(root);

    while let Some(link) = current {
        let name = &link.species.name;
        if !seen.insert(name.to_lowercase()) {
            log::warn!("Evolution chain revisits '{}'; stopping walk", name);
            break;
        }
        if names.len() == MAX_CHAIN_LENGTH {
            log::warn!(
                "Evolution chain exceeds {} nodes; truncating",
                MAX_CHAIN_LENGTH
            );
            break;
        }
        names.push(name.clone());
        current = link.first_next();
    }

    names
}

#[derive(Clone)]
pub struct EvolutionResolver {
    catalog: Arc<dyn CatalogApi>,
}

impl EvolutionResolver {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }

    /// Ordered lineage for `name`, root first. Never fails: a species without a
    /// chain and any lookup failure both yield an empty list.
    pub async fn resolve(&self, name: &str) -> Vec<EvolutionDetail> {
        match self.try_resolve(name).await {
            Ok(details) => details,
            Err(e) => {
                log::debug!("Evolution lookup for '{}' failed: {}", name, e);
                Vec::new()
            }
        }
    }

    async fn try_resolve(&self, name: &str) -> CatalogResult<Vec<EvolutionDetail>> {
        let species = self.catalog.get_species(name).await?;
        let Some(chain_url) = species.evolution_chain_url() else {
            return Ok(Vec::new());
        };

        let root = self.catalog.get_evolution_chain(chain_url).await?;
        let names = chain_species_names(&root);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        // try_join_all keeps input order whatever the completion order is.
        let records = try_join_all(names.iter().map(|n| self.catalog.get_record(n))).await?;
        Ok(records.iter().map(EvolutionDetail::from).collect())
    }
}

/// Background lineage resolution for whichever record is open. Only the most
/// recent request is delivered; earlier ones are aborted.
pub struct LineageLoader {
    resolver: EvolutionResolver,
    latest: Option<String>,
    tasks: JoinSet<(String, Vec<EvolutionDetail>)>,
}

impl LineageLoader {
    pub fn new(resolver: EvolutionResolver) -> Self {
        Self {
            resolver,
            latest: None,
            tasks: JoinSet::new(),
        }
    }

    /// Start resolving `name` unless it is already the latest request.
    /// Returns whether a new resolution was started.
    pub fn request(&mut self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        if self.latest.as_deref() == Some(name.as_str()) {
            return false;
        }

        self.tasks.abort_all();
        self.latest = Some(name.clone());
        let resolver = self.resolver.clone();
        self.tasks.spawn(async move {
            let evolutions = resolver.resolve(&name).await;
            (name, evolutions)
        });
        true
    }

    /// Forget the current request, e.g. once its overlay closed.
    pub fn cancel(&mut self) {
        self.tasks.abort_all();
        self.latest = None;
    }

    /// The next delivered lineage. Pending forever while nothing is in flight,
    /// so it can sit in a `select!` loop. Cancel safe.
    pub async fn next(&mut self) -> (String, Vec<EvolutionDetail>) {
        loop {
            match self.tasks.join_next().await {
                Some(Ok((name, evolutions))) if self.latest.as_deref() == Some(name.as_str()) => {
                    return (name, evolutions);
                }
                Some(Ok((name, _))) => log::debug!("Dropping stale lineage for '{}'", name),
                Some(Err(e)) if e.is_cancelled() => {}
                Some(Err(e)) => log::error!("Lineage task failed: {}", e),
                None => std::future::pending::<()>().await,
            }
        }
    }
}
