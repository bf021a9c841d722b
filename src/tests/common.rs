use crate::animation::{AnimationGate, NoAnimation};
use crate::catalog::CatalogApi;
use crate::config::AppConfig;
use crate::errors::{CatalogError, CatalogResult};
use crate::events::{event_channel, AppEvent, EventReceiver, RenderHook, StateChange};
use crate::favorites::MemoryStore;
use crate::gallery::{GalleryApp, GalleryServices};
use crate::modal::HeadlessModal;
use crate::routing::HistoryNavigator;
use async_trait::async_trait;
use schema::{
    AbilitySlot, ApiResource, ChainLink, NamedResource, OtherSprites, Pokemon, PokemonSpecies,
    SpriteVariant, Sprites, StatEntry, TypeSlot,
};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// A builder for catalog records with empty defaults.
///
/// # Example
/// ```
/// let pikachu = PokemonBuilder::new(25, "pikachu")
///     .with_types(&["electric"])
///     .build();
/// ```
pub struct PokemonBuilder {
    id: u32,
    name: String,
    types: Vec<String>,
    abilities: Vec<String>,
    stats: Vec<(String, u16)>,
    sprite: Option<String>,
}

impl PokemonBuilder {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            types: Vec::new(),
            abilities: Vec::new(),
            stats: Vec::new(),
            sprite: None,
        }
    }

    pub fn with_types(mut self, types: &[&str]) -> Self {
        self.types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_abilities(mut self, abilities: &[&str]) -> Self {
        self.abilities = abilities.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_stats(mut self, stats: &[(&str, u16)]) -> Self {
        self.stats = stats.iter().map(|(n, v)| (n.to_string(), *v)).collect();
        self
    }

    /// Sets the official artwork URL.
    pub fn with_sprite(mut self, url: &str) -> Self {
        self.sprite = Some(url.to_string());
        self
    }

    pub fn build(self) -> Pokemon {
        let sprites = Sprites {
            other: self.sprite.map(|url| OtherSprites {
                official_artwork: Some(SpriteVariant {
                    front_default: Some(url),
                }),
                home: None,
                dream_world: None,
            }),
            ..Sprites::default()
        };

        Pokemon {
            id: self.id,
            name: self.name,
            height: 0,
            weight: 0,
            sprites,
            types: self
                .types
                .into_iter()
                .enumerate()
                .map(|(i, name)| TypeSlot {
                    slot: i as u8 + 1,
                    kind: NamedResource::new(name, ""),
                })
                .collect(),
            abilities: self
                .abilities
                .into_iter()
                .enumerate()
                .map(|(i, name)| AbilitySlot {
                    is_hidden: false,
                    slot: i as u8 + 1,
                    ability: NamedResource::new(name, ""),
                })
                .collect(),
            stats: self
                .stats
                .into_iter()
                .map(|(name, base_stat)| StatEntry {
                    base_stat,
                    effort: 0,
                    stat: NamedResource::new(name, ""),
                })
                .collect(),
        }
    }
}

pub fn species(id: u32, name: &str, chain_url: Option<&str>) -> PokemonSpecies {
    PokemonSpecies {
        id,
        name: name.to_string(),
        order: id as i32,
        is_baby: false,
        is_legendary: false,
        is_mythical: false,
        evolution_chain: chain_url.map(|url| ApiResource {
            url: url.to_string(),
        }),
        evolves_from_species: None,
        flavor_text_entries: Vec::new(),
        genera: Vec::new(),
        color: None,
        habitat: None,
    }
}

/// A linear chain through `names`; the last node has no `evolves_to` field.
pub fn linear_chain(names: &[&str]) -> ChainLink {
    let mut node: Option<ChainLink> = None;
    for name in names.iter().rev() {
        node = Some(ChainLink {
            species: NamedResource::new(*name, ""),
            evolves_to: node.map(|next| vec![next]),
        });
    }
    node.unwrap_or_else(|| panic!("linear_chain needs at least one name"))
}

/// In-memory catalog with per-key latency and failure injection.
///
/// Keys are lowercase record names, species names, chain URLs, or `"random"`.
/// Every call is logged as `"<kind>:<key>"`.
#[derive(Default)]
pub struct FakeCatalog {
    records: HashMap<String, Pokemon>,
    species: HashMap<String, PokemonSpecies>,
    chains: HashMap<String, ChainLink>,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, record: Pokemon) -> Self {
        self.records.insert(record.name.clone(), record);
        self
    }

    pub fn with_species(mut self, species: PokemonSpecies) -> Self {
        self.species.insert(species.name.clone(), species);
        self
    }

    pub fn with_chain(mut self, url: &str, chain: ChainLink) -> Self {
        self.chains.insert(url.to_string(), chain);
        self
    }

    pub fn with_delay(mut self, key: &str, millis: u64) -> Self {
        self.delays
            .insert(key.to_string(), Duration::from_millis(millis));
        self
    }

    /// Lookups of `key` fail with a server error.
    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, kind: &str) -> Vec<String> {
        let prefix = format!("{}:", kind);
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    async fn enter(&self, kind: &str, key: &str) -> CatalogResult<()> {
        self.calls.lock().unwrap().push(format!("{}:{}", kind, key));
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(key) {
            return Err(CatalogError::Status {
                status: 500,
                url: format!("fake://{}/{}", kind, key),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn get_record(&self, name: &str) -> CatalogResult<Pokemon> {
        let key = name.trim().to_lowercase();
        self.enter("record", &key).await?;
        self.records
            .get(&key)
            .cloned()
            .ok_or(CatalogError::NotFound(name.to_string()))
    }

    async fn get_random_records(&self, count: usize) -> CatalogResult<Vec<Pokemon>> {
        self.enter("random", "random").await?;
        let mut records: Vec<Pokemon> = self.records.values().cloned().collect();
        records.sort_by_key(|p| p.id);
        records.truncate(count);
        Ok(records)
    }

    async fn get_species(&self, name: &str) -> CatalogResult<PokemonSpecies> {
        let key = name.trim().to_lowercase();
        self.enter("species", &key).await?;
        self.species
            .get(&key)
            .cloned()
            .ok_or(CatalogError::NotFound(name.to_string()))
    }

    async fn get_evolution_chain(&self, url: &str) -> CatalogResult<ChainLink> {
        self.enter("chain", url).await?;
        self.chains
            .get(url)
            .cloned()
            .ok_or(CatalogError::NotFound(url.to_string()))
    }
}

/// Render hook that records every notification.
#[derive(Clone, Default)]
pub struct RecordingRender {
    changes: Arc<Mutex<Vec<StateChange>>>,
}

impl RecordingRender {
    pub fn changes(&self) -> Vec<StateChange> {
        self.changes.lock().unwrap().clone()
    }
}

impl RenderHook for RecordingRender {
    fn state_changed(&mut self, change: StateChange) {
        self.changes.lock().unwrap().push(change);
    }
}

/// Feed every event that arrives within `window` of virtual time to `apply`.
/// Returns how many events were applied.
pub async fn drain_for<F>(rx: &mut EventReceiver, window: Duration, mut apply: F) -> usize
where
    F: FnMut(AppEvent),
{
    let deadline = Instant::now() + window;
    let mut applied = 0;
    while let Ok(Some(event)) = timeout_at(deadline, rx.recv()).await {
        apply(event);
        applied += 1;
    }
    applied
}

/// Serve `app` on an ephemeral local port until the test runtime stops.
pub async fn serve_local(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A local address with nothing listening on it.
pub async fn closed_local_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// A fully wired gallery over a `FakeCatalog`, a headless modal and an
/// in-memory history.
pub struct TestGallery {
    pub app: GalleryApp,
    pub rx: EventReceiver,
    pub nav: HistoryNavigator,
    pub modal: HeadlessModal,
    pub catalog: Arc<FakeCatalog>,
    pub render: RecordingRender,
    pub store: MemoryStore,
}

impl TestGallery {
    pub fn new(catalog: FakeCatalog, path: &str) -> Self {
        Self::build(catalog, path, Arc::new(NoAnimation), AppConfig::default())
    }

    pub fn build(
        catalog: FakeCatalog,
        path: &str,
        gate: Arc<dyn AnimationGate>,
        config: AppConfig,
    ) -> Self {
        let (tx, rx) = event_channel();
        let catalog = catalog.shared();
        let nav = HistoryNavigator::from_path(path, tx.clone());
        let modal = HeadlessModal::new();
        let render = RecordingRender::default();
        let store = MemoryStore::default();

        let services = GalleryServices {
            catalog: catalog.clone(),
            navigator: Arc::new(nav.clone()),
            modal: Box::new(modal.clone()),
            favorites: Box::new(store.clone()),
            gate,
            render: Box::new(render.clone()),
        };
        let app = GalleryApp::new(services, tx, &config);

        Self {
            app,
            rx,
            nav,
            modal,
            catalog,
            render,
            store,
        }
    }

    /// Apply every event arriving within `window` of virtual time.
    pub async fn pump(&mut self, window: Duration) -> usize {
        let app = &mut self.app;
        drain_for(&mut self.rx, window, |event| app.handle(event)).await
    }

    /// Names of the records in the visible overlays, oldest first.
    pub fn visible(&self) -> Vec<String> {
        self.modal
            .visible()
            .into_iter()
            .map(|content| content.record.name)
            .collect()
    }
}

/// Bulbasaur, Pikachu and Eevee with their usual types.
pub fn starter_catalog() -> FakeCatalog {
    FakeCatalog::new()
        .with_record(
            PokemonBuilder::new(1, "bulbasaur")
                .with_types(&["grass", "poison"])
                .build(),
        )
        .with_record(
            PokemonBuilder::new(25, "pikachu")
                .with_types(&["electric"])
                .build(),
        )
        .with_record(
            PokemonBuilder::new(133, "eevee")
                .with_types(&["normal"])
                .build(),
        )
}
