// In: src/lib.rs

//! Pokedex Gallery
//!
//! Client-side orchestration of a browsable Pokemon catalog: a debounced live
//! search, a detail overlay kept in sync with the URL, evolution lineage
//! resolution, persisted favorites and a small biography proxy.

// --- MODULE DECLARATIONS ---
pub mod animation;
pub mod bio;
pub mod bio_proxy;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod errors;
pub mod events;
pub mod evolution;
pub mod favorites;
pub mod gallery;
pub mod mcp_interface;
pub mod modal;
pub mod routing;
pub mod search;

#[cfg(test)]
mod tests;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Catalog wire types.
pub use schema::{
    card_gradient, stat_label, ChainLink, EvolutionChain, NamedResource, Pokemon,
    PokemonSpecies, PokemonType, StatKind,
};

// --- From this crate's modules (`src/`) ---

// Orchestration.
pub use gallery::{GalleryApp, GalleryServices};
pub use events::{event_channel, AppEvent, EventReceiver, EventSender, RenderHook, StateChange};
pub use routing::{HistoryNavigator, Navigator, Route, RouteMatch};

// Components.
pub use animation::{AnimationGate, NoAnimation, TimedAnimation};
pub use catalog::{CatalogApi, HttpCatalog};
pub use detail::DetailPanel;
pub use evolution::{EvolutionDetail, EvolutionResolver, LineageLoader};
pub use favorites::{Favorites, FavoritesStore, JsonFileStore, MemoryStore};
pub use modal::{HeadlessModal, ModalController, ModalRouteState, OverlayContent, OverlayHandle};
pub use search::{SearchPipeline, SearchState};

// Configuration and error types.
pub use config::{AppConfig, ProxyConfig};
pub use errors::{
    BioError, BioGenerationError, CatalogError, CatalogResult, ConfigError, ConfigResult,
    FavoritesError, FavoritesResult,
};
