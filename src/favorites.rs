use crate::errors::{FavoritesError, FavoritesResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Fixed storage key of the persisted favorites array.
pub const FAVORITES_KEY: &str = "pokemonFavorites";

/// Key-value persistence for the favorites array.
pub trait FavoritesStore: Send {
    fn load(&self) -> FavoritesResult<Vec<u32>>;
    fn save(&self, ids: &[u32]) -> FavoritesResult<()>;
}

/// Stores the favorites as a JSON array of ids in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FavoritesStore for JsonFileStore {
    fn load(&self) -> FavoritesResult<Vec<u32>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(FavoritesError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, ids: &[u32]) -> FavoritesResult<()> {
        let json = serde_json::to_string(ids)?;
        std::fs::write(&self.path, json).map_err(|source| FavoritesError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory store; clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saved: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn with_ids(ids: &[u32]) -> Self {
        let store = Self::default();
        if let Ok(mut saved) = store.saved.lock() {
            *saved = serde_json::to_string(ids).ok();
        }
        store
    }

    /// The raw JSON last written, if any.
    pub fn raw(&self) -> Option<String> {
        self.saved.lock().ok().and_then(|saved| saved.clone())
    }
}

impl FavoritesStore for MemoryStore {
    fn load(&self) -> FavoritesResult<Vec<u32>> {
        match self.raw() {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, ids: &[u32]) -> FavoritesResult<()> {
        let json = serde_json::to_string(ids)?;
        if let Ok(mut saved) = self.saved.lock() {
            *saved = Some(json);
        }
        Ok(())
    }
}

/// The favorites set: loaded once, then the in-memory mirror is authoritative.
pub struct Favorites {
    ids: Vec<u32>,
    store: Box<dyn FavoritesStore>,
}

impl Favorites {
    pub fn load(store: Box<dyn FavoritesStore>) -> Self {
        let ids = match store.load() {
            Ok(ids) => ids,
            Err(e) => {
                log::warn!("Could not load favorites, starting empty: {}", e);
                Vec::new()
            }
        };
        Self { ids, store }
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Add or remove `id` and overwrite the stored array. Returns whether
    /// `id` is a favorite afterwards.
    pub fn toggle(&mut self, id: u32) -> bool {
        let now_favorite = if self.is_favorite(id) {
            self.ids.retain(|&existing| existing != id);
            false
        } else {
            self.ids.push(id);
            true
        };

        if let Err(e) = self.store.save(&self.ids) {
            log::error!("Failed to persist favorites: {}", e);
        }
        now_favorite
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }
}
