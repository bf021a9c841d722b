//! Live search: normalize, de-duplicate, debounce, look up, switch to latest.
//!
//! Two generation counters do the cancellation work. `debounce_generation`
//! tags quiet-period timers, so only a timer for the last value of a burst
//! fires a lookup. `lookup_generation` tags lookups, so only the newest
//! lookup's result is ever applied. Superseded work may still finish in the
//! background; its event is simply ignored.

use crate::catalog::CatalogApi;
use crate::events::{post, AppEvent, EventSender};
use schema::Pokemon;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Trim and lowercase a raw input value.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Last query acted on (after debounce)
    pub query: String,
    pub results: Vec<Pokemon>,
    pub loading: bool,
}

pub struct SearchPipeline {
    catalog: Arc<dyn CatalogApi>,
    events: EventSender,
    debounce: Duration,
    state: SearchState,
    /// Last normalized input value, for suppressing consecutive duplicates
    last_input: Option<String>,
    /// Value waiting for its quiet period to elapse
    pending: Option<String>,
    /// Last debounced value that was acted on
    last_issued: Option<String>,
    debounce_generation: u64,
    lookup_generation: u64,
    tasks: JoinSet<()>,
}

impl SearchPipeline {
    pub fn new(catalog: Arc<dyn CatalogApi>, events: EventSender, debounce: Duration) -> Self {
        Self {
            catalog,
            events,
            debounce,
            state: SearchState::default(),
            last_input: None,
            pending: None,
            last_issued: None,
            debounce_generation: 0,
            lookup_generation: 0,
            tasks: JoinSet::new(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Feed one raw input value (one keystroke or edit).
    pub fn on_input(&mut self, raw: &str) {
        self.reap_finished();

        let value = normalize_query(raw);
        if self.last_input.as_deref() == Some(value.as_str()) {
            return;
        }
        self.last_input = Some(value.clone());

        // Restart the quiet period; the previous pending value is dropped.
        self.debounce_generation += 1;
        let generation = self.debounce_generation;
        self.pending = Some(value);

        let events = self.events.clone();
        let quiet = self.debounce;
        self.tasks.spawn(async move {
            tokio::time::sleep(quiet).await;
            post(&events, AppEvent::SearchQuiet { generation });
        });
    }

    /// The quiet period of a value elapsed. Returns whether state changed.
    pub fn on_quiet(&mut self, generation: u64) -> bool {
        if generation != self.debounce_generation {
            return false;
        }
        let Some(query) = self.pending.take() else {
            return false;
        };
        if self.last_issued.as_deref() == Some(query.as_str()) {
            log::debug!("Search '{}' unchanged since last lookup", query);
            return false;
        }
        self.last_issued = Some(query.clone());

        // Newer work supersedes any in-flight lookup.
        self.lookup_generation += 1;
        let lookup = self.lookup_generation;
        self.state.query = query.clone();

        if query.is_empty() {
            self.state.results.clear();
            self.state.loading = false;
            return true;
        }

        self.state.loading = true;
        let catalog = Arc::clone(&self.catalog);
        let events = self.events.clone();
        self.tasks.spawn(async move {
            let results = match catalog.get_record(&query).await {
                Ok(pokemon) => vec![pokemon],
                Err(e) => {
                    log::debug!("Search for '{}' found nothing: {}", query, e);
                    Vec::new()
                }
            };
            post(
                &events,
                AppEvent::SearchResolved {
                    generation: lookup,
                    query,
                    results,
                },
            );
        });
        true
    }

    /// A lookup finished. Results of superseded lookups are dropped.
    pub fn on_resolved(&mut self, generation: u64, query: &str, results: Vec<Pokemon>) -> bool {
        if generation != self.lookup_generation {
            log::debug!("Discarding stale results for '{}'", query);
            return false;
        }
        self.state.results = results;
        self.state.loading = false;
        true
    }

    fn reap_finished(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }

    pub fn shutdown(&mut self) {
        self.tasks.abort_all();
        self.debounce_generation += 1;
        self.lookup_generation += 1;
        self.pending = None;
        self.state.loading = false;
    }
}
