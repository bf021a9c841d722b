//! The gallery orchestrator: owns every component and is the only place
//! events are applied. All mutation happens in `handle`, on one task.

use crate::animation::AnimationGate;
use crate::catalog::CatalogApi;
use crate::config::AppConfig;
use crate::events::{post, AppEvent, EventSender, RenderHook, StateChange};
use crate::favorites::{Favorites, FavoritesStore};
use crate::modal::{ModalController, RouteModalMachine};
use crate::routing::{Navigator, Route};
use crate::search::{SearchPipeline, SearchState};
use schema::Pokemon;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Collaborators injected into the orchestrator.
pub struct GalleryServices {
    pub catalog: Arc<dyn CatalogApi>,
    pub navigator: Arc<dyn Navigator>,
    pub modal: Box<dyn ModalController>,
    pub favorites: Box<dyn FavoritesStore>,
    pub gate: Arc<dyn AnimationGate>,
    pub render: Box<dyn RenderHook>,
}

#[derive(Debug, Default)]
struct TransitionState {
    visible: bool,
    /// Detail to navigate to once the animation finishes
    pending: Option<String>,
    token: u64,
}

pub struct GalleryApp {
    catalog: Arc<dyn CatalogApi>,
    navigator: Arc<dyn Navigator>,
    gate: Arc<dyn AnimationGate>,
    favorites: Favorites,
    search: SearchPipeline,
    modal: RouteModalMachine,
    render: Box<dyn RenderHook>,
    events: EventSender,
    random_count: usize,
    list: Vec<Pokemon>,
    list_loading: bool,
    transition: TransitionState,
    tasks: JoinSet<()>,
}

impl GalleryApp {
    pub fn new(services: GalleryServices, events: EventSender, config: &AppConfig) -> Self {
        let GalleryServices {
            catalog,
            navigator,
            modal,
            favorites,
            gate,
            render,
        } = services;

        let search = SearchPipeline::new(
            Arc::clone(&catalog),
            events.clone(),
            config.search_debounce(),
        );
        let modal = RouteModalMachine::new(
            Arc::clone(&catalog),
            Arc::clone(&navigator),
            modal,
            events.clone(),
        );

        Self {
            catalog,
            navigator,
            gate,
            favorites: Favorites::load(favorites),
            search,
            modal,
            render,
            events,
            random_count: config.random_count,
            list: Vec::new(),
            list_loading: false,
            transition: TransitionState::default(),
            tasks: JoinSet::new(),
        }
    }

    /// Load the random list and apply the initial URL (deep links open here).
    pub fn start(&mut self) {
        self.list_loading = true;
        self.render.state_changed(StateChange::List);

        let catalog = Arc::clone(&self.catalog);
        let events = self.events.clone();
        let count = self.random_count;
        self.tasks.spawn(async move {
            let result = catalog.get_random_records(count).await;
            post(&events, AppEvent::RandomLoaded(result));
        });

        let initial = self.navigator.current();
        log::info!("Starting at {}", initial);
        if self.modal.on_route(&initial) {
            self.render.state_changed(StateChange::Modal);
        }
    }

    pub fn handle(&mut self, event: AppEvent) {
        let change = match event {
            AppEvent::Navigated(route) => self.modal.on_route(&route).then_some(StateChange::Modal),
            AppEvent::RecordFetched {
                generation,
                name,
                result,
            } => self
                .modal
                .on_record_fetched(generation, &name, result)
                .then_some(StateChange::Modal),
            AppEvent::OverlayClosed { overlay_id } => {
                let dismissed = self.modal.on_overlay_closed(overlay_id);
                if dismissed && self.transition.pending.take().is_some() {
                    log::debug!("Dismiss cancelled the pending detail navigation");
                }
                dismissed.then_some(StateChange::Modal)
            }
            AppEvent::AnimationDone { token } => {
                self.on_animation_done(token).then_some(StateChange::Animation)
            }
            AppEvent::SearchQuiet { generation } => self
                .search
                .on_quiet(generation)
                .then_some(StateChange::Search),
            AppEvent::SearchResolved {
                generation,
                query,
                results,
            } => self
                .search
                .on_resolved(generation, &query, results)
                .then_some(StateChange::Search),
            AppEvent::RandomLoaded(result) => {
                match result {
                    Ok(records) => {
                        log::info!("Loaded {} random records", records.len());
                        self.list = records;
                    }
                    Err(e) => log::error!("Failed to load random records: {}", e),
                }
                self.list_loading = false;
                Some(StateChange::List)
            }
        };

        if let Some(change) = change {
            self.render.state_changed(change);
        }
    }

    pub fn search_input(&mut self, raw: &str) {
        self.search.on_input(raw);
    }

    /// Returns whether `id` is a favorite afterwards.
    pub fn toggle_favorite(&mut self, id: u32) -> bool {
        let now_favorite = self.favorites.toggle(id);
        self.render.state_changed(StateChange::Favorites);
        now_favorite
    }

    /// Play the transition animation, then navigate to the detail URL.
    pub fn go_to_details(&mut self, name: &str) {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return;
        }
        self.reap_finished();

        self.transition.token += 1;
        let token = self.transition.token;
        self.transition.pending = Some(name);
        self.transition.visible = true;
        self.render.state_changed(StateChange::Animation);

        let gate = Arc::clone(&self.gate);
        let events = self.events.clone();
        self.tasks.spawn(async move {
            gate.play().await;
            post(&events, AppEvent::AnimationDone { token });
        });
    }

    fn on_animation_done(&mut self, token: u64) -> bool {
        if token != self.transition.token {
            return false;
        }
        self.transition.visible = false;
        if let Some(name) = self.transition.pending.take() {
            self.navigator.navigate(Route::Detail(name));
        }
        true
    }

    fn reap_finished(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }

    #[cfg(test)]
    pub(crate) fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn shutdown(&mut self) {
        log::debug!("Shutting down gallery");
        self.tasks.abort_all();
        self.search.shutdown();
        self.modal.shutdown();
        self.transition = TransitionState::default();
        self.list_loading = false;
    }

    pub fn list(&self) -> &[Pokemon] {
        &self.list
    }

    pub fn is_loading(&self) -> bool {
        self.list_loading
    }

    /// Search results while a query is active, otherwise the random list.
    pub fn displayed(&self) -> &[Pokemon] {
        let search = self.search.state();
        if search.query.is_empty() {
            &self.list
        } else {
            &search.results
        }
    }

    pub fn search(&self) -> &SearchState {
        self.search.state()
    }

    pub fn modal(&self) -> &RouteModalMachine {
        &self.modal
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.favorites.is_favorite(id)
    }

    pub fn show_animation(&self) -> bool {
        self.transition.visible
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogApi> {
        &self.catalog
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }
}
