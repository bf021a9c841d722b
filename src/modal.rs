//! Route-synchronized detail overlay.
//!
//! The machine keeps the overlay consistent with the URL's name parameter in
//! both directions:
//!
//! * URL gains a name: resolve the record, then open the overlay, unless an
//!   overlay for that name is already open or resolving.
//! * URL loses the name: close the overlay.
//! * The user dismisses the overlay: navigate back to the root.
//!
//! Fetches carry a generation number and overlays carry an id, so results for
//! superseded navigations and close notifications for replaced overlays are
//! ignored when they arrive.

use crate::catalog::CatalogApi;
use crate::errors::CatalogResult;
use crate::events::{post, AppEvent, EventSender};
use crate::routing::{Navigator, Route};
use schema::Pokemon;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

/// What an overlay displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContent {
    pub record: Pokemon,
}

/// A live overlay instance.
pub trait OverlayHandle: Send {
    /// Close programmatically. Closing twice is a no-op.
    fn close(&self);
    /// Register a callback that runs once when the overlay closes, whether the
    /// user dismissed it or `close` was called.
    fn on_closed(&self, callback: Box<dyn FnOnce() + Send>);
}

/// The UI layer's dialog service.
pub trait ModalController: Send {
    fn open(&mut self, content: OverlayContent) -> Box<dyn OverlayHandle>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalRouteState {
    Closed,
    Resolving(String),
    Open(Pokemon),
}

struct ActiveOverlay {
    id: u64,
    /// Name as it appeared in the URL (may differ from the record name, e.g. "25")
    requested: String,
    handle: Box<dyn OverlayHandle>,
}

impl ActiveOverlay {
    fn shows(&self, record: &Pokemon, name: &str) -> bool {
        self.requested.eq_ignore_ascii_case(name) || record.name.eq_ignore_ascii_case(name)
    }
}

pub struct RouteModalMachine {
    state: ModalRouteState,
    overlay: Option<ActiveOverlay>,
    generation: u64,
    next_overlay_id: u64,
    catalog: Arc<dyn CatalogApi>,
    navigator: Arc<dyn Navigator>,
    controller: Box<dyn ModalController>,
    events: EventSender,
    tasks: JoinSet<()>,
}

impl RouteModalMachine {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        navigator: Arc<dyn Navigator>,
        controller: Box<dyn ModalController>,
        events: EventSender,
    ) -> Self {
        Self {
            state: ModalRouteState::Closed,
            overlay: None,
            generation: 0,
            next_overlay_id: 0,
            catalog,
            navigator,
            controller,
            events,
            tasks: JoinSet::new(),
        }
    }

    pub fn state(&self) -> &ModalRouteState {
        &self.state
    }

    pub fn open_record(&self) -> Option<&Pokemon> {
        match &self.state {
            ModalRouteState::Open(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self.state, ModalRouteState::Resolving(_))
    }

    /// React to the URL. Returns whether the visible state changed.
    pub fn on_route(&mut self, route: &Route) -> bool {
        self.reap_finished();

        let Some(name) = route.name_param() else {
            // Any in-flight fetch is now stale.
            self.generation += 1;
            let changed = self.state != ModalRouteState::Closed;
            self.close_overlay();
            self.state = ModalRouteState::Closed;
            return changed;
        };

        match (&self.state, &self.overlay) {
            (ModalRouteState::Open(record), Some(active)) if active.shows(record, name) => {
                return false;
            }
            (ModalRouteState::Resolving(pending), _) if pending.eq_ignore_ascii_case(name) => {
                return false;
            }
            _ => {}
        }

        // Close-then-open: the old overlay is gone before the new fetch starts.
        self.close_overlay();
        self.begin_resolving(name);
        true
    }

    fn begin_resolving(&mut self, name: &str) {
        self.generation += 1;
        let generation = self.generation;
        self.state = ModalRouteState::Resolving(name.to_string());
        log::debug!("Resolving '{}' (generation {})", name, generation);

        let catalog = Arc::clone(&self.catalog);
        let events = self.events.clone();
        let name = name.to_string();
        self.tasks.spawn(async move {
            let result = catalog.get_record(&name).await;
            post(
                &events,
                AppEvent::RecordFetched {
                    generation,
                    name,
                    result,
                },
            );
        });
    }

    /// Apply a finished fetch. Returns whether the visible state changed.
    pub fn on_record_fetched(
        &mut self,
        generation: u64,
        name: &str,
        result: CatalogResult<Pokemon>,
    ) -> bool {
        if generation != self.generation {
            log::debug!(
                "Discarding superseded result for '{}' (generation {} != {})",
                name,
                generation,
                self.generation
            );
            return false;
        }
        if !self.navigator.current().names(name) {
            log::debug!("URL no longer names '{}'; discarding result", name);
            return false;
        }

        match result {
            Ok(record) => {
                self.open_overlay(name, record);
                true
            }
            Err(e) => {
                if e.is_not_found() {
                    log::warn!("Pokemon '{}' not found. Redirecting to /", name);
                } else {
                    log::error!("Failed to load '{}': {}. Redirecting to /", name, e);
                }
                self.state = ModalRouteState::Closed;
                self.navigator.replace(Route::List);
                true
            }
        }
    }

    fn open_overlay(&mut self, requested: &str, record: Pokemon) {
        self.close_overlay();

        self.next_overlay_id += 1;
        let id = self.next_overlay_id;
        let handle = self.controller.open(OverlayContent {
            record: record.clone(),
        });
        let events = self.events.clone();
        handle.on_closed(Box::new(move || {
            post(&events, AppEvent::OverlayClosed { overlay_id: id });
        }));

        log::info!("Opened overlay #{} for '{}'", id, record.name);
        self.overlay = Some(ActiveOverlay {
            id,
            requested: requested.to_string(),
            handle,
        });
        self.state = ModalRouteState::Open(record);
    }

    /// An overlay reported closing. Only the current overlay counts: closes
    /// caused by this machine (URL change, replacement) arrive with a stale id.
    pub fn on_overlay_closed(&mut self, overlay_id: u64) -> bool {
        if !self
            .overlay
            .as_ref()
            .is_some_and(|active| active.id == overlay_id)
        {
            return false;
        }

        log::debug!("Overlay #{} dismissed", overlay_id);
        self.overlay = None;
        self.generation += 1;
        self.state = ModalRouteState::Closed;

        if self.navigator.current().name_param().is_some() {
            self.navigator.navigate(Route::List);
        }
        true
    }

    fn close_overlay(&mut self) {
        if let Some(active) = self.overlay.take() {
            log::debug!("Closing overlay #{}", active.id);
            active.handle.close();
        }
    }

    fn reap_finished(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }

    /// Tear down: abort in-flight fetches and close the overlay.
    pub fn shutdown(&mut self) {
        self.tasks.abort_all();
        self.generation += 1;
        self.close_overlay();
        self.state = ModalRouteState::Closed;
    }
}

impl Drop for RouteModalMachine {
    fn drop(&mut self) {
        self.close_overlay();
    }
}

/// One operation observed by a `HeadlessModal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOp {
    Opened { id: u64, name: String },
    Closed { id: u64, by_user: bool },
}

#[derive(Default)]
struct HeadlessInner {
    next_id: u64,
    visible: Vec<(u64, OverlayContent)>,
    callbacks: Vec<(u64, Box<dyn FnOnce() + Send>)>,
    ops: Vec<ModalOp>,
    max_visible: usize,
}

impl HeadlessInner {
    /// Mark `id` closed and hand back its callback, if any.
    fn close(&mut self, id: u64, by_user: bool) -> Option<Box<dyn FnOnce() + Send>> {
        let position = self.visible.iter().position(|(open_id, _)| *open_id == id)?;
        self.visible.remove(position);
        self.ops.push(ModalOp::Closed { id, by_user });
        let callback = self.callbacks.iter().position(|(cb_id, _)| *cb_id == id)?;
        Some(self.callbacks.remove(callback).1)
    }
}

/// A dialog service without a screen: it tracks open overlays and lets the
/// caller dismiss them as a user would. The terminal frontend renders from it.
#[derive(Clone, Default)]
pub struct HeadlessModal {
    inner: Arc<Mutex<HeadlessInner>>,
}

impl HeadlessModal {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut HeadlessInner) -> T) -> T {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut inner)
    }

    /// Contents of the overlays currently visible, oldest first.
    pub fn visible(&self) -> Vec<OverlayContent> {
        self.with_inner(|inner| inner.visible.iter().map(|(_, c)| c.clone()).collect())
    }

    /// The most overlays that were ever visible at the same time.
    pub fn max_visible(&self) -> usize {
        self.with_inner(|inner| inner.max_visible)
    }

    pub fn ops(&self) -> Vec<ModalOp> {
        self.with_inner(|inner| inner.ops.clone())
    }

    /// Dismiss the top overlay as the user would. Returns whether one was open.
    pub fn dismiss(&self) -> bool {
        let callback = self.with_inner(|inner| {
            let id = inner.visible.last().map(|(id, _)| *id)?;
            Some(inner.close(id, true))
        });
        match callback {
            Some(Some(callback)) => {
                callback();
                true
            }
            Some(None) => true,
            None => false,
        }
    }
}

impl ModalController for HeadlessModal {
    fn open(&mut self, content: OverlayContent) -> Box<dyn OverlayHandle> {
        let id = self.with_inner(|inner| {
            inner.next_id += 1;
            let id = inner.next_id;
            inner.ops.push(ModalOp::Opened {
                id,
                name: content.record.name.clone(),
            });
            inner.visible.push((id, content));
            inner.max_visible = inner.max_visible.max(inner.visible.len());
            id
        });
        Box::new(HeadlessHandle {
            id,
            modal: self.clone(),
        })
    }
}

struct HeadlessHandle {
    id: u64,
    modal: HeadlessModal,
}

impl OverlayHandle for HeadlessHandle {
    fn close(&self) {
        // The callback runs after the lock is released.
        if let Some(callback) = self.modal.with_inner(|inner| inner.close(self.id, false)) {
            callback();
        }
    }

    fn on_closed(&self, callback: Box<dyn FnOnce() + Send>) {
        let already_closed = self.modal.with_inner(|inner| {
            // Ids are only handed out by `open`, so one not visible is closed.
            if !inner.visible.iter().any(|(open_id, _)| *open_id == self.id) {
                Some(callback)
            } else {
                inner.callbacks.push((self.id, callback));
                None
            }
        });
        if let Some(callback) = already_closed {
            callback();
        }
    }
}
