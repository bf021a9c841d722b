//! Events and render notifications of the gallery event loop.
//!
//! Spawned work never touches orchestration state directly. It posts an
//! `AppEvent` back to the loop, and the owning component decides whether the
//! result is still current.

use crate::errors::CatalogResult;
use crate::routing::Route;
use schema::Pokemon;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum AppEvent {
    /// The navigable URL changed (navigation, redirect, back or forward)
    Navigated(Route),
    /// A modal record fetch finished
    RecordFetched {
        generation: u64,
        name: String,
        result: CatalogResult<Pokemon>,
    },
    /// An overlay reported that it closed, for whatever reason
    OverlayClosed { overlay_id: u64 },
    /// The list -> detail animation finished
    AnimationDone { token: u64 },
    /// A search value stayed unchanged for the whole quiet period
    SearchQuiet { generation: u64 },
    /// A search lookup finished; failures already resolved to an empty set
    SearchResolved {
        generation: u64,
        query: String,
        results: Vec<Pokemon>,
    },
    /// The initial random list finished loading
    RandomLoaded(CatalogResult<Vec<Pokemon>>),
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Post an event, ignoring a closed loop (the owner is gone).
pub(crate) fn post(events: &EventSender, event: AppEvent) {
    if events.send(event).is_err() {
        log::debug!("Event loop closed; dropping late event");
    }
}

/// What part of the visible state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChange {
    List,
    Search,
    Modal,
    Favorites,
    Animation,
}

/// Explicit "state changed, re-render" notification from the orchestrator.
pub trait RenderHook {
    fn state_changed(&mut self, change: StateChange);
}

/// Discards notifications.
pub struct NoRender;

impl RenderHook for NoRender {
    fn state_changed(&mut self, _change: StateChange) {}
}
