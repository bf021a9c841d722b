//! URL surface of the gallery and an in-memory history navigator.
//!
//! `/` shows the list and `/pokemon/{name}` opens the detail overlay over it.
//! `/record/{name}` is accepted as an alias. Anything else redirects to `/`.

use crate::events::{post, AppEvent, EventSender};
use std::fmt;
use std::sync::{Arc, Mutex};

const DETAIL_PREFIXES: [&str; 2] = ["pokemon", "record"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    Detail(String),
}

/// Outcome of matching a raw path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Matched(Route),
    /// Unmatched path; the navigator replaces it with the root
    Redirect,
}

impl Route {
    pub fn detail(name: impl Into<String>) -> Self {
        Route::Detail(name.into())
    }

    pub fn parse(path: &str) -> RouteMatch {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => RouteMatch::Matched(Route::List),
            [prefix, name] if DETAIL_PREFIXES.iter().any(|p| prefix.eq_ignore_ascii_case(p)) => {
                RouteMatch::Matched(Route::Detail(name.to_string()))
            }
            _ => RouteMatch::Redirect,
        }
    }

    /// The name path parameter, if any.
    pub fn name_param(&self) -> Option<&str> {
        match self {
            Route::List => None,
            Route::Detail(name) => Some(name),
        }
    }

    /// Whether this route names `name` (case-insensitive).
    pub fn names(&self, name: &str) -> bool {
        self.name_param()
            .is_some_and(|param| param.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::List => write!(f, "/"),
            Route::Detail(name) => write!(f, "/pokemon/{}", name),
        }
    }
}

/// The navigable URL. Every change is reported to the event loop as
/// `AppEvent::Navigated`, never synchronously.
pub trait Navigator: Send + Sync {
    fn current(&self) -> Route;
    fn navigate(&self, route: Route);
    fn replace(&self, route: Route);
}

#[derive(Debug)]
struct History {
    entries: Vec<Route>,
    index: usize,
}

/// Browser-like history: a stack of routes with back/forward.
#[derive(Clone)]
pub struct HistoryNavigator {
    history: Arc<Mutex<History>>,
    events: EventSender,
}

impl HistoryNavigator {
    pub fn new(initial: Route, events: EventSender) -> Self {
        Self {
            history: Arc::new(Mutex::new(History {
                entries: vec![initial],
                index: 0,
            })),
            events,
        }
    }

    /// Start from a raw path, as when the app is loaded from a deep link.
    pub fn from_path(path: &str, events: EventSender) -> Self {
        match Route::parse(path) {
            RouteMatch::Matched(route) => Self::new(route, events),
            RouteMatch::Redirect => {
                log::info!("No route matches '{}'; redirecting to /", path);
                Self::new(Route::List, events)
            }
        }
    }

    /// Navigate to a raw path; unmatched paths push the root instead.
    pub fn navigate_path(&self, path: &str) {
        match Route::parse(path) {
            RouteMatch::Matched(route) => self.navigate(route),
            RouteMatch::Redirect => {
                log::info!("No route matches '{}'; redirecting to /", path);
                self.navigate(Route::List);
            }
        }
    }

    pub fn back(&self) -> bool {
        self.step(-1)
    }

    pub fn forward(&self) -> bool {
        self.step(1)
    }

    pub fn len(&self) -> usize {
        self.with_history(|h| h.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn step(&self, delta: isize) -> bool {
        let moved = self.with_history(|h| {
            let target = h.index as isize + delta;
            if target < 0 || target >= h.entries.len() as isize {
                return None;
            }
            h.index = target as usize;
            Some(h.entries[h.index].clone())
        });

        match moved {
            Some(route) => {
                post(&self.events, AppEvent::Navigated(route));
                true
            }
            None => false,
        }
    }

    fn with_history<T>(&self, f: impl FnOnce(&mut History) -> T) -> T {
        let mut history = match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut history)
    }
}

impl Navigator for HistoryNavigator {
    fn current(&self) -> Route {
        self.with_history(|h| h.entries[h.index].clone())
    }

    fn navigate(&self, route: Route) {
        self.with_history(|h| {
            h.entries.truncate(h.index + 1);
            h.entries.push(route.clone());
            h.index = h.entries.len() - 1;
        });
        log::debug!("Navigated to {}", route);
        post(&self.events, AppEvent::Navigated(route));
    }

    fn replace(&self, route: Route) {
        self.with_history(|h| h.entries[h.index] = route.clone());
        post(&self.events, AppEvent::Navigated(route));
    }
}
