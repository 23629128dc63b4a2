use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The chat page; `None` is a new, unsaved conversation.
    Home { conversation: Option<i64> },
    Notes,
    Urls,
}

impl Route {
    pub fn home() -> Self {
        Route::Home { conversation: None }
    }

    pub fn conversation(id: i64) -> Self {
        Route::Home { conversation: Some(id) }
    }

    pub fn conversation_id(&self) -> Option<i64> {
        match self {
            Route::Home { conversation } => *conversation,
            _ => None,
        }
    }

    /// Parse `/`, `/?conversation=12`, `/notes` or `/urls`.
    pub fn parse(location: &str) -> AppResult<Self> {
        let (path, query) = match location.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (location, None),
        };
        match path.trim_end_matches('/') {
            "" => {
                let conversation = query
                    .into_iter()
                    .flat_map(|q| q.split('&'))
                    .filter_map(|pair| pair.split_once('='))
                    .find(|(k, _)| *k == "conversation")
                    .map(|(_, v)| {
                        v.parse::<i64>().map_err(|_| {
                            AppError::Validation(format!("Invalid conversation id '{v}'"))
                        })
                    })
                    .transpose()?;
                Ok(Route::Home { conversation })
            }
            "/notes" => Ok(Route::Notes),
            "/urls" => Ok(Route::Urls),
            other => Err(AppError::Validation(format!("Unknown route '{other}'"))),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Home { conversation: Some(id) } => write!(f, "/?conversation={id}"),
            Route::Home { conversation: None } => f.write_str("/"),
            Route::Notes => f.write_str("/notes"),
            Route::Urls => f.write_str("/urls"),
        }
    }
}

#[derive(Debug)]
struct NavState {
    current: Route,
    history: Vec<Route>,
}

/// Shared navigation state. `navigate` records history, `replace` does not.
#[derive(Debug, Clone)]
pub struct Navigator {
    inner: Arc<Mutex<NavState>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::home())
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            inner: Arc::new(Mutex::new(NavState {
                current: initial,
                history: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NavState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn current(&self) -> Route {
        self.lock().current
    }

    pub fn navigate(&self, route: Route) {
        let mut state = self.lock();
        if state.current != route {
            log::debug!("Navigate {} -> {}", state.current, route);
            let previous = state.current;
            state.history.push(previous);
            state.current = route;
        }
    }

    pub fn replace(&self, route: Route) {
        let mut state = self.lock();
        log::debug!("Replace {} -> {}", state.current, route);
        state.current = route;
    }

    /// Go back one entry; returns the new current route.
    pub fn back(&self) -> Route {
        let mut state = self.lock();
        if let Some(previous) = state.history.pop() {
            state.current = previous;
        }
        state.current
    }

    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }
}
