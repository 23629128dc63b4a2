use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::config::Settings;
use crate::error::AppResult;
use crate::navigation::{Navigator, Route};
use crate::toast::Toaster;

/// Process-wide services, created once at start-up and handed to every view.
///
/// Every field is a cheap handle over shared state, so clones observe the
/// same cache, toast queue and route.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    /// HTTP client for the backend
    pub api: ApiClient,
    /// Server data keyed by query
    pub cache: QueryCache,
    /// Pending user notifications
    pub toasts: Toaster,
    /// Current route; the conversation id lives here
    pub navigator: Navigator,
}

impl AppState {
    pub fn new(settings: Settings, initial_route: Route) -> AppResult<Self> {
        let api = ApiClient::new(&settings)?;
        Ok(Self {
            settings,
            api,
            cache: QueryCache::new(),
            toasts: Toaster::new(),
            navigator: Navigator::new(initial_route),
        })
    }
}
