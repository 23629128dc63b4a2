use crate::error::AppResult;
use crate::navigation::Route;
use crate::state::AppState;

use super::home::truncate_with_ellipsis;

pub const PREVIEW_MAX_CHARS: usize = 30;
const UNTITLED: &str = "New Chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub conversation_id: i64,
    pub preview: String,
    pub route: Route,
    pub active: bool,
}

/// Recent conversations plus the fixed links.
pub struct SidebarView {
    state: AppState,
}

impl SidebarView {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn load(&self) -> AppResult<()> {
        self.state.cache.conversations(&self.state.api).await?;
        Ok(())
    }

    pub fn entries(&self) -> Vec<SidebarEntry> {
        let current = self.state.navigator.current().conversation_id();
        self.state
            .cache
            .cached_conversations()
            .unwrap_or_default()
            .into_iter()
            .map(|c| {
                let title = c.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(UNTITLED);
                SidebarEntry {
                    conversation_id: c.id,
                    preview: truncate_with_ellipsis(title, PREVIEW_MAX_CHARS),
                    route: Route::conversation(c.id),
                    active: current == Some(c.id),
                }
            })
            .collect()
    }

    pub fn links(&self) -> [(&'static str, Route); 3] {
        [
            ("New Chat", Route::home()),
            ("All Notes", Route::Notes),
            ("Saved URLs", Route::Urls),
        ]
    }
}
