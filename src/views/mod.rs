pub mod home;
pub mod notes;
pub mod sidebar;
pub mod urls;

use crate::cache::CacheKey;
use crate::error::{AppError, AppResult};
use crate::models::item::{KnowledgeItem, SourceTag};
use crate::state::AppState;

/// Result of submitting a note or URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Blank input, nothing sent.
    Ignored,
    /// A previous submission is still pending; nothing sent.
    Busy,
    /// Rejected client-side; nothing sent.
    Invalid(String),
    Saved,
    /// The backend answered `success: false`.
    Rejected(String),
    /// Transport failure.
    Failed(String),
}

/// Toast copy for one kind of item.
pub(crate) struct IngestLabels {
    pub success_title: &'static str,
    pub success_description: &'static str,
    pub failure_title: &'static str,
    pub failure_fallback: &'static str,
}

/// Source-filtered listing shared by the notes and URL pages.
pub struct ItemList {
    state: AppState,
    source: SourceTag,
    expanded: Option<i64>,
    load_error: Option<String>,
}

impl ItemList {
    pub fn new(state: AppState, source: SourceTag) -> Self {
        Self {
            state,
            source,
            expanded: None,
            load_error: None,
        }
    }

    pub fn source(&self) -> SourceTag {
        self.source
    }

    pub fn items(&self) -> Vec<KnowledgeItem> {
        self.state.cache.cached_items(self.source).unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.load_error.is_none() && !self.state.cache.contains(&CacheKey::Items(self.source))
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub async fn load(&mut self) -> AppResult<()> {
        match self.state.cache.items(&self.state.api, self.source).await {
            Ok(_) => {
                self.load_error = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {} items: {}", self.source, e);
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Show the full content of one item.
    pub fn expand(&mut self, id: i64) -> Option<KnowledgeItem> {
        let item = self.items().into_iter().find(|i| i.id == id);
        self.expanded = item.as_ref().map(|i| i.id);
        item
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    pub fn expanded(&self) -> Option<KnowledgeItem> {
        let id = self.expanded?;
        self.items().into_iter().find(|i| i.id == id)
    }

    /// Send content to ingest, toast the outcome, and refresh the list on success.
    pub(crate) async fn ingest(&mut self, content: &str, labels: &IngestLabels) -> IngestOutcome {
        let toasts = self.state.toasts.clone();
        let response = match self.state.api.ingest(self.source, content).await {
            Ok(resp) => resp,
            Err(e) => {
                toasts.error(labels.failure_title, Some(&e.to_string()));
                return IngestOutcome::Failed(e.to_string());
            }
        };

        match response.into_result() {
            Ok(_) => {
                toasts.success(labels.success_title, Some(labels.success_description));
                self.state.cache.invalidate(&CacheKey::Items(self.source));
                if let Err(e) = self.load().await {
                    toasts.error("Failed to refresh list", Some(&e.to_string()));
                }
                IngestOutcome::Saved
            }
            Err(AppError::Rejected(message)) => {
                let description = if message.is_empty() {
                    labels.failure_fallback.to_string()
                } else {
                    message
                };
                toasts.error(labels.failure_title, Some(&description));
                IngestOutcome::Rejected(description)
            }
            Err(e) => {
                toasts.error(labels.failure_title, Some(&e.to_string()));
                IngestOutcome::Failed(e.to_string())
            }
        }
    }
}
