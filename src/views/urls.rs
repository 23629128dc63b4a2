use crate::models::item::{KnowledgeItem, SourceTag};
use crate::state::AppState;
use crate::validation::{self, UrlFeedback};

use super::{IngestLabels, IngestOutcome, ItemList};

const URL_LABELS: IngestLabels = IngestLabels {
    success_title: "URL added successfully!",
    success_description: "The URL has been saved to the knowledge base.",
    failure_title: "Failed to add URL",
    failure_fallback: "Something went wrong while saving the URL.",
};

pub struct UrlsView {
    state: AppState,
    list: ItemList,
    input: String,
    is_pending: bool,
}

impl UrlsView {
    pub fn new(state: AppState) -> Self {
        Self {
            list: ItemList::new(state.clone(), SourceTag::Url),
            state,
            input: String::new(),
            is_pending: false,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_pending(&self) -> bool {
        self.is_pending
    }

    pub fn list(&self) -> &ItemList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ItemList {
        &mut self.list
    }

    pub fn urls(&self) -> Vec<KnowledgeItem> {
        self.list.items()
    }

    /// Inline validation message for the current input.
    pub fn feedback(&self) -> UrlFeedback {
        validation::url_feedback(&self.input)
    }

    /// Validate, normalize and ingest the current input.
    pub async fn submit(&mut self) -> IngestOutcome {
        if self.input.trim().is_empty() {
            return IngestOutcome::Ignored;
        }
        if self.is_pending {
            self.state
                .toasts
                .warning("Please wait", Some("The previous URL is still being saved."));
            return IngestOutcome::Busy;
        }
        let url = match validation::validate_url(&self.input).into_result() {
            Ok(url) => url,
            Err(e) => {
                self.state.toasts.warning("Invalid URL", Some(&e.to_string()));
                return IngestOutcome::Invalid(e.to_string());
            }
        };

        self.is_pending = true;
        let outcome = self.list.ingest(&url, &URL_LABELS).await;
        self.is_pending = false;

        if outcome == IngestOutcome::Saved {
            self.input.clear();
        }
        outcome
    }
}
