use crate::models::item::{KnowledgeItem, SourceTag};
use crate::state::AppState;
use crate::validation;

use super::{IngestLabels, IngestOutcome, ItemList};

const NOTE_LABELS: IngestLabels = IngestLabels {
    success_title: "Note added successfully!",
    success_description: "The note has been saved to the knowledge base.",
    failure_title: "Failed to add note",
    failure_fallback: "Something went wrong while saving the note.",
};

pub struct NotesView {
    state: AppState,
    list: ItemList,
    input: String,
    is_pending: bool,
}

impl NotesView {
    pub fn new(state: AppState) -> Self {
        Self {
            list: ItemList::new(state.clone(), SourceTag::Note),
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

    pub fn notes(&self) -> Vec<KnowledgeItem> {
        self.list.items()
    }

    /// Validate and ingest the current input. The input is kept unless the
    /// note was saved.
    pub async fn submit(&mut self) -> IngestOutcome {
        if self.input.trim().is_empty() {
            return IngestOutcome::Ignored;
        }
        if self.is_pending {
            self.state
                .toasts
                .warning("Please wait", Some("The previous note is still being saved."));
            return IngestOutcome::Busy;
        }
        let content = match validation::validate_note(&self.input) {
            Ok(content) => content.to_string(),
            Err(e) => {
                self.state.toasts.warning("Note is too short", Some(&e.to_string()));
                return IngestOutcome::Invalid(e.to_string());
            }
        };

        self.is_pending = true;
        let outcome = self.list.ingest(&content, &NOTE_LABELS).await;
        self.is_pending = false;

        if outcome == IngestOutcome::Saved {
            self.input.clear();
        }
        outcome
    }
}
