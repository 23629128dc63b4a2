//! Chat page view model.
//!
//! Each question goes through one exchange: `Idle -> Pending` on submit, then
//! back to `Idle` when the query resolves, is cancelled, or the conversation
//! changes underneath it. While pending, the optimistic user message and a
//! loading placeholder are shown after the server's messages.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::cache::CacheKey;
use crate::error::{AppError, AppResult};
use crate::models::message::ChatMessage;
use crate::models::query::{QueryAnswer, QueryRequest};
use crate::navigation::Route;
use crate::state::AppState;

pub const TITLE_MAX_CHARS: usize = 60;

#[derive(Debug)]
pub struct PendingExchange {
    pub id: Uuid,
    /// Exactly what the user submitted, restored on failure.
    pub question: String,
    pub conversation_id: Option<i64>,
    pub user_message: ChatMessage,
    pub placeholder: ChatMessage,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
pub enum Exchange {
    #[default]
    Idle,
    Pending(PendingExchange),
}

/// Everything needed to run the query for a pending exchange.
#[derive(Debug, Clone)]
pub struct QueryTicket {
    pub exchange_id: Uuid,
    pub request: QueryRequest,
    pub cancel: CancellationToken,
}

impl QueryTicket {
    pub async fn run(self, api: &ApiClient) -> QueryCompletion {
        let result = api.query(&self.request, Some(self.cancel)).await;
        QueryCompletion {
            exchange_id: self.exchange_id,
            result,
        }
    }
}

#[derive(Debug)]
pub struct QueryCompletion {
    pub exchange_id: Uuid,
    pub result: AppResult<QueryAnswer>,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// A query is already in flight.
    Busy,
    Started(QueryTicket),
}

pub struct ConversationView {
    state: AppState,
    input: String,
    conversation_id: Option<i64>,
    exchange: Exchange,
    load_error: Option<String>,
}

impl ConversationView {
    pub fn new(state: AppState) -> Self {
        let conversation_id = state.navigator.current().conversation_id();
        Self {
            state,
            input: String::new(),
            conversation_id,
            exchange: Exchange::Idle,
            load_error: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation_id
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.exchange, Exchange::Pending(_))
    }

    pub fn optimistic_messages(&self) -> Vec<&ChatMessage> {
        match &self.exchange {
            Exchange::Pending(p) => vec![&p.user_message, &p.placeholder],
            Exchange::Idle => Vec::new(),
        }
    }

    /// Messages the server has confirmed for the current conversation.
    pub fn server_messages(&self) -> Vec<ChatMessage> {
        self.conversation_id
            .and_then(|id| self.state.cache.cached_conversation(id))
            .map(|c| c.messages)
            .unwrap_or_default()
    }

    /// Server messages first, then any optimistic ones.
    pub fn display_messages(&self) -> Vec<ChatMessage> {
        let mut messages = self.server_messages();
        messages.extend(self.optimistic_messages().into_iter().cloned());
        messages
    }

    /// True while a conversation id is set, its messages are not cached yet
    /// and the last fetch did not fail.
    pub fn is_loading_conversation(&self) -> bool {
        match self.conversation_id {
            Some(id) => {
                self.load_error.is_none() && !self.state.cache.contains(&CacheKey::Conversation(id))
            }
            None => false,
        }
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// First message of the conversation, shortened for a header.
    pub fn title(&self) -> Option<String> {
        self.server_messages()
            .first()
            .map(|m| truncate_with_ellipsis(&m.content, TITLE_MAX_CHARS))
    }

    /// Fetch the current conversation into the cache, if there is one.
    pub async fn load(&mut self) -> AppResult<()> {
        let Some(id) = self.conversation_id else {
            return Ok(());
        };
        match self.state.cache.conversation(&self.state.api, id).await {
            Ok(_) => {
                self.load_error = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load conversation {}: {}", id, e);
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Start an exchange for the current input.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.input.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }
        if self.is_processing() {
            log::warn!("Submit rejected: a query is already in flight");
            self.state.toasts.warning(
                "Please wait",
                Some("The assistant is still answering your previous question."),
            );
            return SubmitOutcome::Busy;
        }

        let question = std::mem::take(&mut self.input);
        let pending = PendingExchange {
            id: Uuid::new_v4(),
            user_message: ChatMessage::optimistic_user(&question),
            placeholder: ChatMessage::optimistic_placeholder(),
            conversation_id: self.conversation_id,
            question: question.clone(),
            cancel: CancellationToken::new(),
        };
        let ticket = QueryTicket {
            exchange_id: pending.id,
            request: QueryRequest {
                question,
                conversation_id: self.conversation_id,
            },
            cancel: pending.cancel.clone(),
        };
        log::debug!("Exchange {} pending", pending.id);
        self.exchange = Exchange::Pending(pending);
        SubmitOutcome::Started(ticket)
    }

    /// Apply the outcome of a query. Completions for an exchange that is no
    /// longer pending are dropped.
    pub async fn complete(&mut self, completion: QueryCompletion) {
        let pending = match std::mem::take(&mut self.exchange) {
            Exchange::Pending(p) if p.id == completion.exchange_id => p,
            other => {
                log::debug!("Ignoring completion for stale exchange {}", completion.exchange_id);
                self.exchange = other;
                return;
            }
        };

        match completion.result {
            Ok(answer) => self.on_success(pending, answer).await,
            Err(e) => self.on_error(pending, e),
        }
    }

    async fn on_success(&mut self, pending: PendingExchange, answer: QueryAnswer) {
        let cache = &self.state.cache;
        match (pending.conversation_id, answer.conversation_id) {
            (Some(existing), _) => {
                cache.invalidate(&CacheKey::Conversation(existing));
            }
            (None, Some(created)) => {
                log::info!("Adopting new conversation {}", created);
                self.state.navigator.replace(Route::conversation(created));
                self.conversation_id = Some(created);
                cache.invalidate(&CacheKey::Conversations);
            }
            (None, None) => {
                log::warn!("Query succeeded without a conversation id");
            }
        }

        if let Err(e) = self.load().await {
            self.state
                .toasts
                .error("Failed to load conversation", Some(&e.to_string()));
        }
    }

    fn on_error(&mut self, pending: PendingExchange, error: AppError) {
        if error.is_cancellation() {
            log::info!("Exchange {} aborted: {}", pending.id, error);
        } else {
            log::error!("Exchange {} failed: {}", pending.id, error);
        }
        self.input = pending.question;
        let toasts = &self.state.toasts;
        match error {
            AppError::Cancelled => toasts.info("Request cancelled", None),
            AppError::Timeout => toasts.error(
                "Request timeout",
                Some("The assistant took too long to respond. Please try again."),
            ),
            other => toasts.error("Failed to get a response", Some(&other.to_string())),
        }
    }

    /// Abort the in-flight query and put the question back into the input.
    pub fn cancel(&mut self) {
        if let Exchange::Pending(pending) = std::mem::take(&mut self.exchange) {
            log::info!("Cancelling exchange {}", pending.id);
            pending.cancel.cancel();
            self.input = pending.question;
            self.state.toasts.info("Request cancelled", None);
        }
    }

    /// Drop any in-flight exchange without touching the input.
    fn abandon_exchange(&mut self) {
        if let Exchange::Pending(pending) = std::mem::take(&mut self.exchange) {
            log::debug!("Abandoning exchange {}", pending.id);
            pending.cancel.cancel();
        }
    }

    pub fn new_chat(&mut self) {
        self.abandon_exchange();
        self.state.navigator.navigate(Route::home());
        self.conversation_id = None;
        self.load_error = None;
        self.input.clear();
    }

    /// Navigate to another conversation (or none).
    pub fn open(&mut self, conversation_id: Option<i64>) {
        let route = match conversation_id {
            Some(id) => Route::conversation(id),
            None => Route::home(),
        };
        self.state.navigator.navigate(route);
        self.sync_route();
    }

    /// Pick up the conversation id from navigation. A change always clears
    /// optimistic state, even mid-flight.
    pub fn sync_route(&mut self) {
        let Route::Home { conversation } = self.state.navigator.current() else {
            return;
        };
        if conversation != self.conversation_id {
            log::debug!("Conversation changed {:?} -> {:?}", self.conversation_id, conversation);
            self.abandon_exchange();
            self.conversation_id = conversation;
            self.load_error = None;
        }
    }
}

pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
