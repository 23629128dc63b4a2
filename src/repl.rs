//! Interactive terminal loop.
//!
//! User lines and query completions are multiplexed with `tokio::select!`.
//! A question is sent from a spawned task so the user can keep typing
//! (`/cancel`, `/new`, `/open`) while the answer is pending; its completion
//! comes back over a channel and is applied to the chat view.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::error::AppResult;
use crate::navigation::Route;
use crate::render;
use crate::state::AppState;
use crate::views::home::{ConversationView, QueryCompletion, SubmitOutcome};
use crate::views::notes::NotesView;
use crate::views::sidebar::SidebarView;
use crate::views::urls::UrlsView;
use crate::views::ItemList;

pub const HELP: &str = "\
Type a question to ask the assistant.
  /new            start a new chat
  /cancel         stop waiting for the current answer
  /open <id>      open a conversation
  /chats          list recent conversations
  /home           back to the current chat
  /back           previous page        /refresh       reload from the server
  /notes          list notes           /note <text>   add a note
  /urls           list saved URLs      /url <url>     add a URL
  /check <url>    preview URL validation
  /view <id>      show a note or URL in full (again to collapse)
  /help           this help            /quit          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    New,
    Cancel,
    Open(i64),
    Chats,
    Home,
    Back,
    Refresh,
    Notes,
    Urls,
    Note(String),
    Url(String),
    Check(String),
    View(i64),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Command::Ask(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((n, a)) => (n, a.trim()),
        None => (rest, ""),
    };
    let id_arg = |usage: &str| match arg.parse::<i64>() {
        Ok(id) => Ok(id),
        Err(_) => Err(Command::Invalid(format!("Usage: {usage}"))),
    };

    match name {
        "new" => Command::New,
        "cancel" => Command::Cancel,
        "chats" => Command::Chats,
        "home" => Command::Home,
        "back" => Command::Back,
        "refresh" => Command::Refresh,
        "notes" => Command::Notes,
        "urls" => Command::Urls,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "note" => Command::Note(arg.to_string()),
        "url" => Command::Url(arg.to_string()),
        "check" => Command::Check(arg.to_string()),
        "open" => id_arg("/open <id>").map(Command::Open).unwrap_or_else(|e| e),
        "view" => id_arg("/view <id>").map(Command::View).unwrap_or_else(|e| e),
        other => Command::Invalid(format!("Unknown command '/{other}', try /help")),
    }
}

fn emit(text: &str) {
    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
}

pub struct Repl {
    state: AppState,
    home: ConversationView,
    notes: NotesView,
    urls: UrlsView,
    sidebar: SidebarView,
    completions: mpsc::UnboundedSender<QueryCompletion>,
}

impl Repl {
    pub fn new(state: AppState, completions: mpsc::UnboundedSender<QueryCompletion>) -> Self {
        Self {
            home: ConversationView::new(state.clone()),
            notes: NotesView::new(state.clone()),
            urls: UrlsView::new(state.clone()),
            sidebar: SidebarView::new(state.clone()),
            state,
            completions,
        }
    }

    pub fn home(&self) -> &ConversationView {
        &self.home
    }

    fn flush_toasts(&self) {
        for toast in self.state.toasts.drain() {
            println!("{}", render::render_toast(&toast));
        }
    }

    async fn show_home(&mut self) {
        if let Err(e) = self.home.load().await {
            self.state
                .toasts
                .error("Failed to load conversation", Some(&e.to_string()));
        }
        emit(&render::render_conversation(&self.home));
    }

    /// Route to the chat page, keeping the chat's conversation.
    fn enter_home(&mut self) {
        let route = Route::Home {
            conversation: self.home.conversation_id(),
        };
        self.state.navigator.navigate(route);
        self.home.sync_route();
    }

    async fn show_list(&mut self, source_route: Route) {
        self.state.navigator.navigate(source_route);
        let list = match source_route {
            Route::Urls => self.urls.list_mut(),
            _ => self.notes.list_mut(),
        };
        // Failures are kept on the list and rendered inline.
        let _ = list.load().await;
        emit(&render::render_items(list));
    }

    /// Render whatever page the navigator points at.
    async fn show_current(&mut self) {
        match self.state.navigator.current() {
            route @ (Route::Notes | Route::Urls) => self.show_list(route).await,
            Route::Home { .. } => {
                self.home.sync_route();
                self.show_home().await;
            }
        }
    }

    fn current_list(&mut self) -> Option<&mut ItemList> {
        match self.state.navigator.current() {
            Route::Notes => Some(self.notes.list_mut()),
            Route::Urls => Some(self.urls.list_mut()),
            Route::Home { .. } => None,
        }
    }

    fn ask(&mut self, question: String) {
        if !matches!(self.state.navigator.current(), Route::Home { .. }) {
            self.enter_home();
        }
        self.home.set_input(question);
        match self.home.submit() {
            SubmitOutcome::Started(ticket) => {
                let api = self.state.api.clone();
                let tx = self.completions.clone();
                tokio::spawn(async move {
                    let completion = ticket.run(&api).await;
                    if tx.send(completion).is_err() {
                        log::debug!("[Repl] Completion dropped, loop has exited");
                    }
                });
                emit(&render::render_conversation(&self.home));
            }
            SubmitOutcome::Busy | SubmitOutcome::Ignored => {}
        }
    }

    /// Apply one command. Returns `false` when the user asked to quit.
    pub async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Empty => {}
            Command::Ask(question) => self.ask(question),
            Command::New => {
                self.home.new_chat();
                emit(&render::render_conversation(&self.home));
            }
            Command::Cancel => {
                self.home.cancel();
                if !self.home.input().is_empty() {
                    println!("Restored: {}", self.home.input());
                }
            }
            Command::Open(id) => {
                self.home.open(Some(id));
                self.show_home().await;
            }
            Command::Home => {
                self.enter_home();
                self.show_home().await;
            }
            Command::Back => {
                if self.state.navigator.history_len() == 0 {
                    println!("Nothing to go back to");
                } else {
                    self.state.navigator.back();
                    self.show_current().await;
                }
            }
            Command::Refresh => {
                self.state.cache.clear();
                self.show_current().await;
            }
            Command::Chats => {
                if let Err(e) = self.sidebar.load().await {
                    self.state
                        .toasts
                        .error("Failed to load conversations", Some(&e.to_string()));
                }
                emit(&render::render_sidebar(&self.sidebar));
            }
            Command::Notes => self.show_list(Route::Notes).await,
            Command::Urls => self.show_list(Route::Urls).await,
            Command::Note(text) => {
                self.state.navigator.navigate(Route::Notes);
                self.notes.set_input(text);
                self.notes.submit().await;
                emit(&render::render_items(self.notes.list()));
            }
            Command::Url(text) => {
                self.state.navigator.navigate(Route::Urls);
                self.urls.set_input(text);
                if let Some(line) = render::render_url_feedback(&self.urls.feedback()) {
                    println!("{}", line);
                }
                self.urls.submit().await;
                emit(&render::render_items(self.urls.list()));
            }
            Command::Check(text) => {
                self.urls.set_input(text);
                match render::render_url_feedback(&self.urls.feedback()) {
                    Some(line) => println!("{}", line),
                    None => println!("Keep typing..."),
                }
            }
            Command::View(id) => match self.current_list() {
                Some(list) if list.expanded().is_some_and(|i| i.id == id) => {
                    list.collapse();
                    println!("Collapsed #{}", id);
                }
                Some(list) => match list.expand(id) {
                    Some(item) => emit(&render::render_item_detail(&item)),
                    None => println!("No item #{} on this page", id),
                },
                None => println!("Open /notes or /urls first"),
            },
            Command::Help => println!("{}", HELP),
            Command::Invalid(message) => println!("{}", message),
            Command::Quit => return false,
        }
        true
    }

    pub async fn apply_completion(&mut self, completion: QueryCompletion) {
        self.home.complete(completion).await;
        if matches!(self.state.navigator.current(), Route::Home { .. }) {
            emit(&render::render_conversation(&self.home));
        }
    }
}

/// Run the interactive loop on stdin until `/quit` or end of input.
pub async fn run(state: AppState) -> AppResult<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<QueryCompletion>();
    let mut repl = Repl::new(state.clone(), tx);

    println!("AI Knowledge Inbox ({})", state.api.base_url());
    println!("Type /help for commands.");
    repl.show_current().await;
    repl.flush_toasts();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    log::info!("[Repl] Started");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !repl.handle(parse_command(&line)).await {
                            break;
                        }
                    }
                    Ok(None) => {
                        log::info!("[Repl] stdin closed");
                        break;
                    }
                    Err(e) => {
                        log::error!("[Repl] Error reading stdin: {}", e);
                        return Err(e.into());
                    }
                }
            }
            Some(completion) = rx.recv() => {
                repl.apply_completion(completion).await;
            }
        }
        repl.flush_toasts();
    }

    repl.home.cancel();
    log::info!("[Repl] Stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_plain_question() {
        assert_eq!(
            parse_command("What is in my notes?\n"),
            Command::Ask("What is in my notes?".into())
        );
        assert_eq!(parse_command("   "), Command::Empty);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/new"), Command::New);
        assert_eq!(parse_command("/open 12"), Command::Open(12));
        assert_eq!(parse_command("/note buy a new kettle"), Command::Note("buy a new kettle".into()));
        assert_eq!(parse_command("/url   example.com "), Command::Url("example.com".into()));
        assert_eq!(parse_command("/view 3"), Command::View(3));
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert!(matches!(parse_command("/open twelve"), Command::Invalid(_)));
        assert!(matches!(parse_command("/frobnicate"), Command::Invalid(_)));
        assert_eq!(parse_command("/back"), Command::Back);
        assert_eq!(parse_command("/refresh"), Command::Refresh);
    }

    async fn notes_server(expected_fetches: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{"id": 4, "content": "Pick up dry cleaning", "title": "Errands", "url": null, "created_at": "2024-06-01T12:00:00Z", "updated_at": null}]
            })))
            .expect(expected_fetches)
            .mount(&server)
            .await;
        server
    }

    fn repl_for(server: &MockServer, route: Route) -> (AppState, Repl) {
        let settings = Settings { api_base_url: server.uri(), ..Settings::default() };
        let state = AppState::new(settings, route).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        (state.clone(), Repl::new(state, tx))
    }

    #[tokio::test]
    async fn test_view_toggles_item_detail() {
        let server = notes_server(1).await;
        let (_state, mut repl) = repl_for(&server, Route::home());

        assert!(repl.handle(Command::Notes).await);
        repl.handle(Command::View(4)).await;
        assert_eq!(repl.notes.list().expanded().map(|i| i.id), Some(4));
        repl.handle(Command::View(4)).await;
        assert!(repl.notes.list().expanded().is_none());
    }

    #[tokio::test]
    async fn test_back_returns_to_previous_page() {
        let server = notes_server(1).await;
        let (state, mut repl) = repl_for(&server, Route::home());

        repl.handle(Command::Back).await;
        assert_eq!(state.navigator.current(), Route::home());

        repl.handle(Command::Notes).await;
        repl.handle(Command::Back).await;
        assert_eq!(state.navigator.current(), Route::home());
        assert_eq!(state.navigator.history_len(), 0);
    }

    #[tokio::test]
    async fn test_refresh_refetches_current_page() {
        let server = notes_server(2).await;
        let (state, mut repl) = repl_for(&server, Route::Notes);

        repl.handle(Command::Notes).await;
        repl.handle(Command::Notes).await;
        repl.handle(Command::Refresh).await;
        assert_eq!(state.cache.cached_items(crate::models::item::SourceTag::Note).map(|i| i.len()), Some(1));
    }

    #[tokio::test]
    async fn test_question_completes_through_channel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/data/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"conversation_id": 77, "answer": "ok"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/data/conversations/77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": 77, "title": null, "messages": [], "created_at": "", "updated_at": ""}
            })))
            .mount(&server)
            .await;

        let settings = Settings { api_base_url: server.uri(), ..Settings::default() };
        let state = AppState::new(settings, Route::Notes).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut repl = Repl::new(state.clone(), tx);

        assert!(repl.handle(Command::Ask("hello there".into())).await);
        assert!(repl.home().is_processing());
        assert!(matches!(state.navigator.current(), Route::Home { .. }));

        let completion = rx.recv().await.unwrap();
        repl.apply_completion(completion).await;
        assert!(!repl.home().is_processing());
        assert_eq!(state.navigator.current(), Route::conversation(77));
    }

    #[tokio::test]
    async fn test_quit_stops_loop() {
        let state = AppState::new(Settings::default(), Route::home()).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut repl = Repl::new(state, tx);
        assert!(!repl.handle(Command::Quit).await);
    }
}
