//! Plain-text rendering of view state for the terminal.

use std::fmt::Write;

use crate::models::item::{KnowledgeItem, SourceTag};
use crate::models::message::ChatMessage;
use crate::toast::{Toast, ToastLevel};
use crate::validation::UrlFeedback;
use crate::views::home::{truncate_with_ellipsis, ConversationView};
use crate::views::sidebar::SidebarView;
use crate::views::ItemList;

const SKELETON_ROWS: usize = 3;
const SKELETON_ROW: &str = "  ░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░";
const CONTENT_PREVIEW_CHARS: usize = 160;
const DISCLAIMER: &str = "AI can make mistakes. Check important info.";

/// `YYYY-MM-DD` for RFC 3339 or `YYYY-MM-DD HH:MM:SS` timestamps, otherwise the input.
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}

pub fn render_message(message: &ChatMessage) -> String {
    let mut out = String::new();
    if message.is_user() {
        let _ = writeln!(out, "You: {}", message.content);
        return out;
    }

    if message.is_loading {
        let _ = writeln!(out, "Assistant: Thinking...");
        return out;
    }

    let _ = writeln!(out, "Assistant: {}", message.content);
    if !message.citations.is_empty() {
        let _ = writeln!(out, "  Sources ({})", message.citations.len());
        for citation in &message.citations {
            let _ = write!(out, "  [{}] {}", citation.number, citation.label());
            if let Some(url) = citation.url.as_deref().filter(|u| !u.is_empty()) {
                if citation.label() != url {
                    let _ = write!(out, " <{}>", url);
                }
            }
            if let Some(source_type) = &citation.source_type {
                let _ = write!(out, " ({})", source_type);
            }
            out.push('\n');
        }
    }
    out
}

pub fn render_conversation(view: &ConversationView) -> String {
    let mut out = String::new();
    if view.conversation_id().is_some() {
        let title = view.title().unwrap_or_else(|| "Chat".to_string());
        let _ = writeln!(out, "== {} ==  (/new for a new chat)", title);
    }

    let messages = view.display_messages();
    if view.is_loading_conversation() && messages.is_empty() {
        let _ = writeln!(out, "Loading conversation...");
    } else if messages.is_empty() {
        let _ = writeln!(out, "Start a conversation with AI");
    } else {
        for message in &messages {
            out.push_str(&render_message(message));
        }
    }

    if view.is_processing() {
        let _ = writeln!(out, "(waiting for the answer, /cancel to stop)");
    }
    let _ = writeln!(out, "{}", DISCLAIMER);
    out
}

pub fn render_skeleton() -> String {
    let mut out = String::new();
    for _ in 0..SKELETON_ROWS {
        let _ = writeln!(out, "{}", SKELETON_ROW);
    }
    out
}

fn render_item(out: &mut String, item: &KnowledgeItem, source: SourceTag) {
    let title = if item.title.is_empty() { "(untitled)" } else { &item.title };
    let _ = writeln!(out, "#{}  {}", item.id, title);
    let _ = writeln!(out, "    {}", truncate_with_ellipsis(&item.content, CONTENT_PREVIEW_CHARS));
    let _ = write!(out, "    {}", format_date(&item.created_at));
    if source == SourceTag::Url && !item.url.is_empty() {
        let _ = write!(out, "  Visit: {}", item.url);
    }
    let _ = writeln!(out, "  (/view {})", item.id);
}

pub fn render_items(list: &ItemList) -> String {
    let source = list.source();
    let (heading, noun, empty) = match source {
        SourceTag::Note => ("Your Notes", "notes", "No notes found. Create one above!"),
        SourceTag::Url => ("Your URLs", "URLs", "No URLs saved yet."),
    };

    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", heading);
    if list.is_loading() {
        out.push_str(&render_skeleton());
        return out;
    }
    if list.load_error().is_some() {
        let _ = writeln!(out, "Failed to load {}. Please try again later.", noun);
        return out;
    }

    let items = list.items();
    if items.is_empty() {
        let _ = writeln!(out, "{}", empty);
    }
    for item in &items {
        render_item(&mut out, item, source);
    }
    out
}

pub fn render_item_detail(item: &KnowledgeItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", item.title);
    if !item.url.is_empty() {
        let _ = writeln!(out, "{}", item.url);
    }
    let _ = writeln!(out, "{}", format_date(&item.created_at));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", item.content);
    out
}

pub fn render_sidebar(sidebar: &SidebarView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "AI Knowledge Inbox");
    for (label, route) in sidebar.links() {
        let _ = writeln!(out, "  {:<12} {}", label, route);
    }
    let entries = sidebar.entries();
    if !entries.is_empty() {
        let _ = writeln!(out, "Recent Chats");
        for entry in entries {
            let marker = if entry.active { '*' } else { ' ' };
            let _ = writeln!(out, " {} {:>4}  {}", marker, entry.conversation_id, entry.preview);
        }
    }
    out
}

pub fn render_url_feedback(feedback: &UrlFeedback) -> Option<String> {
    match feedback {
        UrlFeedback::None => None,
        UrlFeedback::Error(e) => Some(format!("! {}", e)),
        UrlFeedback::WillAdd(url) => Some(format!("Will add: {}", url)),
    }
}

pub fn render_toast(toast: &Toast) -> String {
    let tag = match toast.level {
        ToastLevel::Success => "ok",
        ToastLevel::Info => "info",
        ToastLevel::Warning => "warn",
        ToastLevel::Error => "error",
    };
    match &toast.description {
        Some(d) => format!("[{}] {} - {}", tag, toast.title, d),
        None => format!("[{}] {}", tag, toast.title),
    }
}
