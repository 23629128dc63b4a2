use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub description: Option<String>,
}

/// Queue of user-facing notifications, drained by the front end after each action.
#[derive(Debug, Clone, Default)]
pub struct Toaster {
    queue: Arc<Mutex<VecDeque<Toast>>>,
}

impl Toaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: ToastLevel, title: &str, description: Option<&str>) {
        match level {
            ToastLevel::Success | ToastLevel::Info => {
                log::info!("[Toast] {}: {}", title, description.unwrap_or(""))
            }
            ToastLevel::Warning => log::warn!("[Toast] {}: {}", title, description.unwrap_or("")),
            ToastLevel::Error => log::error!("[Toast] {}: {}", title, description.unwrap_or("")),
        }
        let toast = Toast {
            level,
            title: title.to_string(),
            description: description.map(str::to_string),
        };
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(toast);
    }

    pub fn success(&self, title: &str, description: Option<&str>) {
        self.push(ToastLevel::Success, title, description);
    }

    pub fn info(&self, title: &str, description: Option<&str>) {
        self.push(ToastLevel::Info, title, description);
    }

    pub fn warning(&self, title: &str, description: Option<&str>) {
        self.push(ToastLevel::Warning, title, description);
    }

    pub fn error(&self, title: &str, description: Option<&str>) {
        self.push(ToastLevel::Error, title, description);
    }

    /// Remove and return every queued toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_order() {
        let toaster = Toaster::new();
        toaster.success("URL added successfully!", Some("Saved"));
        toaster.warning("Invalid URL", None);

        let toasts = toaster.drain();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].level, ToastLevel::Success);
        assert_eq!(toasts[0].description.as_deref(), Some("Saved"));
        assert_eq!(toasts[1].title, "Invalid URL");
        assert!(toaster.drain().is_empty());
    }

    #[test]
    fn test_shared_between_clones() {
        let toaster = Toaster::new();
        toaster.clone().error("Failed", None);
        assert_eq!(toaster.drain()[0].level, ToastLevel::Error);
    }
}
