//! In-memory cache of server data, keyed the way views ask for it.
//!
//! Entries live until invalidated; an invalidated key is refetched on the
//! next read.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::ApiClient;
use crate::error::AppResult;
use crate::models::conversation::Conversation;
use crate::models::item::{KnowledgeItem, SourceTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Conversation(i64),
    Conversations,
    Items(SourceTag),
}

#[derive(Debug, Clone)]
pub enum CacheValue {
    Conversation(Conversation),
    Conversations(Vec<Conversation>),
    Items(Vec<KnowledgeItem>),
}

#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<CacheKey, CacheValue>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheValue>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn put(&self, key: CacheKey, value: CacheValue) {
        self.lock().insert(key, value);
    }

    pub fn invalidate(&self, key: &CacheKey) {
        if self.lock().remove(key).is_some() {
            log::debug!("Invalidated cache entry {:?}", key);
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn cached_conversation(&self, id: i64) -> Option<Conversation> {
        match self.get(&CacheKey::Conversation(id)) {
            Some(CacheValue::Conversation(c)) => Some(c),
            _ => None,
        }
    }

    pub fn cached_conversations(&self) -> Option<Vec<Conversation>> {
        match self.get(&CacheKey::Conversations) {
            Some(CacheValue::Conversations(list)) => Some(list),
            _ => None,
        }
    }

    pub fn cached_items(&self, source: SourceTag) -> Option<Vec<KnowledgeItem>> {
        match self.get(&CacheKey::Items(source)) {
            Some(CacheValue::Items(items)) => Some(items),
            _ => None,
        }
    }

    pub async fn conversation(&self, api: &ApiClient, id: i64) -> AppResult<Conversation> {
        if let Some(conv) = self.cached_conversation(id) {
            return Ok(conv);
        }
        let conv = api.fetch_conversation(id).await?;
        self.put(CacheKey::Conversation(id), CacheValue::Conversation(conv.clone()));
        Ok(conv)
    }

    pub async fn conversations(&self, api: &ApiClient) -> AppResult<Vec<Conversation>> {
        if let Some(list) = self.cached_conversations() {
            return Ok(list);
        }
        let list = api.list_conversations().await?;
        self.put(CacheKey::Conversations, CacheValue::Conversations(list.clone()));
        Ok(list)
    }

    pub async fn items(&self, api: &ApiClient, source: SourceTag) -> AppResult<Vec<KnowledgeItem>> {
        if let Some(items) = self.cached_items(source) {
            return Ok(items);
        }
        let items = api.list_items(source).await?;
        self.put(CacheKey::Items(source), CacheValue::Items(items.clone()));
        Ok(items)
    }
}
