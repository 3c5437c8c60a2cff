//! Recent asset searches.
//!
//! The list is owned by whoever runs the searches and is persisted through a
//! [`SearchHistoryStore`](crate::core::search_history::SearchHistoryStore) handed in by that caller. There is no process-wide copy.

use crate::{
    entities::{SystemState, system_state},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// `system_state` key the search history is stored under
pub const SEARCH_HISTORY_KEY: &str = "search_history";

/// Where a [`SearchHistory`] is loaded from and saved to
#[allow(async_fn_in_trait)]
pub trait SearchHistoryStore {
    /// Stored entries, most recent first
    async fn load(&self) -> Result<Vec<String>>;

    /// Replaces the stored entries
    async fn save(&self, entries: &[String]) -> Result<()>;
}

/// Most-recent-first list of distinct search queries, capped at `limit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistory {
    entries: Vec<String>,
    limit: usize,
}

impl SearchHistory {
    /// An empty history keeping at most `limit` entries
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Loads the stored entries, trimming them to `limit`.
    pub async fn load<S: SearchHistoryStore>(store: &S, limit: usize) -> Result<Self> {
        let mut history = Self::new(limit);
        for entry in store.load().await?.into_iter().rev() {
            history.push(&entry);
        }
        Ok(history)
    }

    /// Adds `query` at the front.
    ///
    /// Blank queries are ignored. A query already present (ignoring case) moves to
    /// the front instead of appearing twice. Returns whether the list changed.
    pub fn push(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || self.limit == 0 {
            return false;
        }

        if self.entries.first().is_some_and(|first| first == query) {
            return false;
        }

        let folded = query.to_lowercase();
        self.entries
            .retain(|existing| existing.to_lowercase() != folded);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.limit);
        true
    }

    /// Forgets every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, most recent first
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Writes the current entries to `store`.
    pub async fn persist<S: SearchHistoryStore>(&self, store: &S) -> Result<()> {
        store.save(&self.entries).await
    }
}

/// Loads the history, records `query` and saves it back when it changed.
pub async fn record_search<S: SearchHistoryStore>(
    store: &S,
    limit: usize,
    query: &str,
) -> Result<Vec<String>> {
    let mut history = SearchHistory::load(store, limit).await?;
    if history.push(query) {
        history.persist(store).await?;
    }
    Ok(history.entries().to_vec())
}

/// Keeps the entries in memory, for tests and short-lived sessions
#[derive(Debug, Default)]
pub struct InMemorySearchHistoryStore {
    entries: Mutex<Vec<String>>,
}

impl SearchHistoryStore for InMemorySearchHistoryStore {
    async fn load(&self) -> Result<Vec<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn save(&self, entries: &[String]) -> Result<()> {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = entries.to_vec();
        Ok(())
    }
}

/// Persists the entries as a JSON array in the `system_state` table
#[derive(Debug, Clone)]
pub struct SystemStateSearchHistoryStore {
    db: DatabaseConnection,
}

impl SystemStateSearchHistoryStore {
    /// Creates a store backed by `db`
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl SearchHistoryStore for SystemStateSearchHistoryStore {
    async fn load(&self) -> Result<Vec<String>> {
        let state = SystemState::find()
            .filter(system_state::Column::Key.eq(SEARCH_HISTORY_KEY))
            .one(&self.db)
            .await?;

        let Some(state) = state else {
            return Ok(Vec::new());
        };

        // A damaged value only costs the user their recent searches
        Ok(serde_json::from_str(&state.value).unwrap_or_else(|e| {
            warn!("Ignoring unreadable search history: {e}");
            Vec::new()
        }))
    }

    async fn save(&self, entries: &[String]) -> Result<()> {
        let value = serde_json::to_string(entries)?;
        let now = Utc::now().naive_utc();

        let existing = SystemState::find()
            .filter(system_state::Column::Key.eq(SEARCH_HISTORY_KEY))
            .one(&self.db)
            .await?;

        if let Some(state) = existing {
            let mut active_model: system_state::ActiveModel = state.into();
            active_model.value = Set(value);
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_state = system_state::ActiveModel {
                key: Set(SEARCH_HISTORY_KEY.to_string()),
                value: Set(value),
                updated_at: Set(now),
                ..Default::default()
            };
            new_state.insert(&self.db).await?;
        }

        debug!("Saved {} recent searches", entries.len());
        Ok(())
    }
}
