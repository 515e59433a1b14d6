//! Bounded, persisted command history with a browsing cursor.

use std::{cell::RefCell, rc::Rc};

use platform_host::{MemoryPrefsStore, PrefsStore};

/// Default number of entries retained on persistence.
pub const DEFAULT_HISTORY_LIMIT: usize = 400;

/// Default preference key for persisted history.
pub const DEFAULT_HISTORY_KEY: &str = "portfolio.terminal.history";

#[derive(Debug, Default)]
struct HistoryState {
    entries: Vec<String>,
    cursor: usize,
}

/// Command history shared between the engine and the `history` command.
///
/// The cursor ranges over `0..=len`; `len` means "not browsing". The in-memory list may exceed
/// the limit between persists; [`HistoryStore::persist`] and [`HistoryStore::load`] keep only the
/// most recent entries.
#[derive(Clone)]
pub struct HistoryStore {
    state: Rc<RefCell<HistoryState>>,
    prefs: Rc<dyn PrefsStore>,
    key: String,
    limit: usize,
}

impl HistoryStore {
    /// Creates an empty history persisted under `key`.
    pub fn new(prefs: Rc<dyn PrefsStore>, key: impl Into<String>, limit: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(HistoryState::default())),
            prefs,
            key: key.into(),
            limit: limit.max(1),
        }
    }

    /// Creates a history backed by a private in-memory store.
    pub fn in_memory() -> Self {
        Self::new(
            Rc::new(MemoryPrefsStore::default()),
            DEFAULT_HISTORY_KEY,
            DEFAULT_HISTORY_LIMIT,
        )
    }

    /// Replaces the in-memory entries with the persisted tail.
    ///
    /// Missing, unreadable, or malformed storage yields an empty history. Non-string items in a
    /// stored array are skipped.
    pub async fn load(&self) {
        let entries = match self.prefs.load_pref(&self.key).await {
            Ok(Some(raw)) => decode_entries(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                log::warn!("history load failed: {err}");
                Vec::new()
            }
        };
        let skip = entries.len().saturating_sub(self.limit);
        let mut state = self.state.borrow_mut();
        state.entries = entries.into_iter().skip(skip).collect();
        state.cursor = state.entries.len();
    }

    /// Appends a submitted line.
    ///
    /// Returns `false` when the trimmed line is empty or equals the last entry. The cursor is
    /// reset to the not-browsing position either way for non-empty lines.
    pub fn append(&self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return false;
        }
        let mut state = self.state.borrow_mut();
        let added = state.entries.last().map(String::as_str) != Some(trimmed);
        if added {
            state.entries.push(trimmed.to_string());
        }
        state.cursor = state.entries.len();
        added
    }

    /// Writes the most recent entries to the preference store.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the store fails.
    pub async fn persist(&self) -> Result<(), String> {
        let tail = self.tail(self.limit);
        let raw = serde_json::to_string(&tail).map_err(|e| e.to_string())?;
        self.prefs.save_pref(&self.key, &raw).await
    }

    /// Moves the cursor toward older entries and returns the entry under it.
    pub fn navigate_up(&self) -> String {
        let mut state = self.state.borrow_mut();
        if state.entries.is_empty() {
            return String::new();
        }
        state.cursor = state.cursor.saturating_sub(1);
        state.entries.get(state.cursor).cloned().unwrap_or_default()
    }

    /// Moves the cursor toward newer entries; returns an empty string past the newest one.
    pub fn navigate_down(&self) -> String {
        let mut state = self.state.borrow_mut();
        if state.entries.is_empty() {
            return String::new();
        }
        state.cursor = (state.cursor + 1).min(state.entries.len());
        state.entries.get(state.cursor).cloned().unwrap_or_default()
    }

    /// Returns all in-memory entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.state.borrow().entries.clone()
    }

    /// Returns at most `n` most recent entries, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let state = self.state.borrow();
        let skip = state.entries.len().saturating_sub(n);
        state.entries[skip..].to_vec()
    }

    /// Returns the browsing cursor.
    pub fn cursor(&self) -> usize {
        self.state.borrow().cursor
    }

    /// Returns the number of in-memory entries.
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Returns whether history is empty.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    /// Forgets every entry and removes the persisted copy.
    ///
    /// # Errors
    ///
    /// Returns an error when the store delete fails.
    pub async fn wipe(&self) -> Result<(), String> {
        {
            let mut state = self.state.borrow_mut();
            state.entries.clear();
            state.cursor = 0;
        }
        self.prefs.delete_pref(&self.key).await
    }
}

fn decode_entries(raw: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(entry) => Some(entry),
                _ => None,
            })
            .collect(),
        Ok(_) => Vec::new(),
        Err(err) => {
            log::warn!("discarding corrupt history: {err}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    fn store_with(prefs: &MemoryPrefsStore) -> HistoryStore {
        HistoryStore::new(Rc::new(prefs.clone()), "h", DEFAULT_HISTORY_LIMIT)
    }

    #[test]
    fn consecutive_duplicates_collapse_after_trim() {
        let history = HistoryStore::in_memory();
        assert!(history.append("echo hi"));
        assert!(!history.append("  echo hi "));
        assert!(!history.append("   "));
        assert!(history.append("help"));
        assert!(history.append("echo hi"));
        assert_eq!(history.entries(), vec!["echo hi", "help", "echo hi"]);
        assert_eq!(history.cursor(), 3);
    }

    #[test]
    fn persistence_keeps_latest_four_hundred() {
        let prefs = MemoryPrefsStore::default();
        let history = store_with(&prefs);
        for i in 0..401 {
            history.append(&format!("cmd {i}"));
        }
        assert_eq!(history.len(), 401);
        block_on(history.persist()).expect("persist");

        let stored: Vec<String> =
            serde_json::from_str(&prefs.raw("h").expect("stored")).expect("json");
        assert_eq!(stored.len(), 400);
        assert_eq!(stored.first().map(String::as_str), Some("cmd 1"));
        assert_eq!(stored.last().map(String::as_str), Some("cmd 400"));

        let reloaded = store_with(&prefs);
        block_on(reloaded.load());
        assert_eq!(reloaded.entries(), stored);
        assert_eq!(reloaded.cursor(), 400);
    }

    #[test]
    fn corrupt_or_foreign_storage_loads_empty() {
        let prefs = MemoryPrefsStore::default();
        prefs.insert_raw("h", "{not json");
        let history = store_with(&prefs);
        history.append("stale");
        block_on(history.load());
        assert!(history.is_empty());

        prefs.insert_raw("h", "{\"a\":1}");
        block_on(history.load());
        assert!(history.is_empty());

        prefs.insert_raw("h", "[\"ok\", 3, null, \"fine\"]");
        block_on(history.load());
        assert_eq!(history.entries(), vec!["ok", "fine"]);
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let history = HistoryStore::in_memory();
        assert_eq!(history.navigate_up(), "");
        assert_eq!(history.navigate_down(), "");

        history.append("one");
        history.append("two");
        assert_eq!(history.navigate_up(), "two");
        assert_eq!(history.navigate_up(), "one");
        assert_eq!(history.navigate_up(), "one");
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.navigate_down(), "two");
        assert_eq!(history.navigate_down(), "");
        assert_eq!(history.navigate_down(), "");
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn wipe_clears_memory_and_storage() {
        let prefs = MemoryPrefsStore::default();
        let history = store_with(&prefs);
        history.append("one");
        block_on(history.persist()).expect("persist");
        assert!(prefs.raw("h").is_some());

        block_on(history.wipe()).expect("wipe");
        assert!(history.is_empty());
        assert_eq!(prefs.raw("h"), None);
    }
}
