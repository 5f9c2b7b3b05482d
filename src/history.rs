//! Statement history with shell-like navigation
//!
//! Bounded ring of committed statements, walked with Up/Down at the prompt.
//! Whatever was typed before browsing started is kept as a draft and handed
//! back when the user walks past the newest entry.
//!
//! Entries are persisted to `~/.redline/history`, NUL-separated so that
//! multi-line statements survive. Persistence is best-effort.

use crate::config::ConnectionOptions;
use std::collections::VecDeque;
use std::path::PathBuf;

/// NUL never appears in SQL text, so no escaping is needed
const ENTRY_SEPARATOR: char = '\0';

pub struct QueryHistory {
    entries: VecDeque<String>,
    capacity: usize,
    /// Index into `entries` while browsing
    cursor: Option<usize>,
    draft: Option<String>,
    /// `None` keeps the history in memory only
    path: Option<PathBuf>,
}

impl QueryHistory {
    /// In-memory history
    pub fn new(capacity: usize) -> Self {
        Self::load_from(None, capacity)
    }

    /// History backed by `~/.redline/history` when `persist` is set
    pub fn load(capacity: usize, persist: bool) -> Self {
        let path = persist
            .then(|| ConnectionOptions::config_dir().ok())
            .flatten()
            .map(|dir| dir.join("history"));
        Self::load_from(path, capacity)
    }

    fn load_from(path: Option<PathBuf>, capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be > 0");

        let mut entries: VecDeque<String> = path
            .as_deref()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .map(|content| {
                content
                    .split(ENTRY_SEPARATOR)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        // keep the newest
        let excess = entries.len().saturating_sub(capacity);
        entries.drain(..excess);

        Self {
            entries,
            capacity,
            cursor: None,
            draft: None,
            path,
        }
    }

    fn save(&self) {
        let Some(path) = &self.path else { return };
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let content = Vec::from_iter(self.entries.iter().map(String::as_str))
            .join(&ENTRY_SEPARATOR.to_string());
        if let Err(e) = std::fs::write(path, content) {
            tracing::debug!("could not save history to {}: {}", path.display(), e);
        }
    }

    /// Record a committed statement.
    ///
    /// Whitespace is trimmed; empty input and a repeat of the newest entry
    /// are not recorded. The oldest entry is dropped at capacity.
    pub fn push(&mut self, statement: &str) {
        self.stop_browsing();

        let statement = statement.trim();
        if statement.is_empty() || self.entries.back().is_some_and(|last| last == statement) {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(statement.to_string());
        self.save();
    }

    /// Step to an older entry; the first step stores `current` as the draft.
    /// `None` when there is nothing older.
    pub fn back(&mut self, current: &str) -> Option<&str> {
        let index = match self.cursor {
            None if self.entries.is_empty() => return None,
            None => {
                self.draft = Some(current.to_string());
                self.entries.len() - 1
            }
            Some(0) => return None,
            Some(i) => i - 1,
        };
        self.cursor = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    /// Step to a newer entry. Past the newest, browsing ends and the draft
    /// is returned. `None` when not browsing.
    pub fn forward(&mut self) -> Option<&str> {
        let index = self.cursor? + 1;
        if index < self.entries.len() {
            self.cursor = Some(index);
            return self.entries.get(index).map(String::as_str);
        }
        self.cursor = None;
        self.draft.as_deref()
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }

    /// Leave browse mode and forget the draft
    pub fn stop_browsing(&mut self) {
        self.cursor = None;
        self.draft = None;
    }

    /// Entries from oldest to newest
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
