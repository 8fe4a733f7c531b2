//! Long-term memory for a session
//!
//! Keeps summaries of past exchanges ranked by importance. The store holds
//! at most `capacity` entries. When an insertion goes over, entries are
//! stably sorted by importance (highest first) and the tail is dropped, so
//! the lowest-importance entries always go first. Among equal importance the
//! earlier position in the store wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Default maximum number of retained entries
pub const DEFAULT_MEMORY_CAPACITY: usize = 100;

/// Tag for canned identity exchanges
pub const TAG_IDENTITY: &str = "identity";

/// Tag for strategy-generated exchanges
pub const TAG_AI_GENERATED: &str = "ai_generated";

/// Tag added when the exchange used search results
pub const TAG_WEB_ENHANCED: &str = "web_enhanced";

/// A retained summary of one exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryEntry {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub importance: i32,
    pub tags: BTreeSet<String>,
}

impl MemoryEntry {
    pub fn new<I, S>(content: impl Into<String>, importance: i32, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: format!("memory_{}", Uuid::new_v4().simple()),
            content: content.into(),
            timestamp: Utc::now(),
            importance,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Summarise a user/assistant exchange
    pub fn exchange<I, S>(input: &str, response: &str, importance: i32, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            format!("User: {}\nAssistant: {}", input, response),
            importance,
            tags,
        )
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Importance-bounded store of memory entries
#[derive(Debug, Clone)]
pub struct LongTermMemory {
    entries: Vec<MemoryEntry>,
    capacity: usize,
}

impl LongTermMemory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Add an entry, returning whatever had to be evicted
    pub fn insert(&mut self, entry: MemoryEntry) -> Vec<MemoryEntry> {
        self.entries.push(entry);

        if self.entries.len() <= self.capacity {
            return Vec::new();
        }

        self.entries
            .sort_by(|a, b| b.importance.cmp(&a.importance));
        self.entries.split_off(self.capacity)
    }

    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The lowest importance still held
    pub fn lowest_importance(&self) -> Option<i32> {
        self.entries.iter().map(|e| e.importance).min()
    }
}

impl Default for LongTermMemory {
    fn default() -> Self {
        Self::new()
    }
}
