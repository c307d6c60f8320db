//! Commit logging with pattern-based filtering and in-memory storage
//!
//! Mutations pass through [`CommitLoggerMiddleware`] on their way into the
//! store. Matching commits are traced and, when storage is enabled, kept in a
//! bounded ring buffer so callers can see exactly which mutations ran.
//!
//! # Example
//!
//! ```ignore
//! use mintshop_store::{CommitLogConfig, CommitLoggerMiddleware, StoreWithMiddleware};
//!
//! let middleware = CommitLoggerMiddleware::with_log(CommitLogConfig::default());
//! let mut store = StoreWithMiddleware::new(AppState::default(), reducer, middleware);
//! store.commit(Mutation::ClearCart);
//!
//! if let Some(log) = store.middleware().log() {
//!     for entry in log.recent(10) {
//!         println!("{}: {}", entry.sequence, entry.summary);
//!     }
//! }
//! ```

use crate::mutation::MutationSummary;
use crate::store::Middleware;
use std::collections::VecDeque;

/// Glob include/exclude filter over mutation names.
///
/// Patterns support `*` (any sequence) and `?` (any single character).
///
/// # Examples
///
/// - `receive_*` matches every fetch result mutation
/// - `*_food_count` matches the cart count mutations
#[derive(Debug, Clone, Default)]
pub struct CommitFilter {
    /// If non-empty, only log mutations matching these patterns
    pub include_patterns: Vec<String>,
    /// Exclude mutations matching these patterns (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl CommitFilter {
    /// Create a filter from comma-separated pattern strings
    ///
    /// # Example
    /// ```
    /// use mintshop_store_core::commit_log::CommitFilter;
    ///
    /// let filter = CommitFilter::new(Some("receive_*"), Some("receive_goods"));
    /// assert!(filter.should_log("receive_shops"));
    /// assert!(!filter.should_log("receive_goods"));
    /// assert!(!filter.should_log("clear_cart"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    /// Check if a mutation name passes the filter
    pub fn should_log(&self, name: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self.include_patterns.iter().any(|p| glob_match(p, name))
        {
            return false;
        }

        !self.exclude_patterns.iter().any(|p| glob_match(p, name))
    }
}

fn split_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// An entry in the commit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLogEntry {
    /// Mutation name (from Mutation::name())
    pub name: &'static str,
    /// Summary representation (from MutationSummary::summary())
    pub summary: String,
    /// Sequence number for ordering
    pub sequence: u64,
    /// Whether the reducer reported a change (set after it runs)
    pub state_changed: Option<bool>,
}

/// Configuration for the commit log ring buffer
#[derive(Debug, Clone)]
pub struct CommitLogConfig {
    /// Maximum number of entries to keep
    pub capacity: usize,
    pub filter: CommitFilter,
}

impl Default for CommitLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: CommitFilter::default(),
        }
    }
}

impl CommitLogConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }
}

/// In-memory ring buffer of recent commits
///
/// Older entries are discarded once capacity is reached.
#[derive(Debug, Clone)]
pub struct CommitLog {
    entries: VecDeque<CommitLogEntry>,
    config: CommitLogConfig,
    next_sequence: u64,
}

impl Default for CommitLog {
    fn default() -> Self {
        Self::new(CommitLogConfig::default())
    }
}

impl CommitLog {
    pub fn new(config: CommitLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            next_sequence: 0,
        }
    }

    /// Log a mutation (if it passes the filter)
    ///
    /// Returns the entry if it was logged, None if filtered out.
    pub fn log<M: MutationSummary>(&mut self, mutation: &M) -> Option<&CommitLogEntry> {
        let name = mutation.name();
        if !self.config.filter.should_log(name) || self.config.capacity == 0 {
            return None;
        }

        let entry = CommitLogEntry {
            name,
            summary: mutation.summary(),
            sequence: self.next_sequence,
            state_changed: None,
        };
        self.next_sequence += 1;

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(entry);
        self.entries.back()
    }

    /// Update the last entry with the reducer's change flag
    pub fn update_last_state_changed(&mut self, changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(changed);
        }
    }

    /// All entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &CommitLogEntry> {
        self.entries.iter()
    }

    /// Names of all entries, oldest first
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// The most recent N entries (newest first)
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &CommitLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Middleware that traces commits and optionally records them.
///
/// - **Tracing only**: `tracing::debug!` per commit
/// - **With storage**: also keeps a [`CommitLog`]
#[derive(Debug, Clone)]
pub struct CommitLoggerMiddleware {
    filter: CommitFilter,
    log: Option<CommitLog>,
    /// Whether the current mutation made it into the log
    last_logged: bool,
}

impl CommitLoggerMiddleware {
    /// Tracing only, no in-memory storage
    pub fn new(filter: CommitFilter) -> Self {
        Self {
            filter,
            log: None,
            last_logged: false,
        }
    }

    /// Tracing plus in-memory storage
    pub fn with_log(config: CommitLogConfig) -> Self {
        Self {
            filter: config.filter.clone(),
            log: Some(CommitLog::new(config)),
            last_logged: false,
        }
    }

    /// Get the commit log (if storage is enabled)
    pub fn log(&self) -> Option<&CommitLog> {
        self.log.as_ref()
    }

    pub fn log_mut(&mut self) -> Option<&mut CommitLog> {
        self.log.as_mut()
    }

    pub fn filter(&self) -> &CommitFilter {
        &self.filter
    }
}

impl<M: MutationSummary> Middleware<M> for CommitLoggerMiddleware {
    fn before(&mut self, mutation: &M) {
        self.last_logged = false;
        if let Some(ref mut log) = self.log {
            self.last_logged = log.log(mutation).is_some();
        }
    }

    fn after(&mut self, mutation: &M, state_changed: bool) {
        let name = mutation.name();
        if self.filter.should_log(name) {
            tracing::debug!(mutation = %name, state_changed, "commit");
        }

        // A filtered mutation must not overwrite the flag of the last logged one
        if self.last_logged {
            if let Some(ref mut log) = self.log {
                log.update_last_state_changed(state_changed);
            }
        }
    }
}

/// Simple glob pattern matching supporting `*` and `?`.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut pi = 0;
    let mut ti = 0;
    let mut star_pi = None;
    let mut star_ti = 0;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star_pi = Some(pi);
            star_ti = ti;
            pi += 1;
        } else if let Some(spi) = star_pi {
            pi = spi + 1;
            star_ti += 1;
            ti = star_ti;
        } else {
            return false;
        }
    }

    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }

    pi == pattern.len()
}
