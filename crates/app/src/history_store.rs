//! History store: bounded, append-only log of recorded samples.
//!
//! Entries are kept oldest-first in a [`VecDeque`]; once the configured
//! capacity is reached the oldest entry is evicted for each new one.
//! A closed store rejects further entries.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::num::NonZeroUsize;

use evesim_domain::error::StoreClosedError;
use evesim_domain::history::HistoryEntry;
use evesim_domain::illuminance;
use evesim_domain::time::Timestamp;

/// Number of entries included in a non-verbose dump.
const RECENT_ENTRIES: usize = 10;

/// Bounded history of one emulated device.
#[derive(Debug)]
pub struct HistoryStore {
    name: String,
    entries: VecDeque<HistoryEntry>,
    capacity: Option<NonZeroUsize>,
    last_event: Option<Timestamp>,
    times_opened: u32,
    closed: bool,
    debug: bool,
}

impl HistoryStore {
    /// Create an open, empty store.
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: Option<NonZeroUsize>) -> Self {
        Self {
            name: name.into(),
            entries: VecDeque::new(),
            capacity,
            last_event: None,
            times_opened: 0,
            closed: false,
            debug: false,
        }
    }

    /// Log every appended entry at `info` level.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Append an entry, evicting the oldest one when full.
    ///
    /// # Errors
    ///
    /// Returns [`StoreClosedError`] once [`close`](Self::close) has been
    /// called; the store is left unchanged.
    pub fn add_entry(&mut self, entry: HistoryEntry) -> Result<(), StoreClosedError> {
        if self.closed {
            return Err(StoreClosedError {
                store: self.name.clone(),
            });
        }

        if let Some(capacity) = self.capacity {
            while self.entries.len() >= capacity.get() {
                self.entries.pop_front();
            }
        }

        if self.debug {
            tracing::info!(store = %self.name, %entry, "history entry added");
        } else {
            tracing::debug!(store = %self.name, %entry, "history entry added");
        }

        self.entries.push_back(entry);
        Ok(())
    }

    /// Record the time of the most recent state change.
    ///
    /// Timestamps older than the current marker are ignored.
    pub fn set_last_event(&mut self, timestamp: Timestamp) {
        match self.last_event {
            Some(current) if timestamp < current => {
                tracing::debug!(
                    store = %self.name,
                    %timestamp,
                    %current,
                    "ignoring out-of-order last event"
                );
            }
            _ => self.last_event = Some(timestamp),
        }
    }

    /// Count one more opening of the door.
    pub fn add_to_times_opened(&mut self) {
        self.times_opened = self.times_opened.saturating_add(1);
    }

    /// A synthetic reading in `[min, max]`, reproducible when `seed != 0`.
    #[must_use]
    pub fn fake_level(&self, min: f64, max: f64, seed: u64) -> f64 {
        illuminance::fake_level(min, max, seed)
    }

    /// Human-readable dump of the history, also emitted to the log.
    ///
    /// Verbose dumps list every entry; otherwise only the latest ten.
    /// Does not modify the store.
    pub fn log_history(&self, verbose: bool) -> String {
        let shown = if verbose {
            self.entries.len()
        } else {
            self.entries.len().min(RECENT_ENTRIES)
        };

        let mut dump = format!(
            "{} history: {} entries ({} shown), last event {}, times opened {}{}",
            self.name,
            self.entries.len(),
            shown,
            self.last_event
                .map_or_else(|| "never".to_string(), |ts| ts.timestamp().to_string()),
            self.times_opened,
            if self.closed { " [closed]" } else { "" },
        );
        for entry in self.entries.iter().skip(self.entries.len() - shown) {
            let _ = write!(dump, "\n  {entry}");
        }

        tracing::info!(store = %self.name, "{dump}");
        dump
    }

    /// Close the store. Idempotent.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            tracing::info!(store = %self.name, entries = self.entries.len(), "history closed");
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    /// Entries oldest-first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    #[must_use]
    pub fn last_event(&self) -> Option<Timestamp> {
        self.last_event
    }

    #[must_use]
    pub fn times_opened(&self) -> u32 {
        self.times_opened
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
