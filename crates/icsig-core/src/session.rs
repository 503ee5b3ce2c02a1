//! Explicit state for one collect → compare → save cycle.
//!
//! A [`Session`] is created fresh for each collection, handed by reference
//! to the matcher, and written to a small JSON file so that later
//! invocations (`compare`, `save`) can pick up where collection left off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{AveragedVector, CatalogEntry, ComparisonSummary, MatchResult, MessageSet};

/// Number of best matches kept with a saved measurement.
pub const SUMMARY_LEN: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    message_set: Option<MessageSet>,
    averaged: Option<AveragedVector>,
    results: Vec<MatchResult>,
    collected_at: Option<DateTime<Utc>>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed message set together with its average.
    ///
    /// Any comparison from a previous collection is discarded.
    pub fn record_collection(&mut self, message_set: MessageSet, averaged: AveragedVector) {
        self.message_set = Some(message_set);
        self.averaged = Some(averaged);
        self.results.clear();
        self.collected_at = Some(Utc::now());
    }

    pub fn record_results(&mut self, results: Vec<MatchResult>) {
        self.results = results;
    }

    #[must_use]
    pub const fn message_set(&self) -> Option<&MessageSet> {
        self.message_set.as_ref()
    }

    #[must_use]
    pub const fn averaged(&self) -> Option<&AveragedVector> {
        self.averaged.as_ref()
    }

    /// The averaged vector, or [`Error::NoAverage`] when nothing has been
    /// collected yet.
    pub fn require_average(&self) -> Result<&AveragedVector> {
        self.averaged.as_ref().ok_or(Error::NoAverage)
    }

    #[must_use]
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    #[must_use]
    pub fn best_match(&self) -> Option<&MatchResult> {
        self.results.first()
    }

    #[must_use]
    pub const fn collected_at(&self) -> Option<DateTime<Utc>> {
        self.collected_at
    }

    /// The first `n` results as stored history.
    #[must_use]
    pub fn top_summary(&self, n: usize) -> Vec<ComparisonSummary> {
        self.results.iter().take(n).map(ComparisonSummary::from).collect()
    }

    /// Build the catalog entry for saving this measurement under `name`.
    pub fn to_catalog_entry(&self, name: &str) -> Result<CatalogEntry> {
        let averaged = self.require_average()?;
        let messages = self.message_set.clone().ok_or(Error::NoAverage)?;
        let entry = CatalogEntry::measured(
            name.trim(),
            averaged.as_reading(),
            messages,
            self.top_summary(SUMMARY_LEN),
        );
        entry.validate()?;
        Ok(entry)
    }

    /// Load a session previously written with [`Session::save`].
    ///
    /// Returns `Ok(None)` when no session file exists.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
