//! Event retrieval: the one asynchronous boundary of a computation.
//!
//! An [`EventSource`] returns the rows relevant to a reference instant: every
//! weekly-recurring event, plus every other event that ends after the
//! reference. The engine relies on that filter and does not apply it itself.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::RawEvent;

/// Which events a source must return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
    /// Start of the reference date in the reference calendar.
    pub reference: DateTime<Utc>,
}

impl EventQuery {
    pub fn new(reference: DateTime<Utc>) -> Self {
        Self { reference }
    }

    /// `weekly_recurring = true OR ends_at > reference`.
    ///
    /// A non-recurring row without a readable `ends_at` cannot satisfy the
    /// second clause and is dropped.
    pub fn matches(&self, raw: &RawEvent) -> bool {
        raw.is_weekly_recurring()
            || raw
                .ends_at_utc()
                .is_some_and(|ends_at| ends_at > self.reference)
    }
}

/// Supplies raw event rows for a query.
pub trait EventSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_events(
        &self,
        query: &EventQuery,
    ) -> impl Future<Output = Result<Vec<RawEvent>, Self::Error>> + Send;
}

impl<S: EventSource> EventSource for &S {
    type Error = S::Error;

    fn fetch_events(
        &self,
        query: &EventQuery,
    ) -> impl Future<Output = Result<Vec<RawEvent>, S::Error>> + Send {
        (**self).fetch_events(query)
    }
}

/// Errors from the bundled sources.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    events: Vec<RawEvent>,
}

impl MemorySource {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self { events }
    }

    /// Parse a JSON array of rows.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn push(&mut self, event: RawEvent) {
        self.events.push(event);
    }

    fn select(&self, query: &EventQuery) -> Vec<RawEvent> {
        self.events
            .iter()
            .filter(|raw| query.matches(raw))
            .cloned()
            .collect()
    }
}

impl EventSource for MemorySource {
    type Error = SourceError;

    fn fetch_events(
        &self,
        query: &EventQuery,
    ) -> impl Future<Output = Result<Vec<RawEvent>, SourceError>> + Send {
        let selected = self.select(query);
        async move { Ok(selected) }
    }
}

/// Rows stored as a JSON array in a file, re-read on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for JsonFileSource {
    type Error = SourceError;

    fn fetch_events(
        &self,
        query: &EventQuery,
    ) -> impl Future<Output = Result<Vec<RawEvent>, SourceError>> + Send {
        let path = self.path.clone();
        let query = *query;
        async move {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| SourceError::Read {
                    path: path.clone(),
                    source,
                })?;
            Ok(MemorySource::from_json(&content)?.select(&query))
        }
    }
}
