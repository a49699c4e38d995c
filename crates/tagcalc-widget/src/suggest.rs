//! Suggestion bookkeeping: per-query caching and stale result suppression.
//!
//! Fetching itself is left to the host (or the `http` module). The editor hands
//! out a [`SuggestionRequest`] whenever the pending input changes and accepts
//! the result back later; only the newest request for the current input may
//! update what is shown.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A tag offered by the autocomplete service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SuggestError {
    #[error("Suggestion service responded with status {0}")]
    Status(u16),
    #[error("Failed to reach suggestion service: {0}")]
    Transport(String),
    #[error("Malformed suggestion response: {0}")]
    Decode(String),
}

/// One fetch the host owes the editor. Hand it back unchanged with the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub seq: u64,
    pub query: String,
}

/// What the suggestion list should display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "candidates", rename_all = "snake_case")]
pub enum SuggestionView {
    Hidden,
    Loading,
    Ready(Vec<Candidate>),
    /// Nothing matched, or the fetch failed.
    Empty,
}

impl SuggestionView {
    fn from_candidates(candidates: Vec<Candidate>) -> Self {
        if candidates.is_empty() {
            SuggestionView::Empty
        } else {
            SuggestionView::Ready(candidates)
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        match self {
            SuggestionView::Ready(candidates) => candidates,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at_ms: f64,
    candidates: Vec<Candidate>,
}

/// Successful results keyed by exact query text.
#[derive(Debug, Clone)]
pub struct SuggestionCache {
    ttl_ms: f64,
    entries: HashMap<String, CacheEntry>,
}

impl SuggestionCache {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms: ttl_ms as f64,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, query: &str, now_ms: f64) -> Option<&[Candidate]> {
        self.entries
            .get(query)
            .filter(|entry| now_ms - entry.fetched_at_ms < self.ttl_ms)
            .map(|entry| entry.candidates.as_slice())
    }

    pub fn insert(&mut self, query: impl Into<String>, candidates: Vec<Candidate>, now_ms: f64) {
        let ttl_ms = self.ttl_ms;
        self.entries.retain(|_, entry| now_ms - entry.fetched_at_ms < ttl_ms);
        self.entries.insert(
            query.into(),
            CacheEntry {
                fetched_at_ms: now_ms,
                candidates,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tracks the in-flight request and the list on display.
#[derive(Debug, Clone)]
pub struct Suggestions {
    cache: SuggestionCache,
    latest: Option<SuggestionRequest>,
    next_seq: u64,
    view: SuggestionView,
}

impl Suggestions {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            cache: SuggestionCache::new(ttl_ms),
            latest: None,
            next_seq: 0,
            view: SuggestionView::Hidden,
        }
    }

    pub fn view(&self) -> &SuggestionView {
        &self.view
    }

    pub fn pending(&self) -> Option<&SuggestionRequest> {
        self.latest.as_ref()
    }

    pub fn cache(&self) -> &SuggestionCache {
        &self.cache
    }

    /// Reacts to new pending input. Returns a request when the host must
    /// fetch; empty input and fresh cache hits need no fetch.
    pub fn query_changed(&mut self, query: &str, now_ms: f64) -> Option<SuggestionRequest> {
        if query.is_empty() {
            self.dismiss();
            return None;
        }

        let visible = !query.trim().is_empty();

        if let Some(candidates) = self.cache.get(query, now_ms) {
            debug!(query, count = candidates.len(), "suggestion cache hit");
            self.latest = None;
            self.view = if visible {
                SuggestionView::from_candidates(candidates.to_vec())
            } else {
                SuggestionView::Hidden
            };
            return None;
        }

        self.next_seq += 1;
        let request = SuggestionRequest {
            seq: self.next_seq,
            query: query.to_string(),
        };
        self.latest = Some(request.clone());
        self.view = if visible {
            SuggestionView::Loading
        } else {
            SuggestionView::Hidden
        };
        Some(request)
    }

    /// Applies a fetch result. Successful results are always cached, but only
    /// the newest request matching `current_query` changes the view.
    ///
    /// Returns whether the view was updated.
    pub fn deliver(
        &mut self,
        request: &SuggestionRequest,
        result: Result<Vec<Candidate>, SuggestError>,
        current_query: &str,
        now_ms: f64,
    ) -> bool {
        if let Ok(candidates) = &result {
            self.cache.insert(request.query.clone(), candidates.clone(), now_ms);
        }

        let is_current = self.latest.as_ref() == Some(request) && request.query == current_query;
        if !is_current {
            debug!(seq = request.seq, query = %request.query, "dropping stale suggestions");
            return false;
        }
        self.latest = None;

        let visible = !current_query.trim().is_empty();
        self.view = match result {
            Ok(_) if !visible => SuggestionView::Hidden,
            Ok(candidates) => SuggestionView::from_candidates(candidates),
            Err(error) => {
                warn!(%error, query = %request.query, "suggestion fetch failed");
                if visible {
                    SuggestionView::Empty
                } else {
                    SuggestionView::Hidden
                }
            }
        };
        true
    }

    pub fn dismiss(&mut self) {
        self.latest = None;
        self.view = SuggestionView::Hidden;
    }
}
