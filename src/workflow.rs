//! Drives one summarization request from raw URL to persisted record.
//!
//! The controller is shared by reference; only one request may be in flight
//! at a time. A second `submit` while the first is pending is rejected with
//! [`SummarizeError::Busy`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use log::{debug, info, warn};

use crate::SummaryOptions;
use crate::backend::{SummaryBackend, SummaryRequest};
use crate::error::SummarizeError;
use crate::history::HistoryStore;
use crate::record::{SummaryRecord, VideoInfo};
use crate::storage::KeyValueStore;

/// Where the controller is in its request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Requesting,
}

/// What the user currently sees
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryView {
    pub summary: String,
    pub video_info: Option<VideoInfo>,
    pub analysis: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
}

struct State<S> {
    phase: Phase,
    view: SummaryView,
    store: HistoryStore<S>,
}

pub struct Controller<B, S> {
    backend: B,
    state: Mutex<State<S>>,
}

/// Returns the controller to `Idle` however the request ends, including cancellation
struct InFlight<'a, S> {
    state: &'a Mutex<State<S>>,
}

impl<S> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).phase = Phase::Idle;
    }
}

impl<B: SummaryBackend, S: KeyValueStore> Controller<B, S> {
    pub fn new(backend: B, store: HistoryStore<S>) -> Self {
        Self {
            backend,
            state: Mutex::new(State {
                phase: Phase::Idle,
                view: SummaryView::default(),
                store,
            }),
        }
    }

    /// Validate `url`, request a summary and record it in history.
    pub async fn submit(&self, url: &str, options: SummaryOptions) -> Result<SummaryRecord, SummarizeError> {
        let request = {
            let mut state = self.lock();
            if state.phase != Phase::Idle {
                debug!("Rejecting submission while {:?}", state.phase);
                return Err(SummarizeError::Busy);
            }
            state.phase = Phase::Validating;

            match validate(url) {
                Ok(video_id) => {
                    state.phase = Phase::Requesting;
                    state.view = SummaryView::default();
                    SummaryRequest {
                        video_id,
                        length: options.length,
                        style: options.style,
                    }
                }
                Err(e) => {
                    state.phase = Phase::Idle;
                    debug!("Rejected input {url:?}: {e}");
                    return Err(e);
                }
            }
        };

        let _in_flight = InFlight { state: &self.state };
        info!("Requesting {} summary ({}) for {}", options.length, options.style, request.video_id);
        let result = self.backend.summarize(&request).await;

        let mut state = self.lock();
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Summarization of {} failed: {e}", request.video_id);
                state.view.summary = e.to_string();
                return Err(e);
            }
        };

        let summary = match response.summary {
            Some(summary) if !summary.trim().is_empty() => summary,
            _ => {
                let e = SummarizeError::EmptyResult;
                info!("No summary returned for {}", request.video_id);
                state.view.summary = e.to_string();
                return Err(e);
            }
        };

        state.view = SummaryView {
            summary: summary.clone(),
            video_info: response.video_info.clone(),
            analysis: response.analysis.clone(),
            metadata: response.metadata,
        };

        let now = Utc::now();
        let record = SummaryRecord {
            id: state.store.next_id(now),
            url: url.to_string(),
            summary,
            video_info: response.video_info,
            summary_length: options.length,
            summary_style: options.style,
            analysis: response.analysis,
            timestamp: now,
            favorited_at: None,
        };
        state.store.append_history(record.clone());
        info!("Saved summary {} for {}", record.id, request.video_id);

        Ok(record)
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn view(&self) -> SummaryView {
        self.lock().view.clone()
    }

    pub fn history(&self) -> Vec<SummaryRecord> {
        self.lock().store.history().to_vec()
    }

    pub fn favorites(&self) -> Vec<SummaryRecord> {
        self.lock().store.favorites().to_vec()
    }

    /// Toggle the favorite state of a stored record; `None` if the id is unknown
    pub fn toggle_favorite(&self, id: &str) -> Option<bool> {
        let mut state = self.lock();
        let record = state.store.find(id)?.clone();
        Some(state.store.toggle_favorite(&record))
    }

    pub fn clear_history(&self) {
        self.lock().store.clear_history();
    }

    pub fn clear_favorites(&self) {
        self.lock().store.clear_favorites();
    }

    fn lock(&self) -> MutexGuard<'_, State<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate(url: &str) -> Result<String, SummarizeError> {
    if url.trim().is_empty() {
        return Err(SummarizeError::EmptyInput);
    }
    crate::extract_video_id(url).ok_or(SummarizeError::InvalidUrl)
}
