//! Debounced location search over the catalog.
//!
//! Every non-blank query is answered on a worker thread after a fixed delay.
//! Each query gets a sequence number and only the answer to the most recent
//! one is applied, so a slow stale answer can never overwrite a fresher one.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::location::{Location, LocationCatalog};

#[derive(Debug)]
struct SearchResponse {
    seq: u64,
    results: Vec<Location>,
}

pub struct LocationSearch {
    catalog: Arc<LocationCatalog>,
    delay: Duration,
    query: String,
    results: Vec<Location>,
    loading: bool,
    latest_seq: u64,
    sender: Sender<SearchResponse>,
    receiver: Receiver<SearchResponse>,
}

impl LocationSearch {
    pub fn new(catalog: Arc<LocationCatalog>, delay: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        let results = catalog.entries().to_vec();
        Self {
            catalog,
            delay,
            query: String::new(),
            results,
            loading: false,
            latest_seq: 0,
            sender,
            receiver,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Location] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Starts a search for `query` unless it is already the current text.
    /// Blank queries resolve at once to the full catalog; anything else shows
    /// the loading state for the delay window regardless of how many entries
    /// match.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query == self.query {
            return;
        }
        self.query = query;
        let seq = self.next_seq();

        if self.query.trim().is_empty() {
            self.results = self.catalog.entries().to_vec();
            self.loading = false;
            return;
        }

        self.loading = true;
        let catalog = Arc::clone(&self.catalog);
        let delay = self.delay;
        let query = self.query.clone();
        let sender = self.sender.clone();
        std::thread::spawn(move || {
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            let results = catalog.filter(&query);
            let _ = sender.send(SearchResponse { seq, results });
        });
    }

    /// Applies any answers that arrived since the last frame. Returns true
    /// when the visible results changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(response) = self.receiver.try_recv() {
            changed |= self.apply(response);
        }
        changed
    }

    /// Blocks until the latest query is answered or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.loading {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(response) => {
                    self.apply(response);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        !self.loading
    }

    fn next_seq(&mut self) -> u64 {
        self.latest_seq += 1;
        self.latest_seq
    }

    fn apply(&mut self, response: SearchResponse) -> bool {
        if response.seq != self.latest_seq {
            debug!(
                seq = response.seq,
                latest = self.latest_seq,
                "discarding stale search response"
            );
            return false;
        }
        self.results = response.results;
        self.loading = false;
        true
    }
}
