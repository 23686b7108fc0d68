use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogSource, SearchQuery, Track};
use crate::config::Config;
use crate::error::AppError;

/// A request the controller wants issued.
///
/// The generation identifies which text change produced it, so the response
/// can be matched back up once it arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: SearchQuery,
}

/// The result of running a [`SearchTicket`] against a catalog.
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub result: Result<Vec<Track>, AppError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Results replaced; holds the new result count.
    Results(usize),
    /// The fetch failed; previous results kept.
    Failed,
    /// A newer request was issued since this one; nothing changed.
    Stale,
}

/// Binds the search text to catalog requests and holds the latest results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchController {
    text: String,
    results: Vec<Track>,
    loading: bool,
    generation: u64,
    last_error: Option<String>,
    #[serde(skip)]
    media: String,
    #[serde(skip)]
    limit: u32,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl SearchController {
    pub fn new(config: &Config) -> Self {
        Self {
            text: String::new(),
            results: Vec::new(),
            loading: false,
            generation: 0,
            last_error: None,
            media: config.media.clone(),
            limit: config.result_limit,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn results(&self) -> &[Track] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn find_result(&self, track_id: u64) -> Option<&Track> {
        self.results.iter().find(|t| t.id == track_id)
    }

    /// Stores `text` and, unless it is empty, starts a new request.
    ///
    /// An empty string leaves the current results untouched and issues
    /// nothing.
    pub fn set_text(&mut self, text: impl Into<String>) -> Option<SearchTicket> {
        self.text = text.into();

        if self.text.is_empty() {
            debug!("Empty search text, no request issued");
            return None;
        }

        self.generation += 1;
        self.loading = true;

        debug!("Issuing search #{} for {:?}", self.generation, self.text);

        Some(SearchTicket {
            generation: self.generation,
            query: SearchQuery::new(self.text.clone(), self.media.clone(), self.limit),
        })
    }

    /// Applies a finished fetch if it belongs to the latest request.
    pub fn apply(&mut self, outcome: FetchOutcome) -> Applied {
        if outcome.generation != self.generation {
            debug!(
                "Discarding stale search #{} (current is #{})",
                outcome.generation, self.generation
            );
            return Applied::Stale;
        }

        self.loading = false;

        match outcome.result {
            Ok(tracks) => {
                let count = tracks.len();
                self.results = tracks;
                self.last_error = None;
                Applied::Results(count)
            }
            Err(e) => {
                warn!("Search #{} for {:?} failed: {}", outcome.generation, self.text, e);
                self.last_error = Some(e.to_string());
                Applied::Failed
            }
        }
    }
}

/// Runs `ticket` against `source`, tagging the result with its generation.
pub async fn run_fetch<S: CatalogSource>(source: &S, ticket: SearchTicket) -> FetchOutcome {
    let result = source.search(&ticket.query).await;

    if let Ok(tracks) = &result {
        info!("Search #{} returned {} tracks", ticket.generation, tracks.len());
    }

    FetchOutcome {
        generation: ticket.generation,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::error::Result;

    /// Answers from a fixed table and records every query it sees.
    #[derive(Default)]
    struct FakeCatalog {
        responses: HashMap<String, Vec<Track>>,
        delays: HashMap<String, Duration>,
        seen: Mutex<Vec<SearchQuery>>,
        calls: AtomicUsize,
    }

    impl FakeCatalog {
        fn with(mut self, term: &str, tracks: Vec<Track>) -> Self {
            self.responses.insert(term.to_string(), tracks);
            self
        }

        fn delayed(mut self, term: &str, delay: Duration) -> Self {
            self.delays.insert(term.to_string(), delay);
            self
        }
    }

    impl CatalogSource for FakeCatalog {
        fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<Vec<Track>>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(query.clone());
            let delay = self.delays.get(&query.term).copied();
            let response = self.responses.get(&query.term).cloned();

            async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                response.ok_or_else(|| AppError::CatalogApi {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            }
        }
    }

    async fn search(
        controller: &mut SearchController,
        source: &FakeCatalog,
        text: &str,
    ) -> Option<Applied> {
        let ticket = controller.set_text(text)?;
        Some(controller.apply(run_fetch(source, ticket).await))
    }

    #[test]
    fn test_empty_text_issues_nothing_and_keeps_results() {
        let mut controller = SearchController::default();
        let ticket = controller.set_text("daft punk").unwrap();
        controller.apply(FetchOutcome {
            generation: ticket.generation,
            result: Ok(vec![Track::mock(1, "One More Time", "Daft Punk")]),
        });

        assert!(controller.set_text("").is_none());
        assert_eq!(controller.text(), "");
        assert_eq!(controller.results().len(), 1);
        assert_eq!(controller.generation(), 1);
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_ticket_carries_fixed_params() {
        let mut controller = SearchController::default();
        let ticket = controller.set_text("daft punk").unwrap();

        assert_eq!(ticket.generation, 1);
        assert_eq!(ticket.query, SearchQuery::new("daft punk", "music", 20));
        assert!(controller.is_loading());
    }

    #[test]
    fn test_whitespace_is_still_a_search() {
        let mut controller = SearchController::default();
        assert!(controller.set_text(" ").is_some());
    }

    #[tokio::test]
    async fn test_results_replaced_in_server_order() {
        let source = FakeCatalog::default().with(
            "daft punk",
            vec![
                Track::mock(1, "One More Time", "Daft Punk"),
                Track::mock(5, "Aerodynamic", "Daft Punk"),
            ],
        );
        let mut controller = SearchController::default();

        let applied = search(&mut controller, &source, "daft punk").await;

        assert_eq!(applied, Some(Applied::Results(2)));
        let ids: Vec<u64> = controller.results().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 5]);
        assert!(!controller.is_loading());
        assert_eq!(controller.last_error(), None);
    }

    #[tokio::test]
    async fn test_single_result_matches_exactly() {
        let one_more_time = Track::mock(1, "One More Time", "Daft Punk");
        let source = FakeCatalog::default().with("daft punk", vec![one_more_time.clone()]);
        let mut controller = SearchController::default();

        search(&mut controller, &source, "daft punk").await;

        assert_eq!(controller.results(), &[one_more_time]);
    }

    #[tokio::test]
    async fn test_empty_text_sends_no_request() {
        let source = FakeCatalog::default();
        let mut controller = SearchController::default();

        assert_eq!(search(&mut controller, &source, "").await, None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_clears_loading_and_keeps_results() {
        let source = FakeCatalog::default().with("justice", vec![Track::mock(9, "D.A.N.C.E.", "Justice")]);
        let mut controller = SearchController::default();
        search(&mut controller, &source, "justice").await;

        let applied = search(&mut controller, &source, "nothing here").await;

        assert_eq!(applied, Some(Applied::Failed));
        assert!(!controller.is_loading());
        assert_eq!(controller.results().len(), 1);
        assert!(controller.last_error().unwrap().contains("503"));

        // The next successful search clears the error.
        search(&mut controller, &source, "justice").await;
        assert_eq!(controller.last_error(), None);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let source = FakeCatalog::default()
            .with("daft", vec![Track::mock(1, "Stale", "Daft Punk")])
            .with("daft punk", vec![Track::mock(2, "Fresh", "Daft Punk")]);
        let mut controller = SearchController::default();

        let older = controller.set_text("daft").unwrap();
        let newer = controller.set_text("daft punk").unwrap();

        // Newer answers first, then the older one arrives late.
        assert_eq!(controller.apply(run_fetch(&source, newer).await), Applied::Results(1));
        assert_eq!(controller.apply(run_fetch(&source, older).await), Applied::Stale);

        assert_eq!(controller.results()[0].id, 2);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_loading_stays_set_until_latest_arrives() {
        let source = FakeCatalog::default()
            .with("a", vec![Track::mock(1, "A", "x")])
            .with("ab", vec![Track::mock(2, "AB", "x")]);
        let mut controller = SearchController::default();

        let first = controller.set_text("a").unwrap();
        let second = controller.set_text("ab").unwrap();

        controller.apply(run_fetch(&source, first).await);
        assert!(controller.is_loading());
        assert!(controller.results().is_empty());

        controller.apply(run_fetch(&source, second).await);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_concurrent_fetches_last_issued_wins() {
        let source = std::sync::Arc::new(
            FakeCatalog::default()
                .with("slow", vec![Track::mock(1, "Slow", "x")])
                .with("fast", vec![Track::mock(2, "Fast", "x")])
                .delayed("slow", Duration::from_millis(50)),
        );
        let mut controller = SearchController::default();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        for text in ["slow", "fast"] {
            let ticket = controller.set_text(text).unwrap();
            let source = source.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(run_fetch(source.as_ref(), ticket).await);
            });
        }
        drop(tx);

        let mut applied = Vec::new();
        while let Some(outcome) = rx.recv().await {
            applied.push(controller.apply(outcome));
        }

        assert_eq!(applied, vec![Applied::Results(1), Applied::Stale]);
        assert_eq!(controller.results()[0].name.as_deref(), Some("Fast"));
        assert_eq!(source.seen.lock().unwrap().len(), 2);
    }
}
