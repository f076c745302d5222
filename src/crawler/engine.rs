//! Crawl engine - the state machine that drives a crawl session
//!
//! The engine owns its collaborators (fetcher, store, continuation) and moves
//! an explicit [`CrawlSession`] through the crawl:
//! - `start` loads the durable frontier and visited set and opens a run
//! - `step` fetches one batch, applies the results in dequeue order and
//!   checkpoints when the interval is reached
//! - `run` repeats `step` until the crawl pauses or runs out of pages
//!
//! Fetch failures are recorded and skipped. Persistence failures abort.

use crate::config::{validate_crawl_limits, validate_seed_url, Config};
use crate::crawler::continuation::{Continuation, StopSignal};
use crate::fetcher::{extract_keywords, extract_links, Document, FetchError, PageFetcher};
use crate::frontier::{self, load_session};
use crate::identity::IdentityPolicy;
use crate::state::{CrawlSession, CrawlState};
use crate::storage::{CrawlStore, PersistenceError};
use crate::{ConfigResult, Result, SpideyError};
use futures::future::join_all;
use std::time::Instant;

/// Tuning the engine reads on every step
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub seed_url: String,
    pub checkpoint_interval: u32,
    pub keyword_count: usize,
    pub max_concurrent_fetches: usize,
    pub identity: IdentityPolicy,

    /// Stored on the run record
    pub config_hash: String,
}

impl EngineSettings {
    pub fn from_config(config: &Config, config_hash: impl Into<String>) -> Self {
        Self {
            seed_url: config.crawler.seed_url.clone(),
            checkpoint_interval: config.crawler.checkpoint_interval,
            keyword_count: config.crawler.keyword_count as usize,
            max_concurrent_fetches: config.crawler.max_concurrent_fetches as usize,
            identity: config.crawler.identity,
            config_hash: config_hash.into(),
        }
    }

    /// Rejects settings the engine cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        validate_seed_url(&self.seed_url)?;
        validate_crawl_limits(
            self.checkpoint_interval as u64,
            self.keyword_count as u64,
            self.max_concurrent_fetches as u64,
        )
    }
}

/// How a crawl that did not abort ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Stopped at a checkpoint; the next run resumes from there
    Paused,

    /// The frontier ran dry
    Exhausted,
}

impl CrawlOutcome {
    pub fn state(&self) -> CrawlState {
        match self {
            Self::Paused => CrawlState::Paused,
            Self::Exhausted => CrawlState::Exhausted,
        }
    }
}

/// Result of a single engine step
#[derive(Debug)]
pub enum Step {
    /// More work remains; pass the session to the next `step`
    Continue(CrawlSession),

    /// The session reached a terminal state
    Finished(CrawlSession, CrawlOutcome),
}

/// Summary returned by [`CrawlEngine::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub outcome: CrawlOutcome,
    pub pages_crawled: u64,
    pub pages_failed: u64,
    pub frontier_remaining: usize,
    pub run_id: i64,
}

/// Breadth-first crawl engine
pub struct CrawlEngine<F, S, C> {
    fetcher: F,
    store: S,
    continuation: C,
    settings: EngineSettings,
    stop: StopSignal,
    state: CrawlState,
    run_id: Option<i64>,
    started_at: Option<Instant>,
}

impl<F, S, C> CrawlEngine<F, S, C>
where
    F: PageFetcher,
    S: CrawlStore,
    C: Continuation,
{
    pub fn new(fetcher: F, store: S, continuation: C, settings: EngineSettings) -> Self {
        Self {
            fetcher,
            store,
            continuation,
            settings,
            stop: StopSignal::new(),
            state: CrawlState::Idle,
            run_id: None,
            started_at: None,
        }
    }

    /// Replaces the engine's stop signal with a shared one
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// A handle that pauses the crawl at the next batch boundary
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn run_id(&self) -> Option<i64> {
        self.run_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Idle -> Running: opens a run and loads the durable session
    ///
    /// Fails without side effects if the engine is not idle or its
    /// settings are invalid.
    pub fn start(&mut self) -> Result<CrawlSession> {
        if self.state != CrawlState::Idle {
            return Err(SpideyError::InvalidTransition {
                from: self.state,
                to: CrawlState::Running,
            });
        }

        self.settings.validate()?;

        let run_id = self
            .store
            .create_run(&self.settings.seed_url, &self.settings.config_hash)?;
        let session = load_session(&self.store, &self.settings.seed_url, self.settings.identity)?;

        self.transition(CrawlState::Running)?;
        self.run_id = Some(run_id);
        self.started_at = Some(Instant::now());

        tracing::info!(
            "Starting crawl run {} from {} ({} queued, {} already visited)",
            run_id,
            self.settings.seed_url,
            session.frontier.len(),
            session.frontier.visited_count()
        );

        Ok(session)
    }

    /// Processes one batch of the frontier
    ///
    /// The batch holds at most `max_concurrent_fetches` URLs and never runs
    /// past the next checkpoint. Fetches in a batch run concurrently; their
    /// results are applied in the order the URLs were dequeued.
    pub async fn step(&mut self, mut session: CrawlSession) -> Result<Step> {
        if self.state != CrawlState::Running {
            return Err(SpideyError::InvalidTransition {
                from: self.state,
                to: CrawlState::Running,
            });
        }

        if session.frontier.is_empty() {
            tracing::info!("Frontier is empty, crawl complete");
            return self.halt(session, CrawlOutcome::Exhausted);
        }

        if self.stop.is_triggered() {
            tracing::info!("Stop requested, pausing at checkpoint");
            return self.halt(session, CrawlOutcome::Paused);
        }

        let interval = self.settings.checkpoint_interval;
        let room = interval.saturating_sub(session.pages_since_checkpoint).max(1) as usize;
        let batch_size = self
            .settings
            .max_concurrent_fetches
            .min(room)
            .min(session.frontier.len());

        let batch: Vec<String> = (0..batch_size)
            .filter_map(|_| session.frontier.dequeue())
            .collect();

        let results = join_all(batch.iter().map(|url| self.fetcher.fetch(url))).await;

        for (url, result) in batch.into_iter().zip(results) {
            self.apply(&mut session, url, result);
        }

        if session.checkpoint_due(interval) {
            self.checkpoint(&mut session)?;
            self.log_progress(&session);

            if !self.continuation.should_continue(session.pages_crawled) {
                tracing::info!("Pausing after {} pages", session.pages_crawled);
                return self.conclude(session, CrawlOutcome::Paused);
            }
        }

        Ok(Step::Continue(session))
    }

    /// Starts the crawl and steps it until it pauses, exhausts or aborts
    pub async fn run(&mut self) -> Result<CrawlReport> {
        let mut session = self.start()?;

        loop {
            match self.step(session).await? {
                Step::Continue(next) => session = next,
                Step::Finished(done, outcome) => return Ok(self.report(&done, outcome)),
            }
        }
    }

    pub fn report(&self, session: &CrawlSession, outcome: CrawlOutcome) -> CrawlReport {
        CrawlReport {
            outcome,
            pages_crawled: session.pages_crawled,
            pages_failed: session.pages_failed,
            frontier_remaining: session.frontier.len(),
            run_id: self.run_id.unwrap_or_default(),
        }
    }

    fn apply(
        &self,
        session: &mut CrawlSession,
        url: String,
        result: std::result::Result<Document, FetchError>,
    ) {
        let id = session.frontier.identify(&url);

        match result {
            Ok(document) => {
                let keywords = extract_keywords(&document, self.settings.keyword_count);
                let links = extract_links(&document);
                let found = links.len();
                let queued = session.record_success(id, &url, keywords, links);
                tracing::debug!("{}: {} links, {} newly queued", url, found, queued);
            }
            Err(error) => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
                session.record_failure(id, &url, &error);
            }
        }
    }

    /// Final checkpoint, then the terminal transition
    fn halt(&mut self, mut session: CrawlSession, outcome: CrawlOutcome) -> Result<Step> {
        self.checkpoint(&mut session)?;
        self.conclude(session, outcome)
    }

    fn conclude(&mut self, session: CrawlSession, outcome: CrawlOutcome) -> Result<Step> {
        let state = outcome.state();
        self.transition(state)?;

        if let Some(run_id) = self.run_id {
            self.store.finish_run(run_id, state, session.pages_crawled)?;
        }

        tracing::info!(
            "Crawl {}: {} pages crawled ({} failed), {} left in frontier",
            state,
            session.pages_crawled,
            session.pages_failed,
            session.frontier.len()
        );

        Ok(Step::Finished(session, outcome))
    }

    fn checkpoint(&mut self, session: &mut CrawlSession) -> Result<()> {
        match frontier::checkpoint(&mut self.store, session) {
            Ok(()) => Ok(()),
            Err(error) => Err(self.abort(session, error)),
        }
    }

    /// Running -> Aborted after a failed checkpoint
    ///
    /// Tries the checkpoint once more and marks the run aborted, both best
    /// effort. The original error is what the caller sees.
    fn abort(&mut self, session: &mut CrawlSession, error: PersistenceError) -> SpideyError {
        tracing::error!("Checkpoint failed: {}", error);

        match frontier::checkpoint(&mut self.store, session) {
            Ok(()) => tracing::warn!("Retried checkpoint succeeded; aborting anyway"),
            Err(retry) => tracing::error!("Retried checkpoint failed: {}", retry),
        }

        self.state = CrawlState::Aborted;

        if let Some(run_id) = self.run_id {
            if let Err(e) = self
                .store
                .finish_run(run_id, CrawlState::Aborted, session.pages_crawled)
            {
                tracing::warn!("Could not mark run {} aborted: {}", run_id, e);
            }
        }

        SpideyError::Persistence(error)
    }

    fn transition(&mut self, to: CrawlState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(SpideyError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!("Crawl state {} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }

    fn log_progress(&self, session: &CrawlSession) {
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or_default();
        let rate = if elapsed > 0.0 {
            session.pages_crawled as f64 / elapsed
        } else {
            0.0
        };

        tracing::info!(
            "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
            session.pages_crawled,
            session.frontier.len(),
            rate
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{AlwaysContinue, StopAfter};
    use crate::identity::identify;
    use crate::state::{FailureRecord, PageRecord};
    use crate::storage::{RunRecord, SqliteStore, StorageResult};
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    const S: &str = "https://s.test/";
    const P1: &str = "https://p1.test/";
    const P2: &str = "https://p2.test/";
    const P3: &str = "https://p3.test/";
    const P4: &str = "https://p4.test/";

    /// Serves canned documents and records every URL it is asked for
    #[derive(Default)]
    struct MapFetcher {
        pages: HashMap<String, std::result::Result<Document, FetchError>>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl MapFetcher {
        fn page(mut self, url: &str, links: &[&str], text: &str) -> Self {
            let hrefs = links.iter().map(|l| l.to_string()).collect();
            self.pages
                .insert(url.to_string(), Ok(Document::from_parts(hrefs, text)));
            self
        }

        fn failing(mut self, url: &str, error: FetchError) -> Self {
            self.pages.insert(url.to_string(), Err(error));
            self
        }

        fn log(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.log)
        }
    }

    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<Document, FetchError> {
            self.log.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .unwrap_or_else(|| {
                    Err(FetchError::Unreachable {
                        url: url.to_string(),
                        message: "no such page".to_string(),
                    })
                })
        }
    }

    fn settings(interval: u32, concurrency: usize) -> EngineSettings {
        EngineSettings {
            seed_url: S.to_string(),
            checkpoint_interval: interval,
            keyword_count: 2,
            max_concurrent_fetches: concurrency,
            identity: IdentityPolicy::Exact,
            config_hash: "test-hash".to_string(),
        }
    }

    fn store() -> SqliteStore {
        SqliteStore::new_in_memory().unwrap()
    }

    fn fetched(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn stored_urls(store: &impl CrawlStore) -> Vec<String> {
        let mut pages = store.recent_pages(100).unwrap();
        pages.reverse();
        pages.into_iter().map(|p| p.url).collect()
    }

    #[tokio::test]
    async fn test_breadth_first_order() {
        let fetcher = MapFetcher::default()
            .page(S, &[P1, P2], "seed")
            .page(P1, &[P3], "one")
            .page(P2, &[], "two")
            .page(P3, &[], "three");
        let log = fetcher.log();

        let mut engine = CrawlEngine::new(fetcher, store(), AlwaysContinue, settings(30, 1));
        let report = engine.run().await.unwrap();

        assert_eq!(fetched(&log), vec![S, P1, P2, P3]);
        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(report.pages_crawled, 4);
        assert_eq!(report.frontier_remaining, 0);
        assert_eq!(engine.state(), CrawlState::Exhausted);
        assert_eq!(stored_urls(engine.store()), vec![S, P1, P2, P3]);

        let run = engine.store().get_latest_run().unwrap().unwrap();
        assert_eq!(run.status, CrawlState::Exhausted);
        assert_eq!(run.pages_crawled, 4);
        assert_eq!(run.config_hash, "test-hash");
    }

    #[tokio::test]
    async fn test_rediscovered_pages_are_fetched_once() {
        let fetcher = MapFetcher::default()
            .page(S, &[P1, P2, P1], "seed")
            .page(P1, &[S, P2], "one")
            .page(P2, &[P1, S], "two");
        let log = fetcher.log();

        let mut engine = CrawlEngine::new(fetcher, store(), AlwaysContinue, settings(30, 1));
        engine.run().await.unwrap();

        assert_eq!(fetched(&log), vec![S, P1, P2]);
        assert_eq!(engine.store().count_pages().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_visited_once_and_crawl_continues() {
        let fetcher = MapFetcher::default()
            .page(S, &[P1, P2], "seed")
            .failing(P1, FetchError::Timeout { url: P1.to_string() })
            .page(P2, &[P1], "two");
        let log = fetcher.log();

        let mut engine = CrawlEngine::new(fetcher, store(), AlwaysContinue, settings(30, 1));
        let report = engine.run().await.unwrap();

        assert_eq!(fetched(&log), vec![S, P1, P2]);
        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(report.pages_failed, 1);

        let failed = engine.store().get_page(&identify(P1)).unwrap().unwrap();
        assert!(failed.keywords.is_empty());

        let failures = engine.store().get_failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, "timeout");
        assert_eq!(engine.store().count_queued().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_keywords_are_recorded() {
        let fetcher = MapFetcher::default().page(S, &[], "a a b b b c");

        let mut engine = CrawlEngine::new(fetcher, store(), AlwaysContinue, settings(30, 1));
        engine.run().await.unwrap();

        let record = engine.store().get_page(&identify(S)).unwrap().unwrap();
        assert_eq!(record.keywords, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_pause_then_resume_without_refetching() {
        let pages = || {
            MapFetcher::default()
                .page(S, &[P1], "s")
                .page(P1, &[P2], "1")
                .page(P2, &[P3], "2")
                .page(P3, &[P4], "3")
                .page(P4, &[S], "4")
        };

        let first = pages();
        let first_log = first.log();
        let mut engine = CrawlEngine::new(first, store(), StopAfter::new(2), settings(2, 1));
        let report = engine.run().await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Paused);
        assert_eq!(report.pages_crawled, 2);
        assert_eq!(fetched(&first_log), vec![S, P1]);
        assert_eq!(engine.store().load_frontier().unwrap(), vec![P2]);

        let store = engine.into_store();
        let second = pages();
        let second_log = second.log();
        let mut engine = CrawlEngine::new(second, store, AlwaysContinue, settings(2, 1));
        let report = engine.run().await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(fetched(&second_log), vec![P2, P3, P4]);
        assert_eq!(engine.store().count_pages().unwrap(), 5);
        assert_eq!(engine.store().count_runs().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stop_signal_pauses_with_frontier_persisted() {
        let fetcher = MapFetcher::default().page(S, &[P1], "seed");
        let log = fetcher.log();

        let mut engine = CrawlEngine::new(fetcher, store(), AlwaysContinue, settings(30, 1));
        engine.stop_signal().trigger();
        let report = engine.run().await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Paused);
        assert!(fetched(&log).is_empty());
        assert_eq!(engine.store().load_frontier().unwrap(), vec![S]);
        assert_eq!(engine.state(), CrawlState::Paused);
    }

    #[tokio::test]
    async fn test_stop_signal_observed_between_batches() {
        let fetcher = MapFetcher::default()
            .page(S, &[P1, P2], "seed")
            .page(P1, &[], "one");
        let log = fetcher.log();

        let mut engine = CrawlEngine::new(fetcher, store(), AlwaysContinue, settings(30, 1));
        let stop = engine.stop_signal();

        let session = engine.start().unwrap();
        let session = match engine.step(session).await.unwrap() {
            Step::Continue(session) => session,
            Step::Finished(..) => panic!("crawl finished early"),
        };
        stop.trigger();

        match engine.step(session).await.unwrap() {
            Step::Finished(session, outcome) => {
                assert_eq!(outcome, CrawlOutcome::Paused);
                assert_eq!(session.pages_crawled, 1);
            }
            Step::Continue(_) => panic!("stop signal ignored"),
        }

        assert_eq!(fetched(&log), vec![S]);
        assert_eq!(engine.store().load_frontier().unwrap(), vec![P1, P2]);
        assert_eq!(engine.store().count_pages().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_batches_apply_in_dequeue_order() {
        let fetcher = MapFetcher::default()
            .page(S, &[P1, P2, P3, P4], "seed")
            .page(P1, &[P4], "1")
            .page(P2, &[], "2")
            .page(P3, &[], "3")
            .page(P4, &[], "4");

        let asked = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&asked);
        let continuation = move |pages: u64| {
            recorder.lock().unwrap().push(pages);
            true
        };

        let mut engine = CrawlEngine::new(fetcher, store(), continuation, settings(2, 3));
        let report = engine.run().await.unwrap();

        assert_eq!(report.pages_crawled, 5);
        assert_eq!(stored_urls(engine.store()), vec![S, P1, P2, P3, P4]);
        // Batches never cross a checkpoint boundary
        assert_eq!(*asked.lock().unwrap(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let fetcher = MapFetcher::default().page(S, &[], "seed");
        let mut engine = CrawlEngine::new(fetcher, store(), AlwaysContinue, settings(30, 1));
        engine.run().await.unwrap();

        let err = engine.start().unwrap_err();
        assert!(matches!(
            err,
            SpideyError::InvalidTransition {
                from: CrawlState::Exhausted,
                to: CrawlState::Running
            }
        ));
    }

    #[tokio::test]
    async fn test_invalid_seed_fails_before_any_work() {
        let mut settings = settings(30, 1);
        settings.seed_url = "ftp://nope.test/".to_string();

        let mut engine = CrawlEngine::new(MapFetcher::default(), store(), AlwaysContinue, settings);
        assert!(matches!(engine.start(), Err(SpideyError::Config(_))));
        assert_eq!(engine.state(), CrawlState::Idle);
        assert_eq!(engine.store().count_runs().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_limits_fail_before_any_work() {
        let cases: [fn(&mut EngineSettings); 3] = [
            |s| s.checkpoint_interval = 0,
            |s| s.keyword_count = 0,
            |s| s.max_concurrent_fetches = 0,
        ];

        for zero_out in cases {
            let mut settings = settings(30, 1);
            zero_out(&mut settings);

            let fetcher = MapFetcher::default().page(S, &[], "seed");
            let log = fetcher.log();
            let mut engine = CrawlEngine::new(fetcher, store(), AlwaysContinue, settings);

            assert!(matches!(
                engine.start(),
                Err(SpideyError::Config(crate::ConfigError::Validation(_)))
            ));
            assert_eq!(engine.state(), CrawlState::Idle);
            assert_eq!(engine.store().count_runs().unwrap(), 0);
            assert!(fetched(&log).is_empty());
        }
    }

    #[tokio::test]
    async fn test_empty_frontier_reports_exhausted_despite_stop() {
        let fetcher = MapFetcher::default().failing(S, FetchError::Timeout { url: S.to_string() });
        let mut engine = CrawlEngine::new(fetcher, store(), AlwaysContinue, settings(30, 1));
        let stop = engine.stop_signal();

        let session = engine.start().unwrap();
        let session = match engine.step(session).await.unwrap() {
            Step::Continue(session) => session,
            Step::Finished(..) => panic!("crawl finished before fetching the seed"),
        };
        assert!(session.frontier.is_empty());
        stop.trigger();

        match engine.step(session).await.unwrap() {
            Step::Finished(_, outcome) => assert_eq!(outcome, CrawlOutcome::Exhausted),
            Step::Continue(_) => panic!("empty frontier did not finish the crawl"),
        }
        assert_eq!(engine.state(), CrawlState::Exhausted);

        let run = engine.store().get_latest_run().unwrap().unwrap();
        assert_eq!(run.status, CrawlState::Exhausted);
    }

    /// Store whose checkpoints always fail
    struct BrokenStore {
        inner: SqliteStore,
        checkpoint_attempts: usize,
    }

    impl CrawlStore for BrokenStore {
        fn load_frontier(&self) -> StorageResult<Vec<String>> {
            self.inner.load_frontier()
        }

        fn load_visited(&self) -> StorageResult<HashSet<crate::identity::PageId>> {
            self.inner.load_visited()
        }

        fn checkpoint(
            &mut self,
            _frontier: &[String],
            _records: &[PageRecord],
            _failures: &[FailureRecord],
        ) -> StorageResult<()> {
            self.checkpoint_attempts += 1;
            Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        fn append_records(
            &mut self,
            records: &[PageRecord],
            failures: &[FailureRecord],
        ) -> StorageResult<()> {
            self.inner.append_records(records, failures)
        }

        fn get_page(&self, id: &crate::identity::PageId) -> StorageResult<Option<PageRecord>> {
            self.inner.get_page(id)
        }

        fn recent_pages(&self, limit: usize) -> StorageResult<Vec<PageRecord>> {
            self.inner.recent_pages(limit)
        }

        fn find_pages_by_keyword(&self, keyword: &str) -> StorageResult<Vec<PageRecord>> {
            self.inner.find_pages_by_keyword(keyword)
        }

        fn get_failures(&self) -> StorageResult<Vec<FailureRecord>> {
            self.inner.get_failures()
        }

        fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64> {
            self.inner.create_run(seed_url, config_hash)
        }

        fn finish_run(
            &mut self,
            run_id: i64,
            status: CrawlState,
            pages_crawled: u64,
        ) -> StorageResult<()> {
            self.inner.finish_run(run_id, status, pages_crawled)
        }

        fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
            self.inner.get_latest_run()
        }

        fn count_pages(&self) -> StorageResult<u64> {
            self.inner.count_pages()
        }

        fn count_failures(&self) -> StorageResult<u64> {
            self.inner.count_failures()
        }

        fn count_queued(&self) -> StorageResult<u64> {
            self.inner.count_queued()
        }

        fn count_runs(&self) -> StorageResult<u64> {
            self.inner.count_runs()
        }

        fn reset(&mut self) -> StorageResult<()> {
            self.inner.reset()
        }
    }

    #[tokio::test]
    async fn test_checkpoint_failure_aborts() {
        let fetcher = MapFetcher::default()
            .page(S, &[P1], "seed")
            .page(P1, &[P2], "one")
            .page(P2, &[], "two");
        let log = fetcher.log();
        let broken = BrokenStore {
            inner: store(),
            checkpoint_attempts: 0,
        };

        let mut engine = CrawlEngine::new(fetcher, broken, AlwaysContinue, settings(1, 1));
        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, SpideyError::Persistence(PersistenceError::Io(_))));
        assert_eq!(engine.state(), CrawlState::Aborted);
        assert_eq!(fetched(&log), vec![S]);
        assert_eq!(engine.store().checkpoint_attempts, 2);

        let run = engine.store().get_latest_run().unwrap().unwrap();
        assert_eq!(run.status, CrawlState::Aborted);
    }
}
