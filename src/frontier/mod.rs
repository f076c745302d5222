//! Frontier store: the durable BFS queue and visited set
//!
//! [`Frontier`] is the in-memory half: a FIFO queue of URLs plus the id sets
//! that make dedup exact (queued, in flight, visited). [`load_session`] and
//! [`checkpoint`] are the durable half, moving that state to and from a
//! [`CrawlStore`].

use crate::identity::{IdentityPolicy, PageId};
use crate::state::CrawlSession;
use crate::storage::{CrawlStore, StorageResult};
use std::collections::{HashSet, VecDeque};

/// In-memory frontier with its dedup sets
///
/// A URL is in at most one of: queued, in flight, visited. Once visited, an
/// id is never queued again.
#[derive(Debug, Clone)]
pub struct Frontier {
    policy: IdentityPolicy,
    queue: VecDeque<(PageId, String)>,
    queued: HashSet<PageId>,
    /// Dequeued but not yet marked visited, in dequeue order
    in_flight: Vec<(PageId, String)>,
    visited: HashSet<PageId>,
}

impl Frontier {
    pub fn new(policy: IdentityPolicy) -> Self {
        Self {
            policy,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            in_flight: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Rebuilds a frontier from persisted state
    ///
    /// Entries already visited, and later duplicates of an earlier entry,
    /// are dropped so the rebuilt frontier satisfies the dedup invariant even
    /// if the stored rows do not.
    pub fn restore(policy: IdentityPolicy, queued_urls: Vec<String>, visited: HashSet<PageId>) -> Self {
        let mut frontier = Self {
            visited,
            ..Self::new(policy)
        };

        for url in queued_urls {
            if !frontier.enqueue(url.as_str()) {
                tracing::debug!("Dropping stale frontier entry {}", url);
            }
        }

        frontier
    }

    /// Identifier of `url` under this frontier's identity policy
    pub fn identify(&self, url: &str) -> PageId {
        self.policy.identify(url)
    }

    /// Appends `url` to the tail unless its id is visited, queued or in flight
    ///
    /// Returns true if the URL was queued.
    pub fn enqueue(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        let id = self.identify(&url);

        if self.is_known(&id) {
            return false;
        }

        self.queued.insert(id);
        self.queue.push_back((id, url));
        true
    }

    /// Puts `url` at the head of the queue
    ///
    /// An entry that is already queued is moved to the head. Visited and
    /// in-flight URLs are left alone. Returns true if `url` is now at the head.
    pub fn push_front(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        let id = self.identify(&url);

        if self.visited.contains(&id) || self.in_flight.iter().any(|(f, _)| *f == id) {
            return false;
        }

        if self.queued.contains(&id) {
            self.queue.retain(|(queued_id, _)| *queued_id != id);
        } else {
            self.queued.insert(id);
        }

        self.queue.push_front((id, url));
        true
    }

    /// Pops the head of the queue (FIFO) and tracks it as in flight
    pub fn dequeue(&mut self) -> Option<String> {
        let (id, url) = self.queue.pop_front()?;
        self.queued.remove(&id);
        self.in_flight.push((id, url.clone()));
        Some(url)
    }

    /// Records `id` as visited; idempotent
    ///
    /// Returns true if the id was not visited before.
    pub fn mark_visited(&mut self, id: PageId) -> bool {
        self.in_flight.retain(|(f, _)| *f != id);
        if self.queued.remove(&id) {
            self.queue.retain(|(queued_id, _)| *queued_id != id);
        }
        self.visited.insert(id)
    }

    pub fn is_visited(&self, id: &PageId) -> bool {
        self.visited.contains(id)
    }

    pub fn is_queued(&self, id: &PageId) -> bool {
        self.queued.contains(id)
    }

    /// Number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn visited(&self) -> &HashSet<PageId> {
        &self.visited
    }

    /// Queued URLs in FIFO order
    pub fn queued_urls(&self) -> Vec<String> {
        self.queue.iter().map(|(_, url)| url.clone()).collect()
    }

    /// The URL list a checkpoint persists
    ///
    /// In-flight URLs lead the list: if a checkpoint is ever taken while a
    /// fetch is outstanding, that page is fetched again on resume rather
    /// than lost.
    pub fn snapshot(&self) -> Vec<String> {
        self.in_flight
            .iter()
            .map(|(_, url)| url.clone())
            .chain(self.queue.iter().map(|(_, url)| url.clone()))
            .collect()
    }

    fn is_known(&self, id: &PageId) -> bool {
        self.visited.contains(id)
            || self.queued.contains(id)
            || self.in_flight.iter().any(|(f, _)| f == id)
    }
}

/// Loads the persisted frontier and visited set into a fresh session
///
/// If the seed has not been visited it is placed at the head of the
/// frontier, so a resumed crawl always continues from its seed first.
pub fn load_session<S: CrawlStore + ?Sized>(
    store: &S,
    seed_url: &str,
    policy: IdentityPolicy,
) -> StorageResult<CrawlSession> {
    let queued_urls = store.load_frontier()?;
    let visited = store.load_visited()?;
    tracing::info!(
        "Loaded {} queued URLs and {} visited pages",
        queued_urls.len(),
        visited.len()
    );

    let mut frontier = Frontier::restore(policy, queued_urls, visited);

    if frontier.push_front(seed_url) {
        tracing::debug!("Seed {} placed at frontier head", seed_url);
    } else {
        tracing::debug!("Seed {} already visited", seed_url);
    }

    Ok(CrawlSession::new(seed_url, frontier))
}

/// Durably flushes the session's frontier and pending records in one transaction
///
/// The pending buffers are cleared only after the store commits, so a failed
/// checkpoint can be retried with nothing lost.
pub fn checkpoint<S: CrawlStore + ?Sized>(
    store: &mut S,
    session: &mut CrawlSession,
) -> StorageResult<()> {
    let snapshot = session.frontier.snapshot();
    store.checkpoint(&snapshot, &session.pending_records, &session.pending_failures)?;

    tracing::debug!(
        "Checkpoint: {} queued, {} records, {} failures",
        snapshot.len(),
        session.pending_records.len(),
        session.pending_failures.len()
    );

    session.clear_pending();
    Ok(())
}
