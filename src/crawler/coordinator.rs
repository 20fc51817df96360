//! Crawl coordinator - main crawl orchestration logic
//!
//! The coordinator is the single control loop of a crawl. It:
//! - Seeds the worker pool with the disambiguation page
//! - Drains pages from the result stream and parses them
//! - Applies the per-level link budget and queues the next batches
//! - Detects completion once no work is outstanding and the stream is empty

use crate::config::CrawlerConfig;
use crate::crawler::progress::Progress;
use crate::crawler::work::{chunk_requests, LinkBudget, LinkRequest, WorkItem};
use crate::crawler::worker::{CrawlEvent, Outstanding, WorkerPool};
use crate::markup::extract_wikitext;
use crate::tree::{PageId, PageTree, SharedTree};
use crate::wiki::Resolver;
use crate::DisamError;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Coordinator states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Handling whatever is already on the result stream
    Running,
    /// Nothing ready: waiting for an event or for the workers to go idle
    Draining,
    /// No work outstanding and nothing left to handle
    Done,
}

/// What ended a wait in [`State::Draining`]
enum Wake {
    Event(Option<CrawlEvent>),
    Idle,
    WorkerExit(DisamError),
}

/// Main crawl coordinator structure
pub struct Coordinator {
    tree: SharedTree,
    pool: WorkerPool,
    results: mpsc::UnboundedReceiver<CrawlEvent>,
    outstanding: Outstanding,
    budget: LinkBudget,
    batch_size: usize,
    progress: Progress,
}

impl Coordinator {
    /// Creates a coordinator and spawns its worker pool
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: &CrawlerConfig, resolver: Resolver) -> Self {
        let tree = SharedTree::new();
        let outstanding = Outstanding::new();
        let (results_tx, results) = mpsc::unbounded_channel();
        let pool = WorkerPool::spawn(
            config.workers,
            resolver,
            tree.clone(),
            results_tx,
            outstanding.clone(),
        );

        Self {
            tree,
            pool,
            results,
            outstanding,
            budget: LinkBudget::from(config),
            batch_size: config.batch_size,
            progress: Progress::new(config.progress),
        }
    }

    /// Crawls outward from `seed_title` and returns the finished tree
    ///
    /// The workers are stopped before returning, whether the crawl succeeded or
    /// not.
    pub async fn run(mut self, seed_title: &str) -> Result<PageTree, DisamError> {
        tracing::info!("Seeding crawl with '{}'", seed_title);
        let result = self.drive(seed_title).await;
        self.progress.finish();
        self.pool.shutdown().await;

        result?;
        tracing::info!(
            "Crawl drained: {} articles processed, {} requested",
            self.progress.processed(),
            self.progress.sent()
        );
        Ok(self.tree.take())
    }

    async fn drive(&mut self, seed_title: &str) -> Result<(), DisamError> {
        self.pool.submit(WorkItem::seed(seed_title))?;

        let mut state = State::Running;
        while state != State::Done {
            state = match state {
                State::Running => match self.results.try_recv() {
                    Ok(event) => {
                        self.handle(event)?;
                        State::Running
                    }
                    Err(TryRecvError::Empty) => State::Draining,
                    Err(TryRecvError::Disconnected) => return Err(stream_closed()),
                },
                State::Draining => {
                    let wake = tokio::select! {
                        event = self.results.recv() => Wake::Event(event),
                        _ = self.outstanding.wait_idle() => Wake::Idle,
                        error = self.pool.worker_exited() => Wake::WorkerExit(error),
                    };
                    match wake {
                        Wake::Event(Some(event)) => {
                            self.handle(event)?;
                            State::Running
                        }
                        Wake::Event(None) => return Err(stream_closed()),
                        Wake::WorkerExit(error) => {
                            tracing::error!("Aborting crawl: {}", error);
                            return Err(error);
                        }
                        // Pages are published before their item completes, so
                        // anything not yet on the stream now never will be
                        Wake::Idle => match self.results.try_recv() {
                            Ok(event) => {
                                self.handle(event)?;
                                State::Running
                            }
                            Err(_) => State::Done,
                        },
                    }
                }
                State::Done => State::Done,
            };
        }

        tracing::debug!("Crawl idle with {} items outstanding", self.outstanding.get());
        Ok(())
    }

    fn handle(&mut self, event: CrawlEvent) -> Result<(), DisamError> {
        match event {
            CrawlEvent::Page(id) => self.handle_page(id),
            CrawlEvent::Failed(error) => {
                tracing::error!("Aborting crawl: {}", error);
                Err(error)
            }
        }
    }

    /// Parses a freshly resolved page and queues its links
    fn handle_page(&mut self, id: PageId) -> Result<(), DisamError> {
        let (raw, level, path) = {
            let tree = self.tree.lock();
            let page = tree.get(id);
            (page.raw_content.clone(), tree.level(id), tree.hierarchy_path(id))
        };

        let Some(raw) = raw else {
            tracing::warn!("Page does not exist: {}", path);
            return Ok(());
        };

        let extracted = extract_wikitext(&raw);
        let requests: Vec<LinkRequest> = {
            let mut tree = self.tree.lock();
            tree.set_parsed(id, extracted.plain_text, extracted.links);
            if self.budget.expands(level) {
                tree.get(id)
                    .links(self.budget.links_for(level))
                    .iter()
                    .map(LinkRequest::from)
                    .collect()
            } else {
                Vec::new()
            }
        };
        self.progress.record_processed();

        if !requests.is_empty() {
            tracing::debug!(
                "Following {} link(s) from {} (level {})",
                requests.len(),
                path,
                level
            );
            self.progress.add_sent(requests.len());
            for item in chunk_requests(Some(id), requests, self.batch_size) {
                self.pool.submit(item)?;
            }
        }

        self.progress.report();
        Ok(())
    }
}

fn stream_closed() -> DisamError {
    DisamError::WorkerPool("result stream closed while work was outstanding".to_string())
}
