//! Fetch-and-expand worker pool
//!
//! Each worker repeatedly:
//! 1. Claims a [`WorkItem`] from the shared queue
//! 2. Splits its requests into plain titles and section fragments
//! 3. Resolves them (full content for the seed, lead section otherwise)
//! 4. Inserts the resulting pages and attaches them under the item's parent
//! 5. Publishes every new page on the result stream
//! 6. Marks the item as processed
//!
//! A work item is claimed by exactly one worker, so attaching children under a
//! given parent never races.

use crate::crawler::work::{TitleSpec, WorkItem};
use crate::tree::{Page, PageId, SharedTree};
use crate::wiki::{ResolutionRecord, Resolver};
use crate::{DisamError, ResolveError};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinSet;

/// What workers report back to the coordinator
#[derive(Debug)]
pub enum CrawlEvent {
    /// A page was created (and attached, unless it is the root)
    Page(PageId),
    /// A work item failed fatally
    Failed(DisamError),
}

/// Count of work items enqueued but not yet fully processed
///
/// Incremented before an item is queued and decremented only after the worker
/// has published its pages, so zero outstanding work plus an empty result stream
/// means the crawl is finished.
#[derive(Debug, Clone)]
pub struct Outstanding {
    count: Arc<watch::Sender<usize>>,
}

impl Default for Outstanding {
    fn default() -> Self {
        Self::new()
    }
}

impl Outstanding {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }

    pub fn begin(&self) {
        self.count.send_modify(|n| *n += 1);
    }

    pub fn complete(&self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
    }

    pub fn get(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolves once no work item is outstanding
    pub async fn wait_idle(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

/// Everything a worker needs, cloned into each task
#[derive(Clone)]
struct WorkerContext {
    resolver: Resolver,
    tree: SharedTree,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<WorkItem>>>,
    results: mpsc::UnboundedSender<CrawlEvent>,
    outstanding: Outstanding,
}

/// Fixed-size set of fetch workers fed from one unbounded queue
pub struct WorkerPool {
    tasks: JoinSet<()>,
    queue: mpsc::UnboundedSender<WorkItem>,
    outstanding: Outstanding,
}

impl WorkerPool {
    /// Spawns `size` workers
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(
        size: usize,
        resolver: Resolver,
        tree: SharedTree,
        results: mpsc::UnboundedSender<CrawlEvent>,
        outstanding: Outstanding,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let context = WorkerContext {
            resolver,
            tree,
            queue: Arc::new(Mutex::new(queue_rx)),
            results,
            outstanding: outstanding.clone(),
        };

        let mut tasks = JoinSet::new();
        for worker_id in 0..size.max(1) {
            tasks.spawn(run_worker(worker_id, context.clone()));
        }
        tracing::debug!("Spawned {} fetch workers", size.max(1));

        Self {
            tasks,
            queue: queue_tx,
            outstanding,
        }
    }

    /// Counts `item` as outstanding and queues it
    pub fn submit(&self, item: WorkItem) -> Result<(), DisamError> {
        self.outstanding.begin();
        self.queue.send(item).map_err(|_| {
            self.outstanding.complete();
            DisamError::WorkerPool("work queue closed".to_string())
        })
    }

    /// Resolves when a worker task ends
    ///
    /// Workers run until the pool is dropped, so any exit before that is a
    /// failure: a panicking worker never completes its item.
    pub async fn worker_exited(&mut self) -> DisamError {
        match self.tasks.join_next().await {
            Some(Err(e)) if e.is_panic() => DisamError::WorkerPool(format!("worker panicked: {}", e)),
            Some(Err(e)) => DisamError::WorkerPool(format!("worker cancelled: {}", e)),
            Some(Ok(())) => DisamError::WorkerPool("worker exited while work was outstanding".to_string()),
            None => std::future::pending().await,
        }
    }

    /// Stops all workers, abandoning queued items
    pub async fn shutdown(mut self) {
        self.tasks.abort_all();
        while self.tasks.join_next().await.is_some() {}
    }
}

async fn run_worker(worker_id: usize, ctx: WorkerContext) {
    loop {
        let item = {
            let mut queue = ctx.queue.lock().await;
            queue.recv().await
        };
        let Some(item) = item else {
            tracing::debug!("Worker {} exiting: queue closed", worker_id);
            break;
        };

        let events = match process_item(&ctx.resolver, &ctx.tree, &item).await {
            Ok(pages) => pages.into_iter().map(CrawlEvent::Page).collect(),
            Err(e) => {
                tracing::error!("Worker {} failed on {:?}: {}", worker_id, item.parent, e);
                vec![CrawlEvent::Failed(e)]
            }
        };

        let mut delivered = true;
        for event in events {
            if ctx.results.send(event).is_err() {
                delivered = false;
                break;
            }
        }
        ctx.outstanding.complete();

        if !delivered {
            tracing::debug!("Worker {} exiting: result stream closed", worker_id);
            break;
        }
    }
}

/// A request with its title resolved against the parent
#[derive(Debug)]
struct ResolvedRequest {
    link_name: String,
    title: String,
    fragment: bool,
}

fn resolve_requests(
    item: &WorkItem,
    parent_title: Option<&str>,
) -> Result<Vec<ResolvedRequest>, DisamError> {
    item.requests
        .iter()
        .map(|request| {
            let (title, fragment) = match TitleSpec::parse(&request.title) {
                TitleSpec::Plain(title) => (title.to_string(), false),
                TitleSpec::Fragment { .. } => (request.title.clone(), true),
                TitleSpec::LocalFragment(section) => {
                    let parent_title =
                        parent_title.ok_or_else(|| DisamError::InvalidFragmentRequest {
                            title: request.title.clone(),
                        })?;
                    (format!("{}#{}", parent_title, section), true)
                }
            };
            Ok(ResolvedRequest {
                link_name: request.link_name.clone(),
                title,
                fragment,
            })
        })
        .collect()
}

/// Distinct titles of `requests` with the given kind, in first-request order
fn distinct_titles(requests: &[ResolvedRequest], fragment: bool) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    for request in requests.iter().filter(|r| r.fragment == fragment) {
        if !titles.contains(&request.title) {
            titles.push(request.title.clone());
        }
    }
    titles
}

/// Resolves one work item and records its pages in the tree
///
/// Each distinct title is fetched once. Returns the new pages in resolution
/// order: plain titles first, then fragments.
pub async fn process_item(
    resolver: &Resolver,
    tree: &SharedTree,
    item: &WorkItem,
) -> Result<Vec<PageId>, DisamError> {
    let parent_title = item
        .parent
        .and_then(|parent| tree.lock().get(parent).title.clone());
    let requests = resolve_requests(item, parent_title.as_deref())?;

    // Only the seed page needs its full body; everything else is read for its lead
    let section = item.parent.map(|_| 0);
    let mut records = resolver
        .resolve(&distinct_titles(&requests, false), section)
        .await?;

    for title in distinct_titles(&requests, true) {
        let (article, fragment) = title.split_once('#').unwrap_or((title.as_str(), ""));
        records.push(resolver.resolve_fragment(article, fragment).await?);
    }

    tracing::debug!(
        "Resolved {} title(s) under {:?}",
        records.len(),
        item.parent
    );
    record_pages(tree, item.parent, &requests, records).map_err(DisamError::from)
}

/// Inserts one page per record, then attaches them under `parent` in request order
fn record_pages(
    tree: &SharedTree,
    parent: Option<PageId>,
    requests: &[ResolvedRequest],
    records: Vec<ResolutionRecord>,
) -> Result<Vec<PageId>, ResolveError> {
    let mut tree = tree.lock();
    let mut created: Vec<(String, PageId)> = Vec::with_capacity(records.len());

    for record in records {
        let search_title = record.search_title.clone();
        let mut page = Page::from_record(record);
        page.parent = parent;
        let id = tree.insert(page);
        created.push((search_title, id));
    }

    if let Some(parent) = parent {
        for request in requests {
            let id = created
                .iter()
                .find(|(search_title, _)| *search_title == request.title)
                .map(|(_, id)| *id)
                .ok_or_else(|| {
                    ResolveError::Malformed(format!("no record returned for '{}'", request.title))
                })?;
            tree.attach(parent, id, std::slice::from_ref(&request.link_name));
        }
    }

    Ok(created.into_iter().map(|(_, id)| id).collect())
}
