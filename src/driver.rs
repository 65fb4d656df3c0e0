//! Load driver
//!
//! Spawns a fixed pool of workers that all draw terms from one shared cursor
//! over the corpus. Each worker issues exactly `iteration_budget` requests
//! unless the run is cancelled first.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::HttpClient;
use crate::collector::{RequestOutcome, ResultCollector, RunResult};
use crate::config::RunConfig;
use crate::corpus::Corpus;
use crate::overlay::ParamPair;
use crate::request::RequestBuilder;

/// Requests per worker: `max(1, corpus_size / concurrency)`, integer division.
pub fn iteration_budget(corpus_size: usize, concurrency: usize) -> usize {
    (corpus_size / concurrency.max(1)).max(1)
}

/// Shared wrap-around cursor over the corpus.
#[derive(Debug)]
pub struct TermCursor {
    corpus: Corpus,
    position: AtomicUsize,
}

impl TermCursor {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            position: AtomicUsize::new(0),
        }
    }

    /// Next term in corpus order, wrapping at the end. `None` only for an
    /// empty corpus.
    pub fn next_term(&self) -> Option<&str> {
        if self.corpus.is_empty() {
            return None;
        }
        let i = self.position.fetch_add(1, Ordering::Relaxed) % self.corpus.len();
        self.corpus.get(i)
    }
}

struct Shared {
    client: Arc<dyn HttpClient>,
    cursor: TermCursor,
    collector: ResultCollector,
    endpoint: String,
    collection: String,
    overlay: Vec<ParamPair>,
    cancel: CancellationToken,
    interrupted: AtomicBool,
}

impl Shared {
    async fn work(&self, worker: usize, budget: usize) -> usize {
        let mut sent = 0;
        for _ in 0..budget {
            if self.cancel.is_cancelled() {
                self.interrupted.store(true, Ordering::Relaxed);
                debug!(worker, sent, "worker cancelled");
                break;
            }
            let Some(term) = self.cursor.next_term() else {
                break;
            };

            let spec = RequestBuilder::build(&self.endpoint, &self.collection, term, &self.overlay);
            let dispatch = self.client.send(spec.method.clone(), &spec.url()).await;
            if !dispatch.is_success() {
                debug!(
                    worker,
                    term,
                    status = ?dispatch.status,
                    error = dispatch.error.as_deref().unwrap_or(""),
                    "request failed"
                );
            }
            self.collector.record(RequestOutcome::from(&dispatch));
            sent += 1;
        }
        sent
    }
}

pub struct LoadDriver {
    client: Arc<dyn HttpClient>,
}

impl LoadDriver {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    /// Run the whole load and wait for every worker.
    ///
    /// An empty corpus is a no-op: nothing is dispatched and a zero-request
    /// result is returned. Request failures never stop a worker.
    pub async fn run(&self, config: &RunConfig, corpus: Corpus, cancel: CancellationToken) -> RunResult {
        let started = Instant::now();
        let concurrency = config.concurrency.max(1);
        let terms_found = corpus.len();
        let budget = iteration_budget(terms_found, concurrency);

        if corpus.is_empty() {
            warn!(path = %config.corpus_path.display(), "no search terms found, nothing to dispatch");
            return RunResult {
                concurrency,
                iteration_budget: budget,
                wall_time: started.elapsed(),
                ..RunResult::default()
            };
        }

        info!(
            terms = terms_found,
            concurrency,
            iteration_budget = budget,
            collection = %config.collection_name,
            "starting load"
        );

        let shared = Arc::new(Shared {
            client: Arc::clone(&self.client),
            cursor: TermCursor::new(corpus),
            collector: ResultCollector::new(),
            endpoint: config.endpoint.clone(),
            collection: config.collection_name.clone(),
            overlay: config.overlay(),
            cancel,
            interrupted: AtomicBool::new(false),
        });

        let mut workers = JoinSet::new();
        for worker in 0..concurrency {
            let shared = Arc::clone(&shared);
            workers.spawn(async move { (worker, shared.work(worker, budget).await) });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((worker, sent)) => debug!(worker, sent, "worker finished"),
                Err(e) => warn!(error = %e, "worker stopped abnormally"),
            }
        }

        let mut result = shared.collector.finalize();
        result.terms_found = terms_found;
        result.concurrency = concurrency;
        result.iteration_budget = budget;
        result.cancelled = shared.interrupted.load(Ordering::Relaxed);
        result.wall_time = started.elapsed();

        info!(
            total = result.total_requests,
            ok = result.success_count,
            failed = result.failure_count,
            cancelled = result.cancelled,
            "load finished"
        );
        result
    }
}
