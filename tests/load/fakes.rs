use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Method;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use search_load::{Dispatch, HttpClient, ReportFormat, RunConfig};

pub fn run_config(concurrency: usize, overlay: &str) -> RunConfig {
    RunConfig {
        concurrency,
        endpoint: "http://solr.test:8983".to_string(),
        collection_name: "wikipedia".to_string(),
        corpus_path: ".gatling/wikipedia-queries.txt".into(),
        overlay_raw: overlay.to_string(),
        request_timeout: None,
        report_format: ReportFormat::Human,
        scenario_name: "SearchTermsSimulation".to_string(),
    }
}

/// Deterministic transport: every `fail_every`-th call (1-based) answers 500,
/// every call is counted and its URL kept.
#[derive(Default)]
pub struct ScriptedClient {
    pub calls: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
    pub fail_every: Option<usize>,
}

impl ScriptedClient {
    pub fn failing_every(n: usize) -> Self {
        Self {
            fail_every: Some(n),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn send(&self, method: Method, url: &str) -> Dispatch {
        assert_eq!(method, Method::GET);
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.urls.lock().push(url.to_string());
        tokio::task::yield_now().await;
        match self.fail_every {
            Some(every) if n % every == 0 => Dispatch::response(500, Duration::from_millis(2)),
            _ => Dispatch::response(200, Duration::from_millis(1)),
        }
    }
}

/// Transport that raises the cancellation signal once `after` calls have
/// started.
pub struct CancellingClient {
    pub calls: AtomicUsize,
    pub after: usize,
    pub token: CancellationToken,
}

#[async_trait]
impl HttpClient for CancellingClient {
    async fn send(&self, _method: Method, _url: &str) -> Dispatch {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n >= self.after {
            self.token.cancel();
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
        Dispatch::response(200, Duration::from_millis(1))
    }
}

/// Transport that never gets a response.
pub struct DeadClient;

#[async_trait]
impl HttpClient for DeadClient {
    async fn send(&self, _method: Method, _url: &str) -> Dispatch {
        Dispatch::failed("connection refused", Duration::from_micros(50))
    }
}
