use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use std::time::{Duration, Instant};

use crate::error::{LoadError, Result};

/// What came back from one dispatch. Transport failures carry no status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub status: Option<u16>,
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl Dispatch {
    pub fn response(status: u16, elapsed: Duration) -> Self {
        Self {
            status: Some(status),
            elapsed,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status: None,
            elapsed,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && matches!(self.status, Some(200..=299))
    }
}

/// Transport used by the driver. Implementations must never panic on a failed
/// request; failures are reported through [`Dispatch`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, method: Method, url: &str) -> Dispatch;
}

#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(scenario: &str, timeout: Option<Duration>) -> Result<Self> {
        let agent = format!("search-load/{} ({scenario})", env!("CARGO_PKG_VERSION"));
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&agent).map_err(|e| LoadError::HttpClient(e.to_string()))?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LoadError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, method: Method, url: &str) -> Dispatch {
        let start = Instant::now();
        let resp = match self.client.request(method, url).send().await {
            Ok(resp) => resp,
            Err(e) => return Dispatch::failed(e.to_string(), start.elapsed()),
        };

        let status = resp.status().as_u16();
        // Drain the body so the latency covers the whole response.
        match resp.bytes().await {
            Ok(_) => Dispatch::response(status, start.elapsed()),
            Err(e) => Dispatch {
                status: Some(status),
                elapsed: start.elapsed(),
                error: Some(format!("body read failed: {e}")),
            },
        }
    }
}
