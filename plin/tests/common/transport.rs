use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use http::StatusCode;
use plin::{FetchRequest, FetchResponse, Transport, TransportError};
use url::Url;

#[derive(Debug, Clone)]
enum Scripted {
    Respond {
        status: StatusCode,
        body: Bytes,
        final_url: Option<Url>,
    },
    Fail,
}

/// Scripted network. Unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<DashMap<String, Scripted>>,
    calls: Arc<DashMap<String, usize>>,
    total: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
    delay_ms: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &Url, status: StatusCode, body: &'static str) {
        self.routes.insert(
            url.to_string(),
            Scripted::Respond {
                status,
                body: Bytes::from_static(body.as_bytes()),
                final_url: None,
            },
        );
    }

    /// Answers `url` as if redirected to `final_url`.
    pub fn redirect(&self, url: &Url, final_url: &Url, body: &'static str) {
        self.routes.insert(
            url.to_string(),
            Scripted::Respond {
                status: StatusCode::OK,
                body: Bytes::from_static(body.as_bytes()),
                final_url: Some(final_url.clone()),
            },
        );
    }

    pub fn fail(&self, url: &Url) {
        self.routes.insert(url.to_string(), Scripted::Fail);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, url: &Url) -> usize {
        self.calls.get(url.as_str()).map_or(0, |count| *count)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .entry(request.url().to_string())
            .or_insert(0) += 1;

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::offline("network unreachable"));
        }

        let scripted = self
            .routes
            .get(request.url().as_str())
            .map(|entry| entry.clone());
        match scripted {
            Some(Scripted::Respond {
                status,
                body,
                final_url,
            }) => {
                let url = final_url.unwrap_or_else(|| request.url().clone());
                Ok(FetchResponse::new(status, url).with_body(body))
            }
            Some(Scripted::Fail) => Err(TransportError::offline("connection refused")),
            None => Ok(FetchResponse::new(StatusCode::NOT_FOUND, request.url().clone())
                .with_body("not found")),
        }
    }
}
