use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use plin::Host;

#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    skip_waiting: Arc<AtomicUsize>,
    claim_clients: Arc<AtomicUsize>,
}

impl RecordingHost {
    pub fn skip_waiting_calls(&self) -> usize {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    pub fn claim_clients_calls(&self) -> usize {
        self.claim_clients.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn skip_waiting(&self) {
        self.skip_waiting.fetch_add(1, Ordering::SeqCst);
    }

    async fn claim_clients(&self) {
        self.claim_clients.fetch_add(1, Ordering::SeqCst);
    }
}
