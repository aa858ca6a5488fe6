#![allow(dead_code)]

pub mod backend;
pub mod host;
pub mod transport;

pub use backend::CountingBackend;
pub use host::RecordingHost;
pub use transport::MockTransport;

use plin::{CacheController, ControllerConfig};
use url::Url;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const SCOPE: &str = "https://plin.app/";

pub fn url(s: &str) -> Url {
    Url::parse(SCOPE).unwrap().join(s).unwrap()
}

/// Production routing rules with a short manifest.
pub fn test_config() -> ControllerConfig {
    ControllerConfig::builder()
        .generation("plin", "1.1.0")
        .scope(SCOPE)
        .precache(["/", "/css/style.css", "/js/app.js"])
        .bypass_hosts(plin::config::PRODUCTION_BYPASS_HOSTS.iter().copied())
        .network_first(plin::config::PRODUCTION_NETWORK_FIRST.iter().copied())
        .build()
        .unwrap()
}

pub type TestController = CacheController<CountingBackend, MockTransport, RecordingHost>;

pub fn controller() -> (TestController, CountingBackend, MockTransport, RecordingHost) {
    controller_with(test_config())
}

pub fn controller_with(
    config: ControllerConfig,
) -> (TestController, CountingBackend, MockTransport, RecordingHost) {
    let backend = CountingBackend::new();
    let transport = MockTransport::new();
    let host = RecordingHost::default();
    let controller =
        CacheController::with_host(config, backend.clone(), transport.clone(), host.clone());
    (controller, backend, transport, host)
}
