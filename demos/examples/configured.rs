//! Builds a controller from a YAML file and drives it through host events.
//!
//! Pass a path to use your own file, otherwise the embedded one is used.
//!
//! ```text
//! cargo run -p plin-demos --example configured -- plin.yaml
//! ```

use plin::prelude::*;
use plin::EventResponse;
use plin_configuration::ConfigFile;
use plin_reqwest::ReqwestTransport;
use tracing_subscriber::EnvFilter;
use url::Url;

const EMBEDDED: &str = r#"
generation:
  prefix: plin
  version: 1.1.0
scope: https://plin.app/
precache:
  - /
  - /index.html
  - /css/style.css
  - /js/app.js
bypass:
  hosts:
    - firebaseio.com
    - firestore.googleapis.com
    - cloudfunctions.net
network_first:
  - "^https://api\\.open-meteo\\.com/"
  - "^https://maps\\.googleapis\\.com/"
offload:
  timeout: 15s
  on_timeout: Cancel
backend:
  type: Moka
  max_bytes: 52428800
  label: offline
  value:
    format: Bincode
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plin=debug")),
        )
        .init();

    let file = match std::env::args().nth(1) {
        Some(path) => ConfigFile::from_path(path)?,
        None => EMBEDDED.parse()?,
    };
    let backend = file.backend.clone().unwrap_or_default().into_backend()?;
    let config = file.into_config()?;
    println!(
        "generation {} for {} ({} precached URLs)",
        config.generation(),
        config.scope(),
        config.precache().len()
    );

    let controller = CacheController::new(config, backend, ReqwestTransport::default());

    for event in [LifecycleEvent::Install, LifecycleEvent::Activate] {
        let name = event.as_str();
        match controller.handle(event).await.settle().await? {
            EventResponse::Installed(report) => println!(
                "{name}: {} stored, {} failed",
                report.stored.len(),
                report.failed.len()
            ),
            EventResponse::Activated(report) => {
                println!("{name}: removed {} generations", report.deleted.len())
            }
            EventResponse::Fetched(_) => {}
        }
    }

    let page = Url::parse("https://plin.app/")?;
    let handled = controller
        .handle(LifecycleEvent::Fetch(FetchRequest::get(
            page,
            Destination::Document,
        )))
        .await;
    if let EventResponse::Fetched(served) = handled.settle().await? {
        println!(
            "fetch: {} via {} from {}",
            served.status.as_str(),
            served.route.as_str(),
            served.source.as_str()
        );
    }

    Ok(())
}
