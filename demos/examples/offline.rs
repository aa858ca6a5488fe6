//! Runs the production controller against the real network.
//!
//! Installs the current generation, activates it and then routes a handful
//! of requests, printing which strategy answered each one and where the
//! response came from.
//!
//! ```text
//! RUST_LOG=plin=debug cargo run -p plin-demos --example offline
//! ```

use std::time::Duration;

use plin::prelude::*;
use plin_moka::MokaBackend;
use plin_reqwest::ReqwestTransport;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plin=info")),
        )
        .init();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let controller = CacheController::new(
        ControllerConfig::production()?,
        MokaBackend::builder().label("offline").max_entries(1_000).build(),
        ReqwestTransport::new(client),
    );

    let report = controller.install().await?;
    println!(
        "installed {}: {} stored, {} failed",
        report.generation,
        report.stored.len(),
        report.failed.len()
    );
    for failure in &report.failed {
        println!("  skipped {}: {}", failure.url, failure.error);
    }

    let report = controller.activate().await?;
    println!("activated {}, removed {:?}", report.current, report.deleted);

    let requests = [
        ("https://plin.app/css/style.css", Destination::Style),
        (
            "https://api.open-meteo.com/v1/forecast?latitude=38.72&longitude=-9.14&daily=temperature_2m_max",
            Destination::Empty,
        ),
        ("https://plin.app/trips", Destination::Document),
        ("https://plin.app/trips", Destination::Document),
    ];

    for (url, destination) in requests {
        let lifetime = controller.lifetime();
        let request = FetchRequest::get(Url::parse(url)?, destination);
        match controller.fetch(request, &lifetime).await {
            Ok(served) => println!(
                "{:<24} {:<8} {:<8} {} ({} bytes)",
                served.route.as_str(),
                served.status.as_str(),
                served.source.as_str(),
                url,
                served.response.body().len()
            ),
            Err(error) => println!("{url}: {error}"),
        }
        lifetime.settled().await;
    }

    Ok(())
}
