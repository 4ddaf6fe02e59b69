//! Weather poller — binary entrypoint.
//! Loads settings, wires tracing and metrics, then polls until Ctrl-C.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use weather_poller::metrics::Metrics;
use weather_poller::{Poller, Settings};

/// Compact logs by default; `LOG_FORMAT=json` switches to one JSON object per
/// line for log shippers. `RUST_LOG` overrides the filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("weather_poller=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::load_default()?;
    tracing::info!(
        sources = settings.data_sources.len(),
        interval_secs = settings.polling_interval,
        listener = %settings.logz_io.listener_host,
        "settings loaded"
    );

    if let Some(addr) = settings.metrics_addr {
        let metrics = Metrics::init(settings.polling_interval)?;
        tokio::spawn(async move {
            if let Err(e) = metrics.serve(addr).await {
                tracing::warn!(error = ?e, "metrics endpoint stopped");
            }
        });
    }

    let poller = Poller::from_settings(&settings)?;
    poller
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await;
    Ok(())
}
