//! Dashboard run loop
//!
//! Owns the scheduling policy the library crates deliberately lack: an
//! interval timer triggers poll cycles, both fetch results are joined
//! here before reconciliation, and the live channel runs under reconnect
//! supervision. Partial source failures degrade to partial views; only
//! the operator-facing log ever sees the difference.

use anyhow::{Context, Result};
use drivedeck_client::{supervise, LiveMessage, SnapshotPoller, SubscriberRegistry};
use drivedeck_core::{reconcile, DriveView, VendorRules};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;

/// Poll-and-reconcile state for one dashboard session.
pub struct App {
    poller: SnapshotPoller,
    vendor_rules: VendorRules,
    /// Views from the most recent cycle that produced data. Display
    /// cache only; every refresh rebuilds it wholesale.
    latest: Vec<DriveView>,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let inventory_url =
            Url::parse(&config.endpoints.inventory_url).context("Invalid inventory URL")?;
        let health_url = Url::parse(&config.endpoints.health_url).context("Invalid health URL")?;

        let poller = SnapshotPoller::with_timeout(
            inventory_url,
            health_url,
            Duration::from_secs(config.poll.timeout_secs),
        )?;
        let vendor_rules = VendorRules::load_or_default(Path::new(&config.vendor_rules.path));

        Ok(Self {
            poller,
            vendor_rules,
            latest: Vec::new(),
        })
    }

    /// Run one poll cycle: fetch both snapshots, surface any failure,
    /// then reconcile whatever succeeded.
    ///
    /// A failed side is reconciled as an empty sequence after being
    /// logged, so inventory-only views still render when the health
    /// source is down. When both sources fail the previous views are
    /// kept and the outage is logged.
    pub async fn refresh(&mut self) -> &[DriveView] {
        let cycle = self.poller.poll().await;

        if let Err(e) = &cycle.inventory {
            warn!(error = %e, "Inventory fetch failed");
        }
        if let Err(e) = &cycle.health {
            warn!(error = %e, "Health fetch failed");
        }
        if cycle.both_failed() {
            warn!("Both sources failed, keeping previous views");
            return &self.latest;
        }

        let mut inventory = cycle.inventory_records().to_vec();
        for record in &mut inventory {
            self.vendor_rules.enrich(record);
        }

        let views = reconcile(&inventory, cycle.health_records());
        let failing = views
            .iter()
            .filter_map(|view| view.health.as_ref())
            .filter(|health| !health.is_passing())
            .count();
        info!(
            drives = views.len(),
            failing,
            partial = cycle.is_partial(),
            "Refreshed drive views"
        );
        self.latest = views;
        &self.latest
    }
}

/// Run the daemon: periodic refresh plus a supervised live channel.
pub async fn run(config: Config) -> Result<()> {
    let mut app = App::new(&config)?;

    // Live updates are logged the way the dashboard's live view lists
    // them, newest last.
    let registry = Arc::new(SubscriberRegistry::new());
    registry.subscribe(|message: &LiveMessage| match message {
        LiveMessage::Json(value) => info!(update = %value, "Live update"),
        LiveMessage::Text(text) => info!(update = %text, "Live update"),
    });

    let (stop_tx, stop_rx) = watch::channel(false);
    let live_url = config.endpoints.live_url.clone();
    let policy = config.reconnect.to_policy();
    let live_registry = registry.clone();
    let live_task = tokio::spawn(async move {
        supervise(&live_url, live_registry, policy, stop_rx).await;
    });

    let mut ticker = interval(Duration::from_secs(config.poll.interval_secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                app.refresh().await;
            }
            result = &mut shutdown => {
                result.context("Failed to listen for shutdown signal")?;
                info!("Shutting down");
                break;
            }
        }
    }

    let _ = stop_tx.send(true);
    let _ = live_task.await;
    Ok(())
}
