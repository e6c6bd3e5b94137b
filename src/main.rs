use anyhow::{Context, Result};
use jobscout::{
    config::Config,
    fetcher::HttpFetcher,
    scanner::Scanner,
    store::{self, RecordStore},
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let run_id = Uuid::new_v4();
    info!(%run_id, targets_file = config.targets_path(), output_file = config.output_path(), "starting scan");

    // Load the target list and prior records; both are fatal if unreadable.
    let targets =
        store::load_targets(config.targets_path()).context("failed to read target URL list")?;
    if targets.is_empty() {
        info!("no target URLs configured, nothing to do");
        return Ok(());
    }
    let record_store = RecordStore::new(config.output_path());
    let existing = record_store
        .load()
        .context("failed to read existing records")?;
    let mut seen = store::seen_keys(&existing, &config.rules().markers);
    info!(
        targets = targets.len(),
        prior_rows = existing.len(),
        prior_keys = seen.len(),
        "loaded state"
    );

    // Finish the current target cleanly on Ctrl-C.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received, finishing current target");
                cancel.cancel();
            }
        });
    }

    let fetcher = HttpFetcher::new(
        config.fetch_timeout(),
        config.render_endpoint().map(str::to_owned),
    );
    let scanner = Scanner::new(fetcher, config.rules().clone(), config.target_pause());
    let outcome = scanner.run(&targets, &mut seen, &cancel).await;

    info!(
        scanned = outcome.targets_scanned,
        failed = outcome.targets_failed,
        anchors = outcome.anchors_seen,
        new = outcome.new_records.len(),
        "scan complete"
    );

    if outcome.new_records.is_empty() {
        info!("no new postings found, leaving output untouched");
        return Ok(());
    }

    let rows = record_store
        .write_merged(&existing, &outcome.new_records, &config.rules().markers)
        .context("failed to write output records")?;
    info!(rows, path = config.output_path(), "output rewritten");

    Ok(())
}
