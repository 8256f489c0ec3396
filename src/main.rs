mod config;
mod error;
mod logging;
mod page;
mod pipeline;
mod report;
mod scraper;
mod utils;

use crate::config::Config;
use crate::logging::{init_logging, parse_log_level, LoggerConfig};
use crate::page::{PageHandle, SnapshotPage};
use crate::pipeline::{cancel_pair, Canceller, Scan};
use crate::report::Report;
use anyhow::Context as _;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::from_file(&config_path)
        .with_context(|| format!("load configuration from {}", config_path))?;

    let logger_config = LoggerConfig {
        directory: config.logging.directory.clone(),
        file_name: config.logging.filename.clone(),
        rotation: tracing_appender::rolling::Rotation::DAILY,
        level: parse_log_level(&config.logging.level)?,
    };
    init_logging(logger_config)?;

    log_info!("[main] Starting timeline scan...");

    let scan = Scan::from_config(&config).context("build scan pipeline")?;

    // The page is acquired here and released below whatever the scan returns.
    let mut page = SnapshotPage::open(&config.page.snapshot_dir)
        .with_context(|| format!("open page snapshots in {}", config.page.snapshot_dir))?;

    let (canceller, cancel) = cancel_pair();
    spawn_cancel_triggers(canceller, config.run.timeout_secs);

    let scanned = scan.run(&mut page, &cancel).await;
    if let Err(e) = page.close().await {
        log_warn!("[main] Failed to release page: {}", e);
    }

    let result = match scanned {
        Ok(result) => result,
        Err(e) => {
            if e.is_handle_unavailable() {
                log_error!(&e => "[main] Page handle lost, scan aborted");
            } else {
                log_error!(&e => "[main] Scan aborted");
            }
            return Err(e).context("scan timeline");
        }
    };

    log_info!(
        "[main] Collected {} records, {} relevant",
        result.collection.len(),
        result.classification.matched.len()
    );

    let report = Report::build(&result, &config.report);
    println!("{}", report.render(config.report.format)?);

    Ok(())
}

/// Cancel the scan on Ctrl-C and, when configured, after a timeout.
fn spawn_cancel_triggers(canceller: Canceller, timeout_secs: Option<u64>) {
    if let Some(secs) = timeout_secs {
        let canceller = canceller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            log_warn!("[main] Run timeout of {}s reached, stopping scan", secs);
            canceller.cancel();
        });
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log_warn!("[main] Interrupted, stopping scan");
            canceller.cancel();
        }
    });
}
