use std::sync::Arc;
use std::time::Duration;

use adapters::compound::JsonRpcClient;
use anyhow::Context;
use clap::Parser;
use cli::{cli::Cli, driver::BlockPoller};
use common::logger::init_logger;
use market::manager::{BlockTick, UtilizationMonitor};
use market::sink::LogSink;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_logger("utilization-monitor", cli.json_logs || is_production);

    let config = cli.detector_config().context("invalid detector configuration")?;
    let label = cli.token.to_string();

    tracing::info!(
        token = %label,
        ctoken = cli.token.address(),
        window_seconds = config.window_length,
        threshold_bps = %config.threshold_bps(),
        "starting utilization monitor"
    );

    let source = Arc::new(
        JsonRpcClient::new(cli.rpc_url.clone(), cli.token.address()).context("build rpc client")?,
    );

    let (tick_tx, tick_rx) = mpsc::channel::<BlockTick>(cli.queue_capacity);

    let monitor = UtilizationMonitor::new(label.clone(), config, Arc::new(LogSink));
    let monitor_task = tokio::spawn(monitor.run(tick_rx));

    let poller = BlockPoller::new(source, config.denominator, label);
    let mut poller_task = tokio::spawn(poller.run(Duration::from_millis(cli.poll_interval_ms), tick_tx));

    let interrupted = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("listen for shutdown signal")?;
            true
        }
        res = &mut poller_task => {
            match res {
                Ok(Ok(())) => tracing::info!("block poller finished"),
                Ok(Err(e)) => tracing::error!(error = %format!("{e:#}"), "block poller failed"),
                Err(e) => tracing::error!(error = %e, "block poller task panicked"),
            }
            false
        }
    };

    if interrupted {
        tracing::info!("Shutdown signal received");
        poller_task.abort();
        let _ = poller_task.await;
    }

    // The poller is gone, so the tick channel is closed; let the monitor drain it.
    monitor_task.await.context("monitor task")?;

    Ok(())
}
