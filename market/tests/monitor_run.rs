use std::collections::HashMap;
use std::sync::Arc;

use market::finding::UTILIZATION_CHANGE_ALERT_ID;
use market::manager::{BlockTick, UtilizationMonitor};
use market::pulse::utilization::DetectorConfig;
use market::sink::{ChannelSink, LogSink};
use market::types::{Ratio, WAD};
use tokio::sync::mpsc;
use tracing_test::traced_test;

const E16: i128 = 10_000_000_000_000_000;

#[tokio::test]
async fn run_loop_reports_the_hour_scenario() {
    let (finding_tx, mut finding_rx) = mpsc::channel(8);
    let (tick_tx, tick_rx) = mpsc::channel(8);

    let monitor = UtilizationMonitor::new(
        "cUSDC",
        DetectorConfig::default(),
        Arc::new(ChannelSink::new(finding_tx)),
    );
    let handle = tokio::spawn(Arc::clone(&monitor).run(tick_rx));

    for tick in [
        BlockTick::new(100, 0, 50 * E16),
        BlockTick::new(250, 1_800, 55 * E16),
        BlockTick::new(400, 3_600, 62 * E16),
        BlockTick::new(401, 3_601, 62 * E16),
    ] {
        tick_tx.send(tick).await.unwrap();
    }
    drop(tick_tx);
    handle.await.unwrap();

    let finding = finding_rx.recv().await.unwrap();
    assert_eq!(finding.alert_id, UTILIZATION_CHANGE_ALERT_ID);
    assert_eq!(finding.metadata["timestamp"], "3600");
    assert_eq!(finding.metadata["spread"], (12 * E16).to_string());
    assert_eq!(finding.metadata["currentValue"], (62 * E16).to_string());

    // Block 401 dropped t=0 and stayed under the threshold.
    assert!(finding_rx.try_recv().is_err());
    assert_eq!(monitor.window_len().await, 3);
}

#[tokio::test]
#[traced_test]
async fn run_loop_survives_malformed_ticks() {
    let (tick_tx, tick_rx) = mpsc::channel(8);
    let monitor = UtilizationMonitor::new("cDAI", DetectorConfig::default(), Arc::new(LogSink));

    tick_tx.send(BlockTick::new(1, 0, 40 * E16)).await.unwrap();
    tick_tx.send(BlockTick::new(2, 12, -1)).await.unwrap();
    tick_tx.send(BlockTick::new(3, 24, 80 * E16)).await.unwrap();
    drop(tick_tx);

    // Driven inline so the log lines land in this test's span.
    Arc::clone(&monitor).run(tick_rx).await;

    assert_eq!(monitor.window_len().await, 2);
    assert!(logs_contain("block observation failed"));
    assert!(logs_contain("FORTA-COMPOUND-UTILIZATION-CHANGE"));
    assert!(logs_contain("monitor stopped"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_blocks_are_observed_one_at_a_time() {
    const N: u64 = 400;
    const WINDOW: u64 = 100;
    const E15: u128 = 1_000_000_000_000_000;

    let threshold = Ratio::from_raw(150 * E15);
    let config = DetectorConfig::new(WINDOW, threshold, WAD).unwrap();

    // One distinct value per timestamp, so extrema can be traced back to a tick.
    let value_at = |ts: u64| ((ts * 7) % N) as u128 * E15;
    let ts_of: HashMap<u128, u64> = (0..N).map(|ts| (value_at(ts), ts)).collect();

    let (finding_tx, _finding_rx) = mpsc::channel(N as usize + 1);
    let monitor = UtilizationMonitor::new("cUSDC", config, Arc::new(ChannelSink::new(finding_tx)));

    // 7919 is prime: every timestamp in 0..N is visited once, out of order.
    let handles: Vec<_> = (0..N)
        .map(|i| {
            let ts = (i * 7_919) % N;
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move {
                let tick = BlockTick::new(i, ts as i64, value_at(ts) as i128);
                (ts, monitor.on_block(tick).await.unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (ts, decision) = handle.await.unwrap();
        let Some(e) = decision.evaluation() else {
            continue;
        };
        let cutoff = ts.saturating_sub(WINDOW);

        assert_eq!(e.timestamp, ts);
        assert_eq!(e.current_value.raw(), value_at(ts));
        assert!(e.min <= e.current_value && e.current_value <= e.max);
        assert_eq!(e.spread.raw(), e.max.raw() - e.min.raw());
        assert_eq!(e.exceeded, e.spread > threshold);

        // Only ticks at or after this observation's cutoff may survive its eviction.
        assert!(ts_of[&e.min.raw()] >= cutoff);
        assert!(ts_of[&e.max.raw()] >= cutoff);
        assert!(e.samples >= 2 && e.samples <= (cutoff..N).count());
    }

    // A later block settles the window to exactly the ticks it must keep.
    let last = monitor.on_block(BlockTick::new(N, N as i64, 0)).await.unwrap();
    let e = *last.evaluation().unwrap();

    let survivors: Vec<u128> = (N - WINDOW..N).map(value_at).collect();
    let expected_max = *survivors.iter().max().unwrap();

    assert_eq!(e.samples, survivors.len() + 1);
    assert_eq!(e.min, Ratio::ZERO);
    assert_eq!(e.max.raw(), expected_max);
    assert_eq!(monitor.window_len().await, survivors.len() + 1);
    assert_eq!(monitor.extrema().await.map(|x| x.max.raw()), Some(expected_max));
}
