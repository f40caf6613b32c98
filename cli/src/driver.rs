//! Block poller
//!
//! Polls the chain head on a fixed cadence and, for every new block,
//! samples the pool's utilization and forwards it to the monitor.
//!
//! Data flow:
//! Chain → BlockPoller → BlockTick channel → UtilizationMonitor
//!
//! Blocks produced between two polls are not sampled; the window simply has
//! no entry for them. A block whose balances cannot be fetched is logged and
//! skipped.

use std::sync::Arc;
use std::time::Duration;

use adapters::compound::{ChainSource, utilization_at};
use anyhow::{Context, Result};
use common::logger::{TraceId, block_span};
use market::manager::BlockTick;
use tokio::sync::mpsc::Sender;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, Span, debug, field, info, warn};

pub struct BlockPoller<C> {
    source: Arc<C>,
    /// Fixed-point scale the utilization is expressed in.
    scale: u128,
    label: String,
    last_block: Option<u64>,
}

impl<C: ChainSource> BlockPoller<C> {
    pub fn new(source: Arc<C>, scale: u128, label: impl Into<String>) -> Self {
        Self {
            source,
            scale,
            label: label.into(),
            last_block: None,
        }
    }

    pub fn last_block(&self) -> Option<u64> {
        self.last_block
    }

    /// One poll. Returns the block number that was sampled, if any.
    ///
    /// The head is marked as seen even when sampling fails, so a broken
    /// block is skipped rather than retried.
    pub async fn poll_once(&mut self, tx: &Sender<BlockTick>) -> Result<Option<u64>> {
        let head = self.source.latest_block().await.context("fetch head block")?;

        if self.last_block.is_some_and(|seen| head.number <= seen) {
            debug!(block = head.number, "no new block");
            return Ok(None);
        }
        self.last_block = Some(head.number);

        let trace_id = TraceId::default();
        let span = block_span(&self.label, head.number, &trace_id);

        async {
            let utilization = utilization_at(self.source.as_ref(), head.number, self.scale)
                .await
                .with_context(|| format!("sample utilization at block {}", head.number))?;

            Span::current().record("utilization", field::display(utilization));

            let tick = BlockTick {
                block_number: head.number,
                timestamp: i64::try_from(head.timestamp).context("block timestamp out of range")?,
                value: i128::try_from(utilization).context("utilization out of range")?,
                trace_id: trace_id.clone(),
            };

            tx.send(tick).await.context("monitor channel closed")?;

            Ok::<_, anyhow::Error>(Some(head.number))
        }
        .instrument(span)
        .await
    }

    /// Poll until the monitor goes away. Upstream failures are logged and the
    /// loop carries on with the next tick.
    pub async fn run(mut self, every: Duration, tx: Sender<BlockTick>) -> Result<()> {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            label = %self.label,
            every_ms = every.as_millis() as u64,
            "block poller started"
        );

        loop {
            ticker.tick().await;

            if tx.is_closed() {
                info!(label = %self.label, "monitor gone; block poller stopping");
                return Ok(());
            }

            if let Err(e) = self.poll_once(&tx).await {
                warn!(error = %format!("{e:#}"), label = %self.label, "block skipped");
            }
        }
    }
}
