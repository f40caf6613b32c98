//! UtilizationMonitor
//!
//! Runtime wrapper around one [`VolatilityDetector`]:
//!   • serializes block events onto the detector (one lock per observation)
//!   • turns an exceeded decision into a [`Finding`]
//!   • hands findings to the configured sink
//!
//! The monitor is Arc-managed so the block driver and the event loop can
//! share it across tasks.

use std::sync::Arc;

use common::logger::{TraceId, block_span, child_span};
use tokio::sync::{Mutex, mpsc::Receiver};
use tracing::{Instrument, debug, error, info, warn};

use crate::errors::MonitorError;
use crate::finding::Finding;
use crate::pulse::Pulse;
use crate::pulse::input::SampleInput;
use crate::pulse::utilization::{Decision, DetectorConfig, VolatilityDetector};
use crate::rolling_window::Extrema;
use crate::sink::FindingSink;

/// One sampled block, as produced by the chain driver.
#[derive(Clone, Debug)]
pub struct BlockTick {
    pub block_number: u64,
    /// Block time in seconds.
    pub timestamp: i64,
    /// Utilization in the detector's fixed-point scale.
    pub value: i128,
    pub trace_id: TraceId,
}

impl BlockTick {
    pub fn new(block_number: u64, timestamp: i64, value: i128) -> Self {
        Self {
            block_number,
            timestamp,
            value,
            trace_id: TraceId::default(),
        }
    }

    /// Raw sample handed to the detector. Not yet validated.
    pub fn sample(&self) -> SampleInput {
        SampleInput::new(self.timestamp, self.value)
    }
}

pub struct UtilizationMonitor<S> {
    /// Monitored metric, used only in reporting.
    label: String,

    detector: Mutex<VolatilityDetector>,

    sink: Arc<S>,
}

impl<S: FindingSink> UtilizationMonitor<S> {
    pub fn new(label: impl Into<String>, config: DetectorConfig, sink: Arc<S>) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            detector: Mutex::new(VolatilityDetector::new(config)),
            sink,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current window extrema, for inspection.
    pub async fn extrema(&self) -> Option<Extrema> {
        self.detector.lock().await.window().scan_extrema()
    }

    /// Samples currently held in the window.
    pub async fn window_len(&self) -> usize {
        self.detector.lock().await.window().len()
    }

    /// Observe one block and report if the window spread crossed the threshold.
    pub async fn on_block(&self, tick: BlockTick) -> Result<Decision, MonitorError> {
        let (decision, config) = {
            let mut detector = self.detector.lock().await;
            let decision = detector.evaluate(tick.sample())?;
            (decision, *detector.config())
        };

        let eval = match &decision {
            Decision::Insufficient => {
                debug!(block = tick.block_number, "not enough history in window");
                return Ok(decision);
            }
            Decision::Evaluated(eval) => eval,
        };

        debug!(
            block = tick.block_number,
            samples = eval.samples,
            current = eval.current_value.to_f64(config.denominator),
            spread = eval.spread.to_f64(config.denominator),
            exceeded = eval.exceeded,
            "window evaluated"
        );

        if eval.exceeded {
            let finding = Finding::utilization_change(&self.label, &config, eval);

            warn!(
                block = tick.block_number,
                spread_bps = %eval.spread.to_bps(config.denominator),
                threshold_bps = %config.threshold_bps(),
                "utilization volatility above threshold"
            );

            self.sink
                .emit(finding)
                .instrument(child_span("emit_finding"))
                .await
                .map_err(MonitorError::Sink)?;
        }

        Ok(decision)
    }

    /// Consume ticks until the channel closes. Errors are logged, never fatal.
    pub async fn run(self: Arc<Self>, mut rx: Receiver<BlockTick>) {
        info!(label = %self.label, "utilization monitor started");

        while let Some(tick) = rx.recv().await {
            let span = block_span(&self.label, tick.block_number, &tick.trace_id);
            let block = tick.block_number;

            if let Err(e) = self.on_block(tick).instrument(span).await {
                error!(error = %e, block, label = %self.label, "block observation failed");
            }
        }

        info!(label = %self.label, "tick channel closed; monitor stopped");
    }
}
