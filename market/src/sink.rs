use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::mpsc::Sender;
use tracing::warn;

use crate::finding::Finding;

/// Destination for findings raised by a monitor.
#[async_trait]
pub trait FindingSink: Send + Sync {
    async fn emit(&self, finding: Finding) -> anyhow::Result<()>;
}

/// Writes each finding as one JSON line through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

#[async_trait]
impl FindingSink for LogSink {
    async fn emit(&self, finding: Finding) -> anyhow::Result<()> {
        let json = serde_json::to_string(&finding).context("serialize finding")?;

        warn!(
            target: "findings",
            alert_id = %finding.alert_id,
            finding = %json,
            "{}",
            finding.name
        );

        Ok(())
    }
}

/// Forwards findings to another task.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: Sender<Finding>,
}

impl ChannelSink {
    pub fn new(tx: Sender<Finding>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl FindingSink for ChannelSink {
    async fn emit(&self, finding: Finding) -> anyhow::Result<()> {
        self.tx
            .send(finding)
            .await
            .map_err(|_| anyhow::anyhow!("finding channel closed"))
    }
}
