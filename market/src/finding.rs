use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Serialize;

use crate::pulse::utilization::{DetectorConfig, Evaluation};

/// Stable identifier consumers route on.
pub const UTILIZATION_CHANGE_ALERT_ID: &str = "FORTA-COMPOUND-UTILIZATION-CHANGE";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FindingSeverity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FindingType {
    Info,
    Suspicious,
    Degraded,
    Exploit,
}

/// Structured alert handed to a [`crate::sink::FindingSink`].
///
/// Numeric metadata is kept as decimal strings of the raw fixed-point values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub name: String,
    pub description: String,
    pub alert_id: String,
    pub severity: FindingSeverity,
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    pub metadata: BTreeMap<String, String>,
}

impl Finding {
    /// Alert for a window whose spread crossed the threshold.
    pub fn utilization_change(label: &str, config: &DetectorConfig, eval: &Evaluation) -> Self {
        let block_time = i64::try_from(eval.timestamp)
            .ok()
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| eval.timestamp.to_string());

        let description = format!(
            "Compound {label} pool utilization rate changed by {} bps (threshold {} bps) within {}s, at {block_time}",
            eval.spread.to_bps(config.denominator),
            config.threshold_bps(),
            config.window_length,
        );

        let metadata = BTreeMap::from([
            ("timestamp".to_string(), eval.timestamp.to_string()),
            ("spread".to_string(), eval.spread.to_string()),
            ("currentValue".to_string(), eval.current_value.to_string()),
            ("windowMin".to_string(), eval.min.to_string()),
            ("windowMax".to_string(), eval.max.to_string()),
        ]);

        Self {
            name: format!("Volatile {label} Pool Utilization Rate"),
            description,
            alert_id: UTILIZATION_CHANGE_ALERT_ID.to_string(),
            severity: FindingSeverity::Low,
            finding_type: FindingType::Suspicious,
            metadata,
        }
    }
}
