use tracing::{Span, field};

use super::TraceId;

/// Root span for one processed block.
///
/// `utilization` is left empty and recorded once the metric source answers.
pub fn block_span(label: &str, block_number: u64, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "block",
        label = %label,
        block_number,
        trace_id = %trace_id.as_str(),
        utilization = field::Empty
    )
}

/// Child span (inherits trace_id from the enclosing block span)
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name)
}
