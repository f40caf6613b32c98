/// Raw per-tick sample as delivered by the metric source.
///
/// Signed on purpose: upstream data is validated by the pulse, not trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleInput {
    /// Tick time in seconds.
    pub timestamp: i64,
    /// Fixed-point value in the detector's scale.
    pub value: i128,
}

impl SampleInput {
    pub fn new(timestamp: i64, value: i128) -> Self {
        Self { timestamp, value }
    }
}
