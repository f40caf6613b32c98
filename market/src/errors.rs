use thiserror::Error;

/// Malformed sample handed to the detector. The window is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("negative sample value {value} at timestamp {timestamp}")]
    NegativeValue { timestamp: i64, value: i128 },

    #[error("invalid sample timestamp {0}")]
    InvalidTimestamp(i64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("fixed-point denominator must be non-zero")]
    ZeroDenominator,

    #[error("window length must be at least one second")]
    ZeroWindow,

    #[error("scale 10^{0} does not fit in 128 bits")]
    ScaleOverflow(u32),

    #[error("threshold of {bps} bps overflows the fixed-point scale")]
    ThresholdOverflow { bps: u32 },

    #[error("threshold of {bps} bps is not representable at {decimals} decimals")]
    ThresholdPrecision { bps: u32, decimals: u32 },
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("rejected sample: {0}")]
    Input(#[from] InputError),

    #[error("finding sink failed: {0:#}")]
    Sink(anyhow::Error),
}
