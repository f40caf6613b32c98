//! Utilization Volatility Pulse
//!
//! Tracks a fixed-point metric (pool utilization) over a trailing time window
//! and flags the tick at which the window's `max - min` grows past a threshold.
//!
//! ## Cycle per observation
//! 1. validate the raw sample (negative value or timestamp is rejected)
//! 2. insert it into the window
//! 3. evict entries older than `timestamp - window_length`
//! 4. rescan min/max over what is left
//! 5. decide
//!
//! ## Warm-up guard
//! A window holding a single sample has no spread to speak of, so the pulse
//! answers `Insufficient` rather than a zero spread. This also covers the case
//! where a long gap evicted all prior history.
//!
//! ## Determinism
//! Pure computation over the window and the new sample. Any I/O (RPC,
//! reporting, logging) lives outside this module.

use super::Pulse;
use super::input::SampleInput;
use crate::errors::{ConfigError, InputError};
use crate::rolling_window::WindowStore;
use crate::types::{BPS_DENOMINATOR, Ratio, Sample, WAD, scale_from_decimals};

/// Default trailing window: one hour.
pub const DEFAULT_WINDOW_SECONDS: u64 = 3_600;

/// Default threshold: 1000 bps (10%).
pub const DEFAULT_THRESHOLD_BPS: u32 = 1_000;

/// Fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Trailing window in seconds.
    pub window_length: u64,
    /// Spread above which the tick is flagged, in `denominator` scale.
    pub threshold: Ratio,
    /// Scale of every incoming value.
    pub denominator: u128,
}

impl DetectorConfig {
    pub fn new(window_length: u64, threshold: Ratio, denominator: u128) -> Result<Self, ConfigError> {
        if denominator == 0 {
            return Err(ConfigError::ZeroDenominator);
        }
        if window_length == 0 {
            return Err(ConfigError::ZeroWindow);
        }

        Ok(Self {
            window_length,
            threshold,
            denominator,
        })
    }

    /// Threshold given in basis points, scale given as a number of decimals.
    ///
    /// The conversion must be exact: a threshold that would be rounded down
    /// in the chosen scale is rejected.
    pub fn from_bps(window_length: u64, threshold_bps: u32, decimals: u32) -> Result<Self, ConfigError> {
        let denominator = scale_from_decimals(decimals)?;
        let scaled = (threshold_bps as u128)
            .checked_mul(denominator)
            .ok_or(ConfigError::ThresholdOverflow { bps: threshold_bps })?;
        if scaled % BPS_DENOMINATOR != 0 {
            return Err(ConfigError::ThresholdPrecision {
                bps: threshold_bps,
                decimals,
            });
        }
        let threshold = Ratio::from_raw(scaled / BPS_DENOMINATOR);

        Self::new(window_length, threshold, denominator)
    }

    /// Threshold rendered back in basis points.
    pub fn threshold_bps(&self) -> u128 {
        self.threshold.to_bps(self.denominator)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_length: DEFAULT_WINDOW_SECONDS,
            threshold: Ratio::from_raw(WAD / 10),
            denominator: WAD,
        }
    }
}

/// Supporting metadata for a multi-sample window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub timestamp: u64,
    pub current_value: Ratio,
    pub min: Ratio,
    pub max: Ratio,
    pub spread: Ratio,
    /// Samples in the window after eviction.
    pub samples: usize,
    /// `spread > threshold`, strict.
    pub exceeded: bool,
}

/// Outcome of one observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Only the new sample is in the window.
    Insufficient,

    Evaluated(Evaluation),
}

impl Decision {
    pub fn exceeded(&self) -> bool {
        matches!(self, Decision::Evaluated(e) if e.exceeded)
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            Decision::Evaluated(e) => Some(e),
            Decision::Insufficient => None,
        }
    }
}

/// Volatility detector state. Exclusively owns its window.
#[derive(Clone, Debug)]
pub struct VolatilityDetector {
    window: WindowStore,
    config: DetectorConfig,
}

impl VolatilityDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            window: WindowStore::new(),
            config,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn window(&self) -> &WindowStore {
        &self.window
    }

    /// Feed one sample and decide.
    ///
    /// Validation happens before any mutation, so a rejected sample leaves the
    /// window exactly as it was.
    pub fn observe(&mut self, timestamp: i64, value: i128) -> Result<Decision, InputError> {
        let sample = validate(timestamp, value)?;

        self.window.insert(sample.timestamp, sample.value);

        let cutoff = sample.timestamp.saturating_sub(self.config.window_length);
        self.window.evict_older_than(cutoff);

        // The sample just inserted sits at `timestamp >= cutoff`, so the
        // window cannot be empty here.
        let Some(extrema) = self.window.scan_extrema() else {
            return Ok(Decision::Insufficient);
        };

        if self.window.len() == 1 {
            return Ok(Decision::Insufficient);
        }

        let spread = extrema.spread();

        Ok(Decision::Evaluated(Evaluation {
            timestamp: sample.timestamp,
            current_value: sample.value,
            min: extrema.min,
            max: extrema.max,
            spread,
            samples: self.window.len(),
            exceeded: spread > self.config.threshold,
        }))
    }
}

impl Pulse for VolatilityDetector {
    type Input = SampleInput;
    type Output = Decision;
    type Error = InputError;

    fn evaluate(&mut self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        self.observe(input.timestamp, input.value)
    }
}

fn validate(timestamp: i64, value: i128) -> Result<Sample, InputError> {
    let ts = u64::try_from(timestamp).map_err(|_| InputError::InvalidTimestamp(timestamp))?;
    let raw = u128::try_from(value).map_err(|_| InputError::NegativeValue { timestamp, value })?;

    Ok(Sample {
        timestamp: ts,
        value: Ratio::from_raw(raw),
    })
}
