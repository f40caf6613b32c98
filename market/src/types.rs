use std::fmt;

use serde::{Serialize, Serializer};

use crate::errors::ConfigError;

/// Basis points in one whole unit.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Default fixed-point scale (18 decimals, as used by cToken math).
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Non-negative fixed-point ratio: an integer numerator over an implicit
/// scale held by whoever interprets it.
///
/// Serialized as a decimal string so consumers never see a rounded float.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ratio(u128);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u128 {
        self.0
    }

    /// Value in basis points of `scale`, rounded down.
    pub fn to_bps(self, scale: u128) -> u128 {
        if scale == 0 {
            return 0;
        }
        match self.0.checked_mul(BPS_DENOMINATOR) {
            Some(n) => n / scale,
            None => self.0 / scale * BPS_DENOMINATOR,
        }
    }

    /// Lossy view for logs only. Never compare on this.
    pub fn to_f64(self, scale: u128) -> f64 {
        if scale == 0 {
            return 0.0;
        }
        self.0 as f64 / scale as f64
    }

    pub fn checked_sub(self, rhs: Ratio) -> Option<Ratio> {
        self.0.checked_sub(rhs.0).map(Ratio)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Ratio {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `10^decimals` as a fixed-point scale.
pub fn scale_from_decimals(decimals: u32) -> Result<u128, ConfigError> {
    10u128
        .checked_pow(decimals)
        .ok_or(ConfigError::ScaleOverflow(decimals))
}

/// A validated observation owned by the window while it is in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Tick time in seconds.
    pub timestamp: u64,
    pub value: Ratio,
}
