//! cToken call encoding and response decoding.
//!
//! Only zero-argument view calls are needed, so the calldata is just the
//! 4-byte selector and every answer is a single 32-byte word.

use super::errors::SourceError;
use super::types::PoolBalances;

/// `getCash()`
pub const GET_CASH: &str = "0x3b1d21a2";
/// `totalBorrowsCurrent()` (accrues interest first; fine under `eth_call`)
pub const TOTAL_BORROWS_CURRENT: &str = "0x73acee98";
/// `totalReserves()`
pub const TOTAL_RESERVES: &str = "0x8f840ddd";

/// Hex block tag for `eth_call`.
pub fn block_tag(number: u64) -> String {
    format!("0x{number:x}")
}

/// Decode an RPC quantity such as `"0x1b4"`.
pub fn decode_quantity(raw: &str) -> Result<u64, SourceError> {
    let digits = strip_prefix(raw)?;
    if digits.is_empty() {
        return Err(SourceError::InvalidResponse(format!("empty quantity {raw:?}")));
    }
    if digits.len() > 16 {
        return Err(SourceError::Overflow(raw.to_string()));
    }

    u64::from_str_radix(digits, 16)
        .map_err(|e| SourceError::InvalidResponse(format!("quantity {raw:?}: {e}")))
}

/// Decode a single ABI `uint256` return word into `u128`.
///
/// Values with any of the upper 128 bits set are rejected rather than
/// truncated.
pub fn decode_word(raw: &str) -> Result<u128, SourceError> {
    let digits = strip_prefix(raw)?;

    // `0x` is what a call to an address without code returns.
    if digits.is_empty() {
        return Err(SourceError::InvalidResponse("empty return data".into()));
    }
    if digits.len() > 64 {
        return Err(SourceError::InvalidResponse(format!(
            "return data longer than one word ({} hex chars)",
            digits.len()
        )));
    }

    let split = digits.len().saturating_sub(32);
    let (high, low) = digits.split_at(split);

    if !high.chars().all(|c| c == '0') {
        if !high.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SourceError::InvalidResponse(format!("non-hex return data {raw:?}")));
        }
        return Err(SourceError::Overflow(raw.to_string()));
    }

    u128::from_str_radix(low, 16)
        .map_err(|e| SourceError::InvalidResponse(format!("word {raw:?}: {e}")))
}

/// `borrows * scale / (cash + borrows - reserves)`, rounded down.
pub fn utilization_rate(balances: &PoolBalances, scale: u128) -> Result<u128, SourceError> {
    let PoolBalances {
        cash,
        borrows,
        reserves,
    } = *balances;

    let supplied = cash
        .checked_add(borrows)
        .ok_or_else(|| SourceError::Overflow("cash + borrows".into()))?;
    let denominator = supplied
        .checked_sub(reserves)
        .ok_or(SourceError::Degenerate("reserves exceed cash plus borrows"))?;

    if denominator == 0 {
        return Err(SourceError::Degenerate("no liquidity supplied"));
    }

    let numerator = borrows
        .checked_mul(scale)
        .ok_or_else(|| SourceError::Overflow("borrows * scale".into()))?;

    Ok(numerator / denominator)
}

fn strip_prefix(raw: &str) -> Result<&str, SourceError> {
    raw.strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| SourceError::InvalidResponse(format!("missing 0x prefix in {raw:?}")))
}
