use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::UnknownCToken;

/// Compound v2 markets the monitor knows how to sample (Ethereum mainnet).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CToken {
    CUsdc,
    CDai,
    CUsdt,
    CEth,
    CWbtc2,
}

impl CToken {
    pub const ALL: [CToken; 5] = [
        CToken::CUsdc,
        CToken::CDai,
        CToken::CUsdt,
        CToken::CEth,
        CToken::CWbtc2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CToken::CUsdc => "cUSDC",
            CToken::CDai => "cDAI",
            CToken::CUsdt => "cUSDT",
            CToken::CEth => "cETH",
            CToken::CWbtc2 => "cWBTC2",
        }
    }

    pub fn address(&self) -> &'static str {
        match self {
            CToken::CUsdc => "0x39AA39c021dfbaE8faC545936693aC917d5E7563",
            CToken::CDai => "0x5d3a536E4D6DbD6114cc1Ead35777bAB948E3643",
            CToken::CUsdt => "0xf650C3d88D12dB855b8bf7D11Be6C55A4e07dCC9",
            CToken::CEth => "0x4Ddc2D193948926D02f9B1fE9e1daa0718270ED5",
            CToken::CWbtc2 => "0xccF4429DB6322D5C611ee964527D42E5d685DD6a",
        }
    }
}

impl fmt::Display for CToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CToken {
    type Err = UnknownCToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CToken::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCToken(s.to_string()))
    }
}

/// Head block as far as the monitor cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: u64,
    /// Seconds since the epoch.
    pub timestamp: u64,
}

/// Raw cToken balances at one block, in underlying token units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolBalances {
    pub cash: u128,
    pub borrows: u128,
    pub reserves: u128,
}

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// Subset of `eth_getBlockByNumber` we read. Quantities are hex strings.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcBlock {
    pub number: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctoken_parses_case_insensitively() {
        assert_eq!("cUSDC".parse::<CToken>().unwrap(), CToken::CUsdc);
        assert_eq!("cusdc".parse::<CToken>().unwrap(), CToken::CUsdc);
        assert_eq!("CWBTC2".parse::<CToken>().unwrap(), CToken::CWbtc2);
        assert_eq!("cFOO".parse::<CToken>(), Err(UnknownCToken("cFOO".into())));
    }

    #[test]
    fn ctoken_names_round_trip_through_display() {
        for t in CToken::ALL {
            assert_eq!(t.to_string().parse::<CToken>().unwrap(), t);
            assert!(t.address().starts_with("0x"));
            assert_eq!(t.address().len(), 42);
        }
    }

    #[test]
    fn rpc_error_response_deserializes() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"header not found"}}"#;
        let resp: RpcResponse = serde_json::from_str(raw).unwrap();

        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "header not found");
    }
}
