//! Compound v2 utilization source.
//!
//! Reads `getCash`, `totalBorrowsCurrent` and `totalReserves` from a cToken at
//! a given block and turns them into a fixed-point utilization ratio.

pub mod abi;
pub mod errors;
pub mod rpc;
pub mod types;

use async_trait::async_trait;

pub use errors::{SourceError, UnknownCToken};
pub use rpc::JsonRpcClient;
pub use types::{BlockHeader, CToken, PoolBalances};

/// Chain access needed to sample one pool per block.
#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn latest_block(&self) -> Result<BlockHeader, SourceError>;

    async fn pool_balances(&self, block: u64) -> Result<PoolBalances, SourceError>;
}

/// Utilization of the pool at `block`, in `scale`.
pub async fn utilization_at<C>(source: &C, block: u64, scale: u128) -> Result<u128, SourceError>
where
    C: ChainSource + ?Sized,
{
    let balances = source.pool_balances(block).await?;
    abi::utilization_rate(&balances, scale)
}
