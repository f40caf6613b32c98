use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::ChainSource;
use super::abi::{self, GET_CASH, TOTAL_BORROWS_CURRENT, TOTAL_RESERVES};
use super::errors::SourceError;
use super::types::{BlockHeader, PoolBalances, RpcBlock, RpcRequest, RpcResponse};

/// Ethereum JSON-RPC client bound to one cToken contract.
pub struct JsonRpcClient {
    http: Client,
    url: String,
    ctoken: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: String, ctoken: impl Into<String>) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url,
            ctoken: ctoken.into(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, SourceError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let resp: RpcResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        unwrap_response(method, resp)
    }

    async fn call_view(&self, selector: &str, block: u64) -> Result<u128, SourceError> {
        let result = self
            .call(
                "eth_call",
                json!([{ "to": self.ctoken, "data": selector }, abi::block_tag(block)]),
            )
            .await?;

        let word = result
            .as_str()
            .ok_or_else(|| SourceError::InvalidResponse(format!("eth_call returned {result}")))?;

        abi::decode_word(word)
    }
}

#[async_trait]
impl ChainSource for JsonRpcClient {
    #[instrument(skip(self), level = "debug")]
    async fn latest_block(&self) -> Result<BlockHeader, SourceError> {
        let result = self
            .call("eth_getBlockByNumber", json!(["latest", false]))
            .await?;

        let header = parse_block(result)?;
        debug!(number = header.number, timestamp = header.timestamp, "head block fetched");

        Ok(header)
    }

    #[instrument(skip(self), fields(ctoken = %self.ctoken), level = "debug")]
    async fn pool_balances(&self, block: u64) -> Result<PoolBalances, SourceError> {
        let (cash, borrows, reserves) = futures::try_join!(
            self.call_view(GET_CASH, block),
            self.call_view(TOTAL_BORROWS_CURRENT, block),
            self.call_view(TOTAL_RESERVES, block),
        )?;

        debug!(%cash, %borrows, %reserves, "cToken balances fetched");

        Ok(PoolBalances {
            cash,
            borrows,
            reserves,
        })
    }
}

fn unwrap_response(method: &str, resp: RpcResponse) -> Result<Value, SourceError> {
    if let Some(err) = resp.error {
        return Err(SourceError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    resp.result
        .ok_or_else(|| SourceError::InvalidResponse(format!("{method}: neither result nor error")))
}

fn parse_block(result: Value) -> Result<BlockHeader, SourceError> {
    if result.is_null() {
        return Err(SourceError::InvalidResponse("block not found".into()));
    }

    let block: RpcBlock = serde_json::from_value(result)
        .map_err(|e| SourceError::InvalidResponse(format!("block: {e}")))?;

    Ok(BlockHeader {
        number: abi::decode_quantity(&block.number)?,
        timestamp: abi::decode_quantity(&block.timestamp)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(raw: &str) -> RpcResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn rpc_error_wins_over_result() {
        let resp = response(r#"{"jsonrpc":"2.0","id":7,"error":{"code":-32005,"message":"rate limited"}}"#);

        match unwrap_response("eth_call", resp) {
            Err(SourceError::Rpc { code, message }) => {
                assert_eq!(code, -32005);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_result_and_error_is_invalid() {
        let resp = response(r#"{"jsonrpc":"2.0","id":7}"#);
        assert!(matches!(
            unwrap_response("eth_blockNumber", resp),
            Err(SourceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn block_header_is_decoded_from_hex() {
        let result = json!({
            "number": "0x121eac9",
            "timestamp": "0x65a8a3c3",
            "hash": "0xabc",
            "transactions": []
        });

        let header = parse_block(result).unwrap();
        assert_eq!(header.number, 0x121eac9);
        assert_eq!(header.timestamp, 0x65a8a3c3);
    }

    #[test]
    fn null_block_is_rejected() {
        assert!(matches!(parse_block(Value::Null), Err(SourceError::InvalidResponse(_))));
    }

    #[test]
    fn request_serializes_as_json_rpc() {
        let req = RpcRequest {
            jsonrpc: "2.0",
            id: 3,
            method: "eth_call",
            params: json!([{ "to": "0x1", "data": GET_CASH }, "0x10"]),
        };
        let v = serde_json::to_value(&req).unwrap();

        assert_eq!(v["jsonrpc"], "2.0");
        assert_eq!(v["id"], 3);
        assert_eq!(v["method"], "eth_call");
        assert_eq!(v["params"][0]["data"], GET_CASH);
        assert_eq!(v["params"][1], "0x10");
    }
}
