//! EVM ledger backend
//!
//! Sends each record as transaction calldata to the arena contract through a
//! node-managed account (`eth_sendTransaction`), then polls for the receipt.
//! The calldata is the `ARNA` magic prefix followed by the hex of the record
//! JSON.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::backend::{BattleRecord, LedgerBackend, LedgerReceipt};
use crate::error::LedgerError;

/// `ARNA` in hex
pub const CALLDATA_PREFIX: &str = "0x41524e41";

const RPC_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'a str,
    method: &'a str,
    params: T,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxReceipt {
    block_number: Option<String>,
    status: Option<String>,
}

/// How long to wait for a transaction to be mined
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolling {
    pub interval: Duration,
    pub attempts: u32,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            attempts: 30,
        }
    }
}

/// Calldata for a record
pub fn encode_calldata(record: &BattleRecord) -> Result<String, LedgerError> {
    Ok(format!("{}{}", CALLDATA_PREFIX, hex::encode(record.to_payload()?)))
}

fn parse_quantity(hex: &str) -> Result<u64, LedgerError> {
    u64::from_str_radix(hex.trim_start_matches("0x"), 16)
        .map_err(|e| LedgerError::Network(format!("bad quantity {:?}: {}", hex, e)))
}

/// EVM JSON-RPC ledger
#[derive(Debug)]
pub struct EvmLedger {
    rpc_url: String,
    from_address: String,
    contract_address: String,
    client: reqwest::Client,
    polling: ReceiptPolling,
    next_id: AtomicU64,
}

impl EvmLedger {
    pub fn new(
        rpc_url: impl Into<String>,
        from_address: impl Into<String>,
        contract_address: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(RPC_TIMEOUT)
            .user_agent(concat!("arena-anchor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        Ok(Self {
            rpc_url: rpc_url.into(),
            from_address: from_address.into(),
            contract_address: contract_address.into(),
            client,
            polling: ReceiptPolling::default(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn with_polling(mut self, polling: ReceiptPolling) -> Self {
        self.polling = polling;
        self
    }

    async fn call<P: Serialize + Send + Sync, T: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<T>, LedgerError> {
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let resp = self
            .client
            .post(&self.rpc_url)
            .json(&req)
            .send()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LedgerError::Network(format!(
                "RPC endpoint returned HTTP {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;
        let resp: JsonRpcResponse<T> = serde_json::from_slice(&bytes)?;

        if let Some(err) = resp.error {
            return Err(LedgerError::from_rpc(err.code, err.message));
        }
        Ok(resp.result)
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<u64, LedgerError> {
        for attempt in 0..self.polling.attempts {
            if attempt > 0 {
                tokio::time::sleep(self.polling.interval).await;
            }
            let receipt: Option<TxReceipt> = self
                .call("eth_getTransactionReceipt", serde_json::json!([tx_hash]))
                .await?;
            let Some(receipt) = receipt else {
                continue;
            };
            let Some(block) = receipt.block_number else {
                continue;
            };
            if receipt.status.as_deref() == Some("0x0") {
                return Err(LedgerError::Transaction(format!("{} reverted", tx_hash)));
            }
            return parse_quantity(&block);
        }
        Err(LedgerError::Transaction(format!(
            "{} not mined after {} polls",
            tx_hash, self.polling.attempts
        )))
    }
}

#[async_trait]
impl LedgerBackend for EvmLedger {
    async fn record(&self, record: &BattleRecord) -> Result<LedgerReceipt, LedgerError> {
        let calldata = encode_calldata(record)?;

        let tx_hash: String = self
            .call(
                "eth_sendTransaction",
                serde_json::json!([{
                    "from": self.from_address,
                    "to": self.contract_address,
                    "data": calldata
                }]),
            )
            .await?
            .ok_or_else(|| LedgerError::Transaction("node returned no transaction hash".into()))?;

        tracing::info!(battle = %record.battle_id, %tx_hash, "battle transaction sent");

        let block = self.wait_for_receipt(&tx_hash).await?;

        Ok(LedgerReceipt {
            backend: self.name().to_string(),
            tx_hash,
            sequence: block,
            ipfs_cid: record.ipfs_cid.clone(),
            recorded_at: Utc::now(),
        })
    }

    fn name(&self) -> &str {
        "evm"
    }

    async fn is_healthy(&self) -> bool {
        self.call::<_, String>("eth_blockNumber", serde_json::json!([]))
            .await
            .map(|r| r.is_some())
            .unwrap_or(false)
    }
}
