//! Pinata / IPFS content store

use arena_core::BattleResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::backend::ContentStore;
use crate::error::LedgerError;

pub const PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const PINATA_GATEWAY_URL: &str = "https://gateway.pinata.cloud";
/// Gateway reads give up after this long
pub const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinResponse {
    ipfs_hash: String,
}

/// Pins full battles as JSON on Pinata
#[derive(Debug, Clone)]
pub struct PinataStore {
    jwt: String,
    api_url: String,
    gateway_url: String,
    client: reqwest::Client,
}

impl PinataStore {
    pub fn new(jwt: impl Into<String>) -> Self {
        Self::with_endpoints(jwt, PINATA_API_URL, PINATA_GATEWAY_URL)
    }

    pub fn with_endpoints(jwt: impl Into<String>, api_url: &str, gateway_url: &str) -> Self {
        Self {
            jwt: jwt.into(),
            api_url: api_url.trim_end_matches('/').to_string(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ContentStore for PinataStore {
    async fn put(&self, result: &BattleResult) -> Result<String, LedgerError> {
        let body = serde_json::json!({
            "pinataContent": result,
            "pinataMetadata": {
                "name": format!("battle-{}", result.id),
                "keyvalues": {
                    "app": "arena",
                    "category": result.prompt.category,
                    "winner": result.winner(),
                }
            }
        });

        let resp = self
            .client
            .post(format!("{}/pinning/pinJSONToIPFS", self.api_url))
            .bearer_auth(&self.jwt)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Storage(format!("Pinata {}: {}", status, body)));
        }

        let pinned: PinResponse = resp
            .json()
            .await
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        tracing::info!(battle = %result.id, cid = %pinned.ipfs_hash, "battle pinned");
        Ok(pinned.ipfs_hash)
    }

    async fn get(&self, cid: &str) -> Result<Option<serde_json::Value>, LedgerError> {
        let resp = self
            .client
            .get(self.link(cid))
            .timeout(GATEWAY_TIMEOUT)
            .send()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(LedgerError::Storage(format!("gateway returned {}", resp.status())));
        }
        let doc = resp
            .json()
            .await
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(Some(doc))
    }

    fn link(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_url, cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_link() {
        let store = PinataStore::new("jwt");
        assert_eq!(store.link("bafyabc"), "https://gateway.pinata.cloud/ipfs/bafyabc");
        let local = PinataStore::with_endpoints("jwt", "http://127.0.0.1:1/", "http://127.0.0.1:2/");
        assert_eq!(local.link("x"), "http://127.0.0.1:2/ipfs/x");
    }
}
