//! Configuration management for the arena
//!
//! Handles API keys, provider selection and the optional recording backends.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::openrouter::OPENROUTER_BASE_URL;

/// Model that judges battles unless overridden
pub const DEFAULT_JUDGE_MODEL: &str = "meta-llama/llama-4-maverick";

/// Error types for configuration
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which model client drives battles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenRouter,
    /// Offline generated replies
    Mock,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenRouter => f.write_str("openrouter"),
            ProviderKind::Mock => f.write_str("mock"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(ConfigError::Invalid(format!(
                "ARENA_PROVIDER must be openrouter or mock, got {:?}",
                other
            ))),
        }
    }
}

/// Presence of one configuration key, for the startup banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStatus {
    pub label: &'static str,
    pub set: bool,
}

/// Arena configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// OpenRouter API key (env: OPENROUTER_API_KEY)
    pub openrouter_api_key: Option<String>,
    /// Completion API base (env: OPENROUTER_BASE_URL)
    pub base_url: String,
    /// Judge and summary model (env: ARENA_JUDGE_MODEL)
    pub judge_model: String,
    /// env: ARENA_PROVIDER
    pub provider: ProviderKind,
    /// EVM JSON-RPC endpoint (env: BNB_TESTNET_RPC)
    pub rpc_url: Option<String>,
    /// Node-managed sender account (env: WALLET_ADDRESS)
    pub wallet_address: Option<String>,
    /// Arena contract (env: ARENA_CONTRACT_ADDRESS)
    pub contract_address: Option<String>,
    /// Local JSONL ledger (env: ARENA_LEDGER_FILE)
    pub ledger_file: Option<PathBuf>,
    /// Pinata API token (env: PINATA_JWT)
    pub pinata_jwt: Option<String>,
}

/// Read a variable, treating empty as unset
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ArenaConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = match var("ARENA_PROVIDER") {
            Some(p) => p.parse()?,
            None => ProviderKind::default(),
        };
        Ok(Self {
            openrouter_api_key: var("OPENROUTER_API_KEY"),
            base_url: var("OPENROUTER_BASE_URL").unwrap_or_else(|| OPENROUTER_BASE_URL.to_string()),
            judge_model: var("ARENA_JUDGE_MODEL").unwrap_or_else(|| DEFAULT_JUDGE_MODEL.to_string()),
            provider,
            rpc_url: var("BNB_TESTNET_RPC"),
            wallet_address: var("WALLET_ADDRESS"),
            contract_address: var("ARENA_CONTRACT_ADDRESS"),
            ledger_file: var("ARENA_LEDGER_FILE").map(PathBuf::from),
            pinata_jwt: var("PINATA_JWT"),
        })
    }

    /// The API key, required unless running offline
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.openrouter_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))
    }

    /// Whether an on-chain ledger can be built
    pub fn chain_configured(&self) -> bool {
        self.rpc_url.is_some() && self.wallet_address.is_some() && self.contract_address.is_some()
    }

    /// Which keys are present
    pub fn key_status(&self) -> Vec<KeyStatus> {
        vec![
            KeyStatus {
                label: "OPENROUTER_API_KEY (All models)",
                set: self.openrouter_api_key.is_some(),
            },
            KeyStatus {
                label: "BNB_TESTNET_RPC (Chain)",
                set: self.rpc_url.is_some(),
            },
            KeyStatus {
                label: "WALLET_ADDRESS (Chain)",
                set: self.wallet_address.is_some(),
            },
            KeyStatus {
                label: "ARENA_CONTRACT_ADDRESS (Chain)",
                set: self.contract_address.is_some(),
            },
            KeyStatus {
                label: "ARENA_LEDGER_FILE (Local ledger)",
                set: self.ledger_file.is_some(),
            },
            KeyStatus {
                label: "PINATA_JWT (IPFS storage)",
                set: self.pinata_jwt.is_some(),
            },
        ]
    }
}
