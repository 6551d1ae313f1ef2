//! Error types for recording operations

use thiserror::Error;

/// Errors that can occur while recording or storing a battle
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Backend is missing the settings it needs
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Sender account cannot pay for the transaction
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Transport failure talking to a remote backend
    #[error("Network error: {0}")]
    Network(String),

    /// JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Transaction mined but reverted, or never mined
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Content store rejected or lost the upload
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Classify an RPC error, spotting an unfunded sender
    pub(crate) fn from_rpc(code: i64, message: String) -> Self {
        if message.to_lowercase().contains("insufficient funds") {
            LedgerError::InsufficientBalance(message)
        } else {
            LedgerError::Rpc { code, message }
        }
    }
}
