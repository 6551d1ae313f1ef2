//! # Arena Anchor
//!
//! Receipts for finished battles.
//!
//! ## Backends
//!
//! - **FileLedger**: local append-only JSON Lines ledger (offline play, tests)
//! - **EvmLedger**: calldata transactions through an EVM JSON-RPC node
//! - **PinataStore**: full battle archive pinned to IPFS via Pinata
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use arena_anchor::{BattleRecorder, FileLedger};
//! # async fn demo(result: arena_core::BattleResult) -> Result<(), arena_anchor::LedgerError> {
//! let recorder = BattleRecorder::new(Some(Arc::new(FileLedger::new("./ledger.jsonl"))), None);
//! let recording = recorder.record(&result).await?;
//! println!("Recorded as #{}", recording.receipt.sequence);
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod evm;
mod file;
mod ipfs;
mod recorder;

pub use backend::{BattleRecord, ContentStore, LedgerBackend, LedgerReceipt};
pub use error::LedgerError;
pub use evm::{encode_calldata, EvmLedger, ReceiptPolling, CALLDATA_PREFIX};
pub use file::{FileLedger, LedgerEntry};
pub use ipfs::{PinataStore, GATEWAY_TIMEOUT, PINATA_API_URL, PINATA_GATEWAY_URL};
pub use recorder::{BattleRecorder, Recording};
