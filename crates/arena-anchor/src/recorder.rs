//! Records a battle: archive first, then the ledger

use arena_core::BattleResult;
use std::sync::Arc;

use crate::backend::{BattleRecord, ContentStore, LedgerBackend, LedgerReceipt};
use crate::error::LedgerError;

/// Outcome of a successful recording
#[derive(Debug, Clone)]
pub struct Recording {
    pub receipt: LedgerReceipt,
    /// Non-fatal problems, such as a failed archive upload
    pub warnings: Vec<String>,
}

/// Combines an optional ledger with an optional content store
#[derive(Debug, Clone, Default)]
pub struct BattleRecorder {
    ledger: Option<Arc<dyn LedgerBackend>>,
    store: Option<Arc<dyn ContentStore>>,
}

impl BattleRecorder {
    pub fn new(
        ledger: Option<Arc<dyn LedgerBackend>>,
        store: Option<Arc<dyn ContentStore>>,
    ) -> Self {
        Self { ledger, store }
    }

    /// Whether battles can be recorded at all
    pub fn is_enabled(&self) -> bool {
        self.ledger.is_some()
    }

    pub fn ledger_name(&self) -> Option<&str> {
        self.ledger.as_deref().map(|l| l.name())
    }

    pub fn store(&self) -> Option<&Arc<dyn ContentStore>> {
        self.store.as_ref()
    }

    /// Archive the full battle (best effort), then write its record to the
    /// ledger. A ledger failure is returned; an archive failure becomes a
    /// warning and the record goes out without a CID.
    pub async fn record(&self, result: &BattleResult) -> Result<Recording, LedgerError> {
        let ledger = self
            .ledger
            .as_ref()
            .ok_or_else(|| LedgerError::NotConfigured("no ledger backend configured".into()))?;

        let mut warnings = Vec::new();
        let ipfs_cid = match &self.store {
            Some(store) => match store.put(result).await {
                Ok(cid) => Some(cid),
                Err(e) => {
                    tracing::warn!(battle = %result.id, error = %e, "archive upload failed");
                    warnings.push(format!("IPFS upload failed: {}", e));
                    None
                }
            },
            None => None,
        };

        let record = BattleRecord::from_result(result, ipfs_cid);
        let receipt = ledger.record(&record).await?;
        tracing::info!(
            battle = %result.id,
            backend = %receipt.backend,
            tx_hash = %receipt.tx_hash,
            sequence = receipt.sequence,
            "battle recorded"
        );
        Ok(Recording { receipt, warnings })
    }
}
