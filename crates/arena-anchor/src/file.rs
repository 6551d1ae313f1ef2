//! File-based battle ledger
//!
//! Appends records to a local JSON Lines file for offline play and testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::backend::{BattleRecord, LedgerBackend, LedgerReceipt};
use crate::error::LedgerError;

/// One line of the ledger file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// 1-based line number
    pub sequence: u64,
    /// SHA-256 of the record payload
    pub digest: String,
    pub recorded_at: DateTime<Utc>,
    pub record: BattleRecord,
}

/// JSON Lines ledger; the receipt's sequence is the entry's line number
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    // serialises count-then-append so sequences stay unique
    write_lock: Mutex<()>,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry written so far; unreadable lines are skipped
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        Ok(content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect())
    }

    async fn line_count(&self) -> Result<u64, LedgerError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(0);
        }
        let content = fs::read_to_string(&self.path).await?;
        Ok(content.lines().filter(|l| !l.trim().is_empty()).count() as u64)
    }
}

#[async_trait]
impl LedgerBackend for FileLedger {
    async fn record(&self, record: &BattleRecord) -> Result<LedgerReceipt, LedgerError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let digest = record.digest()?;
        let entry = LedgerEntry {
            sequence: self.line_count().await? + 1,
            digest: digest.clone(),
            recorded_at: Utc::now(),
            record: record.clone(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let mut json = serde_json::to_string(&entry)?;
        json.push('\n');
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(path = %self.path.display(), sequence = entry.sequence, "battle appended to ledger file");

        Ok(LedgerReceipt {
            backend: self.name().to_string(),
            tx_hash: format!("0x{}", digest),
            sequence: entry.sequence,
            ipfs_cid: record.ipfs_cid.clone(),
            recorded_at: entry.recorded_at,
        })
    }

    fn name(&self) -> &str {
        "file"
    }

    async fn is_healthy(&self) -> bool {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => fs::create_dir_all(parent).await.is_ok(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::sample_result;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_ledger_appends() {
        let dir = tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("nested").join("ledger.jsonl"));
        assert!(ledger.is_healthy().await);
        assert!(ledger.entries().await.unwrap().is_empty());

        let first = BattleRecord::from_result(&sample_result(), None);
        let second = BattleRecord::from_result(&sample_result(), Some("bafy2".into()));

        let r1 = ledger.record(&first).await.unwrap();
        let r2 = ledger.record(&second).await.unwrap();
        assert_eq!(r1.backend, "file");
        assert_eq!(r1.sequence, 1);
        assert_eq!(r2.sequence, 2);
        assert_eq!(r1.tx_hash, format!("0x{}", first.digest().unwrap()));
        assert_eq!(r2.ipfs_cid.as_deref(), Some("bafy2"));

        let entries = ledger.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].record, first);
        assert_eq!(entries[1].sequence, 2);
    }

    #[tokio::test]
    async fn test_sequence_continues_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");
        let record = BattleRecord::from_result(&sample_result(), None);

        FileLedger::new(&path).record(&record).await.unwrap();
        let receipt = FileLedger::new(&path).record(&record).await.unwrap();
        assert_eq!(receipt.sequence, 2);
    }
}
