//! Transactional databases behind the [`DatabaseFactory`] trait.
//!
//! [`DatabaseFactory`]: authstash_core::traits::DatabaseFactory

pub mod memory;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use memory::MemoryDatabaseFactory;
#[cfg(feature = "redis-backend")]
pub use self::redis::RedisDatabaseFactory;

use std::collections::BTreeMap;

use authstash_core::error::AppError;
use authstash_core::result::AppResult;
use authstash_core::traits::TransactionMode;

/// A write recorded by a transaction before commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WriteOp {
    Put(String, String),
    Delete(String),
    Clear,
}

/// Buffered writes of one transaction, shared by every backend.
///
/// Reads inside a read-write transaction see the transaction's own
/// writes layered over the committed state.
#[derive(Debug)]
pub(crate) struct WriteBuffer {
    mode: TransactionMode,
    ops: Vec<WriteOp>,
    finished: bool,
}

impl WriteBuffer {
    pub(crate) fn new(mode: TransactionMode) -> Self {
        Self {
            mode,
            ops: Vec::new(),
            finished: false,
        }
    }

    pub(crate) fn mode(&self) -> TransactionMode {
        self.mode
    }

    pub(crate) fn ensure_active(&self) -> AppResult<()> {
        if self.finished {
            return Err(AppError::transaction("Transaction has already finished"));
        }
        Ok(())
    }

    pub(crate) fn record(&mut self, op: WriteOp) -> AppResult<()> {
        self.ensure_active()?;
        if self.mode == TransactionMode::ReadOnly {
            return Err(AppError::transaction(
                "Cannot write inside a read-only transaction",
            ));
        }
        self.ops.push(op);
        Ok(())
    }

    /// Outcome of buffered writes for `key`: `Some(value)` when a buffered
    /// write decides it, `None` when the committed state must be read.
    pub(crate) fn lookup(&self, key: &str) -> Option<Option<String>> {
        self.ops.iter().rev().find_map(|op| match op {
            WriteOp::Put(k, v) if k == key => Some(Some(v.clone())),
            WriteOp::Delete(k) if k == key => Some(None),
            WriteOp::Clear => Some(None),
            _ => None,
        })
    }

    /// Apply the buffered writes to a map.
    pub(crate) fn apply(&self, map: &mut BTreeMap<String, String>) {
        apply_ops(&self.ops, map);
    }

    /// Layer buffered writes over a committed key list.
    pub(crate) fn overlay_keys(&self, committed: Vec<String>) -> Vec<String> {
        let mut view: BTreeMap<String, String> =
            committed.into_iter().map(|k| (k, String::new())).collect();
        self.apply(&mut view);
        view.into_keys().collect()
    }

    /// Take the writes for commit and mark the transaction finished.
    pub(crate) fn finish(&mut self) -> AppResult<Vec<WriteOp>> {
        self.ensure_active()?;
        self.finished = true;
        Ok(std::mem::take(&mut self.ops))
    }
}

/// Replay committed writes onto a map.
pub(crate) fn apply_ops(ops: &[WriteOp], map: &mut BTreeMap<String, String>) {
    for op in ops {
        match op {
            WriteOp::Put(k, v) => {
                map.insert(k.clone(), v.clone());
            }
            WriteOp::Delete(k) => {
                map.remove(k);
            }
            WriteOp::Clear => map.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_prefers_latest_write() {
        let mut buffer = WriteBuffer::new(TransactionMode::ReadWrite);
        buffer.record(WriteOp::Put("a".into(), "1".into())).unwrap();
        buffer.record(WriteOp::Put("a".into(), "2".into())).unwrap();
        assert_eq!(buffer.lookup("a"), Some(Some("2".to_string())));
        assert_eq!(buffer.lookup("b"), None);
        buffer.record(WriteOp::Clear).unwrap();
        assert_eq!(buffer.lookup("b"), Some(None));
    }

    #[test]
    fn test_overlay_keys() {
        let mut buffer = WriteBuffer::new(TransactionMode::ReadWrite);
        buffer.record(WriteOp::Delete("a".into())).unwrap();
        buffer.record(WriteOp::Put("c".into(), "3".into())).unwrap();
        let keys = buffer.overlay_keys(vec!["a".into(), "b".into()]);
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let mut buffer = WriteBuffer::new(TransactionMode::ReadOnly);
        assert!(buffer.record(WriteOp::Clear).is_err());
    }

    #[test]
    fn test_finish_twice_fails() {
        let mut buffer = WriteBuffer::new(TransactionMode::ReadWrite);
        buffer.finish().unwrap();
        assert!(buffer.finish().is_err());
        assert!(buffer.record(WriteOp::Clear).is_err());
    }
}
