//! Origin store persisted as a single JSON object file.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use authstash_core::result::AppResult;
use authstash_core::traits::OriginStore;

use super::{check_quota, item_size};

/// Origin store that survives process restarts and is shared by every
/// instance opened on the same path.
///
/// Nothing is cached: every mutation takes an exclusive lock on a sibling
/// `.lock` file, re-reads the items, applies the change and rewrites the
/// file through a temporary sibling and a rename. Two instances therefore
/// only overwrite each other's keys, never the whole file, and readers
/// always see a complete file.
#[derive(Debug)]
pub struct FileOriginStore {
    path: PathBuf,
    lock_path: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileOriginStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts empty. An unparsable file is logged and
    /// treated as empty; it is overwritten by the next mutation.
    pub fn open(path: impl AsRef<Path>, quota_bytes: Option<u64>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let store = Self {
            lock_path: path.with_extension("lock"),
            path,
            quota_bytes,
        };
        let count = store.load()?.len();
        debug!(path = %store.path.display(), count, "Opened origin store file");
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Take the cross-process write lock. Released when the file is dropped.
    fn lock(&self) -> AppResult<File> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(file)
    }

    fn load(&self) -> AppResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(items) => Ok(items),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Corrupted origin store file, reading as empty");
                    Ok(BTreeMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> AppResult<()> {
        let json = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply `change` to the current items under the write lock. The file
    /// is rewritten only when `change` succeeds and reports a modification.
    fn mutate(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> AppResult<bool>,
    ) -> AppResult<()> {
        let _lock = self.lock()?;
        let mut items = self.load()?;
        if change(&mut items)? {
            self.persist(&items)?;
        }
        Ok(())
    }
}

impl OriginStore for FileOriginStore {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.mutate(|items| {
            if self.quota_bytes.is_some() {
                let used: u64 = items
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| item_size(k, v))
                    .sum::<u64>()
                    + item_size(key, value);
                check_quota(used, self.quota_bytes)?;
            }
            items.insert(key.to_string(), value.to_string());
            Ok(true)
        })
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.mutate(|items| Ok(items.remove(key).is_some()))
    }

    fn clear(&self) -> AppResult<()> {
        self.mutate(|items| {
            items.clear();
            Ok(true)
        })
    }

    fn keys(&self) -> AppResult<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }
}
