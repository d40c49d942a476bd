//! Key-value persistence substrate behind the session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store never touches a concrete backend directly; it receives a
//! `KeyValueStore` at construction. Native callers use `MemoryStorage` or
//! `FileStorage`, browser builds use `BrowserStorage` (feature `browser`).
//!
//! TRADE-OFFS
//! ==========
//! Persistence failures are not surfaced to callers. A write that cannot reach
//! disk is logged and the in-memory view stays authoritative for the process.

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

// =============================================================================
// TRAIT
// =============================================================================

/// String key-value store with atomic single-key operations.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str);

    /// Remove a key. Removing an absent key is a no-op.
    fn remove(&self, key: &str);

    /// Write several keys. Backends that can persist them in one step override
    /// this so no observer sees half of the batch.
    fn set_all(&self, entries: &[(&str, &str)]) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Remove several keys.
    fn remove_all(&self, keys: &[&str]) {
        for key in keys {
            self.remove(key);
        }
    }
}

/// Write `entries` one at a time through a backend with no transactions.
/// When a write is rejected, keys already written by this batch are removed
/// again so no half-written batch stays behind. Returns whether every write
/// landed.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub(crate) fn write_batch(
    entries: &[(&str, &str)],
    mut write: impl FnMut(&str, &str) -> bool,
    mut undo: impl FnMut(&str),
) -> bool {
    for (done, (key, value)) in entries.iter().enumerate() {
        if !write(key, value) {
            tracing::warn!(key, "storage write rejected; rolling back batch");
            for (written, _) in &entries[..done] {
                undo(written);
            }
            return false;
        }
    }
    true
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        lock(&self.entries).remove(key);
    }

    fn set_all(&self, entries: &[(&str, &str)]) {
        let mut map = lock(&self.entries);
        for (key, value) in entries {
            map.insert((*key).to_owned(), (*value).to_owned());
        }
    }

    fn remove_all(&self, keys: &[&str]) {
        let mut map = lock(&self.entries);
        for key in keys {
            map.remove(*key);
        }
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON object on disk, loaded once on open and rewritten on every mutation.
///
/// Writes go to a sibling temp file that is then renamed over the target, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file opens empty. An unreadable or malformed file also opens
    /// empty and is overwritten by the next mutation.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self { path, entries: Mutex::new(entries) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) {
        let mut map = lock(&self.entries);
        apply(&mut map);
        if let Err(e) = persist_entries(&self.path, &map) {
            tracing::warn!(path = %self.path.display(), error = %e, "session file write failed");
        }
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "session file unreadable; starting empty");
            return BTreeMap::new();
        }
    };
    if raw.trim().is_empty() {
        return BTreeMap::new();
    }
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "session file malformed; starting empty");
        BTreeMap::new()
    })
}

fn persist_entries(path: &Path, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(entries).map_err(std::io::Error::other)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.mutate(|map| {
            map.insert(key.to_owned(), value.to_owned());
        });
    }

    fn remove(&self, key: &str) {
        self.mutate(|map| {
            map.remove(key);
        });
    }

    fn set_all(&self, entries: &[(&str, &str)]) {
        self.mutate(|map| {
            for (key, value) in entries {
                map.insert((*key).to_owned(), (*value).to_owned());
            }
        });
    }

    fn remove_all(&self, keys: &[&str]) {
        self.mutate(|map| {
            for key in keys {
                map.remove(*key);
            }
        });
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// `window.localStorage`. Every call re-resolves the storage handle because
/// `web_sys::Storage` is not `Send`.
#[cfg(feature = "browser")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

#[cfg(feature = "browser")]
impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(feature = "browser")]
impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, value).is_err() {
                tracing::warn!(key, "localStorage write rejected");
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            if storage.remove_item(key).is_err() {
                tracing::warn!(key, "localStorage remove rejected");
            }
        }
    }

    fn set_all(&self, entries: &[(&str, &str)]) {
        let Some(storage) = Self::storage() else {
            tracing::warn!("localStorage unavailable; batch dropped");
            return;
        };
        write_batch(
            entries,
            |key, value| storage.set_item(key, value).is_ok(),
            |key| {
                let _ = storage.remove_item(key);
            },
        );
    }
}
