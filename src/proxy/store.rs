//! Named cache stores.
//!
//! A cache store is a version-named map from request URL to the last
//! response persisted for it. Two implementations:
//!
//! - [`MemoryStore`] — process-local, used by tests
//! - [`DiskStore`] — one directory per store under a cache root, one JSON
//!   file per entry, written via temp file + rename
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::http::Response;

/// Storage backend for proxy caches.
pub trait CacheStore {
    /// Insert or overwrite a single entry, creating the store if needed.
    fn put(&self, store: &str, key: &str, response: &Response) -> Result<()>;

    /// Insert every entry or none of them.
    fn put_all(&self, store: &str, entries: &[(String, Response)]) -> Result<()>;

    fn lookup(&self, store: &str, key: &str) -> Result<Option<Response>>;

    /// Names of all existing stores.
    fn store_names(&self) -> Result<Vec<String>>;

    /// Delete a store and all of its entries. Returns whether it existed.
    fn delete_store(&self, store: &str) -> Result<bool>;

    /// Keys held by a store (empty when the store does not exist).
    fn keys(&self, store: &str) -> Result<Vec<String>>;
}

impl<T: CacheStore + ?Sized> CacheStore for &T {
    fn put(&self, store: &str, key: &str, response: &Response) -> Result<()> {
        (**self).put(store, key, response)
    }
    fn put_all(&self, store: &str, entries: &[(String, Response)]) -> Result<()> {
        (**self).put_all(store, entries)
    }
    fn lookup(&self, store: &str, key: &str) -> Result<Option<Response>> {
        (**self).lookup(store, key)
    }
    fn store_names(&self) -> Result<Vec<String>> {
        (**self).store_names()
    }
    fn delete_store(&self, store: &str) -> Result<bool> {
        (**self).delete_store(store)
    }
    fn keys(&self, store: &str) -> Result<Vec<String>> {
        (**self).keys(store)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

type Stores = BTreeMap<String, HashMap<String, Response>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    stores: Mutex<Stores>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_stores<R>(&self, f: impl FnOnce(&mut Stores) -> R) -> Result<R> {
        let mut guard = self
            .stores
            .lock()
            .map_err(|_| anyhow::anyhow!("memory cache lock poisoned"))?;
        Ok(f(&mut guard))
    }
}

impl CacheStore for MemoryStore {
    fn put(&self, store: &str, key: &str, response: &Response) -> Result<()> {
        self.with_stores(|s| {
            s.entry(store.to_string())
                .or_default()
                .insert(key.to_string(), response.clone());
        })
    }

    fn put_all(&self, store: &str, entries: &[(String, Response)]) -> Result<()> {
        self.with_stores(|s| {
            let target = s.entry(store.to_string()).or_default();
            for (key, response) in entries {
                target.insert(key.clone(), response.clone());
            }
        })
    }

    fn lookup(&self, store: &str, key: &str) -> Result<Option<Response>> {
        self.with_stores(|s| s.get(store).and_then(|m| m.get(key)).cloned())
    }

    fn store_names(&self) -> Result<Vec<String>> {
        self.with_stores(|s| s.keys().cloned().collect())
    }

    fn delete_store(&self, store: &str) -> Result<bool> {
        self.with_stores(|s| s.remove(store).is_some())
    }

    fn keys(&self, store: &str) -> Result<Vec<String>> {
        self.with_stores(|s| {
            let mut keys: Vec<String> = s
                .get(store)
                .map(|m| m.keys().cloned().collect())
                .unwrap_or_default();
            keys.sort();
            keys
        })
    }
}

// ---------------------------------------------------------------------------
// Disk store
// ---------------------------------------------------------------------------

/// On-disk form of one cache entry.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    status: u16,
    headers: Vec<(String, String)>,
    body_base64: String,
    stored_at: String,
}

impl StoredEntry {
    fn new(key: &str, response: &Response) -> Self {
        Self {
            key: key.to_string(),
            status: response.status,
            headers: response.headers.clone(),
            body_base64: BASE64.encode(&response.body),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn into_response(self) -> Result<Response> {
        let body = BASE64
            .decode(self.body_base64.as_bytes())
            .with_context(|| format!("corrupt cached body for {}", self.key))?;
        Ok(Response {
            status: self.status,
            headers: self.headers,
            body,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_dir(&self, store: &str) -> Result<PathBuf> {
        validate_store_name(store)?;
        Ok(self.root.join(store))
    }

    fn entry_file(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{}.json", entry_hash(key)))
    }

    fn write_entry(dir: &Path, key: &str, response: &Response) -> Result<()> {
        let path = Self::entry_file(dir, key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec(&StoredEntry::new(key, response))
            .context("failed to serialize cache entry")?;
        fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("failed to commit {}", path.display()))?;
        Ok(())
    }
}

/// Store names become directory names.
fn validate_store_name(store: &str) -> Result<()> {
    if store.is_empty()
        || store.starts_with('.')
        || store.contains(['/', '\\'])
        || store.contains("..")
    {
        anyhow::bail!("invalid cache store name: {store:?}");
    }
    Ok(())
}

fn entry_hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

impl CacheStore for DiskStore {
    fn put(&self, store: &str, key: &str, response: &Response) -> Result<()> {
        let dir = self.store_dir(store)?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create cache store {}", dir.display()))?;
        Self::write_entry(&dir, key, response)
    }

    fn put_all(&self, store: &str, entries: &[(String, Response)]) -> Result<()> {
        let dir = self.store_dir(store)?;
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create cache root {}", self.root.display()))?;

        // Stage everything first so a failed write leaves the store untouched.
        let staging = self
            .root
            .join(format!(".{store}.staging-{}", std::process::id()));
        if staging.exists() {
            fs::remove_dir_all(&staging).context("failed to clear stale staging directory")?;
        }
        fs::create_dir_all(&staging).context("failed to create staging directory")?;

        let staged = entries
            .iter()
            .try_for_each(|(key, response)| Self::write_entry(&staging, key, response));
        if let Err(e) = staged {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        if !dir.exists() {
            fs::rename(&staging, &dir)
                .with_context(|| format!("failed to commit cache store {}", dir.display()))?;
            return Ok(());
        }

        for entry in fs::read_dir(&staging).context("failed to read staging directory")? {
            let entry = entry?;
            fs::rename(entry.path(), dir.join(entry.file_name()))
                .context("failed to move staged cache entry")?;
        }
        fs::remove_dir_all(&staging).context("failed to remove staging directory")?;
        Ok(())
    }

    fn lookup(&self, store: &str, key: &str) -> Result<Option<Response>> {
        let path = Self::entry_file(&self.store_dir(store)?, key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let entry: StoredEntry = serde_json::from_slice(&bytes)
            .with_context(|| format!("corrupt cache entry {}", path.display()))?;
        // Guard against hash collisions.
        if entry.key != key {
            return Ok(None);
        }
        entry.into_response().map(Some)
    }

    fn store_names(&self) -> Result<Vec<String>> {
        let read = match fs::read_dir(&self.root) {
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("failed to list cache stores"),
        };
        let mut names = Vec::new();
        for entry in read {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_store(&self, store: &str) -> Result<bool> {
        let dir = self.store_dir(store)?;
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)
            .with_context(|| format!("failed to delete cache store {}", dir.display()))?;
        Ok(true)
    }

    fn keys(&self, store: &str) -> Result<Vec<String>> {
        let dir = self.store_dir(store)?;
        let read = match fs::read_dir(&dir) {
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("failed to list cache entries"),
        };
        let mut keys = Vec::new();
        for entry in read {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Ok(bytes) = fs::read(&path)
                && let Ok(stored) = serde_json::from_slice::<StoredEntry>(&bytes)
            {
                keys.push(stored.key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(body: &str) -> Response {
        Response::new(200, body.as_bytes().to_vec()).with_header("Content-Type", "text/css")
    }

    #[test]
    fn memory_store_round_trip_and_delete() {
        let store = MemoryStore::new();
        store.put("v1", "http://a/x.css", &sample("a{}")).unwrap();
        assert_eq!(
            store.lookup("v1", "http://a/x.css").unwrap(),
            Some(sample("a{}"))
        );
        assert_eq!(store.lookup("v2", "http://a/x.css").unwrap(), None);
        assert_eq!(store.store_names().unwrap(), vec!["v1".to_string()]);
        assert!(store.delete_store("v1").unwrap());
        assert!(!store.delete_store("v1").unwrap());
    }

    #[test]
    fn disk_store_persists_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path());
        store.put("v1", "http://a/data.json", &sample("{}")).unwrap();
        store.put("v1", "http://a/data.json", &sample("{\"n\":1}")).unwrap();

        let reopened = DiskStore::new(dir.path());
        let hit = reopened.lookup("v1", "http://a/data.json").unwrap().unwrap();
        assert_eq!(hit.body, b"{\"n\":1}");
        assert_eq!(hit.header("content-type"), Some("text/css"));
        assert_eq!(reopened.keys("v1").unwrap(), vec!["http://a/data.json"]);
    }

    #[test]
    fn disk_store_put_all_merges_into_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path());
        store.put("v1", "k0", &sample("0")).unwrap();
        store
            .put_all(
                "v1",
                &[("k1".to_string(), sample("1")), ("k2".to_string(), sample("2"))],
            )
            .unwrap();
        assert_eq!(store.keys("v1").unwrap(), vec!["k0", "k1", "k2"]);
        assert_eq!(store.store_names().unwrap(), vec!["v1"]);
    }

    #[test]
    fn disk_store_lists_and_deletes_stores() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path().join("cache"));
        assert!(store.store_names().unwrap().is_empty());
        store.put("old", "k", &sample("x")).unwrap();
        store.put("new", "k", &sample("y")).unwrap();
        assert_eq!(store.store_names().unwrap(), vec!["new", "old"]);
        assert!(store.delete_store("old").unwrap());
        assert_eq!(store.store_names().unwrap(), vec!["new"]);
    }

    #[test]
    fn rejects_path_like_store_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path());
        assert!(store.put("../escape", "k", &sample("x")).is_err());
        assert!(store.put(".hidden", "k", &sample("x")).is_err());
        assert!(store.put("", "k", &sample("x")).is_err());
    }
}
