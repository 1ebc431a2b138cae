//! Directory-backed shared tier.
//!
//! Each key is stored as one file named after the SHA-256 digest of the key,
//! so values survive process restarts and can be shared by every process
//! that mounts the same directory.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::shared::SharedTier;
use crate::error::ResolverError;

/// Storage for shared template bodies on a directory.
#[derive(Debug)]
pub struct DirectorySharedTier {
    /// Root directory for stored values.
    root: PathBuf,
    /// Counter for unique temporary file names.
    writes: AtomicU64,
}

impl DirectorySharedTier {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            writes: AtomicU64::new(0),
        }
    }

    /// Get the store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the store directory exists.
    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create shared tier directory {:?}", self.root))
    }

    /// Get the path holding the value for `key`.
    pub fn value_path(&self, key: &str) -> PathBuf {
        let hash = Sha256::digest(key.as_bytes());
        let hash_str = hex::encode(&hash[..16]);
        self.root.join(hash_str)
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read shared value from {:?}", path)),
        }
    }

    /// Write through a temporary file so readers never see a partial value.
    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;

        let path = self.value_path(key);
        let seq = self.writes.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("tmp-{}-{}", std::process::id(), seq));

        fs::write(&tmp, value).with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, &path).with_context(|| format!("Failed to move value into {:?}", path))
    }

    /// Remove the value for a key.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let path = self.value_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", path)),
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> Result<usize> {
        Ok(self.value_files()?.len())
    }

    /// Check if the store holds no values.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every stored value, returning how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let files = self.value_files()?;
        let count = files.len();

        for path in files {
            let _ = fs::remove_file(path);
        }

        Ok(count)
    }

    fn value_files(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to list shared tier {:?}", self.root))
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_none() {
                files.push(path);
            }
        }

        Ok(files)
    }
}

impl SharedTier for DirectorySharedTier {
    fn get(&self, key: &str) -> crate::error::Result<Option<String>> {
        self.read(key).map_err(|e| ResolverError::SharedTier {
            key: key.to_string(),
            message: format!("{:#}", e),
        })
    }

    fn set(&self, key: &str, value: &str) -> crate::error::Result<()> {
        self.write(key, value).map_err(|e| ResolverError::SharedTier {
            key: key.to_string(),
            message: format!("{:#}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn store_creation() {
        let temp = TempDir::new().unwrap();
        let store = DirectorySharedTier::new(temp.path());

        assert_eq!(store.root(), temp.path());
    }

    #[test]
    fn set_and_get() {
        let temp = TempDir::new().unwrap();
        let store = DirectorySharedTier::new(temp.path());

        store.set("rlt:shop", "template content").unwrap();

        assert_eq!(
            store.get("rlt:shop").unwrap(),
            Some("template content".to_string())
        );
    }

    #[test]
    fn get_missing_returns_none() {
        let temp = TempDir::new().unwrap();
        let store = DirectorySharedTier::new(temp.path());

        assert!(store.get("rlt:nonexistent").unwrap().is_none());
    }

    #[test]
    fn get_before_directory_exists_returns_none() {
        let temp = TempDir::new().unwrap();
        let store = DirectorySharedTier::new(temp.path().join("not-yet"));

        assert!(store.get("rlt:shop").unwrap().is_none());
    }

    #[test]
    fn listing_missing_directory_does_not_create_it() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("not-yet");
        let store = DirectorySharedTier::new(&root);

        assert_eq!(store.len().unwrap(), 0);
        assert!(store.is_empty().unwrap());
        assert_eq!(store.clear().unwrap(), 0);
        assert!(!root.exists());
    }

    #[test]
    fn set_overwrites_value() {
        let temp = TempDir::new().unwrap();
        let store = DirectorySharedTier::new(temp.path());

        store.set("rlt:shop", "T1").unwrap();
        store.set("rlt:shop", "T2").unwrap();

        assert_eq!(store.get("rlt:shop").unwrap(), Some("T2".to_string()));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn values_survive_new_instance() {
        let temp = TempDir::new().unwrap();
        DirectorySharedTier::new(temp.path())
            .set("rlt:shop", "T1")
            .unwrap();

        let reopened = DirectorySharedTier::new(temp.path());
        assert_eq!(reopened.get("rlt:shop").unwrap(), Some("T1".to_string()));
    }

    #[test]
    fn remove_entry() {
        let temp = TempDir::new().unwrap();
        let store = DirectorySharedTier::new(temp.path());
        store.set("rlt:shop", "T1").unwrap();

        assert!(store.remove("rlt:shop").unwrap());
        assert!(store.get("rlt:shop").unwrap().is_none());
        assert!(!store.remove("rlt:shop").unwrap());
    }

    #[test]
    fn clear_store() {
        let temp = TempDir::new().unwrap();
        let store = DirectorySharedTier::new(temp.path());
        store.set("rlt:a", "1").unwrap();
        store.set("rlt:b", "2").unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn value_path_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let store = DirectorySharedTier::new(temp.path());

        assert_eq!(store.value_path("rlt:shop"), store.value_path("rlt:shop"));
        assert_ne!(store.value_path("rlt:shop"), store.value_path("rlt:blog"));
    }

    #[test]
    fn read_error_is_shared_tier_error() {
        let temp = TempDir::new().unwrap();
        let store = DirectorySharedTier::new(temp.path());
        fs::create_dir_all(store.value_path("rlt:shop")).unwrap();

        let err = store.get("rlt:shop").unwrap_err();
        assert!(matches!(err, ResolverError::SharedTier { .. }));
    }
}
