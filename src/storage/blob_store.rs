//! Object storage for document bytes
//!
//! Keys are `/`-separated relative paths such as
//! `owner-1/1700000000000-will.pdf.enc`. Writes never overwrite: putting an
//! existing key is an error, so two uploads can't silently clobber each other.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::error::{FinnestError, FinnestResult};

use super::file_io::write_bytes_atomic;

/// Content type used for ciphertext and other opaque payloads
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A key/value object store
pub trait BlobStore: Send + Sync {
    /// Store a new object; fails if `key` already exists
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> FinnestResult<()>;

    /// Fetch an object; `NotFound` if missing
    fn get(&self, key: &str) -> FinnestResult<Vec<u8>>;

    /// Remove an object, returning whether it existed
    fn delete(&self, key: &str) -> FinnestResult<bool>;

    fn exists(&self, key: &str) -> FinnestResult<bool>;
}

fn validate_key(key: &str) -> FinnestResult<()> {
    let invalid = |reason: &str| {
        Err(FinnestError::Storage(format!(
            "Invalid blob key '{}': {}",
            key, reason
        )))
    };

    if key.is_empty() {
        return invalid("empty");
    }
    if key.starts_with('/') || key.contains('\\') {
        return invalid("must be a relative '/'-separated path");
    }
    if key.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
        return invalid("contains an empty or relative segment");
    }
    Ok(())
}

/// Blob store backed by a directory on disk
pub struct LocalBlobStore {
    root: PathBuf,
    put_lock: Mutex<()>,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            put_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> FinnestResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

impl BlobStore for LocalBlobStore {
    fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> FinnestResult<()> {
        let path = self.resolve(key)?;
        let _guard = self
            .put_lock
            .lock()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire blob lock: {}", e)))?;

        if path.exists() {
            return Err(FinnestError::Storage(format!(
                "Object already exists: {}",
                key
            )));
        }
        write_bytes_atomic(&path, bytes)
    }

    fn get(&self, key: &str) -> FinnestResult<Vec<u8>> {
        let path = self.resolve(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FinnestError::blob_not_found(key))
            }
            Err(e) => Err(FinnestError::Storage(format!(
                "Failed to read object {}: {}",
                key, e
            ))),
        }
    }

    fn delete(&self, key: &str) -> FinnestResult<bool> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FinnestError::Storage(format!(
                "Failed to delete object {}: {}",
                key, e
            ))),
        }
    }

    fn exists(&self, key: &str) -> FinnestResult<bool> {
        Ok(self.resolve(key)?.is_file())
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory blob store with failure injection
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    fail_put_suffix: RwLock<Option<String>>,
    fail_deletes: RwLock<bool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `put` whose key ends with `suffix` fail
    pub fn fail_puts_ending_with(&self, suffix: impl Into<String>) {
        if let Ok(mut slot) = self.fail_put_suffix.write() {
            *slot = Some(suffix.into());
        }
    }

    /// Make every `delete` fail
    pub fn fail_deletes(&self, fail: bool) {
        if let Ok(mut slot) = self.fail_deletes.write() {
            *slot = fail;
        }
    }

    /// Content type recorded for `key`
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .ok()?
            .get(key)
            .map(|o| o.content_type.clone())
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_err(e: impl std::fmt::Display) -> FinnestError {
        FinnestError::Storage(format!("Failed to acquire blob lock: {}", e))
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> FinnestResult<()> {
        validate_key(key)?;

        let injected = self
            .fail_put_suffix
            .read()
            .map_err(Self::lock_err)?
            .as_deref()
            .is_some_and(|suffix| key.ends_with(suffix));
        if injected {
            return Err(FinnestError::Storage(format!(
                "Injected upload failure for {}",
                key
            )));
        }

        let mut objects = self.objects.write().map_err(Self::lock_err)?;
        if objects.contains_key(key) {
            return Err(FinnestError::Storage(format!(
                "Object already exists: {}",
                key
            )));
        }
        objects.insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn get(&self, key: &str) -> FinnestResult<Vec<u8>> {
        self.objects
            .read()
            .map_err(Self::lock_err)?
            .get(key)
            .map(|o| o.bytes.clone())
            .ok_or_else(|| FinnestError::blob_not_found(key))
    }

    fn delete(&self, key: &str) -> FinnestResult<bool> {
        if *self.fail_deletes.read().map_err(Self::lock_err)? {
            return Err(FinnestError::Storage(format!(
                "Injected delete failure for {}",
                key
            )));
        }
        Ok(self
            .objects
            .write()
            .map_err(Self::lock_err)?
            .remove(key)
            .is_some())
    }

    fn exists(&self, key: &str) -> FinnestResult<bool> {
        Ok(self.objects.read().map_err(Self::lock_err)?.contains_key(key))
    }
}
