//! Document vault service
//!
//! Uploads files to the blob store, optionally sealed under a passphrase, and
//! keeps one record per stored document. Each file in a batch succeeds or
//! fails on its own; a failure never leaves a half-written document behind.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audit::EntityType;
use crate::config::EncryptionPolicy;
use crate::crypto::{
    decrypt_document, encrypt_document, validate_passphrase, CryptoProvider, EncryptionMetadata,
    PlainFile, SecureString,
};
use crate::error::{FinnestError, FinnestResult};
use crate::models::document::{meta_key, storage_key};
use crate::models::{AssetId, Document, DocumentId, UploadId};
use crate::storage::{BlobStore, Storage, OCTET_STREAM};

/// Content type of the metadata sidecar
const META_CONTENT_TYPE: &str = "application/json";

/// Where one file in a batch is
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadStatus {
    Queued,
    Uploading,
    Done { document: Document },
    Error { message: String },
}

/// One file in an upload batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadItem {
    pub id: UploadId,
    pub name: String,
    pub size: u64,
    /// Coarse progress: 0 queued, 10 uploading, 100 done
    pub progress: u8,
    #[serde(flatten)]
    pub status: UploadStatus,
}

impl UploadItem {
    fn queued(file: &PlainFile) -> Self {
        Self {
            id: UploadId::new(),
            name: file.name.clone(),
            size: file.size(),
            progress: 0,
            status: UploadStatus::Queued,
        }
    }

    /// An item that failed before it could be queued, such as an unreadable file
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: UploadId::new(),
            name: name.into(),
            size: 0,
            progress: 0,
            status: UploadStatus::Error {
                message: message.into(),
            },
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.status, UploadStatus::Done { .. })
    }

    pub fn document(&self) -> Option<&Document> {
        match &self.status {
            UploadStatus::Done { document } => Some(document),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// A downloaded document, decrypted if it was stored encrypted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Service for document upload, download and bookkeeping
pub struct VaultService<'a> {
    storage: &'a Storage,
    blobs: &'a dyn BlobStore,
    crypto: &'a dyn CryptoProvider,
    policy: &'a EncryptionPolicy,
}

impl<'a> VaultService<'a> {
    pub fn new(
        storage: &'a Storage,
        blobs: &'a dyn BlobStore,
        crypto: &'a dyn CryptoProvider,
        policy: &'a EncryptionPolicy,
    ) -> Self {
        Self {
            storage,
            blobs,
            crypto,
            policy,
        }
    }

    /// Upload a batch of files
    ///
    /// With `passphrase` set every file is encrypted. A missing or short
    /// passphrase rejects the whole batch before anything is uploaded.
    pub fn upload_batch(
        &self,
        owner_id: &str,
        asset_id: Option<AssetId>,
        files: Vec<PlainFile>,
        passphrase: Option<&SecureString>,
    ) -> FinnestResult<Vec<UploadItem>> {
        self.upload_batch_with(owner_id, asset_id, files, passphrase, |_| {})
    }

    /// [`upload_batch`](Self::upload_batch), reporting every status change
    pub fn upload_batch_with<F>(
        &self,
        owner_id: &str,
        asset_id: Option<AssetId>,
        files: Vec<PlainFile>,
        passphrase: Option<&SecureString>,
        mut on_update: F,
    ) -> FinnestResult<Vec<UploadItem>>
    where
        F: FnMut(&UploadItem),
    {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() || owner_id.contains('/') {
            return Err(FinnestError::Validation(format!(
                "Invalid owner id: '{}'",
                owner_id
            )));
        }
        if let Some(passphrase) = passphrase {
            validate_passphrase(passphrase.as_str(), self.policy)?;
        }
        if let Some(asset_id) = asset_id {
            if !self.storage.assets.exists(asset_id)? {
                return Err(FinnestError::asset_not_found(asset_id.to_string()));
            }
        }

        let mut items: Vec<UploadItem> = files.iter().map(UploadItem::queued).collect();
        items.iter().for_each(&mut on_update);

        for (item, file) in items.iter_mut().zip(files.iter()) {
            item.status = UploadStatus::Uploading;
            item.progress = 10;
            on_update(&*item);

            match self.upload_one(owner_id, asset_id, item.id, file, passphrase) {
                Ok(document) => {
                    info!(name = %file.name, path = %document.path, "uploaded document");
                    item.progress = 100;
                    item.status = UploadStatus::Done { document };
                }
                Err(e) => {
                    warn!(name = %file.name, error = %e, "upload failed");
                    item.status = UploadStatus::Error {
                        message: e.to_string(),
                    };
                }
            }
            on_update(&*item);
        }

        Ok(items)
    }

    fn upload_one(
        &self,
        owner_id: &str,
        asset_id: Option<AssetId>,
        upload_id: UploadId,
        file: &PlainFile,
        passphrase: Option<&SecureString>,
    ) -> FinnestResult<Document> {
        let key = storage_key(owner_id, Utc::now(), upload_id, &file.name, passphrase.is_some());
        let mut stored_keys = Vec::with_capacity(2);

        let size = match passphrase {
            Some(passphrase) => {
                let blob = encrypt_document(self.crypto, file, passphrase.as_str(), self.policy)?;
                let meta = blob.metadata().to_json()?;

                self.blobs.put(&key, &blob.ciphertext, OCTET_STREAM)?;
                stored_keys.push(key.clone());

                let meta_path = meta_key(&key);
                if let Err(e) = self.blobs.put(&meta_path, &meta, META_CONTENT_TYPE) {
                    self.remove_blobs(&stored_keys);
                    return Err(e);
                }
                stored_keys.push(meta_path);

                blob.ciphertext.len() as u64
            }
            None => {
                let content_type = file.content_type.as_deref().unwrap_or(OCTET_STREAM);
                self.blobs.put(&key, &file.bytes, content_type)?;
                stored_keys.push(key.clone());
                file.size()
            }
        };

        let document = Document {
            id: DocumentId::new(),
            owner_id: owner_id.to_string(),
            asset_id,
            name: file.name.clone(),
            path: key,
            size,
            content_type: file.content_type.clone(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.insert_record(&document) {
            self.remove_blobs(&stored_keys);
            return Err(e);
        }

        // The document is stored at this point; an audit failure must not
        // report the item as failed
        if let Err(e) = self.storage.log_create(
            EntityType::Document,
            document.id.to_string(),
            Some(document.name.clone()),
            &document,
        ) {
            warn!(id = %document.id, error = %e, "failed to audit upload");
        }

        Ok(document)
    }

    fn insert_record(&self, document: &Document) -> FinnestResult<()> {
        self.storage.documents.upsert(document.clone())?;
        if let Err(e) = self.storage.documents.save() {
            let _ = self.storage.documents.delete(document.id);
            return Err(e);
        }
        Ok(())
    }

    /// Best-effort cleanup of objects written for a failed upload
    fn remove_blobs(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.blobs.delete(key) {
                warn!(key = %key, error = %e, "failed to clean up orphaned object");
            }
        }
    }

    /// Fetch a document, decrypting it if it was stored encrypted
    pub fn download(
        &self,
        id: DocumentId,
        passphrase: Option<&SecureString>,
    ) -> FinnestResult<DownloadedFile> {
        let document = self
            .storage
            .documents
            .get(id)?
            .ok_or_else(|| FinnestError::document_not_found(id.to_string()))?;

        let file = self.read_document(&document, passphrase)?;

        self.storage.log_access(
            EntityType::Document,
            document.id.to_string(),
            Some(document.name.clone()),
            if document.is_encrypted() {
                "decrypted"
            } else {
                "downloaded"
            },
        )?;

        Ok(file)
    }

    fn read_document(
        &self,
        document: &Document,
        passphrase: Option<&SecureString>,
    ) -> FinnestResult<DownloadedFile> {
        let Some(meta_path) = document.meta_path() else {
            let bytes = self.blobs.get(&document.path)?;
            return Ok(DownloadedFile {
                name: non_empty_or(&document.name, "file"),
                content_type: document
                    .content_type
                    .clone()
                    .unwrap_or_else(|| OCTET_STREAM.to_string()),
                bytes,
            });
        };

        let passphrase = passphrase
            .filter(|p| !p.is_empty())
            .ok_or_else(|| FinnestError::Validation("passphrase required".to_string()))?;

        let ciphertext = self.blobs.get(&document.path)?;
        let metadata = EncryptionMetadata::from_json(&self.blobs.get(&meta_path)?)?;
        debug!(path = %document.path, kdf = %metadata.kdf.describe(), "decrypting document");

        let bytes = decrypt_document(self.crypto, &ciphertext, &metadata, passphrase.as_str())?;

        let name = if metadata.orig_name.trim().is_empty() {
            non_empty_or(&document.name, "file")
        } else {
            metadata.orig_name.clone()
        };
        let content_type = metadata
            .orig_type
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| document.content_type.clone())
            .unwrap_or_else(|| OCTET_STREAM.to_string());

        Ok(DownloadedFile {
            name,
            content_type,
            bytes,
        })
    }

    /// Delete a document, its stored object and, for encrypted documents, the
    /// metadata sidecar
    ///
    /// Objects already missing from the store are ignored; any other store
    /// failure leaves the record in place so the delete can be retried.
    pub fn delete(&self, id: DocumentId) -> FinnestResult<Document> {
        let document = self
            .storage
            .documents
            .get(id)?
            .ok_or_else(|| FinnestError::document_not_found(id.to_string()))?;

        for key in std::iter::once(document.path.clone()).chain(document.meta_path()) {
            if !self.blobs.delete(&key)? {
                debug!(key = %key, "object already absent");
            }
        }

        self.storage.documents.delete(id)?;
        self.storage.documents.save()?;
        self.storage.log_delete(
            EntityType::Document,
            document.id.to_string(),
            Some(document.name.clone()),
            &document,
        )?;

        Ok(document)
    }

    /// Documents for an owner, newest first, optionally limited to one asset
    pub fn list(&self, owner_id: &str, asset_id: Option<AssetId>) -> FinnestResult<Vec<Document>> {
        self.storage.documents.get_for_owner(owner_id, asset_id)
    }

    /// Attach a document to an asset
    pub fn link(&self, id: DocumentId, asset_id: AssetId) -> FinnestResult<Document> {
        if !self.storage.assets.exists(asset_id)? {
            return Err(FinnestError::asset_not_found(asset_id.to_string()));
        }
        self.set_asset(id, Some(asset_id))
    }

    /// Detach a document from its asset
    pub fn unlink(&self, id: DocumentId) -> FinnestResult<Document> {
        self.set_asset(id, None)
    }

    fn set_asset(&self, id: DocumentId, asset_id: Option<AssetId>) -> FinnestResult<Document> {
        let before = self
            .storage
            .documents
            .get(id)?
            .ok_or_else(|| FinnestError::document_not_found(id.to_string()))?;

        let mut after = before.clone();
        after.asset_id = asset_id;

        self.storage.documents.upsert(after.clone())?;
        self.storage.documents.save()?;
        self.storage.log_update(
            EntityType::Document,
            after.id.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
        )?;

        Ok(after)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinnestPaths;
    use crate::crypto::{KdfParams, RustCryptoProvider};
    use crate::models::{Asset, CurrencyCode};
    use crate::storage::MemoryBlobStore;
    use tempfile::TempDir;

    fn fast_policy() -> EncryptionPolicy {
        EncryptionPolicy {
            min_passphrase_len: 6,
            kdf: KdfParams::Pbkdf2Sha256 { iterations: 1000 },
        }
    }

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinnestPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn files() -> Vec<PlainFile> {
        vec![
            PlainFile::new("will.pdf", Some("application/pdf".into()), b"%PDF will".to_vec()),
            PlainFile::new("photo.png", Some("image/png".into()), vec![0x89, b'P', b'N', b'G']),
        ]
    }

    #[test]
    fn test_plain_upload_and_download() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);

        let items = vault.upload_batch("owner-1", None, files(), None).unwrap();
        assert!(items.iter().all(UploadItem::is_done));
        assert!(items.iter().all(|i| i.progress == 100));

        let doc = items[0].document().unwrap();
        assert!(doc.path.starts_with("owner-1/"));
        assert!(doc.path.ends_with("-will.pdf"));
        assert_eq!(blobs.content_type(&doc.path).as_deref(), Some("application/pdf"));

        let file = vault.download(doc.id, None).unwrap();
        assert_eq!(file.bytes, b"%PDF will");
        assert_eq!(file.name, "will.pdf");
        assert_eq!(file.content_type, "application/pdf");
    }

    #[test]
    fn test_encrypted_upload_layout_and_round_trip() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);
        let pass = SecureString::new("hunter22");

        let items = vault
            .upload_batch("owner-1", None, files(), Some(&pass))
            .unwrap();
        let doc = items[0].document().unwrap();

        assert!(doc.path.ends_with("-will.pdf.enc"));
        assert_eq!(blobs.content_type(&doc.path).as_deref(), Some(OCTET_STREAM));
        assert_eq!(doc.content_type.as_deref(), Some("application/pdf"));
        assert_ne!(blobs.get(&doc.path).unwrap(), b"%PDF will");
        assert_eq!(doc.size, blobs.get(&doc.path).unwrap().len() as u64);

        let meta: serde_json::Value =
            serde_json::from_slice(&blobs.get(&format!("{}.meta.json", doc.path)).unwrap()).unwrap();
        assert_eq!(meta["v"], 1);
        assert_eq!(meta["alg"], "AES-GCM");
        assert_eq!(meta["origName"], "will.pdf");
        assert_eq!(meta["origType"], "application/pdf");
        assert_eq!(meta["origSize"], 9);

        let file = vault.download(doc.id, Some(&pass)).unwrap();
        assert_eq!(file.bytes, b"%PDF will");
        assert_eq!(file.name, "will.pdf");
        assert_eq!(file.content_type, "application/pdf");
    }

    #[test]
    fn test_encrypted_download_needs_correct_passphrase() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);
        let pass = SecureString::new("hunter22");

        let items = vault
            .upload_batch("o", None, files(), Some(&pass))
            .unwrap();
        let id = items[0].document().unwrap().id;

        assert!(vault.download(id, None).unwrap_err().is_validation());
        let err = vault
            .download(id, Some(&SecureString::new("hunter23")))
            .unwrap_err();
        assert!(err.is_decryption());
    }

    #[test]
    fn test_short_passphrase_rejects_batch_up_front() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);

        let err = vault
            .upload_batch("o", None, files(), Some(&SecureString::new("12345")))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(blobs.is_empty());
        assert_eq!(storage.documents.count().unwrap(), 0);
    }

    #[test]
    fn test_one_failure_does_not_stop_the_batch() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        blobs.fail_puts_ending_with("-photo.png");
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);

        let mut all = files();
        all.push(PlainFile::new("notes.txt", None, b"notes".to_vec()));

        let mut seen = Vec::new();
        let items = vault
            .upload_batch_with("o", None, all, None, |item| {
                seen.push((item.name.clone(), item.progress))
            })
            .unwrap();

        assert!(items[0].is_done());
        assert!(items[1].error().is_some());
        assert_eq!(items[1].progress, 10);
        assert!(items[2].is_done());
        assert_eq!(storage.documents.count().unwrap(), 2);
        assert!(seen.contains(&("photo.png".to_string(), 0)));
        assert!(seen.contains(&("notes.txt".to_string(), 100)));
    }

    #[test]
    fn test_plain_file_named_enc_stays_plain() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);

        let items = vault
            .upload_batch("o", None, vec![PlainFile::new("backup.enc", None, b"plain".to_vec())], None)
            .unwrap();
        let doc = items[0].document().unwrap().clone();
        assert!(!doc.is_encrypted());

        let file = vault.download(doc.id, None).unwrap();
        assert_eq!(file.bytes, b"plain");
        assert_eq!(file.name, "backup.enc");

        vault.delete(doc.id).unwrap();
        assert!(blobs.is_empty());
    }

    #[test]
    fn test_same_names_in_one_batch_all_upload() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);

        let batch: Vec<PlainFile> = (0..50)
            .map(|i| PlainFile::new("scan.pdf", None, vec![i as u8]))
            .collect();
        let items = vault.upload_batch("o", None, batch, None).unwrap();

        assert!(items.iter().all(UploadItem::is_done));
        assert_eq!(blobs.len(), 50);
        assert_eq!(storage.documents.count().unwrap(), 50);
    }

    #[test]
    fn test_metadata_failure_removes_ciphertext() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        blobs.fail_puts_ending_with(".meta.json");
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);

        let items = vault
            .upload_batch("o", None, files(), Some(&SecureString::new("hunter22")))
            .unwrap();

        assert!(items.iter().all(|i| i.error().is_some()));
        assert!(blobs.is_empty(), "orphaned objects: {:?}", blobs.keys());
        assert_eq!(storage.documents.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_removes_object_sidecar_and_record() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);

        let items = vault
            .upload_batch("o", None, files(), Some(&SecureString::new("hunter22")))
            .unwrap();
        let doc = items[0].document().unwrap().clone();
        assert_eq!(blobs.len(), 4);

        vault.delete(doc.id).unwrap();

        assert_eq!(blobs.len(), 2);
        assert!(!blobs.exists(&doc.path).unwrap());
        assert!(!blobs.exists(&doc.meta_path().unwrap()).unwrap());
        assert!(storage.documents.get(doc.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_tolerates_missing_object_but_not_store_errors() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);

        let items = vault.upload_batch("o", None, files(), None).unwrap();
        let first = items[0].document().unwrap().clone();
        let second = items[1].document().unwrap().clone();

        blobs.delete(&first.path).unwrap();
        vault.delete(first.id).unwrap();

        blobs.fail_deletes(true);
        assert!(vault.delete(second.id).is_err());
        assert!(storage.documents.get(second.id).unwrap().is_some());
    }

    #[test]
    fn test_link_and_unlink() {
        let (_temp, storage) = create_test_storage();
        let blobs = MemoryBlobStore::new();
        let policy = fast_policy();
        let vault = VaultService::new(&storage, &blobs, &RustCryptoProvider, &policy);

        let asset = Asset::new("o", "House", "property", CurrencyCode::parse("AUD").unwrap(), 1.0);
        let asset_id = asset.id;
        storage.assets.upsert(asset).unwrap();

        let items = vault.upload_batch("o", None, files(), None).unwrap();
        let id = items[0].document().unwrap().id;

        vault.link(id, asset_id).unwrap();
        assert_eq!(vault.list("o", Some(asset_id)).unwrap().len(), 1);
        assert!(vault.link(id, AssetId::new()).unwrap_err().is_not_found());

        vault.unlink(id).unwrap();
        assert!(vault.list("o", Some(asset_id)).unwrap().is_empty());
        assert_eq!(vault.list("o", None).unwrap().len(), 2);
    }
}
